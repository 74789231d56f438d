use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 单条持仓披露记录：某公司在某年末的持股情况
#[derive(Debug, Clone, Serialize)]
pub struct HoldingRecord {
    pub year: i32,
    pub name: String,
    pub ownership: f64,          // 持股比例 (%)
    pub market_value_usd: f64,   // 市值 (USD 百万)
    /// 其余披露列，按表头原样保留
    pub extra: BTreeMap<String, String>,
}

/// Holding row joined with that year's closing price
#[derive(Debug, Clone, Serialize)]
pub struct MergedRecord {
    pub year: i32,
    pub ownership: f64,
    pub market_value_usd: f64,
    pub close: f64,
    /// 隐含持股数量 (百万股)，收盘价接近零时为 None
    pub implied_shares: Option<f64>,
}

/// 批量分析列表中的一项
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchEntry {
    pub name: String,
    #[serde(default)]
    pub ticker: Option<String>,
}

impl WatchEntry {
    pub fn new(name: &str, ticker: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            ticker: ticker.map(|t| t.to_string()),
        }
    }
}
