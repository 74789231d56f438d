use crate::models::holding::{HoldingRecord, MergedRecord};
use crate::models::price::YearlyPrice;
use log::warn;
use serde::Serialize;
use std::collections::HashMap;

/// 收盘价低于此值时不计算隐含持股数量
pub const MIN_CLOSE_PRICE: f64 = 1e-6;

/// 单个公司的分析结果，图表和报表都只依赖它
#[derive(Debug, Clone, Serialize)]
pub struct CompanyAnalysis {
    pub company: String,
    pub ticker: Option<String>,
    /// 按年份升序的持仓记录
    pub holdings: Vec<HoldingRecord>,
    /// 与年末股价内连接后的记录；没有股价时为 None
    pub merged: Option<Vec<MergedRecord>>,
}

impl CompanyAnalysis {
    pub fn has_prices(&self) -> bool {
        self.merged.is_some()
    }

    /// (first, last) year of the holdings
    pub fn year_span(&self) -> Option<(i32, i32)> {
        Some((self.holdings.first()?.year, self.holdings.last()?.year))
    }
}

/// 隐含持股数量 = 市值 / 收盘价。收盘价非有限值或接近零时返回 None
pub fn implied_share_count(market_value: f64, close: f64) -> Option<f64> {
    if !close.is_finite() || close.abs() < MIN_CLOSE_PRICE {
        return None;
    }
    Some(market_value / close)
}

/// Inner join on year: only years present on both sides survive, in the
/// order of `holdings`.
pub fn join_with_prices(holdings: &[HoldingRecord], prices: &[YearlyPrice]) -> Vec<MergedRecord> {
    let by_year: HashMap<i32, f64> = prices.iter().map(|p| (p.year, p.close)).collect();

    holdings
        .iter()
        .filter_map(|h| {
            let close = *by_year.get(&h.year)?;
            let implied_shares = implied_share_count(h.market_value_usd, close);
            if implied_shares.is_none() {
                warn!("{} {}: close price {} too small, implied share count omitted", h.name, h.year, close);
            }
            Some(MergedRecord {
                year: h.year,
                ownership: h.ownership,
                market_value_usd: h.market_value_usd,
                close,
                implied_shares,
            })
        })
        .collect()
}

/// 组装分析结果；`holdings` 需已按年份排序
pub fn build_analysis(
    company: &str,
    ticker: Option<&str>,
    holdings: Vec<HoldingRecord>,
    prices: Option<&[YearlyPrice]>,
) -> CompanyAnalysis {
    let merged = prices.map(|p| join_with_prices(&holdings, p));
    CompanyAnalysis {
        company: company.to_string(),
        ticker: ticker.map(|t| t.to_string()),
        holdings,
        merged,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn holding(year: i32, value: f64) -> HoldingRecord {
        HoldingRecord {
            year,
            name: "Tencent Holdings Ltd".to_string(),
            ownership: 0.5,
            market_value_usd: value,
            extra: BTreeMap::new(),
        }
    }

    fn price(year: i32, close: f64) -> YearlyPrice {
        YearlyPrice { year, close }
    }

    #[test]
    fn only_years_on_both_sides_survive() {
        let holdings = vec![holding(2019, 100.0), holding(2021, 300.0)];
        let prices = vec![price(2019, 10.0), price(2020, 20.0), price(2021, 30.0)];

        let merged = join_with_prices(&holdings, &prices);
        assert_eq!(merged.iter().map(|m| m.year).collect::<Vec<_>>(), vec![2019, 2021]);
        assert_eq!(merged[1].implied_shares, Some(10.0));
    }

    #[test]
    fn holdings_without_price_are_dropped() {
        let holdings = vec![holding(2015, 100.0), holding(2016, 100.0)];
        let prices = vec![price(2016, 4.0)];
        let merged = join_with_prices(&holdings, &prices);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].implied_shares, Some(25.0));
    }

    #[test]
    fn implied_shares_divides_value_by_close() {
        assert_eq!(implied_share_count(500.0, 50.0), Some(10.0));
    }

    #[test]
    fn near_zero_close_has_no_share_count() {
        assert_eq!(implied_share_count(500.0, 0.0), None);
        assert_eq!(implied_share_count(500.0, 1e-9), None);
        assert_eq!(implied_share_count(500.0, f64::NAN), None);
        assert!(implied_share_count(500.0, 0.01).is_some());
    }

    #[test]
    fn near_zero_close_row_still_joins() {
        let holdings = vec![holding(2020, 500.0)];
        let merged = join_with_prices(&holdings, &[price(2020, 0.0)]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].implied_shares, None);
    }

    #[test]
    fn analysis_without_prices_has_no_merged_rows() {
        let analysis = build_analysis("Tencent Holdings Ltd", Some("00700"), vec![holding(2019, 1.0), holding(2024, 2.0)], None);
        assert!(!analysis.has_prices());
        assert_eq!(analysis.year_span(), Some((2019, 2024)));
    }
}
