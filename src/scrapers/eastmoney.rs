use crate::models::price::PriceObservation;
use crate::errors::{Result, HoldingsError};
use crate::scrapers::base::PriceSource;
use crate::util;
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use log::debug;

const DEFAULT_BASE_URL: &str = "https://push2his.eastmoney.com";
// 港股市场代码
const HK_MARKET_ID: &str = "116";
// 月K线
const MONTHLY_PERIOD: &str = "103";
// 前复权
const FORWARD_ADJUSTED: &str = "1";

/// 东方财富港股历史行情
pub struct EastMoneyHkSource {
    client: Client,
    base_url: String,
}

impl EastMoneyHkSource {
    /// 创建新的行情源，`timeout` 作用于每一次请求
    pub fn new(timeout: Duration) -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL, timeout)
    }

    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(HoldingsError::RequestError)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

/// 解析K线响应。`data` 为 null 或 `klines` 为空时返回空结果
pub fn parse_kline_response(json: &Value) -> Result<Vec<PriceObservation>> {
    let klines = match json.get("data").and_then(|d| d.get("klines")).and_then(|k| k.as_array()) {
        Some(klines) => klines,
        None => return Ok(Vec::new()),
    };

    let mut observations = Vec::with_capacity(klines.len());

    // 格式: 日期,开盘,收盘,最高,最低,成交量,成交额,振幅,涨跌幅,涨跌额,换手率
    for line in klines {
        let line = match line.as_str() {
            Some(s) => s,
            None => continue,
        };
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() < 3 {
            return Err(HoldingsError::SourceError(format!("Malformed kline: {}", line)));
        }

        let date = NaiveDate::parse_from_str(fields[0], "%Y-%m-%d")?;
        let close = fields[2].parse::<f64>()
            .map_err(|_| HoldingsError::SourceError(format!("Invalid close price in kline: {}", line)))?;

        observations.push(PriceObservation { date, close });
    }

    observations.sort_by_key(|o| o.date);
    Ok(observations)
}

#[async_trait]
impl PriceSource for EastMoneyHkSource {
    fn source_name(&self) -> &'static str {
        "EastMoney"
    }

    async fn fetch_monthly_history(
        &self,
        ticker: &str,
        start: &NaiveDate,
        end: &NaiveDate,
    ) -> Result<Vec<PriceObservation>> {
        let secid = format!("{}.{}", HK_MARKET_ID, ticker);
        let beg = util::naive_date_to_compact(start);
        let end = util::naive_date_to_compact(end);
        debug!("请求 {} 月K线 {} - {}", secid, beg, end);

        let response = self.client
            .get(format!("{}/api/qt/stock/kline/get", self.base_url))
            .query(&[
                ("secid", secid.as_str()),
                ("fields1", "f1,f2,f3,f4,f5,f6"),
                ("fields2", "f51,f52,f53,f54,f55,f56,f57,f58,f59,f60,f61"),
                ("klt", MONTHLY_PERIOD),
                ("fqt", FORWARD_ADJUSTED),
                ("beg", beg.as_str()),
                ("end", end.as_str()),
                ("lmt", "1000000"),
            ])
            .header("Referer", "https://quote.eastmoney.com/")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(HoldingsError::SourceError(format!(
                "{} returned HTTP status {}", self.source_name(), status
            )));
        }

        let json: Value = response.json().await?;
        let observations = parse_kline_response(&json)?;

        debug!("获取到 {} 条月K线记录", observations.len());
        Ok(observations)
    }
}
