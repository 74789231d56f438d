use crate::models::price::{PriceFetch, YearlyPrice};
use crate::retry::{FetchFailure, RetryPolicy, Sleeper};
use crate::scrapers::base::PriceSource;
use crate::util;
use chrono::NaiveDate;
use log::{info, warn};
use std::sync::Arc;

/// 年末股价服务：带重试地获取月K线并归并为每年最后一条
pub struct PriceService {
    source: Arc<dyn PriceSource + Send + Sync>,
    sleeper: Arc<dyn Sleeper + Send + Sync>,
    policy: RetryPolicy,
}

impl PriceService {
    pub fn new(
        source: Arc<dyn PriceSource + Send + Sync>,
        sleeper: Arc<dyn Sleeper + Send + Sync>,
        policy: RetryPolicy,
    ) -> Self {
        Self { source, sleeper, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// 获取每年最后一个交易日的收盘价。重试耗尽后返回 `Unavailable`，不返回错误
    pub async fn fetch_yearly_prices(&self, ticker: &str, start: &NaiveDate, end: &NaiveDate) -> PriceFetch {
        let max = self.policy.max_attempts;

        for attempt in 1..=max {
            info!("正在获取股票 {} 的数据... (尝试 {}/{}, {})", ticker, attempt, max, self.source.source_name());

            let failure = match self.source.fetch_monthly_history(ticker, start, end).await {
                Ok(observations) if observations.is_empty() => {
                    warn!("股票 {} 返回空数据", ticker);
                    FetchFailure::Empty
                }
                Ok(observations) => {
                    let yearly: Vec<YearlyPrice> = util::resample_yearly_last(&observations);
                    info!("成功获取股票 {} 的数据！共 {} 个年度收盘价", ticker, yearly.len());
                    return PriceFetch::Available(yearly);
                }
                Err(e) => {
                    warn!("获取股票数据失败 (尝试 {}/{}): {}", attempt, max, e);
                    FetchFailure::Error
                }
            };

            match self.policy.next_delay(attempt, failure) {
                Some(delay) => {
                    info!("等待 {} 秒后重试...", delay.as_secs_f64());
                    self.sleeper.sleep(delay).await;
                }
                None => break,
            }
        }

        warn!("已达到最大重试次数，放弃获取股票 {} 的数据", ticker);
        PriceFetch::Unavailable { attempts: max }
    }
}
