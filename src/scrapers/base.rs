use crate::models::price::PriceObservation;
use crate::errors::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Base trait for market data sources
#[async_trait]
pub trait PriceSource {
    /// Short name used in log lines
    fn source_name(&self) -> &'static str;

    /// Fetch forward-adjusted monthly closes for `ticker` within [start, end].
    /// An empty vector means the source answered with no data.
    async fn fetch_monthly_history(
        &self,
        ticker: &str,
        start: &NaiveDate,
        end: &NaiveDate,
    ) -> Result<Vec<PriceObservation>>;
}
