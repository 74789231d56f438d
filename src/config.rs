use chrono::NaiveDate;
use std::time::Duration;

use crate::errors::{HoldingsError, Result};

pub struct Config {
    pub data_dir: String,
    pub output_dir: String,
    pub start_year: i32,
    pub end_year: i32,
    pub max_retries: u32,
    pub request_timeout: Duration,
    pub write_charts: bool,
}

impl Config {
    pub fn new() -> Self {
        Self {
            data_dir: "datasets".to_string(),
            output_dir: "charts".to_string(),
            start_year: 2015,
            end_year: 2025,
            max_retries: 3,
            request_timeout: Duration::from_secs(30),
            write_charts: true,
        }
    }

    pub fn with_data_dir(mut self, dir: &str) -> Self {
        self.data_dir = dir.to_string();
        self
    }

    pub fn with_output_dir(mut self, dir: &str) -> Self {
        self.output_dir = dir.to_string();
        self
    }

    pub fn with_years(mut self, start_year: i32, end_year: i32) -> Self {
        self.start_year = start_year;
        self.end_year = end_year;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_write_charts(mut self, write_charts: bool) -> Self {
        self.write_charts = write_charts;
        self
    }

    /// 年份区间内的所有年份（含首尾）
    pub fn years(&self) -> Vec<i32> {
        (self.start_year..=self.end_year).collect()
    }

    /// 股价查询窗口：起始年1月1日到结束年12月31日
    pub fn price_window(&self) -> Result<(NaiveDate, NaiveDate)> {
        let start = NaiveDate::from_ymd_opt(self.start_year, 1, 1)
            .ok_or_else(|| HoldingsError::DataError(format!("Invalid start year: {}", self.start_year)))?;
        let end = NaiveDate::from_ymd_opt(self.end_year, 12, 31)
            .ok_or_else(|| HoldingsError::DataError(format!("Invalid end year: {}", self.end_year)))?;
        if start > end {
            return Err(HoldingsError::DataError(format!(
                "Start year {} is after end year {}", self.start_year, self.end_year
            )));
        }
        Ok((start, end))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_window_covers_2015_to_2025() {
        let config = Config::new();
        let (start, end) = config.price_window().unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2015, 1, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());
        assert_eq!(config.years().len(), 11);
    }

    #[test]
    fn inverted_years_are_rejected() {
        let config = Config::new().with_years(2024, 2020);
        assert!(config.price_window().is_err());
    }
}
