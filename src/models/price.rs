use chrono::NaiveDate;
use serde::Serialize;

/// 行情源返回的单条K线（只保留收盘价）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceObservation {
    pub date: NaiveDate,
    pub close: f64,
}

/// 年末收盘价
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearlyPrice {
    pub year: i32,
    pub close: f64,
}

/// Outcome of a price fetch. Transient failures never escape as errors.
#[derive(Debug, Clone, PartialEq)]
pub enum PriceFetch {
    Available(Vec<YearlyPrice>),
    Unavailable { attempts: u32 },
}

impl PriceFetch {
    pub fn prices(&self) -> Option<&[YearlyPrice]> {
        match self {
            PriceFetch::Available(prices) => Some(prices),
            PriceFetch::Unavailable { .. } => None,
        }
    }
}
