// 公开导出的模块，供外部使用
pub mod models;
pub mod data_provider;
pub mod errors;
pub mod analysis;
pub mod render;
pub mod retry;
pub mod watchlist;

// 主程序使用的内部模块
#[doc(hidden)]
pub mod scrapers;
#[doc(hidden)]
pub mod config;
#[doc(hidden)]
pub mod services;
#[doc(hidden)]
pub mod util;

// 重新导出常用类型，方便使用
pub use models::holding::{HoldingRecord, MergedRecord, WatchEntry};
pub use models::price::{PriceFetch, PriceObservation, YearlyPrice};
pub use data_provider::HoldingsProvider;
pub use errors::{Result, HoldingsError};
