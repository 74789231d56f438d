pub mod base;
pub mod eastmoney;
