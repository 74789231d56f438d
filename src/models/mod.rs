pub mod holding;
pub mod price;
