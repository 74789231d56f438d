pub mod analysis_service;
pub mod price_service;
