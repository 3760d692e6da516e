//! Generic web sources

pub mod numeric_api;
pub mod web;

pub use numeric_api::NumericApiResponseSource;
pub use web::WebPriceService;
