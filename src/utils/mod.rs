pub mod config;
pub mod errors;
pub mod forecast_store;
pub mod forecast_types;
pub mod forecast_utils;
