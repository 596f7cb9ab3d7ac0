pub mod api;
pub mod bootstrap;
pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod ingest;
pub mod model;
pub mod process;
pub mod query;
pub mod service;
pub mod store;

pub use error::{AirQualityError, Result};
