pub mod collector;
pub mod config;
pub mod config_validator;
pub mod error;
pub mod frequency;
pub mod freshness;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod provider;
pub mod rate_limiter;
pub mod registry;
pub mod server;
pub mod token_bucket;

pub use collector::SeriesCollector;
pub use config::Config;
pub use error::{ExporterError, Result};
pub use server::create_app;
