use clap::Parser;
use std::time::Duration;

use crate::config_validator::ConfigValidator;
use crate::error::ExporterError;

pub const DEFAULT_BASE_URL: &str = "https://api.stlouisfed.org";

#[derive(Debug, Parser, Clone)]
#[command(name = "fred-exporter", version, about = "Prometheus exporter for FRED time series")]
pub struct Config {
    /// FRED series ID to track (repeatable)
    #[arg(long = "series", env = "FRED_SERIES", value_delimiter = ',', required = true)]
    pub series: Vec<String>,

    /// FRED API key
    #[arg(long = "key", env = "FRED_API_KEY")]
    pub api_key: String,

    /// HTTP port to serve metrics on
    #[arg(long, env = "PORT", default_value_t = 9170)]
    pub port: u16,

    /// Base URL of the FRED API
    #[arg(long, env = "FRED_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Provider requests per second
    #[arg(long, env = "FRED_RATE_LIMIT", default_value_t = 1.0)]
    pub rate_limit: f64,

    /// Maximum burst of provider requests
    #[arg(long, env = "FRED_BURST", default_value_t = 3)]
    pub burst: u32,

    /// Timeout for a single provider request, in seconds
    #[arg(long, env = "FRED_REQUEST_TIMEOUT", default_value_t = 30)]
    pub request_timeout: u64,

    /// Log level used when RUST_LOG is not set
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Config {
    /// Parse command-line flags and environment, then validate.
    pub fn load() -> Result<Self, ExporterError> {
        let config = Config::parse();
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ExporterError> {
        ConfigValidator::validate_series(&self.series)?;
        ConfigValidator::validate_api_key(&self.api_key)?;
        ConfigValidator::validate_port(self.port)?;
        ConfigValidator::validate_base_url(&self.base_url)?;
        ConfigValidator::validate_rate_limit(self.rate_limit, self.burst)?;
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}
