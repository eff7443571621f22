use crate::error::ExporterError;

/// Validates configuration values before the exporter starts
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validates the list of tracked series
    pub fn validate_series(series: &[String]) -> Result<(), ExporterError> {
        if series.is_empty() {
            return Err(ExporterError::Configuration(
                "At least one series must be configured".to_string(),
            ));
        }

        if series.iter().any(|s| s.trim().is_empty()) {
            return Err(ExporterError::Configuration(
                "Series IDs cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Validates the provider API key
    pub fn validate_api_key(key: &str) -> Result<(), ExporterError> {
        if key.trim().is_empty() {
            return Err(ExporterError::Configuration(
                "API key cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Validates the listen port
    pub fn validate_port(port: u16) -> Result<(), ExporterError> {
        if port == 0 {
            return Err(ExporterError::Configuration(
                "Port must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Validates the provider base URL
    pub fn validate_base_url(url: &str) -> Result<(), ExporterError> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ExporterError::Configuration(format!(
                "Base URL '{}' must start with 'http://' or 'https://'",
                url
            )));
        }

        Ok(())
    }

    /// Validates rate limiter parameters
    pub fn validate_rate_limit(rate: f64, burst: u32) -> Result<(), ExporterError> {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(ExporterError::Configuration(
                "Rate limit must be a positive number".to_string(),
            ));
        }

        if burst == 0 {
            return Err(ExporterError::Configuration(
                "Burst must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
