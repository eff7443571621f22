use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExporterError {
    /// Network failure or an unusable HTTP response.
    #[error("transport error: {0}")]
    Transport(String),

    /// Response body does not match the provider's schema.
    #[error("decode error: {0}")]
    Decode(String),

    /// Well-formed response carrying an application-level error.
    #[error("provider rejected request (code {code}): {message}")]
    ProviderRejected { code: i64, message: String },

    #[error("cancelled while waiting for the rate limiter")]
    Cancelled,

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, ExporterError>;

impl ExporterError {
    /// Errors that abort a whole export cycle rather than a single series.
    pub fn aborts_cycle(&self) -> bool {
        !matches!(self, ExporterError::ProviderRejected { .. })
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ExporterError::Transport(_) | ExporterError::ProviderRejected { .. } => {
                StatusCode::BAD_GATEWAY
            }
            ExporterError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
            ExporterError::Decode(_)
            | ExporterError::Configuration(_)
            | ExporterError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<reqwest::Error> for ExporterError {
    fn from(err: reqwest::Error) -> Self {
        // The request URL carries the API key.
        ExporterError::Transport(err.without_url().to_string())
    }
}

impl From<prometheus::Error> for ExporterError {
    fn from(err: prometheus::Error) -> Self {
        ExporterError::Internal(err.to_string())
    }
}

impl IntoResponse for ExporterError {
    fn into_response(self) -> Response {
        (self.status_code(), format!("{}\n", self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_provider_rejection_is_absorbed() {
        let rejected = ExporterError::ProviderRejected {
            code: 400,
            message: "Bad Request. The series does not exist.".to_string(),
        };
        assert!(!rejected.aborts_cycle());
        assert!(ExporterError::Transport("connection reset".to_string()).aborts_cycle());
        assert!(ExporterError::Decode("bad value".to_string()).aborts_cycle());
        assert!(ExporterError::Cancelled.aborts_cycle());
    }

    #[test]
    fn test_error_response_status() {
        let resp = ExporterError::Transport("timeout".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

        let resp = ExporterError::Decode("bad date".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
