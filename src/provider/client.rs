use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::{wire, Observation, SeriesProvider};
use crate::error::{ExporterError, Result};
use crate::rate_limiter::RateLimiter;
use crate::registry::SeriesDescriptor;

const OBSERVATIONS_PATH: &str = "fred/series/observations";
const SERIES_PATH: &str = "fred/series";

/// HTTP client for the FRED API.
#[derive(Debug, Clone)]
pub struct FredClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    limiter: Arc<RateLimiter>,
}

impl FredClient {
    pub fn new(
        base_url: &str,
        api_key: &str,
        limiter: Arc<RateLimiter>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("fred-exporter/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                ExporterError::Configuration(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            limiter,
        })
    }

    /// Issue an authenticated GET once the rate limiter grants a token and
    /// decode the body.
    ///
    /// Error payloads are decoded whatever the HTTP status; a non-2xx body
    /// that does not decode is a transport failure.
    async fn get<T>(
        &self,
        path: &str,
        series_id: &str,
        cancel: &CancellationToken,
        decode: fn(&[u8]) -> Result<T>,
    ) -> Result<T> {
        self.limiter.acquire(cancel).await?;

        debug!(series = %series_id, path = %path, "requesting provider");
        let response = self
            .http
            .get(format!("{}/{}", self.base_url, path))
            .query(&[
                ("series_id", series_id),
                ("api_key", self.api_key.as_str()),
                ("file_type", "json"),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        match decode(&body[..]) {
            Err(ExporterError::Decode(reason)) if !status.is_success() => {
                Err(ExporterError::Transport(format!(
                    "unexpected HTTP status {} ({})",
                    status, reason
                )))
            }
            result => result,
        }
    }
}

#[async_trait]
impl SeriesProvider for FredClient {
    async fn fetch_observations(
        &self,
        series_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<Observation>> {
        self.get(OBSERVATIONS_PATH, series_id, cancel, wire::decode_observations)
            .await
    }

    async fn fetch_metadata(
        &self,
        series_id: &str,
        cancel: &CancellationToken,
    ) -> Result<SeriesDescriptor> {
        self.get(SERIES_PATH, series_id, cancel, wire::decode_metadata)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frequency::Frequency;
    use crate::provider::ObservationValue;
    use httpmock::prelude::*;

    fn client(server: &MockServer) -> FredClient {
        FredClient::new(
            &server.base_url(),
            "secret",
            Arc::new(RateLimiter::new(100.0, 10)),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_observations_sends_authenticated_query() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/fred/series/observations")
                    .query_param("series_id", "DGS10")
                    .query_param("api_key", "secret")
                    .query_param("file_type", "json");
                then.status(200)
                    .header("content-type", "application/json")
                    .body(r#"{"observations": [{"date": "2023-07-14", "value": "3.83"}]}"#);
            })
            .await;

        let observation = client(&server)
            .fetch_observations("DGS10", &CancellationToken::new())
            .await
            .unwrap()
            .unwrap();

        mock.assert_async().await;
        assert_eq!(observation.value, ObservationValue::Value(3.83));
    }

    #[tokio::test]
    async fn test_fetch_metadata() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/fred/series")
                    .query_param("series_id", "GDP");
                then.status(200).body(
                    r#"{"seriess": [{"id": "GDP", "title": "Gross Domestic Product", "frequency": "Quarterly", "frequency_short": "Q", "units": "Billions of Dollars"}]}"#,
                );
            })
            .await;

        let descriptor = client(&server)
            .fetch_metadata("GDP", &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(descriptor.title, "Gross Domestic Product");
        assert_eq!(descriptor.frequency, Frequency::Quarterly);
    }

    #[tokio::test]
    async fn test_error_payload_on_bad_request_is_provider_rejected() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/fred/series");
                then.status(400).body(
                    r#"{"error_code": 400, "error_message": "Bad Request.  The series does not exist."}"#,
                );
            })
            .await;

        let err = client(&server)
            .fetch_metadata("NOPE", &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, ExporterError::ProviderRejected { code: 400, .. }));
    }

    #[tokio::test]
    async fn test_unparseable_error_status_is_transport_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/fred/series/observations");
                then.status(503).body("<html>Service Unavailable</html>");
            })
            .await;

        let err = client(&server)
            .fetch_observations("GDP", &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, ExporterError::Transport(_)));
    }

    #[tokio::test]
    async fn test_malformed_success_body_is_decode_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/fred/series/observations");
                then.status(200)
                    .body(r#"{"observations": [{"date": "2023-07-14", "value": "n/a"}]}"#);
            })
            .await;

        let err = client(&server)
            .fetch_observations("GDP", &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, ExporterError::Decode(_)));
    }

    #[tokio::test]
    async fn test_cancelled_before_token_makes_no_request() {
        // Nothing listens here, so reaching the network would be a transport error.
        let client = FredClient::new(
            "http://127.0.0.1:1",
            "secret",
            Arc::new(RateLimiter::new(100.0, 10)),
            Duration::from_secs(5),
        )
        .unwrap();

        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = client.fetch_observations("GDP", &cancel).await.unwrap_err();

        assert!(matches!(err, ExporterError::Cancelled));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let client = FredClient::new(
            "http://127.0.0.1:1",
            "secret",
            Arc::new(RateLimiter::new(100.0, 10)),
            Duration::from_secs(5),
        )
        .unwrap();

        let err = client
            .fetch_observations("GDP", &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, ExporterError::Transport(_)));
    }
}
