use axum::{
    extract::State,
    http::header,
    response::{Html, IntoResponse},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::collector::SeriesCollector;
use crate::error::ExporterError;
use crate::frequency::Frequency;
use crate::registry::SeriesSnapshot;

/// Shared application state
pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub collector: SeriesCollector,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(collector: SeriesCollector) -> SharedState {
        Arc::new(Self {
            collector,
            started_at: Instant::now(),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub series_count: usize,
    pub series: Vec<SeriesHealth>,
}

/// What the exporter currently knows about one tracked series.
#[derive(Debug, Serialize)]
pub struct SeriesHealth {
    pub id: String,
    pub title: String,
    pub frequency: Frequency,
    pub units: String,
    pub value: f64,
    pub latest_date: Option<String>,
    pub last_refresh: Option<String>,
}

impl SeriesHealth {
    fn new(id: &str, snapshot: &SeriesSnapshot) -> Self {
        Self {
            id: id.to_string(),
            title: snapshot.descriptor.title.clone(),
            frequency: snapshot.descriptor.frequency,
            units: snapshot.descriptor.units.clone(),
            value: snapshot.state.value,
            latest_date: snapshot.state.latest.map(|o| o.date.to_string()),
            last_refresh: snapshot.state.last_refresh.map(|t| t.to_rfc3339()),
        }
    }
}

const LANDING_PAGE: &str = r#"<html>
<head><title>FRED Exporter</title></head>
<body>
<h1>FRED Exporter</h1>
<p><a href="/metrics">Metrics</a></p>
</body>
</html>"#;

/// Run an export cycle and encode it for the scraper
pub async fn metrics_handler(
    State(state): State<SharedState>,
) -> Result<impl IntoResponse, ExporterError> {
    // Dropped with this future when the client disconnects, cancelling any
    // rate limiter wait still pending.
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    let samples = state.collector.collect(&cancel).await?;
    let body = state.collector.metrics().render(&samples)?;

    Ok(([(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)], body))
}

/// Health check endpoint, listing every tracked series
pub async fn health_check(
    State(state): State<SharedState>,
) -> Result<Json<HealthResponse>, ExporterError> {
    let registry = state.collector.registry();
    let mut series = Vec::with_capacity(registry.len()?);
    registry.for_each(|id, snapshot| series.push(SeriesHealth::new(id, snapshot)))?;
    series.sort_by(|a, b| a.id.cmp(&b.id));

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        series_count: series.len(),
        series,
    }))
}

pub async fn landing_page() -> Html<&'static str> {
    Html(LANDING_PAGE)
}
