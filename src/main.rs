use anyhow::Result;
use fred_exporter::config::Config;
use fred_exporter::handlers::AppState;
use fred_exporter::metrics::ExporterMetrics;
use fred_exporter::provider::FredClient;
use fred_exporter::rate_limiter::RateLimiter;
use fred_exporter::server::Server;
use fred_exporter::SeriesCollector;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    let config = Config::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("fred_exporter={},tower_http=debug", config.log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting FRED exporter");
    tracing::info!(
        "Configuration: port={}, base_url={}, series={}, rate_limit={}/s, burst={}",
        config.port,
        config.base_url,
        config.series.join(","),
        config.rate_limit,
        config.burst
    );

    // One limiter for every provider request in the process
    let limiter = Arc::new(RateLimiter::new(config.rate_limit, config.burst));
    let client = FredClient::new(
        &config.base_url,
        &config.api_key,
        limiter,
        config.request_timeout(),
    )
    .map_err(|e| anyhow::anyhow!("Failed to create FRED client: {}", e))?;

    let metrics = ExporterMetrics::new()
        .map_err(|e| anyhow::anyhow!("Failed to create exporter metrics: {}", e))?;
    let collector = SeriesCollector::new(Arc::new(client), &config.series, metrics)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to register series: {}", e))?;

    let server = Server::new(AppState::new(collector), config.port);
    server
        .run()
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}
