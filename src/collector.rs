use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::error::{ExporterError, Result};
use crate::freshness;
use crate::metrics::{metric_label, ExporterMetrics, MetricSample};
use crate::provider::SeriesProvider;
use crate::registry::{SeriesDescriptor, SeriesRegistry, SeriesState};

/// How a stale series was resolved during an export cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// New observation stored.
    Updated,
    /// Provider returned no observations.
    Empty,
    /// Provider answered with an application-level error.
    Rejected,
}

impl RefreshOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefreshOutcome::Updated => "updated",
            RefreshOutcome::Empty => "empty",
            RefreshOutcome::Rejected => "rejected",
        }
    }
}

/// Refreshes stale series on demand and produces one sample per series.
#[derive(Clone)]
pub struct SeriesCollector {
    registry: Arc<SeriesRegistry>,
    provider: Arc<dyn SeriesProvider>,
    metrics: ExporterMetrics,
}

impl SeriesCollector {
    /// Fetch metadata for every configured series and register it.
    ///
    /// A series whose metadata cannot be fetched is still registered with an
    /// empty descriptor; its unknown frequency makes it stale on every scrape.
    pub async fn new(
        provider: Arc<dyn SeriesProvider>,
        series: &[String],
        metrics: ExporterMetrics,
    ) -> Result<Self> {
        let registry = Arc::new(SeriesRegistry::new());
        let cancel = CancellationToken::new();
        let mut labels: HashMap<String, &str> = HashMap::new();

        for id in series {
            let label = metric_label(id);
            if let Some(first) = labels.get(&label).copied() {
                if first == id.as_str() {
                    warn!(series = %id, "series configured more than once, ignoring duplicate");
                } else {
                    warn!(
                        series = %id,
                        conflicts_with = %first,
                        "series exports under the same label as another series, ignoring it"
                    );
                }
                continue;
            }
            labels.insert(label, id.as_str());

            let descriptor = match provider.fetch_metadata(id, &cancel).await {
                Ok(descriptor) => {
                    info!(
                        series = %id,
                        title = %descriptor.title,
                        frequency = %descriptor.frequency,
                        "registered series"
                    );
                    descriptor
                }
                Err(e) => {
                    warn!(
                        series = %id,
                        error = %e,
                        "failed to fetch series metadata, registering without it"
                    );
                    SeriesDescriptor::default()
                }
            };
            registry.register(id, descriptor)?;
        }

        Ok(Self {
            registry,
            provider,
            metrics,
        })
    }

    pub fn registry(&self) -> &Arc<SeriesRegistry> {
        &self.registry
    }

    pub fn metrics(&self) -> &ExporterMetrics {
        &self.metrics
    }

    /// Run one export cycle at the current time.
    pub async fn collect(&self, cancel: &CancellationToken) -> Result<Vec<MetricSample>> {
        self.collect_at(Utc::now(), cancel).await
    }

    /// Run one export cycle, treating `now` as the current time.
    ///
    /// Either every series yields a sample or the cycle fails as a whole on
    /// the first transport, decode or cancellation error.
    pub async fn collect_at(
        &self,
        now: DateTime<Utc>,
        cancel: &CancellationToken,
    ) -> Result<Vec<MetricSample>> {
        self.metrics.record_scrape();

        let result = self.run_cycle(now, cancel).await;
        if let Err(e) = &result {
            self.metrics.record_scrape_error();
            error!(error = %e, "export cycle aborted");
        }
        result
    }

    async fn run_cycle(
        &self,
        now: DateTime<Utc>,
        cancel: &CancellationToken,
    ) -> Result<Vec<MetricSample>> {
        let ids = self.registry.ids()?;
        let mut samples = Vec::with_capacity(ids.len());

        for id in ids {
            let snapshot = self.registry.get(&id)?.ok_or_else(|| {
                ExporterError::Internal(format!("Series '{}' disappeared from registry", id))
            })?;

            let state = if freshness::needs_refresh(
                snapshot.descriptor.frequency,
                snapshot.state.last_refresh,
                now,
            ) {
                self.refresh(&id, now, cancel).await?
            } else {
                debug!(series = %id, "cached value is fresh");
                snapshot.state
            };

            samples.push(MetricSample::new(&id, state.value));
        }

        Ok(samples)
    }

    /// Refresh one series on its own task, so a fetch that already got past
    /// the rate limiter still reaches the registry if this cycle is dropped.
    async fn refresh(
        &self,
        id: &str,
        now: DateTime<Utc>,
        cancel: &CancellationToken,
    ) -> Result<SeriesState> {
        let task = tokio::spawn(refresh_series(
            self.provider.clone(),
            self.registry.clone(),
            self.metrics.clone(),
            id.to_string(),
            now,
            cancel.clone(),
        ));

        task.await
            .map_err(|e| ExporterError::Internal(format!("Refresh task failed: {}", e)))?
    }
}

async fn refresh_series(
    provider: Arc<dyn SeriesProvider>,
    registry: Arc<SeriesRegistry>,
    metrics: ExporterMetrics,
    id: String,
    now: DateTime<Utc>,
    cancel: CancellationToken,
) -> Result<SeriesState> {
    let (state, outcome) = match provider.fetch_observations(&id, &cancel).await {
        Ok(Some(observation)) => {
            let state = registry.modify_state(&id, |s| s.observed(observation, now))?;
            debug!(series = %id, date = %observation.date, value = state.value, "series refreshed");
            (state, RefreshOutcome::Updated)
        }
        Ok(None) => {
            let state = registry.modify_state(&id, |s| s.touched(now))?;
            debug!(series = %id, "provider returned no observations");
            (state, RefreshOutcome::Empty)
        }
        Err(ExporterError::ProviderRejected { code, message }) => {
            let state = registry.modify_state(&id, |s| s.touched(now))?;
            warn!(series = %id, code, message = %message, "provider rejected observations request");
            (state, RefreshOutcome::Rejected)
        }
        Err(e) => return Err(e),
    };

    metrics.record_refresh(outcome.as_str());
    Ok(state)
}
