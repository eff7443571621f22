use prometheus::{Encoder, GaugeVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

use crate::error::Result;

pub const SERIES_METRIC: &str = "fred_series_values";
pub const SERIES_HELP: &str = "FRED time series";
pub const SERIES_LABEL: &str = "series";
const EXPORTER_NAMESPACE: &str = "fred_exporter";

/// One exported value, built fresh for every scrape.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSample {
    pub label: String,
    pub value: f64,
}

impl MetricSample {
    pub fn new(series_id: &str, value: f64) -> Self {
        Self {
            label: metric_label(series_id),
            value,
        }
    }
}

/// Lowercase a series id and replace `:` and `-` with `_`.
pub fn metric_label(series_id: &str) -> String {
    series_id.replace([':', '-'], "_").to_lowercase()
}

/// Counters describing the exporter itself.
#[derive(Clone)]
pub struct ExporterMetrics {
    registry: Registry,
    scrapes: IntCounter,
    scrape_errors: IntCounter,
    refreshes: IntCounterVec,
}

impl ExporterMetrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let scrapes = IntCounter::with_opts(
            Opts::new("scrapes_total", "Export cycles started").namespace(EXPORTER_NAMESPACE),
        )?;
        let scrape_errors = IntCounter::with_opts(
            Opts::new("scrape_errors_total", "Export cycles aborted by an error")
                .namespace(EXPORTER_NAMESPACE),
        )?;
        let refreshes = IntCounterVec::new(
            Opts::new("refreshes_total", "Series refreshes by outcome")
                .namespace(EXPORTER_NAMESPACE),
            &["outcome"],
        )?;

        registry.register(Box::new(scrapes.clone()))?;
        registry.register(Box::new(scrape_errors.clone()))?;
        registry.register(Box::new(refreshes.clone()))?;

        Ok(Self {
            registry,
            scrapes,
            scrape_errors,
            refreshes,
        })
    }

    pub fn record_scrape(&self) {
        self.scrapes.inc();
    }

    pub fn record_scrape_error(&self) {
        self.scrape_errors.inc();
    }

    pub fn record_refresh(&self, outcome: &str) {
        self.refreshes.with_label_values(&[outcome]).inc();
    }

    pub fn refresh_count(&self, outcome: &str) -> u64 {
        self.refreshes.with_label_values(&[outcome]).get()
    }

    pub fn scrape_count(&self) -> u64 {
        self.scrapes.get()
    }

    pub fn scrape_error_count(&self) -> u64 {
        self.scrape_errors.get()
    }

    /// Encode the series samples followed by the exporter counters in the
    /// Prometheus text format.
    pub fn render(&self, samples: &[MetricSample]) -> Result<String> {
        let series = GaugeVec::new(Opts::new(SERIES_METRIC, SERIES_HELP), &[SERIES_LABEL])?;
        for sample in samples {
            series
                .with_label_values(&[sample.label.as_str()])
                .set(sample.value);
        }

        let scrape_registry = Registry::new();
        scrape_registry.register(Box::new(series))?;

        let mut families = scrape_registry.gather();
        families.extend(self.registry.gather());

        let mut buffer = Vec::new();
        TextEncoder::new().encode(&families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_label_normalization() {
        assert_eq!(metric_label("CPIAUCSL"), "cpiaucsl");
        assert_eq!(metric_label("BAMLH0A0HYM2:EY"), "bamlh0a0hym2_ey");
        assert_eq!(metric_label("Foo-Bar:Baz"), "foo_bar_baz");
    }

    #[test]
    fn test_render_series_samples() {
        let metrics = ExporterMetrics::new().unwrap();
        metrics.record_scrape();

        let text = metrics
            .render(&[
                MetricSample::new("CPIAUCSL", 303.841),
                MetricSample::new("DGS10", 3.83),
            ])
            .unwrap();

        assert!(text.contains("# HELP fred_series_values FRED time series"));
        assert!(text.contains("# TYPE fred_series_values gauge"));
        assert!(text.contains(r#"fred_series_values{series="cpiaucsl"} 303.841"#));
        assert!(text.contains(r#"fred_series_values{series="dgs10"} 3.83"#));
        assert!(text.contains("fred_exporter_scrapes_total 1"));
    }

    #[test]
    fn test_refresh_counters() {
        let metrics = ExporterMetrics::new().unwrap();
        metrics.record_refresh("updated");
        metrics.record_refresh("updated");
        metrics.record_refresh("rejected");

        assert_eq!(metrics.refresh_count("updated"), 2);
        assert_eq!(metrics.refresh_count("rejected"), 1);
        assert_eq!(metrics.refresh_count("empty"), 0);
    }
}
