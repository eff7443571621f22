//! Access to the FRED API.
//!
//! [`SeriesProvider`] is the seam the collector depends on; [`FredClient`] is
//! the HTTP implementation that sends every request through the shared
//! [`RateLimiter`](crate::rate_limiter::RateLimiter).

pub mod client;
pub mod wire;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::registry::SeriesDescriptor;

pub use client::FredClient;

/// Value of a single observation; the provider reports `"."` when no value
/// is available for a date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ObservationValue {
    Value(f64),
    Absent,
}

impl ObservationValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ObservationValue::Value(v) => Some(*v),
            ObservationValue::Absent => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: ObservationValue,
}

#[async_trait]
pub trait SeriesProvider: Send + Sync {
    /// Most recent observation of a series, `None` if the provider returned
    /// no observations.
    async fn fetch_observations(
        &self,
        series_id: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<Observation>>;

    /// Title, frequency and units of a series.
    async fn fetch_metadata(
        &self,
        series_id: &str,
        cancel: &CancellationToken,
    ) -> Result<SeriesDescriptor>;
}
