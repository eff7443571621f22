//! Response bodies of the FRED API.
//!
//! Bodies are first read into string-typed records, then dates and numbers are
//! converted explicitly so schema problems surface as `Decode` errors.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

use super::{Observation, ObservationValue};
use crate::error::{ExporterError, Result};
use crate::frequency::Frequency;
use crate::registry::SeriesDescriptor;

/// Value the provider uses when an observation has no data.
pub const MISSING_VALUE: &str = ".";

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Default, Deserialize)]
struct ProviderStatus {
    #[serde(default, deserialize_with = "lenient_i64")]
    error_code: Option<i64>,
    #[serde(default)]
    error_message: Option<String>,
}

impl ProviderStatus {
    fn check(&self) -> Result<()> {
        let message = self
            .error_message
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty());
        let code = self.error_code.filter(|c| *c != 0);

        match (code, message) {
            (None, None) => Ok(()),
            (code, message) => Err(ExporterError::ProviderRejected {
                code: code.unwrap_or_default(),
                message: message.unwrap_or("no error message").to_string(),
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    #[serde(flatten)]
    status: ProviderStatus,
    #[serde(default)]
    observations: Vec<WireObservation>,
}

#[derive(Debug, Deserialize)]
struct WireObservation {
    date: String,
    value: String,
}

#[derive(Debug, Deserialize)]
struct MetadataResponse {
    #[serde(flatten)]
    status: ProviderStatus,
    // The provider really spells it this way.
    #[serde(default)]
    seriess: Vec<WireSeries>,
}

#[derive(Debug, Deserialize)]
struct WireSeries {
    #[serde(default)]
    title: String,
    #[serde(default)]
    frequency: String,
    #[serde(default)]
    frequency_short: String,
    #[serde(default)]
    units: String,
}

/// Decode an observations body into its most recent observation.
pub fn decode_observations(body: &[u8]) -> Result<Option<Observation>> {
    let response: ObservationsResponse = serde_json::from_slice(body)
        .map_err(|e| ExporterError::Decode(format!("observations response: {}", e)))?;
    response.status.check()?;

    let mut latest: Option<Observation> = None;
    for raw in &response.observations {
        let observation = Observation {
            date: parse_date(&raw.date)?,
            value: parse_value(&raw.value)?,
        };
        if latest.map_or(true, |l| observation.date >= l.date) {
            latest = Some(observation);
        }
    }
    Ok(latest)
}

/// Decode a series metadata body into a descriptor.
pub fn decode_metadata(body: &[u8]) -> Result<SeriesDescriptor> {
    let response: MetadataResponse = serde_json::from_slice(body)
        .map_err(|e| ExporterError::Decode(format!("series response: {}", e)))?;
    response.status.check()?;

    let series = response
        .seriess
        .into_iter()
        .next()
        .ok_or_else(|| ExporterError::Decode("series response contains no series".to_string()))?;

    let frequency = match Frequency::from_code(&series.frequency_short) {
        Frequency::Unknown => Frequency::from_code(&series.frequency),
        known => known,
    };

    Ok(SeriesDescriptor {
        title: series.title,
        frequency,
        units: series.units,
    })
}

pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|e| ExporterError::Decode(format!("invalid date '{}': {}", raw, e)))
}

pub fn parse_value(raw: &str) -> Result<ObservationValue> {
    if raw == MISSING_VALUE {
        return Ok(ObservationValue::Absent);
    }
    raw.trim()
        .parse::<f64>()
        .map(ObservationValue::Value)
        .map_err(|_| ExporterError::Decode(format!("invalid observation value '{}'", raw)))
}

fn lenient_i64<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(i64),
        String(String),
    }

    match Option::<NumberOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrString::Number(n)) => Ok(Some(n)),
        Some(NumberOrString::String(s)) if s.trim().is_empty() => Ok(None),
        Some(NumberOrString::String(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}
