use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::{ExporterError, Result};
use crate::frequency::Frequency;
use crate::provider::Observation;

/// Metadata fetched once when a series is registered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesDescriptor {
    pub title: String,
    pub frequency: Frequency,
    pub units: String,
}

/// Cached value of a series and when it was last refreshed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesState {
    pub value: f64,
    pub last_refresh: Option<DateTime<Utc>>,
    pub latest: Option<Observation>,
}

impl Default for SeriesState {
    fn default() -> Self {
        Self {
            value: 0.0,
            last_refresh: None,
            latest: None,
        }
    }
}

impl SeriesState {
    /// State after a refresh that produced `observation`. An absent value
    /// keeps the previous number.
    pub fn observed(&self, observation: Observation, now: DateTime<Utc>) -> Self {
        Self {
            value: observation.value.as_f64().unwrap_or(self.value),
            last_refresh: Some(now),
            latest: Some(observation),
        }
    }

    /// State after a refresh that did not produce a value.
    pub fn touched(&self, now: DateTime<Utc>) -> Self {
        Self {
            last_refresh: Some(now),
            ..*self
        }
    }
}

/// Consistent copy of one series.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesSnapshot {
    pub descriptor: Arc<SeriesDescriptor>,
    pub state: SeriesState,
}

#[derive(Debug)]
struct SeriesSlot {
    descriptor: Arc<SeriesDescriptor>,
    state: RwLock<SeriesState>,
}

impl SeriesSlot {
    fn snapshot(&self) -> Result<SeriesSnapshot> {
        let state = *self
            .state
            .read()
            .map_err(|_| ExporterError::Internal("Failed to acquire read lock on series state".to_string()))?;
        Ok(SeriesSnapshot {
            descriptor: self.descriptor.clone(),
            state,
        })
    }
}

/// Thread-safe store of every tracked series.
///
/// The map itself is only written during registration. Each series' state has
/// its own lock and is replaced as a whole, so a reader never sees a value
/// from one refresh next to the timestamp of another.
#[derive(Debug, Default)]
pub struct SeriesRegistry {
    series: RwLock<HashMap<String, Arc<SeriesSlot>>>,
}

impl SeriesRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a series with its descriptor and a default state.
    pub fn register(&self, id: &str, descriptor: SeriesDescriptor) -> Result<()> {
        let mut series = self
            .series
            .write()
            .map_err(|_| ExporterError::Internal("Failed to acquire write lock on registry".to_string()))?;

        if series.contains_key(id) {
            return Err(ExporterError::Configuration(format!(
                "Series '{}' is already registered",
                id
            )));
        }

        series.insert(
            id.to_string(),
            Arc::new(SeriesSlot {
                descriptor: Arc::new(descriptor),
                state: RwLock::new(SeriesState::default()),
            }),
        );
        Ok(())
    }

    pub fn get(&self, id: &str) -> Result<Option<SeriesSnapshot>> {
        match self.slot(id)? {
            Some(slot) => Ok(Some(slot.snapshot()?)),
            None => Ok(None),
        }
    }

    /// Replace the state of a series.
    pub fn update_state(&self, id: &str, state: SeriesState) -> Result<()> {
        self.modify_state(id, |_| state).map(|_| ())
    }

    /// Derive the new state of a series from its current one under the
    /// series' write lock, returning the stored state.
    pub fn modify_state<F>(&self, id: &str, f: F) -> Result<SeriesState>
    where
        F: FnOnce(&SeriesState) -> SeriesState,
    {
        let slot = self
            .slot(id)?
            .ok_or_else(|| ExporterError::Internal(format!("Series '{}' is not registered", id)))?;

        let mut state = slot
            .state
            .write()
            .map_err(|_| ExporterError::Internal("Failed to acquire write lock on series state".to_string()))?;
        let next = f(&*state);
        *state = next;
        Ok(next)
    }

    /// Visit a snapshot of every series, in no particular order.
    pub fn for_each<F>(&self, mut visit: F) -> Result<()>
    where
        F: FnMut(&str, &SeriesSnapshot),
    {
        let series = self
            .series
            .read()
            .map_err(|_| ExporterError::Internal("Failed to acquire read lock on registry".to_string()))?;

        for (id, slot) in series.iter() {
            visit(id, &slot.snapshot()?);
        }
        Ok(())
    }

    /// Identifiers of every registered series.
    pub fn ids(&self) -> Result<Vec<String>> {
        let series = self
            .series
            .read()
            .map_err(|_| ExporterError::Internal("Failed to acquire read lock on registry".to_string()))?;
        Ok(series.keys().cloned().collect())
    }

    pub fn len(&self) -> Result<usize> {
        let series = self
            .series
            .read()
            .map_err(|_| ExporterError::Internal("Failed to acquire read lock on registry".to_string()))?;
        Ok(series.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    fn slot(&self, id: &str) -> Result<Option<Arc<SeriesSlot>>> {
        let series = self
            .series
            .read()
            .map_err(|_| ExporterError::Internal("Failed to acquire read lock on registry".to_string()))?;
        Ok(series.get(id).cloned())
    }
}
