//! Data-service collaborators supplying raw feature records.
//!
//! The engine never fetches on its own: the cache controller hands a padded
//! basepair range to a [`FeatureSource`] on a worker thread and folds the
//! result in on a later frame. Retry and backoff policy belong to the
//! source, not to the engine.

pub mod gff;

use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use thiserror::Error;

use crate::feature::FeatureRecord;

pub use gff::GffFeatureSource;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("requested range {start}-{end} is invalid")]
    InvalidRange { start: u64, end: u64 },
    #[error("data source error: {0}")]
    Source(String),
}

/// Supplier of raw feature records for a basepair range.
///
/// `scale_factor` is the requesting viewport's pixels-per-basepair factor;
/// sources may use it to pick a summarization level.
pub trait FeatureSource: Send + Sync {
    fn fetch(
        &self,
        start_index: u64,
        end_index: u64,
        scale_factor: f64,
    ) -> Result<Vec<FeatureRecord>, FetchError>;
}

/// In-memory source over a fixed record set, used by tests and demos.
pub struct InMemoryFeatureSource {
    records: Vec<FeatureRecord>,
    latency: Option<Duration>,
    fetch_count: Mutex<usize>,
}

impl InMemoryFeatureSource {
    pub fn new(records: Vec<FeatureRecord>) -> Self {
        Self {
            records,
            latency: None,
            fetch_count: Mutex::new(0),
        }
    }

    /// Simulate a slow backend; each fetch sleeps before answering.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Number of fetches served so far.
    pub fn fetch_count(&self) -> usize {
        self.fetch_count.lock().map(|count| *count).unwrap_or(0)
    }
}

impl FeatureSource for InMemoryFeatureSource {
    fn fetch(
        &self,
        start_index: u64,
        end_index: u64,
        _scale_factor: f64,
    ) -> Result<Vec<FeatureRecord>, FetchError> {
        if end_index < start_index {
            return Err(FetchError::InvalidRange {
                start: start_index,
                end: end_index,
            });
        }
        if let Some(latency) = self.latency {
            thread::sleep(latency);
        }
        if let Ok(mut count) = self.fetch_count.lock() {
            *count += 1;
        }
        Ok(self
            .records
            .iter()
            .filter(|record| record.overlaps(start_index, end_index))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(start: u64, end: u64) -> FeatureRecord {
        FeatureRecord {
            start_index: start,
            end_index: end,
            feature: Some("gene".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_in_memory_fetch_filters_by_range() {
        let source =
            InMemoryFeatureSource::new(vec![record(100, 200), record(300, 400), record(900, 950)]);
        let records = source.fetch(150, 350, 1.0).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_in_memory_fetch_counts() {
        let source = InMemoryFeatureSource::new(vec![record(100, 200)]);
        let _ = source.fetch(1, 1000, 1.0).unwrap();
        let _ = source.fetch(1, 1000, 1.0).unwrap();
        assert_eq!(source.fetch_count(), 2);
    }

    #[test]
    fn test_in_memory_fetch_invalid_range() {
        let source = InMemoryFeatureSource::new(vec![]);
        assert!(source.fetch(100, 50, 1.0).is_err());
    }

    #[test]
    fn test_in_memory_fetch_empty_result_is_ok() {
        let source = InMemoryFeatureSource::new(vec![record(100, 200)]);
        let records = source.fetch(5000, 6000, 1.0).unwrap();
        assert!(records.is_empty());
    }
}
