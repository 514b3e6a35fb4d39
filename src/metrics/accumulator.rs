use super::flatten::Fields;
use chrono::{
    DateTime,
    Utc,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::{
    collections::BTreeMap,
    sync::{
        Mutex,
        MutexGuard,
    },
};

pub type Tags = BTreeMap<String, String>;

/// Receives the flattened fields of every successful poll.
///
/// Implementations are shared by all concurrent polls of a gather cycle and
/// must accept appends from several tasks at once.
pub trait Accumulator: Send + Sync {
    fn add_fields(&self, measurement: &str, fields: Fields, tags: Tags);
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub measurement: String,
    pub fields: Fields,
    pub tags: Tags,
    pub timestamp: DateTime<Utc>,
}

impl Metric {
    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags.get(name).map(String::as_str)
    }
}

/// Append-only in-memory sink.
#[derive(Debug, Default)]
pub struct MemoryAccumulator {
    metrics: Mutex<Vec<Metric>>,
}

impl MemoryAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Metric>> {
        // Appends are single pushes, so the vector is consistent even if an appender panicked.
        self.metrics.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn metrics(&self) -> Vec<Metric> {
        self.lock().clone()
    }

    /// Takes everything accumulated so far, leaving the sink empty.
    pub fn drain(&self) -> Vec<Metric> {
        std::mem::take(&mut *self.lock())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl Accumulator for MemoryAccumulator {
    fn add_fields(&self, measurement: &str, fields: Fields, tags: Tags) {
        self.lock().push(Metric {
            measurement: measurement.to_string(),
            fields,
            tags,
            timestamp: Utc::now(),
        });
    }
}
