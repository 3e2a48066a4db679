use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use crate::models::reading::{NewReadingRecord, ReadingRecord};
use super::errors::RepositoryError;

#[derive(Debug)]
struct InMemoryState {
    next_id: i64,
    readings: BTreeMap<i64, ReadingRecord>,
}

/// In-memory storage used when the database is not available
#[derive(Debug, Clone)]
pub struct InMemoryStorage {
    state: Arc<Mutex<InMemoryState>>,
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStorage {
    /// Create a new in-memory storage
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(InMemoryState {
                next_id: 1,
                readings: BTreeMap::new(),
            })),
        }
    }

    /// Store a reading, assigning the next identifier
    pub async fn insert(&self, record: NewReadingRecord) -> Result<ReadingRecord, RepositoryError> {
        let mut state = self.state.lock()?;
        let id = state.next_id;
        state.next_id += 1;

        let stored = record.into_record(id);
        state.readings.insert(id, stored.clone());
        Ok(stored)
    }

    /// Readings with `start_ms <= created_at_ms <= end_ms`, oldest first
    pub async fn get_in_range(&self, start_ms: i64, end_ms: i64) -> Result<Vec<ReadingRecord>, RepositoryError> {
        let state = self.state.lock()?;

        let mut readings: Vec<ReadingRecord> = state.readings
            .values()
            .filter(|r| r.created_at_ms >= start_ms && r.created_at_ms <= end_ms)
            .cloned()
            .collect();

        // Ties keep insertion order
        readings.sort_by_key(|r| (r.created_at_ms, r.reading_id));
        Ok(readings)
    }
}
