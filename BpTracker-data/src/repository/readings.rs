use async_trait::async_trait;
use tracing::{debug, error};

use crate::database::{get_db_pool, DatabasePool};
use crate::models::reading::{NewReadingRecord, ReadingRecord};
use super::errors::RepositoryError;
use super::in_memory::InMemoryStorage;
use super::storage::DatabaseStorage;

/// Repository trait for blood pressure readings
#[async_trait]
pub trait ReadingsRepositoryTrait {
    /// Insert a new reading
    async fn create(&self, record: NewReadingRecord) -> Result<ReadingRecord, RepositoryError>;

    /// Readings recorded within `[start_ms, end_ms]`, oldest first
    async fn get_in_range(&self, start_ms: i64, end_ms: i64) -> Result<Vec<ReadingRecord>, RepositoryError>;
}

/// Repository for blood pressure readings.
///
/// Uses the SQLite pool when one is available and in-memory storage only
/// when there is no pool. Errors from an available pool are returned, never
/// papered over with the fallback.
#[derive(Debug, Clone, Default)]
pub struct ReadingsRepository {
    /// Explicit pool; the global pool is used when unset
    pool: Option<DatabasePool>,
    /// In-memory storage for when database is not available
    storage: InMemoryStorage,
}

impl ReadingsRepository {
    /// Create a repository backed by the global database pool
    pub fn new() -> Self {
        Self {
            pool: None,
            storage: InMemoryStorage::new(),
        }
    }

    /// Create a repository backed by a specific pool
    pub fn with_pool(pool: DatabasePool) -> Self {
        Self {
            pool: Some(pool),
            storage: InMemoryStorage::new(),
        }
    }

    fn pool(&self) -> Result<DatabasePool, RepositoryError> {
        match &self.pool {
            Some(pool) => Ok(pool.clone()),
            None => Ok(get_db_pool()?),
        }
    }
}

#[async_trait]
impl ReadingsRepositoryTrait for ReadingsRepository {
    async fn create(&self, record: NewReadingRecord) -> Result<ReadingRecord, RepositoryError> {
        match self.pool() {
            Ok(pool) => DatabaseStorage::insert(&pool, record).await.map_err(|e| {
                error!("Failed to store reading in database: {}", e);
                e
            }),
            Err(e) => {
                debug!("Database not available ({}), using in-memory storage", e);
                self.storage.insert(record).await
            }
        }
    }

    async fn get_in_range(&self, start_ms: i64, end_ms: i64) -> Result<Vec<ReadingRecord>, RepositoryError> {
        match self.pool() {
            Ok(pool) => DatabaseStorage::get_in_range(&pool, start_ms, end_ms).await.map_err(|e| {
                error!("Failed to get readings from database: {}", e);
                e
            }),
            Err(e) => {
                debug!("Database not available ({}), using in-memory storage for get_in_range", e);
                self.storage.get_in_range(start_ms, end_ms).await
            }
        }
    }
}

/// Mock readings repository for testing
#[cfg(any(test, feature = "mock"))]
pub mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Mock implementation of the readings repository
    #[derive(Debug, Default)]
    pub struct MockReadingsRepository {
        readings: Mutex<Vec<ReadingRecord>>,
        fail: bool,
    }

    impl MockReadingsRepository {
        /// Create a new empty mock repository
        pub fn new() -> Self {
            Self::default()
        }

        /// Create a mock repository with predefined readings
        pub fn with_readings(readings: Vec<ReadingRecord>) -> Self {
            Self { readings: Mutex::new(readings), fail: false }
        }

        /// Make every operation fail with a lock error
        pub fn failing() -> Self {
            Self { readings: Mutex::new(Vec::new()), fail: true }
        }

        fn check(&self) -> Result<(), RepositoryError> {
            if self.fail {
                Err(RepositoryError::Lock("mock repository is configured to fail".to_string()))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl ReadingsRepositoryTrait for MockReadingsRepository {
        async fn create(&self, record: NewReadingRecord) -> Result<ReadingRecord, RepositoryError> {
            self.check()?;
            let mut readings = self.readings.lock()?;
            let id = readings.iter().map(|r| r.reading_id).max().unwrap_or(0) + 1;
            let stored = record.into_record(id);
            readings.push(stored.clone());
            Ok(stored)
        }

        async fn get_in_range(&self, start_ms: i64, end_ms: i64) -> Result<Vec<ReadingRecord>, RepositoryError> {
            self.check()?;
            let mut filtered: Vec<ReadingRecord> = self.readings.lock()?
                .iter()
                .filter(|r| r.created_at_ms >= start_ms && r.created_at_ms <= end_ms)
                .cloned()
                .collect();
            filtered.sort_by_key(|r| (r.created_at_ms, r.reading_id));
            Ok(filtered)
        }
    }

}
