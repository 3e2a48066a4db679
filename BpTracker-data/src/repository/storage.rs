use rusqlite::{params, Row};
use tracing::debug;

use crate::database::DatabasePool;
use crate::models::reading::{NewReadingRecord, ReadingRecord};
use super::errors::RepositoryError;

/// Database storage operations for blood pressure readings
pub struct DatabaseStorage;

impl DatabaseStorage {
    /// Insert a reading and return it with its assigned id
    pub async fn insert(pool: &DatabasePool, record: NewReadingRecord) -> Result<ReadingRecord, RepositoryError> {
        debug!("Storing blood pressure reading in database: {}/{}", record.systolic, record.diastolic);

        let conn = pool.connection()?;
        conn.execute(
            "INSERT INTO bp_readings (systolic, diastolic, createdAt) VALUES (?1, ?2, ?3)",
            params![record.systolic, record.diastolic, record.created_at_ms],
        )?;

        let reading_id = conn.last_insert_rowid();
        Ok(record.into_record(reading_id))
    }

    /// Readings with `start_ms <= createdAt <= end_ms`, oldest first
    pub async fn get_in_range(
        pool: &DatabasePool,
        start_ms: i64,
        end_ms: i64,
    ) -> Result<Vec<ReadingRecord>, RepositoryError> {
        debug!("Getting readings between {} and {}", start_ms, end_ms);

        let conn = pool.connection()?;
        let mut stmt = conn.prepare(
            "SELECT readingId, systolic, diastolic, createdAt
             FROM bp_readings
             WHERE createdAt >= ?1 AND createdAt <= ?2
             ORDER BY createdAt ASC, readingId ASC"
        )?;

        let rows = stmt.query_map(params![start_ms, end_ms], map_row)?;

        let mut result = Vec::new();
        for reading in rows {
            result.push(reading?);
        }

        Ok(result)
    }
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<ReadingRecord> {
    Ok(ReadingRecord {
        reading_id: row.get(0)?,
        systolic: row.get(1)?,
        diastolic: row.get(2)?,
        created_at_ms: row.get(3)?,
    })
}
