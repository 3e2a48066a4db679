use serde::{Deserialize, Serialize};

/// Storage model for a row of the `bp_readings` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadingRecord {
    /// Auto-increment primary key
    pub reading_id: i64,

    /// Systolic blood pressure (the higher number)
    pub systolic: i64,

    /// Diastolic blood pressure (the lower number)
    pub diastolic: i64,

    /// When the reading was recorded, in epoch milliseconds
    pub created_at_ms: i64,
}

/// Input data for inserting a new reading
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReadingRecord {
    /// Systolic blood pressure (the higher number)
    pub systolic: i64,

    /// Diastolic blood pressure (the lower number)
    pub diastolic: i64,

    /// When the reading was recorded, in epoch milliseconds
    pub created_at_ms: i64,
}

impl NewReadingRecord {
    /// Attach the identifier assigned by storage
    pub fn into_record(self, reading_id: i64) -> ReadingRecord {
        ReadingRecord {
            reading_id,
            systolic: self.systolic,
            diastolic: self.diastolic,
            created_at_ms: self.created_at_ms,
        }
    }
}
