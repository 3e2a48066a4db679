use chrono::{DateTime, TimeZone, Utc};

use crate::entities::reading::{CreateReadingRequest, Reading};
use bp_tracker_data::models::reading::{NewReadingRecord, ReadingRecord};

// Conversion functions between domain entities and data models.
// These follow the pattern convert_to_[target_layer]_[model_name].

/// Convert epoch milliseconds to a UTC timestamp
pub fn millis_to_datetime(ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(ms).single().unwrap_or_default()
}

/// Convert from data model to domain entity for a reading
pub fn convert_to_domain_reading(record: ReadingRecord) -> Reading {
    Reading {
        id: record.reading_id,
        systolic: record.systolic as i32,
        diastolic: record.diastolic as i32,
        recorded_at: millis_to_datetime(record.created_at_ms),
    }
}

/// Convert from domain entity to data model for an insert
pub fn convert_to_data_new_reading(request: &CreateReadingRequest, recorded_at: DateTime<Utc>) -> NewReadingRecord {
    NewReadingRecord {
        systolic: i64::from(request.systolic),
        diastolic: i64::from(request.diastolic),
        created_at_ms: recorded_at.timestamp_millis(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_to_domain_reading() {
        let record = ReadingRecord {
            reading_id: 12,
            systolic: 131,
            diastolic: 84,
            created_at_ms: 1_704_097_800_123,
        };

        let reading = convert_to_domain_reading(record);

        assert_eq!(reading.id, 12);
        assert_eq!(reading.systolic, 131);
        assert_eq!(reading.diastolic, 84);
        assert_eq!(reading.recorded_at.timestamp_millis(), 1_704_097_800_123);
    }

    #[test]
    fn test_convert_to_data_new_reading() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 8, 30, 0).unwrap();
        let record = convert_to_data_new_reading(&CreateReadingRequest { systolic: 120, diastolic: 80 }, at);

        assert_eq!(record.systolic, 120);
        assert_eq!(record.diastolic, 80);
        assert_eq!(record.created_at_ms, at.timestamp_millis());
    }
}
