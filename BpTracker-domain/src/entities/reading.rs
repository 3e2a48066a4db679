use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// Domain model for a blood pressure reading
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    /// Identifier assigned on creation
    pub id: i64,

    /// Systolic blood pressure (the higher number)
    pub systolic: i32,

    /// Diastolic blood pressure (the lower number)
    pub diastolic: i32,

    /// When the reading was recorded
    #[serde(with = "rfc3339_millis")]
    #[cfg_attr(feature = "with-api", schema(value_type = String, example = "2024-01-01T08:30:00.000Z"))]
    pub recorded_at: DateTime<Utc>,
}

/// Request payload for creating a new blood pressure reading
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
pub struct CreateReadingRequest {
    /// Systolic blood pressure (the higher number)
    #[validate(range(min = 1, message = "Systolic must be greater than Zero"))]
    pub systolic: i32,

    /// Diastolic blood pressure (the lower number)
    #[validate(range(min = 1, message = "Diastolic must be greater than Zero"))]
    pub diastolic: i32,
}

/// RFC 3339 timestamps in UTC with millisecond precision, e.g. `2024-01-01T08:30:00.000Z`
pub mod rfc3339_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn format(value: &DateTime<Utc>) -> String {
        value.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let text = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&text)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(de::Error::custom)
    }
}
