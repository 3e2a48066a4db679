use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use bp_tracker_domain::entities::reading::{rfc3339_millis, CreateReadingRequest, Reading};

/// Public representation of a blood pressure reading
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BpReading {
    /// Identifier assigned on creation
    pub id: i64,

    /// Systolic blood pressure (the higher number)
    pub systolic: i32,

    /// Diastolic blood pressure (the lower number)
    pub diastolic: i32,

    /// When the reading was recorded (RFC 3339, UTC, milliseconds)
    #[serde(with = "rfc3339_millis")]
    #[schema(value_type = String, example = "2024-01-01T08:30:00.000Z")]
    pub recorded_at: DateTime<Utc>,
}

/// Request payload for recording a new reading. The server stamps the time.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateBpReadingRequest {
    /// Systolic blood pressure (the higher number)
    #[validate(range(min = 1, message = "Systolic must be greater than Zero"))]
    #[schema(example = 120)]
    pub systolic: i32,

    /// Diastolic blood pressure (the lower number)
    #[validate(range(min = 1, message = "Diastolic must be greater than Zero"))]
    #[schema(example = 80)]
    pub diastolic: i32,
}

/// Date range query parameters
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ReadingsQueryParams {
    /// RFC 3339 timestamp or YYYY-MM-DD (default: 30 days ago)
    pub start_date: Option<String>,

    /// RFC 3339 timestamp or YYYY-MM-DD, inclusive (default: now)
    pub end_date: Option<String>,
}

/// Convert public request to domain request
pub fn convert_to_domain_request(request: CreateBpReadingRequest) -> CreateReadingRequest {
    CreateReadingRequest {
        systolic: request.systolic,
        diastolic: request.diastolic,
    }
}

/// Convert domain reading to public reading
pub fn convert_to_public_reading(reading: Reading) -> BpReading {
    BpReading {
        id: reading.id,
        systolic: reading.systolic,
        diastolic: reading.diastolic,
        recorded_at: reading.recorded_at,
    }
}
