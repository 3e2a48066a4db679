use std::sync::Arc;

use axum::{
    extract::{FromRef, Json, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use tracing::{error, info, instrument, warn};
use validator::Validate;

use bp_tracker_domain::export::{export_filename, CsvExporter, CSV_MIME};
use bp_tracker_domain::services::{create_default_readings_service, ReadingsServiceError, ReadingsServiceTrait};

use crate::config::AppConfig;
use crate::entities::common::validation_details;
use crate::entities::readings::{convert_to_domain_request, convert_to_public_reading};
use crate::entities::{BpReading, CreateBpReadingRequest, ErrorResponse, ReadingsQueryParams};

/// Service type for dependency injection
pub type ReadingsService = Arc<dyn ReadingsServiceTrait>;

/// Create a default service for the handlers to use
pub fn create_service() -> ReadingsService {
    Arc::new(create_default_readings_service())
}

/// Settings for CSV downloads
#[derive(Debug, Clone)]
pub struct ExportSettings {
    pub exporter: CsvExporter,
    pub owner_name: String,
}

impl ExportSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            exporter: config.exporter(),
            owner_name: config.owner_name.clone(),
        }
    }
}

/// Shared state of the readings routes
#[derive(Clone, FromRef)]
pub struct AppState {
    pub readings: ReadingsService,
    pub export: ExportSettings,
}

/// Map service errors to API error responses
fn service_error_response(err: ReadingsServiceError) -> Response {
    match err {
        ReadingsServiceError::ValidationError(message) => {
            warn!("Invalid reading: {}", message);
            ErrorResponse::validation_error(&message, None).into_response()
        }
        ReadingsServiceError::InvalidRange(range_error) => {
            warn!("Invalid date range: {}", range_error);
            ErrorResponse::bad_request(&range_error.to_string()).into_response()
        }
        ReadingsServiceError::RepositoryError(message) => {
            error!("Readings storage failed: {}", message);
            ErrorResponse::internal_error().into_response()
        }
    }
}

/// List readings within a date range, oldest first
#[utoipa::path(
    get,
    path = "/api/bp-readings",
    params(ReadingsQueryParams),
    responses(
        (status = 200, description = "Readings in the range", body = [BpReading]),
        (status = 400, description = "Unparseable or reversed date range", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "readings"
)]
#[instrument(skip(service))]
pub async fn get_readings(
    State(service): State<ReadingsService>,
    Query(params): Query<ReadingsQueryParams>,
) -> Result<impl IntoResponse, Response> {
    let readings = service
        .get_readings(params.start_date, params.end_date)
        .await
        .map_err(service_error_response)?;

    info!("Returning {} readings", readings.len());
    let public_readings: Vec<BpReading> = readings.into_iter().map(convert_to_public_reading).collect();
    Ok((StatusCode::OK, Json(public_readings)))
}

/// Record a new reading at the current time
#[utoipa::path(
    post,
    path = "/api/bp-readings",
    request_body = CreateBpReadingRequest,
    responses(
        (status = 201, description = "Reading recorded", body = BpReading),
        (status = 400, description = "Invalid reading", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "readings"
)]
#[instrument(skip(service, request))]
pub async fn create_reading(
    State(service): State<ReadingsService>,
    Json(request): Json<CreateBpReadingRequest>,
) -> Result<impl IntoResponse, Response> {
    info!("Recording new reading");

    if let Err(errors) = request.validate() {
        warn!("Rejected reading: {}", errors);
        let response = ErrorResponse::validation_error(
            "Invalid blood pressure reading",
            Some(validation_details(&errors)),
        );
        return Err(response.into_response());
    }

    let reading = service
        .create_reading(convert_to_domain_request(request))
        .await
        .map_err(service_error_response)?;

    info!("Reading recorded with ID: {}", reading.id);
    Ok((StatusCode::CREATED, Json(convert_to_public_reading(reading))))
}

/// Download readings within a date range as CSV
#[utoipa::path(
    get,
    path = "/api/bp-readings/export",
    params(ReadingsQueryParams),
    responses(
        (status = 200, description = "CSV with Date and Blood Pressure columns", body = String, content_type = "text/csv"),
        (status = 400, description = "Unparseable or reversed date range", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "readings"
)]
#[instrument(skip(service, export))]
pub async fn export_readings(
    State(service): State<ReadingsService>,
    State(export): State<ExportSettings>,
    Query(params): Query<ReadingsQueryParams>,
) -> Result<impl IntoResponse, Response> {
    let readings = service
        .get_readings(params.start_date, params.end_date)
        .await
        .map_err(service_error_response)?;

    let csv = export.exporter.to_csv(&readings).map_err(|e| {
        error!("Failed to build CSV export: {}", e);
        ErrorResponse::internal_error().into_response()
    })?;

    let today = Utc::now().with_timezone(&export.exporter.offset()).date_naive();
    let filename = export_filename(&export.owner_name, today);
    info!("Exporting {} readings as {}", readings.len(), filename);

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, format!("{}; charset=utf-8", CSV_MIME)),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", filename)),
        ],
        csv,
    ))
}
