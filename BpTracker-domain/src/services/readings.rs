use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, error};
use validator::Validate;

use crate::entities::conversions;
use crate::entities::reading::{CreateReadingRequest, Reading};
use crate::range::{bounds_from_params, RangeError};
use bp_tracker_data::repository::{ReadingsRepository, ReadingsRepositoryTrait, RepositoryError};

/// Readings service errors
#[derive(Debug, Error)]
pub enum ReadingsServiceError {
    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Unusable date range
    #[error("Invalid date range: {0}")]
    InvalidRange(#[from] RangeError),

    /// Repository error
    #[error("Repository error: {0}")]
    RepositoryError(String),
}

/// Trait for readings service operations
#[async_trait]
pub trait ReadingsServiceTrait: Send + Sync {
    /// Validate a create reading request
    fn validate_create_request(&self, request: &CreateReadingRequest) -> Result<(), ReadingsServiceError>;

    /// Record a new reading at the current time
    async fn create_reading(&self, request: CreateReadingRequest) -> Result<Reading, ReadingsServiceError>;

    /// Readings recorded within `[start, end]`, oldest first
    async fn get_readings_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Reading>, ReadingsServiceError>;

    /// Readings for raw query parameters. Missing bounds default to the
    /// trailing 30 days.
    async fn get_readings(
        &self,
        start_date: Option<String>,
        end_date: Option<String>,
    ) -> Result<Vec<Reading>, ReadingsServiceError> {
        let (start, end) = bounds_from_params(start_date.as_deref(), end_date.as_deref(), Utc::now())?;
        self.get_readings_between(start, end).await
    }
}

/// Readings service for domain logic
pub struct ReadingsService<R: ReadingsRepositoryTrait> {
    repository: R,
}

impl<R: ReadingsRepositoryTrait> ReadingsService<R> {
    /// Create a new readings service
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// Map repository errors to service errors
    fn map_repo_error(&self, err: RepositoryError) -> ReadingsServiceError {
        error!("Readings repository error: {}", err);
        ReadingsServiceError::RepositoryError(err.to_string())
    }
}

/// Flatten validator errors into `field: message` pairs, sorted by field
pub fn describe_validation_errors(errors: &validator::ValidationErrors) -> String {
    let mut fields: Vec<String> = errors
        .field_errors()
        .iter()
        .map(|(field, errors)| {
            let messages: Vec<String> = errors
                .iter()
                .map(|err| match &err.message {
                    Some(msg) => msg.to_string(),
                    None => format!("Invalid {}", field),
                })
                .collect();
            format!("{}: {}", field, messages.join(", "))
        })
        .collect();
    fields.sort();
    fields.join("; ")
}

#[async_trait]
impl<R: ReadingsRepositoryTrait + Send + Sync> ReadingsServiceTrait for ReadingsService<R> {
    fn validate_create_request(&self, request: &CreateReadingRequest) -> Result<(), ReadingsServiceError> {
        request
            .validate()
            .map_err(|errors| ReadingsServiceError::ValidationError(describe_validation_errors(&errors)))
    }

    async fn create_reading(&self, request: CreateReadingRequest) -> Result<Reading, ReadingsServiceError> {
        self.validate_create_request(&request)?;

        let record = conversions::convert_to_data_new_reading(&request, Utc::now());
        let stored = self.repository.create(record)
            .await
            .map_err(|e| self.map_repo_error(e))?;

        debug!("Created reading {} ({}/{})", stored.reading_id, stored.systolic, stored.diastolic);
        Ok(conversions::convert_to_domain_reading(stored))
    }

    async fn get_readings_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Reading>, ReadingsServiceError> {
        let records = self.repository
            .get_in_range(start.timestamp_millis(), end.timestamp_millis())
            .await
            .map_err(|e| self.map_repo_error(e))?;

        Ok(records.into_iter().map(conversions::convert_to_domain_reading).collect())
    }
}

/// Create a default readings service using the repository from data layer
pub fn create_default_readings_service() -> impl ReadingsServiceTrait {
    ReadingsService::new(ReadingsRepository::new())
}

/// Create a mock readings service for testing
#[cfg(feature = "mock")]
pub fn create_mock_readings_service() -> impl ReadingsServiceTrait {
    crate::testing::MockReadingsService::new()
}
