// Testing utilities and mock implementations for the domain layer
// This module is only available when the "mock" feature is enabled

// Re-export useful test mocks from the data layer
pub use bp_tracker_data::repository::tests::MockReadingsRepository;

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::reading::{CreateReadingRequest, Reading};
use crate::health::{ComponentStatus, HealthComponent, HealthServiceTrait, SystemHealth};
use crate::services::readings::{ReadingsServiceError, ReadingsServiceTrait};

/// Mock implementation of the ReadingsServiceTrait for testing
#[derive(Debug, Default)]
pub struct MockReadingsService {
    readings: RwLock<Vec<Reading>>,
    should_fail_validation: bool,
    should_fail_storage: bool,
}

impl MockReadingsService {
    /// Create a new mock readings service
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the mock to fail validation
    pub fn with_validation_failure(mut self) -> Self {
        self.should_fail_validation = true;
        self
    }

    /// Configure the mock to fail every storage operation
    pub fn with_storage_failure(mut self) -> Self {
        self.should_fail_storage = true;
        self
    }

    /// Add pre-defined readings to the mock
    pub fn with_readings(self, readings: Vec<Reading>) -> Self {
        self.write().extend(readings);
        self
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<Reading>> {
        self.readings.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Vec<Reading>> {
        self.readings.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn storage_check(&self) -> Result<(), ReadingsServiceError> {
        if self.should_fail_storage {
            Err(ReadingsServiceError::RepositoryError(
                "Repository error - mock is configured to fail".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ReadingsServiceTrait for MockReadingsService {
    fn validate_create_request(&self, request: &CreateReadingRequest) -> Result<(), ReadingsServiceError> {
        if self.should_fail_validation {
            return Err(ReadingsServiceError::ValidationError(
                "Validation failed - mock is configured to fail validation".to_string(),
            ));
        }
        if request.systolic <= 0 || request.diastolic <= 0 {
            return Err(ReadingsServiceError::ValidationError(
                "Readings must be greater than Zero".to_string(),
            ));
        }
        Ok(())
    }

    async fn create_reading(&self, request: CreateReadingRequest) -> Result<Reading, ReadingsServiceError> {
        self.validate_create_request(&request)?;
        self.storage_check()?;

        let mut readings = self.write();
        let reading = Reading {
            id: readings.iter().map(|r| r.id).max().unwrap_or(0) + 1,
            systolic: request.systolic,
            diastolic: request.diastolic,
            recorded_at: Utc::now(),
        };
        readings.push(reading.clone());
        Ok(reading)
    }

    async fn get_readings_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Reading>, ReadingsServiceError> {
        self.storage_check()?;

        let mut readings: Vec<Reading> = self.read()
            .iter()
            .filter(|r| r.recorded_at >= start && r.recorded_at <= end)
            .cloned()
            .collect();
        readings.sort_by_key(|r| (r.recorded_at, r.id));
        Ok(readings)
    }
}

/// Mock implementation of health services for testing system health
#[derive(Debug)]
pub struct MockHealthService {
    database_status: ComponentStatus,
    components: HashMap<String, HealthComponent>,
}

impl Default for MockHealthService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockHealthService {
    /// Create a new mock health service with all components healthy
    pub fn new() -> Self {
        Self {
            database_status: ComponentStatus::Healthy,
            components: HashMap::new(),
        }
    }

    /// Configure the mock with a degraded database
    pub fn with_degraded_database(mut self) -> Self {
        self.database_status = ComponentStatus::Degraded;
        self
    }

    /// Configure the mock with an unhealthy database
    pub fn with_unhealthy_database(mut self) -> Self {
        self.database_status = ComponentStatus::Unhealthy;
        self
    }

    /// Add a custom component with a specific status
    pub fn with_component(mut self, name: &str, status: ComponentStatus, details: Option<String>) -> Self {
        self.components.insert(name.to_string(), HealthComponent { status, details });
        self
    }
}

#[async_trait]
impl HealthServiceTrait for MockHealthService {
    async fn get_system_health(&self) -> SystemHealth {
        let mut components = self.components.clone();
        components.insert(
            "database".to_string(),
            HealthComponent {
                status: self.database_status.clone(),
                details: match self.database_status {
                    ComponentStatus::Healthy => None,
                    ComponentStatus::Degraded => Some("Using in-memory database".to_string()),
                    ComponentStatus::Unhealthy => Some("Database connection failed".to_string()),
                },
            },
        );
        components.insert(
            "api".to_string(),
            HealthComponent { status: ComponentStatus::Healthy, details: None },
        );

        SystemHealth::from_components(components)
    }

    async fn check_database_status(&self) -> Result<bool, String> {
        match self.database_status {
            ComponentStatus::Healthy => Ok(true),
            ComponentStatus::Degraded => Ok(false),
            ComponentStatus::Unhealthy => Err("Database connection failed".to_string()),
        }
    }
}

/// Factory function to create a mock health service
pub fn create_mock_health_service() -> impl HealthServiceTrait {
    MockHealthService::new()
}
