//! Domain layer health check functionality

use std::collections::HashMap;

use async_trait::async_trait;
use bp_tracker_data::database;

/// System health status
#[derive(Debug, Clone, PartialEq)]
pub enum SystemStatus {
    /// All components are healthy
    Healthy,
    /// Some components are degraded but the system is functional
    Degraded,
    /// System is not functioning properly
    Unhealthy,
}

/// Component health status
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// A health component with status and optional details
#[derive(Debug, Clone)]
pub struct HealthComponent {
    pub status: ComponentStatus,
    pub details: Option<String>,
}

/// Overall health of the system
#[derive(Debug, Clone)]
pub struct SystemHealth {
    pub status: SystemStatus,
    /// Component name to health
    pub components: HashMap<String, HealthComponent>,
}

impl SystemHealth {
    /// Build from components; the worst component decides the overall status
    pub fn from_components(components: HashMap<String, HealthComponent>) -> Self {
        let status = if components.values().any(|c| c.status == ComponentStatus::Unhealthy) {
            SystemStatus::Unhealthy
        } else if components.values().any(|c| c.status == ComponentStatus::Degraded) {
            SystemStatus::Degraded
        } else {
            SystemStatus::Healthy
        };

        Self { status, components }
    }
}

/// Trait for health services
#[async_trait]
pub trait HealthServiceTrait: Send + Sync + std::fmt::Debug {
    /// Get the overall system health
    async fn get_system_health(&self) -> SystemHealth;

    /// Check the status of the database.
    /// Ok(true) when healthy, Ok(false) when degraded, Err when unavailable.
    async fn check_database_status(&self) -> Result<bool, String>;
}

/// Check the global database pool.
///
/// A file-backed pool is healthy. The in-memory fallback works but loses
/// readings on restart, so it counts as degraded.
pub async fn check_database_status() -> Result<bool, String> {
    match database::get_connection_info() {
        Some(info) if info.contains("connection error") => Err(info),
        Some(info) => Ok(!info.contains("in-memory")),
        None => Err("Database pool is not initialized".to_string()),
    }
}

/// Describe the database component for a status check result
pub fn database_component(status: Result<bool, String>) -> HealthComponent {
    match status {
        Ok(true) => HealthComponent {
            status: ComponentStatus::Healthy,
            details: database::get_connection_info(),
        },
        Ok(false) => HealthComponent {
            status: ComponentStatus::Degraded,
            details: Some("Using in-memory database; readings are not persisted".to_string()),
        },
        Err(e) => HealthComponent {
            status: ComponentStatus::Unhealthy,
            details: Some(e),
        },
    }
}

/// Get overall system health
pub async fn get_system_health() -> SystemHealth {
    let db_component = database_component(check_database_status().await);
    SystemHealth::from_components(vec![("database".to_string(), db_component)].into_iter().collect())
}
