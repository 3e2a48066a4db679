use std::collections::HashMap;
use std::sync::{Arc, Once};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use axum::{http::StatusCode, response::IntoResponse, Extension, Json};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;

use bp_tracker_domain::health::{
    self, ComponentStatus as DomainComponentStatus, HealthComponent, HealthServiceTrait, SystemHealth,
    SystemStatus,
};

/// Health check response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// "ok", "degraded" or "error"
    pub status: String,
    /// Application version from the Cargo manifest
    pub version: String,
    /// Unix timestamp of the response
    pub timestamp: u64,
    /// Seconds since the server started
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime: Option<u64>,
    pub components: ComponentStatus,
    pub environment: String,
}

/// Status of the individual components
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ComponentStatus {
    pub database: ComponentHealthStatus,
    pub api: ComponentHealthStatus,
}

/// Health of a single component
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ComponentHealthStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Deployment environment reported by the health endpoint
#[derive(Debug, Clone)]
pub struct AppEnvironment(pub String);

impl Default for AppEnvironment {
    fn default() -> Self {
        Self("development".to_string())
    }
}

static SERVER_START_TIME: OnceCell<u64> = OnceCell::new();
static INIT: Once = Once::new();

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Record the server start time for uptime reporting
pub fn initialize_server_start_time() {
    INIT.call_once(|| {
        let _ = SERVER_START_TIME.set(unix_now());
    });
}

/// Report whether the API and its storage are usable
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "API is healthy", body = HealthResponse),
        (status = 500, description = "API is not healthy", body = HealthResponse),
        (status = 503, description = "API is degraded", body = HealthResponse)
    ),
    tag = "health"
)]
#[instrument(skip(health_service, environment))]
pub async fn health_check(
    Extension(health_service): Extension<Arc<dyn HealthServiceTrait>>,
    Extension(environment): Extension<AppEnvironment>,
) -> impl IntoResponse {
    info!("Health check requested");

    let now = unix_now();
    let uptime = SERVER_START_TIME.get().map(|&start| now.saturating_sub(start));
    let system_health = health_service.get_system_health().await;

    let component = |name: &str| {
        let found = system_health.components.get(name);
        ComponentHealthStatus {
            status: map_component_status(found.map(|c| &c.status).unwrap_or(&DomainComponentStatus::Healthy)),
            message: found.and_then(|c| c.details.clone()),
        }
    };

    let response = HealthResponse {
        status: match system_health.status {
            SystemStatus::Healthy => "ok",
            SystemStatus::Degraded => "degraded",
            SystemStatus::Unhealthy => "error",
        }
        .to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: now,
        uptime,
        components: ComponentStatus {
            database: component("database"),
            api: component("api"),
        },
        environment: environment.0,
    };

    let status = match system_health.status {
        SystemStatus::Healthy => StatusCode::OK,
        SystemStatus::Degraded => StatusCode::SERVICE_UNAVAILABLE,
        SystemStatus::Unhealthy => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(response))
}

fn map_component_status(status: &DomainComponentStatus) -> String {
    match status {
        DomainComponentStatus::Healthy => "ok",
        DomainComponentStatus::Degraded => "degraded",
        DomainComponentStatus::Unhealthy => "error",
    }
    .to_string()
}

/// Health service backed by the global database pool
#[derive(Debug, Default)]
pub struct HealthService;

impl HealthService {
    pub fn new() -> Self {
        HealthService
    }
}

#[async_trait]
impl HealthServiceTrait for HealthService {
    async fn get_system_health(&self) -> SystemHealth {
        let mut components = HashMap::new();
        components.insert(
            "database".to_string(),
            health::database_component(self.check_database_status().await),
        );
        components.insert(
            "api".to_string(),
            HealthComponent { status: DomainComponentStatus::Healthy, details: None },
        );
        SystemHealth::from_components(components)
    }

    async fn check_database_status(&self) -> Result<bool, String> {
        health::check_database_status().await
    }
}

/// Factory function to create a health service
pub fn create_health_service() -> Arc<dyn HealthServiceTrait> {
    Arc::new(HealthService::new())
}
