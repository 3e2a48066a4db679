use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Configure Swagger UI endpoints
pub fn configure_swagger_routes() -> SwaggerUi {
    SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", ApiDoc::openapi())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::handlers::health::health_check,
        crate::api::handlers::readings::get_readings,
        crate::api::handlers::readings::create_reading,
        crate::api::handlers::readings::export_readings,
    ),
    components(
        schemas(
            crate::entities::readings::BpReading,
            crate::entities::readings::CreateBpReadingRequest,
            crate::entities::common::ErrorResponse,
            crate::api::handlers::health::HealthResponse,
            crate::api::handlers::health::ComponentStatus,
            crate::api::handlers::health::ComponentHealthStatus,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoint"),
        (name = "readings", description = "Blood pressure readings and CSV export")
    ),
    info(
        title = "BP Tracker API",
        version = "0.1.0",
        description = "Record blood pressure readings, list them by date range and export them as CSV",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT"),
    ),
    servers(
        (url = "/", description = "Local development server")
    )
)]
pub struct ApiDoc;
