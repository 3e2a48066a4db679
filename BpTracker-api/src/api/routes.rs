use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header, HeaderName, HeaderValue, Method, Request},
    routing::get,
    Extension, Router,
};
use bp_tracker_domain::health::HealthServiceTrait;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};
use tracing::debug;
use uuid::Uuid;

use crate::api::handlers::health::{self, AppEnvironment};
use crate::api::handlers::readings::{self, AppState, ExportSettings};
use crate::config::AppConfig;
use crate::openapi::configure_swagger_routes;

/// Create the application router with the default services
pub fn create_app(config: &AppConfig) -> Router {
    debug!("Creating application router");

    let state = AppState {
        readings: readings::create_service(),
        export: ExportSettings::from_config(config),
    };
    let app = create_router(state, health::create_health_service(), AppEnvironment(config.environment.clone()));

    health::initialize_server_start_time();
    debug!("Health check service initialized");

    app
}

/// Assemble the routes around the given services
pub fn create_router(
    state: AppState,
    health_service: Arc<dyn HealthServiceTrait>,
    environment: AppEnvironment,
) -> Router {
    let api_routes = Router::new()
        .route("/bp-readings/export", get(readings::export_readings))
        .route("/bp-readings", get(readings::get_readings).post(readings::create_reading))
        .with_state(state);

    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .layer(Extension(health_service))
        .layer(Extension(environment));

    let app = Router::new()
        .merge(public_routes)
        .nest("/api", api_routes);
    debug!("API routes nested");

    let app = add_swagger_ui(app);
    configure_middleware(app)
}

/// Add Swagger UI to the router
pub fn add_swagger_ui(app: Router) -> Router {
    app.merge(configure_swagger_routes())
}

/// Request ids are random v4 UUIDs
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuidV4;

impl MakeRequestId for MakeRequestUuidV4 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// CORS, tracing, request ids and security headers for every route
pub fn configure_middleware(app: Router) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_DISPOSITION])
        .max_age(Duration::from_secs(3600));

    let request_tracing = ServiceBuilder::new()
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV4))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id());

    let security_headers = ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ));

    app.layer(cors).layer(security_headers).layer(request_tracing)
}
