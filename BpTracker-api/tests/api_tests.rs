use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use chrono::{DateTime, Duration, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;

use bp_tracker_api::api::handlers::health::AppEnvironment;
use bp_tracker_api::api::handlers::readings::{AppState, ExportSettings};
use bp_tracker_api::api::routes::create_router;
use bp_tracker_api::config::AppConfig;
use bp_tracker_data::database::{DatabaseConfig, DatabasePool};
use bp_tracker_data::repository::ReadingsRepository;
use bp_tracker_domain::export::CsvRowOrder;
use bp_tracker_domain::services::ReadingsService;
use bp_tracker_domain::testing::MockHealthService;

/// Router over a fresh in-memory SQLite database
fn create_test_app(config: &AppConfig) -> Router {
    let pool = DatabasePool::in_memory(&DatabaseConfig::default()).unwrap();
    let state = AppState {
        readings: Arc::new(ReadingsService::new(ReadingsRepository::with_pool(pool))),
        export: ExportSettings::from_config(config),
    };
    create_router(state, Arc::new(MockHealthService::new()), AppEnvironment::default())
}

async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_reading(body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/api/bp-readings")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_created_reading_is_listed_by_default_range() {
    let app = create_test_app(&AppConfig::default());

    let response = send(&app, post_reading(json!({"systolic": 130, "diastolic": 85}))).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = json_body(response).await;

    let recorded_at: DateTime<Utc> = created["recordedAt"].as_str().unwrap().parse().unwrap();
    assert!((Utc::now() - recorded_at).num_milliseconds().abs() < 1_000);

    let response = send(&app, get("/api/bp-readings")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let readings = json_body(response).await;
    let readings = readings.as_array().unwrap();
    assert_eq!(readings.len(), 1);
    assert_eq!(readings[0]["id"], created["id"]);
    assert_eq!(readings[0]["systolic"], 130);
    assert_eq!(readings[0]["diastolic"], 85);
}

#[tokio::test]
async fn test_readings_are_listed_oldest_first() {
    let app = create_test_app(&AppConfig::default());

    for (systolic, diastolic) in [(120, 80), (135, 88), (118, 76)] {
        let response = send(&app, post_reading(json!({"systolic": systolic, "diastolic": diastolic}))).await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let readings = json_body(send(&app, get("/api/bp-readings")).await).await;
    let systolic: Vec<i64> = readings
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["systolic"].as_i64().unwrap())
        .collect();
    assert_eq!(systolic, vec![120, 135, 118]);
}

#[tokio::test]
async fn test_range_outside_readings_is_empty() {
    let app = create_test_app(&AppConfig::default());
    send(&app, post_reading(json!({"systolic": 120, "diastolic": 80}))).await;

    let response = send(&app, get("/api/bp-readings?startDate=2001-01-01&endDate=2001-01-31")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!([]));
}

#[tokio::test]
async fn test_full_timestamps_are_accepted() {
    let app = create_test_app(&AppConfig::default());
    send(&app, post_reading(json!({"systolic": 121, "diastolic": 79}))).await;

    let start = (Utc::now() - Duration::hours(1)).format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string();
    let end = (Utc::now() + Duration::hours(1)).format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string();
    let uri = format!("/api/bp-readings?startDate={}&endDate={}", start, end);

    let readings = json_body(send(&app, get(&uri)).await).await;
    assert_eq!(readings.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_invalid_readings_are_rejected() {
    let app = create_test_app(&AppConfig::default());

    let response = send(&app, post_reading(json!({"systolic": -5, "diastolic": 0}))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error = json_body(response).await;
    assert_eq!(error["error"], "validation_error");
    assert_eq!(error["details"]["systolic"][0], "Systolic must be greater than Zero");
    assert_eq!(error["details"]["diastolic"][0], "Diastolic must be greater than Zero");

    // Nothing was stored
    let readings = json_body(send(&app, get("/api/bp-readings")).await).await;
    assert_eq!(readings, json!([]));
}

#[tokio::test]
async fn test_malformed_body_is_client_error() {
    let app = create_test_app(&AppConfig::default());

    let response = send(&app, post_reading(json!({"systolic": "high"}))).await;
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_bad_date_ranges_are_rejected() {
    let app = create_test_app(&AppConfig::default());

    let response = send(&app, get("/api/bp-readings?startDate=yesterday")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "bad_request");

    let response = send(&app, get("/api/bp-readings?startDate=2024-03-01&endDate=2024-02-01")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_export_downloads_csv() {
    let config = AppConfig {
        owner_name: "Sam Lee".to_string(),
        csv_order: CsvRowOrder::Ascending,
        ..AppConfig::default()
    };
    let app = create_test_app(&config);
    send(&app, post_reading(json!({"systolic": 120, "diastolic": 80}))).await;
    send(&app, post_reading(json!({"systolic": 140, "diastolic": 90}))).await;

    let response = send(&app, get("/api/bp-readings/export")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/csv; charset=utf-8");

    let expected_name = format!("sam-lee-bp-readings-{}.csv", Utc::now().format("%Y-%m-%d"));
    let disposition = response.headers()[header::CONTENT_DISPOSITION].to_str().unwrap().to_string();
    assert!(disposition.contains(&expected_name), "unexpected disposition {}", disposition);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let csv = String::from_utf8(bytes.to_vec()).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "Date,Blood Pressure");
    assert!(lines[1].ends_with(",120/80"));
    assert!(lines[2].ends_with(",140/90"));
}

#[tokio::test]
async fn test_export_of_empty_range_has_header_only() {
    let app = create_test_app(&AppConfig::default());

    let response = send(&app, get("/api/bp-readings/export?startDate=2001-01-01&endDate=2001-01-02")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"Date,Blood Pressure\n");
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = create_test_app(&AppConfig::default());

    let response = send(&app, get("/api-docs/openapi.json")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let doc = json_body(response).await;
    assert!(doc["paths"]["/api/bp-readings"].is_object());
}
