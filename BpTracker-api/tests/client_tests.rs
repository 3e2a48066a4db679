//! Drives the readings client against a live server on a local port.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use bp_tracker_api::api::handlers::health::AppEnvironment;
use bp_tracker_api::api::handlers::readings::{AppState, ExportSettings};
use bp_tracker_api::api::routes::create_router;
use bp_tracker_api::config::AppConfig;
use bp_tracker_data::database::{DatabaseConfig, DatabasePool};
use bp_tracker_data::repository::ReadingsRepository;
use bp_tracker_domain::chart::ChartView;
use bp_tracker_domain::client::{ClientError, Dashboard, HttpReadingsClient, QueryStatus, ReadingsSource, SubmitError};
use bp_tracker_domain::entities::CreateReadingRequest;
use bp_tracker_domain::range::{PresetDays, ResolvedRange};
use bp_tracker_domain::services::ReadingsService;
use bp_tracker_domain::testing::MockHealthService;

async fn spawn_server() -> SocketAddr {
    let pool = DatabasePool::in_memory(&DatabaseConfig::default()).unwrap();
    let state = AppState {
        readings: Arc::new(ReadingsService::new(ReadingsRepository::with_pool(pool))),
        export: ExportSettings::from_config(&AppConfig::default()),
    };
    let app = create_router(state, Arc::new(MockHealthService::new()), AppEnvironment::default());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn client(addr: SocketAddr) -> HttpReadingsClient {
    let http = reqwest::Client::builder().no_proxy().build().unwrap();
    HttpReadingsClient::with_client(format!("http://{}", addr), http)
}

#[tokio::test]
async fn test_dashboard_submits_and_shows_reading() {
    let addr = spawn_server().await;
    let mut dashboard = Dashboard::new(client(addr));

    dashboard.refresh().await.unwrap();
    assert_eq!(dashboard.query().status(), QueryStatus::Ready);
    assert!(matches!(dashboard.chart(), ChartView::NoData));

    dashboard.form_mut().systolic = "130".to_string();
    dashboard.form_mut().diastolic = "85".to_string();
    let reading = dashboard.submit().await.unwrap();
    assert_eq!((reading.systolic, reading.diastolic), (130, 85));

    // Form cleared and the new reading fetched
    assert!(dashboard.form().systolic.is_empty());
    assert_eq!(dashboard.query().data().len(), 1);
    assert!(dashboard.chart().can_export());

    let csv = dashboard.export_csv().unwrap();
    assert!(csv.starts_with("Date,Blood Pressure\n"));
    assert!(csv.trim_end().ends_with(",130/85"));
}

#[tokio::test]
async fn test_invalid_form_is_not_sent() {
    let addr = spawn_server().await;
    let mut dashboard = Dashboard::new(client(addr));

    dashboard.form_mut().systolic = "0".to_string();
    let err = dashboard.submit().await.unwrap_err();
    assert!(matches!(err, SubmitError::Invalid(_)));

    dashboard.select_preset(PresetDays::Ninety).await.unwrap();
    assert!(dashboard.query().data().is_empty());
}

#[tokio::test]
async fn test_server_errors_surface_as_status() {
    let addr = spawn_server().await;
    let source = client(addr);

    let err = source
        .fetch_readings(&ResolvedRange::new("2024-02-01", "2024-01-01"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Status { status: 400, .. }));

    let err = source
        .create_reading(&CreateReadingRequest { systolic: 120, diastolic: -1 })
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Status { status: 400, .. }));
}
