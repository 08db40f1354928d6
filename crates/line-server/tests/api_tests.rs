use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tower::util::ServiceExt;

use application::health::MachineHealthMonitor;
use application::machine::MachineManager;
use domain::machine::PositionConfiguration;
use infrastructure::{
    BroadcastEventPublisher, SimulationSettings, SimulatorFactory, StaticPositionConfiguration,
};
use line_server::{api, state::AppState};

fn test_settings() -> SimulationSettings {
    SimulationSettings {
        tick_interval_secs: 3600,
        data_interval_secs: 3600,
        connect_delay_ms: 1,
        settle_delay_ms: 1,
    }
}

fn test_state() -> (Arc<AppState>, broadcast::Sender<domain::MachineEvent>) {
    let shutdown = CancellationToken::new();
    let publisher = Arc::new(BroadcastEventPublisher::new(64));
    let events = publisher.sender();

    let positions: Arc<dyn PositionConfiguration> = Arc::new(StaticPositionConfiguration::new());
    let factory = Arc::new(SimulatorFactory::new(
        positions.clone(),
        publisher,
        test_settings(),
        shutdown,
    ));
    let manager = Arc::new(MachineManager::new(factory));
    let health_monitor = Arc::new(MachineHealthMonitor::new(
        manager.clone(),
        positions.clone(),
    ));

    let state = Arc::new(AppState::new(
        manager,
        health_monitor,
        positions,
        events.clone(),
    ));
    (state, events)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn list_endpoint_returns_every_position() {
    let (state, _events) = test_state();
    let app = api::create_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/machines")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 4);
    assert!(entries.iter().any(|e| e["position"] == "CM01_1"));
}

#[tokio::test]
async fn read_endpoint_returns_machine_data() {
    let (state, _events) = test_state();
    let app = api::create_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/machines/CM01_1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["position"], "CM01_1");
    assert_eq!(body["status"], "Running");
    assert_eq!(body["has_error"], false);
}

#[tokio::test]
async fn read_endpoint_rejects_malformed_position() {
    let (state, _events) = test_state();
    let app = api::create_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/machines/CM01!1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn configure_endpoint_applies_valid_request() {
    let (state, _events) = test_state();
    let app = api::create_router(state.clone());

    let request = json!({
        "recipe_id": "R7",
        "elements_per_bag": 24,
        "counting_speed": 50,
        "feeder_speed": 60,
        "vibration_strength": 5
    });
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/machines/CM01_1/configure")
                .header("content-type", "application/json")
                .body(Body::from(request.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    // The configuration is visible on the next read
    let app = api::create_router(state);
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/machines/CM01_1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["recipe_id"], "R7");
    assert_eq!(body["elements_per_bag"], 24);
}

#[tokio::test]
async fn configure_endpoint_rejects_invalid_request() {
    let (state, _events) = test_state();
    let app = api::create_router(state);

    let request = json!({
        "recipe_id": "",
        "elements_per_bag": 24,
        "counting_speed": 150,
        "feeder_speed": 60,
        "vibration_strength": 5
    });
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/machines/CM01_1/configure")
                .header("content-type", "application/json")
                .body(Body::from(request.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Validation failed");
    assert!(body["details"].as_array().unwrap().len() >= 2);
}

#[tokio::test]
async fn health_endpoint_reports_all_positions() {
    let (state, _events) = test_state();
    let app = api::create_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let map = body.as_object().unwrap();
    assert_eq!(map.len(), 4);
}
