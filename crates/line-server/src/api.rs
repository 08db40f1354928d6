use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{
        sse::{Event, Sse},
        IntoResponse, Json,
    },
    routing::{get, post},
    Router,
};
use futures::Stream;
use serde_json::json;
use std::{collections::HashMap, sync::Arc, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

use application::data::ConfigurationRequest;
use domain::error::DomainError;
use domain::machine::Position;

use crate::state::AppState;

use tower_http::cors::{Any, CorsLayer};

pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/machines", get(get_all_machines))
        .route("/api/machines/{position}", get(get_machine_data))
        .route("/api/machines/{position}/configure", post(configure_machine))
        .route("/api/machines/{position}/health", get(machine_health))
        .route("/api/health", get(all_health))
        .route("/api/events", get(sse_handler))
        .layer(cors)
        .with_state(state)
}

fn parse_position(raw: String) -> Result<Position, axum::response::Response> {
    Position::new(raw).map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": e.to_string() })),
        )
            .into_response()
    })
}

async fn get_all_machines(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let summaries = state.get_all_machines.execute().await;
    Json(summaries)
}

async fn get_machine_data(
    Path(position): Path<String>,
    State(state): State<Arc<AppState>>,
) -> axum::response::Response {
    let position = match parse_position(position) {
        Ok(p) => p,
        Err(response) => return response,
    };

    match state.get_machine_data.execute(&position).await {
        Some(data) => Json(data).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": format!("Machine at position {position} not found or not accessible")
            })),
        )
            .into_response(),
    }
}

async fn configure_machine(
    Path(position): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(request): Json<ConfigurationRequest>,
) -> axum::response::Response {
    let position = match parse_position(position) {
        Ok(p) => p,
        Err(response) => return response,
    };

    match state.configure_machine.execute(&position, &request).await {
        Ok(()) => Json(json!({ "status": "Configuration applied" })).into_response(),
        Err(DomainError::ValidationFailed(errors)) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Validation failed", "details": errors })),
        )
            .into_response(),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": format!("Configuration failed - {e}")
            })),
        )
            .into_response(),
    }
}

async fn machine_health(
    Path(position): Path<String>,
    State(state): State<Arc<AppState>>,
) -> axum::response::Response {
    let position = match parse_position(position) {
        Ok(p) => p,
        Err(response) => return response,
    };

    let healthy = state.health_monitor.is_healthy(&position).await;
    Json(json!({ "position": position.as_str(), "healthy": healthy })).into_response()
}

async fn all_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_monitor.scan_all().await;
    let map: HashMap<String, bool> = health
        .into_iter()
        .map(|(position, healthy)| (position.to_string(), healthy))
        .collect();
    Json(map)
}

async fn sse_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let rx = state.events.subscribe();
    let stream = BroadcastStream::new(rx).map(|msg| match msg {
        Ok(event) => Event::default()
            .json_data(event)
            .map_err(|_| axum::Error::new("Serialization error")),
        Err(_) => Ok(Event::default().comment("keep-alive")),
    });

    Sse::new(stream)
        .keep_alive(axum::response::sse::KeepAlive::new().interval(Duration::from_secs(15)))
}
