// HTTP request handlers
use crate::infrastructure::chunked_json::stream_from_watch;
use crate::infrastructure::http_response::{accepts_brotli, json_response};
use crate::presentation::app_state::AppState;
use axum::{
    Json,
    extract::State,
    http::HeaderMap,
    response::IntoResponse,
};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct StatusBody {
    pub status: &'static str,
    pub connected: bool,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Service status including whether the realtime store is configured
pub async fn service_status(State(state): State<Arc<AppState>>) -> Json<StatusBody> {
    Json(StatusBody {
        status: "ok",
        connected: state.connected,
    })
}

/// Current dashboard view
pub async fn get_dashboard(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let compress = accepts_brotli(&headers);
    let view = state.view.borrow().clone();

    match json_response(&view, compress).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

/// Stream the dashboard view, one JSON document per change
pub async fn stream_dashboard(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    stream_from_watch(state.view.clone())
}
