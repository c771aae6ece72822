// Presentation layer - HTTP surface for sensors and update notifications
pub mod app_state;
pub mod entity_mapper;
pub mod event_stream;
pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    get_sensor, health_check, list_sensors, stream_events, trigger_update,
};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/sensors", get(list_sensors))
        .route("/sensors/:unique_id", get(get_sensor))
        .route("/update", post(trigger_update))
        .route("/events", get(stream_events))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
