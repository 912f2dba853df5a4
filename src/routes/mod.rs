//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! The surface is what a broadcast compositor loads: the overlay page at
//! `/`, the view stream it subscribes to at `/ws`, and health probes.

pub mod ws;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::get;
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::render;
use crate::source::ConnectionStatus;
use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any);

    Router::new()
        .route("/", get(overlay_page))
        .route("/ws", get(ws::handle_ws))
        .route("/healthz", get(healthz))
        .route("/api/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn overlay_page(State(state): State<AppState>) -> Html<String> {
    let view = state.view.borrow().clone();
    Html(render::overlay_page(&view, state.anchor))
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: &'static str,
    pub source: ConnectionStatus,
    pub visible: bool,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let source = *state.status.borrow();
    let visible = state.view.borrow().visible;
    Json(HealthResponse { status: "healthy", source, visible })
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
