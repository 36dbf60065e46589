use std::any::Any;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::state::AppState;
use crate::api;
use crate::api::health;
use crate::error::INTERNAL_ERROR_MESSAGE;

/// Build the complete axum Router with all routes.
pub fn build(state: AppState) -> Router {
    Router::new()
        .route(
            "/health",
            axum::routing::get(health::health_handler).fallback(api::method_not_allowed),
        )
        .route(
            "/ready",
            axum::routing::get(health::ready_handler).fallback(api::method_not_allowed),
        )
        .nest("/api", api::routes())
        .fallback(api::not_found)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Turn a handler panic into the generic 500 body.
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };
    tracing::error!(panic = %detail, "Request handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": INTERNAL_ERROR_MESSAGE })),
    )
        .into_response()
}
