pub mod health;
pub mod users;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::server::state::AppState;

/// Build the `/api` routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/users",
            get(users::list_handler)
                .post(users::create_handler)
                .fallback(method_not_allowed),
        )
        .route(
            "/users/:id",
            get(users::get_handler)
                .put(users::update_handler)
                .delete(users::delete_handler)
                .fallback(method_not_allowed),
        )
        .route(
            "/version",
            get(health::version_handler).fallback(method_not_allowed),
        )
}

/// Fallback for unknown routes.
pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": "Not found" })),
    )
}

/// Fallback for known routes hit with an unsupported method.
pub async fn method_not_allowed() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(serde_json::json!({ "error": "Method not allowed" })),
    )
}
