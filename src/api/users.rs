use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::error::{Result, UserError};
use crate::server::state::AppState;
use crate::store::MISSING_FIELDS_MESSAGE;
use crate::types::{CreateUserRequest, UpdateUserRequest, User, UserList};

/// Parse a path id. Anything that is not a valid id cannot match a record.
fn parse_id(raw: &str) -> Result<u64> {
    raw.parse::<u64>().map_err(|_| UserError::NotFound)
}

/// GET /api/users - List all users in insertion order.
pub async fn list_handler(State(state): State<AppState>) -> Result<Json<UserList>> {
    let users = state.store.list()?;
    Ok(Json(UserList::from(users)))
}

/// GET /api/users/:id - Fetch a single user.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<User>> {
    let user = state.store.get(parse_id(&id)?)?;
    Ok(Json(user))
}

/// POST /api/users - Create a user and announce it on the bus.
pub async fn create_handler(
    State(state): State<AppState>,
    body: std::result::Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<User>)> {
    let Json(request) = body.map_err(|e| {
        tracing::debug!(error = %e, "Rejected create body");
        UserError::Validation(MISSING_FIELDS_MESSAGE.to_string())
    })?;

    let user = state.store.create(request.name, request.email)?;
    tracing::info!(user_id = user.id, "User created");

    // Fire-and-forget; the response never waits on the bus
    state.events.notify_user_created(&user);

    Ok((StatusCode::CREATED, Json(user)))
}

/// PUT /api/users/:id - Update name and/or email.
pub async fn update_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: std::result::Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<Json<User>> {
    let id = parse_id(&id)?;
    // Every field is optional, so an absent or undecodable body is an empty update
    let request = match body {
        Ok(Json(request)) => request,
        Err(e) => {
            tracing::debug!(error = %e, "Ignoring update body");
            UpdateUserRequest::default()
        }
    };

    let user = state.store.update(id, request.name, request.email)?;
    tracing::info!(user_id = user.id, "User updated");
    Ok(Json(user))
}

/// DELETE /api/users/:id - Remove a user.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let id = parse_id(&id)?;
    state.store.delete(id)?;
    tracing::info!(user_id = id, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}
