//! User directory controller.

use crate::rest::{
    responses::{reply, ApiError, ApiResult, Created},
    state::AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use stash_core::{StashError, UserId};
use stash_service::{CreateUserRequest, UpdateUserRequest, UserResponse};
use tracing::debug;

/// Username existence response.
#[derive(Debug, Serialize)]
pub struct ExistsResponse {
    pub username: String,
    pub exists: bool,
}

/// Creates the user router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_user))
        .route("/:id", get(get_user).put(update_user).delete(delete_user))
        .route("/by-username/:username", get(get_user_by_username))
        .route("/exists/:username", get(username_exists))
}

/// Get a user by ID.
async fn get_user(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<UserResponse> {
    debug!("Get user request: {}", id);

    let user_id = parse_user_id(&id)?;
    let response = state.user_service.get_user(user_id).await?;
    reply(response)
}

/// Get a user by username.
async fn get_user_by_username(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<UserResponse> {
    debug!("Get user by username request: {}", username);

    let response = state.user_service.get_user_by_username(&username).await?;
    reply(response)
}

/// Check whether a username is taken.
async fn username_exists(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<ExistsResponse> {
    let exists = state.user_service.username_exists(&username).await?;
    reply(ExistsResponse { username, exists })
}

/// Create a new user.
async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<Created<UserResponse>, ApiError> {
    debug!("Create user request: {}", request.username);

    let response = state.user_service.create_user(request).await?;
    Ok(Created(response))
}

/// Update a user's profile.
async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateUserRequest>,
) -> ApiResult<UserResponse> {
    debug!("Update user request: {}", id);

    let user_id = parse_user_id(&id)?;
    let response = state.user_service.update_user(user_id, request).await?;
    reply(response)
}

/// Delete a user.
async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    debug!("Delete user request: {}", id);

    let user_id = parse_user_id(&id)?;
    state.user_service.delete_user(user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn parse_user_id(id: &str) -> Result<UserId, ApiError> {
    UserId::parse(id).map_err(|_| ApiError(StashError::validation(format!("Invalid user ID: {id}"))))
}
