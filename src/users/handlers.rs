use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    error::{ApiError, ApiResult},
    response::ApiResponse,
    state::AppState,
    users::{
        dto::UserPayload,
        repo::RepoError,
        repo_types::{User, UserFields},
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<UserPayload>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ApiResponse<User>>)> {
    let fields = parse_body(payload)?;

    match state.users.create(&fields).await {
        Ok(user) => {
            info!(user_id = user.id, user_name = %user.user_name, "user created");
            Ok((
                StatusCode::CREATED,
                Json(ApiResponse::ok("User created successfully", user)),
            ))
        }
        Err(RepoError::Duplicate) => {
            warn!(user_name = %fields.user_name, "username already exists");
            Err(ApiError::Conflict("Username already exists".into()))
        }
        Err(e) => Err(ApiError::internal("Error inserting user", e)),
    }
}

#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<ApiResponse<Vec<User>>>> {
    let users = state
        .users
        .list()
        .await
        .map_err(|e| ApiError::internal("Error executing query", e))?;
    Ok(Json(ApiResponse::ok("Users retrieved successfully", users)))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> ApiResult<Json<ApiResponse<User>>> {
    let id = parse_id(id)?;
    match state.users.find(id).await {
        Ok(Some(user)) => Ok(Json(ApiResponse::ok("User retrieved successfully", user))),
        Ok(None) => {
            warn!(user_id = id, "user not found");
            Err(not_found())
        }
        Err(e) => Err(ApiError::internal("Error retrieving user", e)),
    }
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
    payload: Result<Json<UserPayload>, JsonRejection>,
) -> ApiResult<Json<ApiResponse<User>>> {
    let id = parse_id(id)?;
    let fields = parse_body(payload)?;

    match state.users.update(id, &fields).await {
        Ok(Some(user)) => {
            info!(user_id = id, "user updated");
            Ok(Json(ApiResponse::ok("User updated successfully", user)))
        }
        Ok(None) => {
            warn!(user_id = id, "update of unknown user");
            Err(not_found())
        }
        Err(RepoError::Duplicate) => {
            warn!(user_id = id, user_name = %fields.user_name, "username already exists");
            Err(ApiError::Conflict("Username already exists".into()))
        }
        Err(e) => Err(ApiError::internal("Error updating user", e)),
    }
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> ApiResult<Json<ApiResponse<()>>> {
    let id = parse_id(id)?;
    let deleted = state
        .users
        .delete(id)
        .await
        .map_err(|e| ApiError::internal("Error deleting user", e))?;

    if !deleted {
        warn!(user_id = id, "delete of unknown user");
        return Err(not_found());
    }
    info!(user_id = id, "user deleted");
    Ok(Json(ApiResponse::empty("User deleted successfully")))
}

fn parse_body(payload: Result<Json<UserPayload>, JsonRejection>) -> Result<UserFields, ApiError> {
    let Json(payload) = payload.map_err(|e| {
        warn!(error = %e, "invalid request body");
        ApiError::Validation("Invalid request".into())
    })?;
    payload.into_fields()
}

fn parse_id(id: Result<Path<i32>, PathRejection>) -> Result<i32, ApiError> {
    id.map(|Path(id)| id).map_err(|e| {
        warn!(error = %e, "invalid user id");
        ApiError::Validation("Invalid user id".into())
    })
}

fn not_found() -> ApiError {
    ApiError::NotFound("User not found".into())
}
