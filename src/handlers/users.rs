use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use engine::users::NewUser;
use model::entities::user::{self, UserRole};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::CurrentUser;
use crate::schemas::{engine_error_response, ApiResponse, AppState, ErrorResponse};

/// Request body for creating a new user
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateUserPayload {
    /// Username (must be unique)
    #[validate(length(min = 1))]
    pub username: String,
    /// Initial password (stored hashed)
    #[validate(length(min = 1))]
    pub password: String,
    /// Account role
    pub role: UserRole,
    /// Display name
    #[validate(length(min = 1))]
    pub name: String,
}

/// User response model; never carries the password hash
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub username: String,
    pub role: UserRole,
    pub name: String,
}

impl From<user::Model> for UserResponse {
    fn from(model: user::Model) -> Self {
        Self {
            username: model.username,
            role: model.role,
            name: model.name,
        }
    }
}

/// Create a new user (admin only)
#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "users",
    request_body = CreateUserPayload,
    responses(
        (status = 201, description = "User created successfully", body = ApiResponse<UserResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 403, description = "Actor is not an admin", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(actor, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Valid(Json(payload)): Valid<Json<CreateUserPayload>>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering create_user function");
    debug!(
        "Admin '{}' creating user '{}' with role {:?}",
        actor.username, payload.username, payload.role
    );

    let created = engine::users::create_user(
        &state.db,
        &actor,
        NewUser {
            username: payload.username,
            password: payload.password,
            role: payload.role,
            name: payload.name,
        },
    )
    .await
    .map_err(engine_error_response)?;

    info!("User '{}' created successfully", created.username);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            UserResponse::from(created),
            "User created successfully",
        )),
    ))
}

/// Get all users (admin only), ordered by display name
#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "users",
    responses(
        (status = 200, description = "Users retrieved successfully", body = ApiResponse<Vec<UserResponse>>),
        (status = 403, description = "Actor is not an admin", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(actor))]
pub async fn get_users(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
) -> Result<Json<ApiResponse<Vec<UserResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering get_users function");

    let listed = engine::users::list_users(&state.db, &actor)
        .await
        .map_err(engine_error_response)?;

    debug!("Retrieved {} users", listed.len());
    let users: Vec<UserResponse> = listed.into_iter().map(UserResponse::from).collect();
    Ok(Json(ApiResponse::new(users, "Users retrieved successfully")))
}

/// Delete a user (admin only; admins cannot delete themselves)
#[utoipa::path(
    delete,
    path = "/api/v1/users/{username}",
    tag = "users",
    params(
        ("username" = String, Path, description = "Username to delete"),
    ),
    responses(
        (status = 200, description = "User deleted successfully", body = ApiResponse<String>),
        (status = 403, description = "Actor is not an admin, or tried to delete itself", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(actor))]
pub async fn delete_user(
    Path(username): Path<String>,
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
) -> Result<Json<ApiResponse<String>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering delete_user function for username: {}", username);

    engine::users::delete_user(&state.db, &actor, &username)
        .await
        .map_err(engine_error_response)?;

    Ok(Json(ApiResponse::new(
        format!("User {username} deleted"),
        "User deleted successfully",
    )))
}
