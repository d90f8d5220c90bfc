use axum::{extract::State, http::StatusCode, response::Json};
use axum_valid::Valid;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

use crate::handlers::users::UserResponse;
use crate::schemas::{engine_error_response, ApiResponse, AppState, ErrorResponse};

/// Credentials submitted by the login form
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct LoginPayload {
    /// Account username
    #[validate(length(min = 1))]
    pub username: String,
    /// Account password
    #[validate(length(min = 1))]
    pub password: String,
}

/// Verify credentials and return the matching account
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "auth",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Credentials verified", body = ApiResponse<UserResponse>),
        (status = 401, description = "Invalid username or password", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(payload))]
pub async fn login(
    State(state): State<AppState>,
    Valid(Json(payload)): Valid<Json<LoginPayload>>,
) -> Result<Json<ApiResponse<UserResponse>>, (StatusCode, Json<ErrorResponse>)> {
    debug!("Login attempt for username: {}", payload.username);

    let account = engine::users::authenticate(&state.db, &payload.username, &payload.password)
        .await
        .map_err(engine_error_response)?;

    match account {
        Some(account) => {
            info!("User '{}' logged in", account.username);
            Ok(Json(ApiResponse::new(
                UserResponse::from(account),
                "Login successful",
            )))
        }
        None => {
            warn!("Failed login attempt for username: {}", payload.username);
            Err((
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse {
                    error: "Invalid username or password".to_string(),
                    code: "INVALID_CREDENTIALS".to_string(),
                    success: false,
                }),
            ))
        }
    }
}
