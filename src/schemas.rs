use axum::http::StatusCode;
use axum::response::Json;
use engine::EngineError;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::{OpenApi, ToSchema};

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
}

/// API response wrapper
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success status
    pub success: bool,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T, message: &str) -> Self {
        Self {
            data,
            message: message.to_string(),
            success: true,
        }
    }
}

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

/// Health check response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

/// Map an engine error onto the HTTP surface.
///
/// Store and runtime failures are logged and reported generically;
/// everything else carries the engine's message verbatim.
pub fn engine_error_response(err: EngineError) -> (StatusCode, Json<ErrorResponse>) {
    let (status, code, message) = match &err {
        EngineError::Forbidden => (StatusCode::FORBIDDEN, "FORBIDDEN", err.to_string()),
        EngineError::InvalidState { .. } => {
            (StatusCode::CONFLICT, "INVALID_STATE", err.to_string())
        }
        EngineError::PayloadTooLarge { .. } => (
            StatusCode::PAYLOAD_TOO_LARGE,
            "PAYLOAD_TOO_LARGE",
            err.to_string(),
        ),
        EngineError::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string()),
        EngineError::Validation(_) => {
            (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", err.to_string())
        }
        EngineError::Database(db_error) => {
            error!("Database error surfaced to handler: {}", db_error);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "DATABASE_ERROR",
                "Internal server error".to_string(),
            )
        }
        EngineError::Runtime(detail) => {
            error!("Runtime error surfaced to handler: {}", detail);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "RUNTIME_ERROR",
                "Internal server error".to_string(),
            )
        }
    };
    (
        status,
        Json(ErrorResponse {
            error: message,
            code: code.to_string(),
            success: false,
        }),
    )
}

/// Shorthand for ad-hoc validation failures raised at the HTTP layer.
pub fn bad_request(message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.to_string(),
            code: "VALIDATION_ERROR".to_string(),
            success: false,
        }),
    )
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::auth::login,
        crate::handlers::requests::create_request,
        crate::handlers::requests::get_requests,
        crate::handlers::requests::get_request,
        crate::handlers::requests::update_request,
        crate::handlers::requests::delete_request,
        crate::handlers::requests::claim_request,
        crate::handlers::requests::submit_result,
        crate::handlers::requests::override_status,
        crate::handlers::requests::get_history,
        crate::handlers::requests::get_designers,
        crate::handlers::requests::get_stats,
        crate::handlers::users::create_user,
        crate::handlers::users::get_users,
        crate::handlers::users::delete_user,
    ),
    components(
        schemas(
            ApiResponse<crate::handlers::users::UserResponse>,
            ApiResponse<Vec<crate::handlers::users::UserResponse>>,
            ApiResponse<crate::handlers::requests::DesignRequestResponse>,
            ApiResponse<Vec<crate::handlers::requests::DesignRequestResponse>>,
            ApiResponse<Vec<String>>,
            ApiResponse<common::StatusCounts>,
            ErrorResponse,
            HealthResponse,
            crate::handlers::auth::LoginPayload,
            crate::handlers::users::UserResponse,
            crate::handlers::users::CreateUserPayload,
            crate::handlers::requests::DesignRequestResponse,
            crate::handlers::requests::CreateRequestPayload,
            crate::handlers::requests::UpdateRequestPayload,
            crate::handlers::requests::SubmitResultPayload,
            crate::handlers::requests::OverrideStatusPayload,
            crate::handlers::requests::UploadPayload,
            model::entities::design_request::RequestStatus,
            model::entities::user::UserRole,
            common::DateRange,
            common::StatusCounts,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Credential verification"),
        (name = "requests", description = "Design request lifecycle and views"),
        (name = "users", description = "Account management (admin only)"),
    ),
    info(
        title = "Design Hub API",
        description = "Multi-role workflow tracker for design-asset requests: outlets submit design jobs, designers claim and fulfill them, admins manage accounts.",
        version = "0.1.0",
    )
)]
pub struct ApiDoc;
