use crate::handlers::{
    auth::login,
    health::health_check,
    requests::{
        claim_request, create_request, delete_request, get_designers, get_history, get_request,
        get_requests, get_stats, override_status, submit_result, update_request,
    },
    users::{create_user, delete_user, get_users},
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Credential verification
        .route("/api/v1/auth/login", post(login))
        // Request lifecycle routes
        .route("/api/v1/requests", post(create_request))
        .route("/api/v1/requests", get(get_requests))
        .route("/api/v1/requests/:id", get(get_request))
        .route("/api/v1/requests/:id", put(update_request))
        .route("/api/v1/requests/:id", delete(delete_request))
        .route("/api/v1/requests/:id/claim", post(claim_request))
        .route("/api/v1/requests/:id/result", post(submit_result))
        .route("/api/v1/requests/:id/status", put(override_status))
        // Derived views
        .route("/api/v1/history", get(get_history))
        .route("/api/v1/designers", get(get_designers))
        .route("/api/v1/stats", get(get_stats))
        // Account management routes
        .route("/api/v1/users", post(create_user))
        .route("/api/v1/users", get(get_users))
        .route("/api/v1/users/:username", delete(delete_user))
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
