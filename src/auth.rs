//! Per-request authentication.
//!
//! Every protected endpoint authenticates via HTTP Basic credentials and
//! receives the verified account as an explicit [`Actor`]; the server
//! keeps no session state.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use axum::response::Json;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use engine::Actor;
use tracing::{debug, warn};

use crate::schemas::{AppState, ErrorResponse};

/// The authenticated acting user, extracted from the Authorization header.
pub struct CurrentUser(pub Actor);

fn unauthorized(message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse {
            error: message.to_string(),
            code: "UNAUTHORIZED".to_string(),
            success: false,
        }),
    )
}

/// Parse a `Basic` Authorization header into username and password.
fn parse_basic(header_value: &str) -> Option<(String, String)> {
    let payload = header_value.strip_prefix("Basic ")?;
    let decoded = STANDARD.decode(payload.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| unauthorized("Missing credentials"))?;

        let (username, password) = parse_basic(header_value)
            .ok_or_else(|| unauthorized("Malformed Authorization header"))?;

        match engine::users::authenticate(&state.db, &username, &password).await {
            Ok(Some(account)) => {
                debug!("Authenticated '{}' ({:?})", account.username, account.role);
                Ok(CurrentUser(Actor::from(account)))
            }
            Ok(None) => Err(unauthorized("Invalid username or password")),
            Err(e) => {
                warn!("Authentication lookup failed: {}", e);
                Err(unauthorized("Invalid username or password"))
            }
        }
    }
}
