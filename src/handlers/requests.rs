use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, NaiveDate, Utc};
use common::{DateRange, StatusCounts};
use engine::lifecycle::{AttachmentRef, ContentUpdate, NewRequest};
use engine::views::{self, DashboardFilter};
use model::entities::design_request::{self, RequestStatus};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::auth::CurrentUser;
use crate::schemas::{bad_request, engine_error_response, ApiResponse, AppState, ErrorResponse};

/// A file uploaded inline as base64-encoded bytes
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct UploadPayload {
    /// Original file name, used to infer the media kind
    pub file_name: String,
    /// Base64-encoded file contents
    pub data_base64: String,
}

/// Request body for creating a design request
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateRequestPayload {
    /// Outlet the design is for
    #[validate(length(min = 1))]
    pub outlet_name: String,
    /// Kind of design asset (banner, menu, social media post, ...)
    #[validate(length(min = 1))]
    pub design_type: String,
    /// Required dimensions, free-form
    #[validate(length(min = 1))]
    pub dimensions: String,
    /// Design elements to include
    #[validate(length(min = 1))]
    pub elements: String,
    /// Optional reference as an external link
    pub reference_link: Option<String>,
    /// Optional reference as an uploaded file
    pub reference_file: Option<UploadPayload>,
}

/// Request body for editing the descriptive fields of a pending request.
/// Omitted fields are left unchanged.
#[derive(Debug, Deserialize, Serialize, ToSchema, Default)]
pub struct UpdateRequestPayload {
    pub outlet_name: Option<String>,
    pub design_type: Option<String>,
    pub dimensions: Option<String>,
    pub elements: Option<String>,
    pub reference_link: Option<String>,
    pub reference_file: Option<UploadPayload>,
}

/// Request body for delivering a finished design, as a link or a file
#[derive(Debug, Deserialize, Serialize, ToSchema, Default)]
pub struct SubmitResultPayload {
    pub link: Option<String>,
    pub file: Option<UploadPayload>,
}

/// Request body for the admin status override
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct OverrideStatusPayload {
    pub status: RequestStatus,
}

/// Dashboard listing filters
#[derive(Debug, Deserialize, IntoParams)]
pub struct DashboardQuery {
    /// Substring match on outlet name or design type
    pub q: Option<String>,
    /// Exact status match
    pub status: Option<RequestStatus>,
    /// Exact designer match; "Unassigned" matches unclaimed requests
    pub designer: Option<String>,
}

/// History listing filters
#[derive(Debug, Deserialize, IntoParams)]
pub struct HistoryQuery {
    /// Substring match on outlet name or design type
    pub q: Option<String>,
    /// Inclusive lower bound on creation date (YYYY-MM-DD)
    pub start_date: Option<NaiveDate>,
    /// Inclusive upper bound on creation date (YYYY-MM-DD)
    pub end_date: Option<NaiveDate>,
}

/// Design request response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DesignRequestResponse {
    pub id: String,
    pub outlet_name: String,
    pub design_type: String,
    pub dimensions: String,
    pub elements: String,
    /// External link, stored blob, or empty when no reference was given
    pub reference_url: String,
    pub status: RequestStatus,
    pub designer_name: Option<String>,
    pub result_file_name: Option<String>,
    pub result_file_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub requestor_username: String,
}

impl From<design_request::Model> for DesignRequestResponse {
    fn from(model: design_request::Model) -> Self {
        Self {
            id: model.id,
            outlet_name: model.outlet_name,
            design_type: model.design_type,
            dimensions: model.dimensions,
            elements: model.elements,
            reference_url: model.reference_url,
            status: model.status,
            designer_name: model.designer_name,
            result_file_name: model.result_file_name,
            result_file_url: model.result_file_url,
            created_at: model.created_at,
            requestor_username: model.requestor_username,
        }
    }
}

/// Resolve a link/file pair into a single attachment. Supplying both is
/// rejected; supplying neither yields `None`.
fn resolve_attachment(
    link: Option<String>,
    file: Option<UploadPayload>,
) -> Result<Option<AttachmentRef>, (StatusCode, Json<ErrorResponse>)> {
    match (link, file) {
        (None, None) => Ok(None),
        (Some(_), Some(_)) => Err(bad_request("Provide either a link or a file, not both")),
        (Some(link), None) => Ok(Some(AttachmentRef::ExternalLink(link))),
        (None, Some(upload)) => {
            let bytes = STANDARD
                .decode(upload.data_base64.as_bytes())
                .map_err(|_| bad_request("File data is not valid base64"))?;
            Ok(Some(AttachmentRef::UploadedFile {
                file_name: upload.file_name,
                bytes,
            }))
        }
    }
}

/// Submit a new design request
#[utoipa::path(
    post,
    path = "/api/v1/requests",
    tag = "requests",
    request_body = CreateRequestPayload,
    responses(
        (status = 201, description = "Request created successfully", body = ApiResponse<DesignRequestResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 403, description = "Designers cannot submit requests", body = ErrorResponse),
        (status = 413, description = "Reference file too large", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(actor, payload))]
pub async fn create_request(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Valid(Json(payload)): Valid<Json<CreateRequestPayload>>,
) -> Result<(StatusCode, Json<ApiResponse<DesignRequestResponse>>), (StatusCode, Json<ErrorResponse>)>
{
    trace!("Entering create_request function");
    debug!(
        "User '{}' creating request for outlet '{}'",
        actor.username, payload.outlet_name
    );

    let reference = resolve_attachment(payload.reference_link, payload.reference_file)?;
    let created = engine::lifecycle::create_request(
        &state.db,
        &actor,
        NewRequest {
            outlet_name: payload.outlet_name,
            design_type: payload.design_type,
            dimensions: payload.dimensions,
            elements: payload.elements,
            reference,
        },
    )
    .await
    .map_err(engine_error_response)?;

    info!("Request {} created successfully", created.id);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(
            DesignRequestResponse::from(created),
            "Request created successfully",
        )),
    ))
}

/// List requests visible to the caller, newest first, with dashboard filters
#[utoipa::path(
    get,
    path = "/api/v1/requests",
    tag = "requests",
    params(DashboardQuery),
    responses(
        (status = 200, description = "Requests retrieved successfully", body = ApiResponse<Vec<DesignRequestResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(actor))]
pub async fn get_requests(
    Query(query): Query<DashboardQuery>,
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
) -> Result<Json<ApiResponse<Vec<DesignRequestResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering get_requests function");

    let visible = engine::lifecycle::visible_requests(&state.db, &actor)
        .await
        .map_err(engine_error_response)?;
    let filter = DashboardFilter {
        query: query.q,
        status: query.status,
        designer: query.designer,
    };
    let matched = views::dashboard(visible, &filter);

    debug!("Retrieved {} requests for '{}'", matched.len(), actor.username);
    let requests: Vec<DesignRequestResponse> = matched
        .into_iter()
        .map(DesignRequestResponse::from)
        .collect();
    Ok(Json(ApiResponse::new(
        requests,
        "Requests retrieved successfully",
    )))
}

/// Get a single request by id
#[utoipa::path(
    get,
    path = "/api/v1/requests/{id}",
    tag = "requests",
    params(
        ("id" = String, Path, description = "Request id"),
    ),
    responses(
        (status = 200, description = "Request retrieved successfully", body = ApiResponse<DesignRequestResponse>),
        (status = 404, description = "Request not found or not visible", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(actor))]
pub async fn get_request(
    Path(id): Path<String>,
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
) -> Result<Json<ApiResponse<DesignRequestResponse>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering get_request function for id: {}", id);

    let request = engine::lifecycle::get_request(&state.db, &actor, &id)
        .await
        .map_err(engine_error_response)?;
    Ok(Json(ApiResponse::new(
        DesignRequestResponse::from(request),
        "Request retrieved successfully",
    )))
}

/// Edit the descriptive fields of a pending request
#[utoipa::path(
    put,
    path = "/api/v1/requests/{id}",
    tag = "requests",
    params(
        ("id" = String, Path, description = "Request id"),
    ),
    request_body = UpdateRequestPayload,
    responses(
        (status = 200, description = "Request updated successfully", body = ApiResponse<DesignRequestResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 403, description = "Caller may not edit this request", body = ErrorResponse),
        (status = 404, description = "Request not found or not visible", body = ErrorResponse),
        (status = 409, description = "Request is no longer pending", body = ErrorResponse),
        (status = 413, description = "Reference file too large", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(actor, payload))]
pub async fn update_request(
    Path(id): Path<String>,
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Json(payload): Json<UpdateRequestPayload>,
) -> Result<Json<ApiResponse<DesignRequestResponse>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering update_request function for id: {}", id);

    let reference = resolve_attachment(payload.reference_link, payload.reference_file)?;
    let updated = engine::lifecycle::edit_content(
        &state.db,
        &actor,
        &id,
        ContentUpdate {
            outlet_name: payload.outlet_name,
            design_type: payload.design_type,
            dimensions: payload.dimensions,
            elements: payload.elements,
            reference,
        },
    )
    .await
    .map_err(engine_error_response)?;

    info!("Request {} updated by '{}'", id, actor.username);
    Ok(Json(ApiResponse::new(
        DesignRequestResponse::from(updated),
        "Request updated successfully",
    )))
}

/// Delete a request (admin only)
#[utoipa::path(
    delete,
    path = "/api/v1/requests/{id}",
    tag = "requests",
    params(
        ("id" = String, Path, description = "Request id"),
    ),
    responses(
        (status = 200, description = "Request deleted successfully", body = ApiResponse<String>),
        (status = 403, description = "Actor is not an admin", body = ErrorResponse),
        (status = 404, description = "Request not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(actor))]
pub async fn delete_request(
    Path(id): Path<String>,
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
) -> Result<Json<ApiResponse<String>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering delete_request function for id: {}", id);

    engine::lifecycle::delete_request(&state.db, &actor, &id)
        .await
        .map_err(engine_error_response)?;

    Ok(Json(ApiResponse::new(
        format!("Request {id} deleted"),
        "Request deleted successfully",
    )))
}

/// Claim a pending request (designer only)
#[utoipa::path(
    post,
    path = "/api/v1/requests/{id}/claim",
    tag = "requests",
    params(
        ("id" = String, Path, description = "Request id"),
    ),
    responses(
        (status = 200, description = "Request claimed successfully", body = ApiResponse<DesignRequestResponse>),
        (status = 403, description = "Actor is not a designer", body = ErrorResponse),
        (status = 404, description = "Request not found", body = ErrorResponse),
        (status = 409, description = "Request is not pending", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(actor))]
pub async fn claim_request(
    Path(id): Path<String>,
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
) -> Result<Json<ApiResponse<DesignRequestResponse>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering claim_request function for id: {}", id);

    let claimed = engine::lifecycle::claim(&state.db, &actor, &id)
        .await
        .map_err(engine_error_response)?;

    Ok(Json(ApiResponse::new(
        DesignRequestResponse::from(claimed),
        "Request claimed successfully",
    )))
}

/// Deliver the finished design for an in-progress request
#[utoipa::path(
    post,
    path = "/api/v1/requests/{id}/result",
    tag = "requests",
    params(
        ("id" = String, Path, description = "Request id"),
    ),
    request_body = SubmitResultPayload,
    responses(
        (status = 200, description = "Result submitted successfully", body = ApiResponse<DesignRequestResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 403, description = "Actor is not the assigned designer", body = ErrorResponse),
        (status = 404, description = "Request not found", body = ErrorResponse),
        (status = 409, description = "Request is not in progress", body = ErrorResponse),
        (status = 413, description = "Result file too large", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(actor, payload))]
pub async fn submit_result(
    Path(id): Path<String>,
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Json(payload): Json<SubmitResultPayload>,
) -> Result<Json<ApiResponse<DesignRequestResponse>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering submit_result function for id: {}", id);

    let result = resolve_attachment(payload.link, payload.file)?
        .ok_or_else(|| bad_request("A result link or file is required"))?;
    let done = engine::lifecycle::submit_result(&state.db, &actor, &id, result)
        .await
        .map_err(engine_error_response)?;

    Ok(Json(ApiResponse::new(
        DesignRequestResponse::from(done),
        "Result submitted successfully",
    )))
}

/// Force a request into a given status (admin only)
#[utoipa::path(
    put,
    path = "/api/v1/requests/{id}/status",
    tag = "requests",
    params(
        ("id" = String, Path, description = "Request id"),
    ),
    request_body = OverrideStatusPayload,
    responses(
        (status = 200, description = "Status overridden successfully", body = ApiResponse<DesignRequestResponse>),
        (status = 403, description = "Actor is not an admin", body = ErrorResponse),
        (status = 404, description = "Request not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(actor))]
pub async fn override_status(
    Path(id): Path<String>,
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Json(payload): Json<OverrideStatusPayload>,
) -> Result<Json<ApiResponse<DesignRequestResponse>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering override_status function for id: {}", id);

    let updated =
        engine::lifecycle::admin_override_status(&state.db, &actor, &id, payload.status)
            .await
            .map_err(engine_error_response)?;

    Ok(Json(ApiResponse::new(
        DesignRequestResponse::from(updated),
        "Status overridden successfully",
    )))
}

/// List completed requests within an inclusive creation-date range
#[utoipa::path(
    get,
    path = "/api/v1/history",
    tag = "requests",
    params(HistoryQuery),
    responses(
        (status = 200, description = "History retrieved successfully", body = ApiResponse<Vec<DesignRequestResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(actor))]
pub async fn get_history(
    Query(query): Query<HistoryQuery>,
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
) -> Result<Json<ApiResponse<Vec<DesignRequestResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering get_history function");

    let visible = engine::lifecycle::visible_requests(&state.db, &actor)
        .await
        .map_err(engine_error_response)?;
    let range = DateRange::new(query.start_date, query.end_date);
    let matched = views::history(visible, &range, query.q.as_deref());

    debug!("History query matched {} requests", matched.len());
    let requests: Vec<DesignRequestResponse> = matched
        .into_iter()
        .map(DesignRequestResponse::from)
        .collect();
    Ok(Json(ApiResponse::new(
        requests,
        "History retrieved successfully",
    )))
}

/// Distinct designer names across all requests. Deliberately unscoped:
/// the roster populates a filter control, so it covers assignments on
/// requests the caller cannot see.
#[utoipa::path(
    get,
    path = "/api/v1/designers",
    tag = "requests",
    responses(
        (status = 200, description = "Designers retrieved successfully", body = ApiResponse<Vec<String>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(_actor))]
pub async fn get_designers(
    State(state): State<AppState>,
    CurrentUser(_actor): CurrentUser,
) -> Result<Json<ApiResponse<Vec<String>>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering get_designers function");

    let requests = engine::lifecycle::all_requests(&state.db)
        .await
        .map_err(engine_error_response)?;
    let roster = views::designer_roster(&requests);
    Ok(Json(ApiResponse::new(
        roster,
        "Designers retrieved successfully",
    )))
}

/// Per-status totals over the caller's visible requests
#[utoipa::path(
    get,
    path = "/api/v1/stats",
    tag = "requests",
    responses(
        (status = 200, description = "Stats retrieved successfully", body = ApiResponse<StatusCounts>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(actor))]
pub async fn get_stats(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
) -> Result<Json<ApiResponse<StatusCounts>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering get_stats function");

    let visible = engine::lifecycle::visible_requests(&state.db, &actor)
        .await
        .map_err(engine_error_response)?;
    let counts = views::status_counts(&visible);
    Ok(Json(ApiResponse::new(
        counts,
        "Stats retrieved successfully",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attachment_requires_at_most_one_source() {
        let err = resolve_attachment(
            Some("https://x".to_string()),
            Some(UploadPayload {
                file_name: "a.png".to_string(),
                data_base64: STANDARD.encode([1u8, 2, 3]),
            }),
        )
        .unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn attachment_decodes_uploaded_bytes() {
        let resolved = resolve_attachment(
            None,
            Some(UploadPayload {
                file_name: "a.png".to_string(),
                data_base64: STANDARD.encode([1u8, 2, 3]),
            }),
        )
        .unwrap();
        match resolved {
            Some(AttachmentRef::UploadedFile { file_name, bytes }) => {
                assert_eq!(file_name, "a.png");
                assert_eq!(bytes, vec![1, 2, 3]);
            }
            other => panic!("unexpected attachment: {other:?}"),
        }
    }

    #[test]
    fn attachment_rejects_malformed_base64() {
        let err = resolve_attachment(
            None,
            Some(UploadPayload {
                file_name: "a.png".to_string(),
                data_base64: "not base64!!".to_string(),
            }),
        )
        .unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn absent_attachment_is_none() {
        assert!(resolve_attachment(None, None).unwrap().is_none());
    }
}
