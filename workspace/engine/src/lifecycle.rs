//! The request lifecycle state machine and its authorization-gated
//! transition model.
//!
//! ```text
//! Pending --(claim, Designer)--------------> In Progress
//! In Progress --(submit_result, assigned Designer)--> Done
//! <any> --(admin_override_status, Admin)---> <any>
//! ```
//!
//! Each mutation is a single targeted UPDATE; `claim` and `submit_result`
//! include the expected prior status in the WHERE clause and check the
//! affected-row count, so two concurrent claims admit at most one winner.

use chrono::Utc;
use model::entities::design_request::{self, RequestStatus};
use model::entities::user::UserRole;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::actor::Actor;
use crate::blob::{self, MediaKind};
use crate::error::{EngineError, Result};

/// File name recorded when a result is delivered as an external link.
pub const EXTERNAL_LINK_NAME: &str = "External Link";

/// A file attachment: exactly one of an external link or an uploaded file.
#[derive(Debug, Clone)]
pub enum AttachmentRef {
    ExternalLink(String),
    UploadedFile { file_name: String, bytes: Vec<u8> },
}

/// Descriptive fields for a new request.
#[derive(Debug, Clone, Default)]
pub struct NewRequest {
    pub outlet_name: String,
    pub design_type: String,
    pub dimensions: String,
    pub elements: String,
    pub reference: Option<AttachmentRef>,
}

/// Partial update of the descriptive fields; `None` leaves a field alone.
/// Status, designer and result fields are never touched by an edit.
#[derive(Debug, Clone, Default)]
pub struct ContentUpdate {
    pub outlet_name: Option<String>,
    pub design_type: Option<String>,
    pub dimensions: Option<String>,
    pub elements: Option<String>,
    pub reference: Option<AttachmentRef>,
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(EngineError::Validation(format!("{field} is required")));
    }
    Ok(())
}

/// Convert an attachment into its stored `reference_url`/`result_file_url`
/// representation. Uploads are size-checked before encoding.
fn stored_url(attachment: AttachmentRef) -> Result<String> {
    match attachment {
        AttachmentRef::ExternalLink(url) => {
            let url = url.trim().to_string();
            require("link", &url)?;
            Ok(url)
        }
        AttachmentRef::UploadedFile { file_name, bytes } => {
            blob::encode(MediaKind::from_file_name(&file_name), &bytes)
        }
    }
}

async fn reload(db: &DatabaseConnection, id: &str) -> Result<design_request::Model> {
    design_request::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(EngineError::NotFound)
}

/// Fetch a single request, applying the actor's visibility scope.
/// An out-of-scope id is indistinguishable from an unknown one.
pub async fn get_request(
    db: &DatabaseConnection,
    actor: &Actor,
    id: &str,
) -> Result<design_request::Model> {
    let request = design_request::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(EngineError::NotFound)?;
    if !actor.can_see(&request) {
        warn!(
            "User '{}' attempted to access request {} outside their scope",
            actor.username, id
        );
        return Err(EngineError::NotFound);
    }
    Ok(request)
}

/// All requests visible to the actor, newest-created first.
pub async fn visible_requests(
    db: &DatabaseConnection,
    actor: &Actor,
) -> Result<Vec<design_request::Model>> {
    let mut query = design_request::Entity::find()
        .order_by_desc(design_request::Column::CreatedAt);
    if actor.role == UserRole::User {
        query = query.filter(design_request::Column::RequestorUsername.eq(&actor.username));
    }
    Ok(query.all(db).await?)
}

/// Every request in the store, newest-created first, regardless of the
/// actor's visibility scope. The designer roster is built from this set,
/// so User-role callers still see every active designer as a filter
/// option.
pub async fn all_requests(db: &DatabaseConnection) -> Result<Vec<design_request::Model>> {
    Ok(design_request::Entity::find()
        .order_by_desc(design_request::Column::CreatedAt)
        .all(db)
        .await?)
}

/// Create a new Pending request on behalf of the actor.
///
/// Only the User and Admin roles submit requests. The descriptive fields
/// are required; the reference attachment is optional.
pub async fn create_request(
    db: &DatabaseConnection,
    actor: &Actor,
    request: NewRequest,
) -> Result<design_request::Model> {
    if !matches!(actor.role, UserRole::User | UserRole::Admin) {
        return Err(EngineError::Forbidden);
    }
    require("outlet name", &request.outlet_name)?;
    require("design type", &request.design_type)?;
    require("dimensions", &request.dimensions)?;
    require("elements", &request.elements)?;

    let reference_url = match request.reference {
        None => String::new(),
        Some(attachment) => stored_url(attachment)?,
    };

    let new_request = design_request::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        outlet_name: Set(request.outlet_name),
        design_type: Set(request.design_type),
        dimensions: Set(request.dimensions),
        elements: Set(request.elements),
        reference_url: Set(reference_url),
        status: Set(RequestStatus::Pending),
        designer_name: Set(None),
        result_file_name: Set(None),
        result_file_url: Set(None),
        created_at: Set(Utc::now()),
        requestor_username: Set(actor.username.clone()),
    };

    let inserted = new_request.insert(db).await?;
    info!(
        "Request {} created by '{}' for outlet '{}'",
        inserted.id, actor.username, inserted.outlet_name
    );
    Ok(inserted)
}

/// A Designer takes ownership of a Pending request.
///
/// The UPDATE is conditional on `status = Pending`, so under concurrent
/// attempts exactly one claim wins and the loser observes `InvalidState`.
pub async fn claim(
    db: &DatabaseConnection,
    actor: &Actor,
    id: &str,
) -> Result<design_request::Model> {
    if actor.role != UserRole::Designer {
        return Err(EngineError::Forbidden);
    }
    let request = get_request(db, actor, id).await?;
    if request.status != RequestStatus::Pending {
        return Err(EngineError::InvalidState {
            current: request.status,
        });
    }

    let designer_name = actor.display_name().to_string();
    let result = design_request::Entity::update_many()
        .col_expr(
            design_request::Column::Status,
            Expr::value(RequestStatus::InProgress),
        )
        .col_expr(
            design_request::Column::DesignerName,
            Expr::value(Some(designer_name.clone())),
        )
        .filter(design_request::Column::Id.eq(id))
        .filter(design_request::Column::Status.eq(RequestStatus::Pending))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        // Lost the race, or the status moved underneath us
        let current = reload(db, id).await?;
        debug!(
            "Claim of {} by '{}' lost to a concurrent transition (now {:?})",
            id, actor.username, current.status
        );
        return Err(EngineError::InvalidState {
            current: current.status,
        });
    }

    info!("Request {} claimed by designer '{}'", id, designer_name);
    reload(db, id).await
}

/// The assigned Designer delivers the result, moving the request to Done.
pub async fn submit_result(
    db: &DatabaseConnection,
    actor: &Actor,
    id: &str,
    result: AttachmentRef,
) -> Result<design_request::Model> {
    if actor.role != UserRole::Designer {
        return Err(EngineError::Forbidden);
    }
    let request = get_request(db, actor, id).await?;
    if request.status != RequestStatus::InProgress {
        return Err(EngineError::InvalidState {
            current: request.status,
        });
    }
    if request.designer_name.as_deref() != Some(actor.display_name()) {
        warn!(
            "Designer '{}' attempted to submit a result for request {} assigned to {:?}",
            actor.username, id, request.designer_name
        );
        return Err(EngineError::Forbidden);
    }

    let (file_name, file_url) = match result {
        AttachmentRef::ExternalLink(url) => {
            let url = url.trim().to_string();
            require("link", &url)?;
            (EXTERNAL_LINK_NAME.to_string(), url)
        }
        AttachmentRef::UploadedFile { file_name, bytes } => {
            let url = blob::encode(MediaKind::from_file_name(&file_name), &bytes)?;
            (file_name, url)
        }
    };

    let update = design_request::Entity::update_many()
        .col_expr(
            design_request::Column::Status,
            Expr::value(RequestStatus::Done),
        )
        .col_expr(
            design_request::Column::ResultFileName,
            Expr::value(Some(file_name)),
        )
        .col_expr(
            design_request::Column::ResultFileUrl,
            Expr::value(Some(file_url)),
        )
        .filter(design_request::Column::Id.eq(id))
        .filter(design_request::Column::Status.eq(RequestStatus::InProgress))
        .exec(db)
        .await?;

    if update.rows_affected == 0 {
        let current = reload(db, id).await?;
        return Err(EngineError::InvalidState {
            current: current.status,
        });
    }

    info!("Request {} completed by designer '{}'", id, actor.username);
    reload(db, id).await
}

/// Admin escape hatch: set the status directly, with no side effects on
/// the designer or result fields. This deliberately bypasses the normal
/// invariants so an admin can correct a mis-transitioned request.
pub async fn admin_override_status(
    db: &DatabaseConnection,
    actor: &Actor,
    id: &str,
    new_status: RequestStatus,
) -> Result<design_request::Model> {
    if actor.role != UserRole::Admin {
        return Err(EngineError::Forbidden);
    }
    let result = design_request::Entity::update_many()
        .col_expr(design_request::Column::Status, Expr::value(new_status))
        .filter(design_request::Column::Id.eq(id))
        .exec(db)
        .await?;
    if result.rows_affected == 0 {
        return Err(EngineError::NotFound);
    }
    info!(
        "Request {} status overridden to {:?} by admin '{}'",
        id, new_status, actor.username
    );
    reload(db, id).await
}

/// Edit the descriptive fields of a still-Pending request.
///
/// Legal for the requesting User and for Admins; never mutates status,
/// designer or result fields.
pub async fn edit_content(
    db: &DatabaseConnection,
    actor: &Actor,
    id: &str,
    update: ContentUpdate,
) -> Result<design_request::Model> {
    let request = get_request(db, actor, id).await?;
    if request.status != RequestStatus::Pending {
        return Err(EngineError::InvalidState {
            current: request.status,
        });
    }
    let allowed = match actor.role {
        UserRole::Admin => true,
        UserRole::User => request.requestor_username == actor.username,
        UserRole::Designer => false,
    };
    if !allowed {
        return Err(EngineError::Forbidden);
    }

    let mut statement = design_request::Entity::update_many();
    let mut touched = false;
    if let Some(outlet_name) = update.outlet_name {
        require("outlet name", &outlet_name)?;
        statement = statement.col_expr(
            design_request::Column::OutletName,
            Expr::value(outlet_name),
        );
        touched = true;
    }
    if let Some(design_type) = update.design_type {
        require("design type", &design_type)?;
        statement = statement.col_expr(
            design_request::Column::DesignType,
            Expr::value(design_type),
        );
        touched = true;
    }
    if let Some(dimensions) = update.dimensions {
        require("dimensions", &dimensions)?;
        statement = statement.col_expr(
            design_request::Column::Dimensions,
            Expr::value(dimensions),
        );
        touched = true;
    }
    if let Some(elements) = update.elements {
        require("elements", &elements)?;
        statement =
            statement.col_expr(design_request::Column::Elements, Expr::value(elements));
        touched = true;
    }
    if let Some(reference) = update.reference {
        let url = stored_url(reference)?;
        statement =
            statement.col_expr(design_request::Column::ReferenceUrl, Expr::value(url));
        touched = true;
    }

    if !touched {
        return Ok(request);
    }

    let result = statement
        .filter(design_request::Column::Id.eq(id))
        .filter(design_request::Column::Status.eq(RequestStatus::Pending))
        .exec(db)
        .await?;
    if result.rows_affected == 0 {
        let current = reload(db, id).await?;
        return Err(EngineError::InvalidState {
            current: current.status,
        });
    }

    debug!("Request {} content edited by '{}'", id, actor.username);
    reload(db, id).await
}

/// Remove a request entirely. Admin only.
pub async fn delete_request(db: &DatabaseConnection, actor: &Actor, id: &str) -> Result<()> {
    if actor.role != UserRole::Admin {
        return Err(EngineError::Forbidden);
    }
    let result = design_request::Entity::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(EngineError::NotFound);
    }
    info!("Request {} deleted by admin '{}'", id, actor.username);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use migration::{Migrator, MigratorTrait};
    use model::entities::user::UserRole;
    use sea_orm::Database;

    async fn setup_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to connect to in-memory database");
        Migrator::up(&db, None).await.expect("Migrations failed");
        db
    }

    fn actor(username: &str, name: &str, role: UserRole) -> Actor {
        Actor {
            username: username.to_string(),
            name: name.to_string(),
            role,
        }
    }

    fn admin() -> Actor {
        actor("admin", "Super Admin", UserRole::Admin)
    }

    fn alice() -> Actor {
        actor("alice", "Alice", UserRole::User)
    }

    fn bob() -> Actor {
        actor("bob", "bob", UserRole::Designer)
    }

    fn carol() -> Actor {
        actor("carol", "carol", UserRole::Designer)
    }

    fn banner_request() -> NewRequest {
        NewRequest {
            outlet_name: "Kopi Kenangan - Mall".to_string(),
            design_type: "Banner".to_string(),
            dimensions: "2x1 meter".to_string(),
            elements: "logo, red background".to_string(),
            reference: None,
        }
    }

    /// designer_name is set iff status is In Progress or Done;
    /// result_file_url is set iff status is Done.
    fn assert_invariant(request: &design_request::Model) {
        let has_designer = request.designer_name.is_some();
        let has_result = request.result_file_url.is_some();
        match request.status {
            RequestStatus::Pending => {
                assert!(!has_designer);
                assert!(!has_result);
            }
            RequestStatus::InProgress => {
                assert!(has_designer);
                assert!(!has_result);
            }
            RequestStatus::Done => {
                assert!(has_designer);
                assert!(has_result);
            }
        }
    }

    #[tokio::test]
    async fn create_requires_descriptive_fields() {
        let db = setup_db().await;
        let mut request = banner_request();
        request.dimensions = "   ".to_string();
        let err = create_request(&db, &alice(), request).await.unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[tokio::test]
    async fn designers_cannot_create_requests() {
        let db = setup_db().await;
        let err = create_request(&db, &bob(), banner_request())
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Forbidden));
    }

    #[tokio::test]
    async fn claim_admits_exactly_one_winner() {
        let db = setup_db().await;
        let created = create_request(&db, &alice(), banner_request())
            .await
            .unwrap();
        assert_invariant(&created);

        let claimed = claim(&db, &bob(), &created.id).await.unwrap();
        assert_eq!(claimed.status, RequestStatus::InProgress);
        assert_eq!(claimed.designer_name.as_deref(), Some("bob"));
        assert_invariant(&claimed);

        // Second claim loses with InvalidState
        let err = claim(&db, &carol(), &created.id).await.unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidState {
                current: RequestStatus::InProgress
            }
        ));

        // Assignment is unchanged
        let current = get_request(&db, &admin(), &created.id).await.unwrap();
        assert_eq!(current.designer_name.as_deref(), Some("bob"));
    }

    #[tokio::test]
    async fn non_designers_cannot_claim() {
        let db = setup_db().await;
        let created = create_request(&db, &alice(), banner_request())
            .await
            .unwrap();
        let err = claim(&db, &alice(), &created.id).await.unwrap_err();
        assert!(matches!(err, EngineError::Forbidden));
        let err = claim(&db, &admin(), &created.id).await.unwrap_err();
        assert!(matches!(err, EngineError::Forbidden));
    }

    #[tokio::test]
    async fn scenario_claim_then_submit() {
        let db = setup_db().await;
        let r1 = create_request(&db, &alice(), banner_request())
            .await
            .unwrap();

        let claimed = claim(&db, &bob(), &r1.id).await.unwrap();
        assert_eq!(claimed.status, RequestStatus::InProgress);
        assert_eq!(claimed.designer_name.as_deref(), Some("bob"));

        // carol is not the assigned designer
        let err = submit_result(
            &db,
            &carol(),
            &r1.id,
            AttachmentRef::ExternalLink("https://x".to_string()),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, EngineError::Forbidden));
        let unchanged = get_request(&db, &admin(), &r1.id).await.unwrap();
        assert_eq!(unchanged.status, RequestStatus::InProgress);

        let done = submit_result(
            &db,
            &bob(),
            &r1.id,
            AttachmentRef::ExternalLink("https://x".to_string()),
        )
        .await
        .unwrap();
        assert_eq!(done.status, RequestStatus::Done);
        assert_eq!(done.result_file_url.as_deref(), Some("https://x"));
        assert_eq!(done.result_file_name.as_deref(), Some(EXTERNAL_LINK_NAME));
        assert_invariant(&done);
    }

    #[tokio::test]
    async fn submit_result_stores_a_decodable_blob() {
        let db = setup_db().await;
        let r1 = create_request(&db, &alice(), banner_request())
            .await
            .unwrap();
        claim(&db, &bob(), &r1.id).await.unwrap();

        let bytes: Vec<u8> = (0..200u8).collect();
        let done = submit_result(
            &db,
            &bob(),
            &r1.id,
            AttachmentRef::UploadedFile {
                file_name: "final.png".to_string(),
                bytes: bytes.clone(),
            },
        )
        .await
        .unwrap();
        assert_eq!(done.result_file_name.as_deref(), Some("final.png"));

        let stored = done.result_file_url.expect("result url must be set");
        assert!(blob::is_blob(&stored));
        let (kind, decoded) = blob::decode(&stored).unwrap();
        assert_eq!(kind, MediaKind::Image);
        assert_eq!(decoded, bytes);
    }

    #[tokio::test]
    async fn oversized_result_upload_leaves_state_untouched() {
        let db = setup_db().await;
        let r1 = create_request(&db, &alice(), banner_request())
            .await
            .unwrap();
        claim(&db, &bob(), &r1.id).await.unwrap();

        let err = submit_result(
            &db,
            &bob(),
            &r1.id,
            AttachmentRef::UploadedFile {
                file_name: "huge.psd".to_string(),
                bytes: vec![0u8; blob::MAX_UPLOAD_BYTES + 1],
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, EngineError::PayloadTooLarge { .. }));

        let current = get_request(&db, &admin(), &r1.id).await.unwrap();
        assert_eq!(current.status, RequestStatus::InProgress);
        assert!(current.result_file_url.is_none());
    }

    #[tokio::test]
    async fn edit_is_limited_to_pending_requests() {
        let db = setup_db().await;
        let r1 = create_request(&db, &alice(), banner_request())
            .await
            .unwrap();

        let update = ContentUpdate {
            dimensions: Some("1080x1080".to_string()),
            ..Default::default()
        };
        let edited = edit_content(&db, &alice(), &r1.id, update.clone())
            .await
            .unwrap();
        assert_eq!(edited.dimensions, "1080x1080");

        claim(&db, &bob(), &r1.id).await.unwrap();
        for editor in [alice(), admin()] {
            let err = edit_content(&db, &editor, &r1.id, update.clone())
                .await
                .unwrap_err();
            assert!(matches!(err, EngineError::InvalidState { .. }));
        }
    }

    #[tokio::test]
    async fn edit_never_touches_lifecycle_fields() {
        let db = setup_db().await;
        let r1 = create_request(&db, &alice(), banner_request())
            .await
            .unwrap();
        let edited = edit_content(
            &db,
            &admin(),
            &r1.id,
            ContentUpdate {
                outlet_name: Some("New Outlet".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(edited.status, RequestStatus::Pending);
        assert!(edited.designer_name.is_none());
        assert!(edited.result_file_url.is_none());
    }

    #[tokio::test]
    async fn foreign_users_cannot_see_or_edit() {
        let db = setup_db().await;
        let r1 = create_request(&db, &alice(), banner_request())
            .await
            .unwrap();

        let mallory = actor("mallory", "Mallory", UserRole::User);
        let err = get_request(&db, &mallory, &r1.id).await.unwrap_err();
        assert!(matches!(err, EngineError::NotFound));
        let err = edit_content(&db, &mallory, &r1.id, ContentUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::NotFound));

        let visible = visible_requests(&db, &mallory).await.unwrap();
        assert!(visible.is_empty());
        let visible = visible_requests(&db, &alice()).await.unwrap();
        assert_eq!(visible.len(), 1);

        // The unscoped listing backing the roster ignores visibility
        let everything = all_requests(&db).await.unwrap();
        assert_eq!(everything.len(), 1);
    }

    #[tokio::test]
    async fn admin_override_has_no_side_effects() {
        let db = setup_db().await;
        let r1 = create_request(&db, &alice(), banner_request())
            .await
            .unwrap();
        claim(&db, &bob(), &r1.id).await.unwrap();
        submit_result(
            &db,
            &bob(),
            &r1.id,
            AttachmentRef::ExternalLink("https://x".to_string()),
        )
        .await
        .unwrap();

        // Push the request back; designer and result survive untouched
        let reverted = admin_override_status(&db, &admin(), &r1.id, RequestStatus::Pending)
            .await
            .unwrap();
        assert_eq!(reverted.status, RequestStatus::Pending);
        assert_eq!(reverted.designer_name.as_deref(), Some("bob"));
        assert_eq!(reverted.result_file_url.as_deref(), Some("https://x"));

        let err = admin_override_status(&db, &bob(), &r1.id, RequestStatus::Done)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Forbidden));
    }

    #[tokio::test]
    async fn delete_is_admin_only() {
        let db = setup_db().await;
        let r1 = create_request(&db, &alice(), banner_request())
            .await
            .unwrap();

        for denied in [alice(), bob()] {
            let err = delete_request(&db, &denied, &r1.id).await.unwrap_err();
            assert!(matches!(err, EngineError::Forbidden));
        }

        delete_request(&db, &admin(), &r1.id).await.unwrap();
        let err = delete_request(&db, &admin(), &r1.id).await.unwrap_err();
        assert!(matches!(err, EngineError::NotFound));
    }

    #[tokio::test]
    async fn display_name_fallback_is_used_for_assignment() {
        let db = setup_db().await;
        let r1 = create_request(&db, &alice(), banner_request())
            .await
            .unwrap();
        let nameless = actor("dana", "", UserRole::Designer);
        let claimed = claim(&db, &nameless, &r1.id).await.unwrap();
        assert_eq!(claimed.designer_name.as_deref(), Some("dana"));
    }
}
