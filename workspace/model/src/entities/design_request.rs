use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Where a tracked request currently sits in its lifecycle.
///
/// The stored strings are the wire values clients see, which is why
/// `InProgress` carries a space.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum RequestStatus {
    #[sea_orm(string_value = "Pending")]
    Pending,
    #[sea_orm(string_value = "In Progress")]
    #[serde(rename = "In Progress")]
    InProgress,
    #[sea_orm(string_value = "Done")]
    Done,
}

/// A unit of design work tracked through Pending -> In Progress -> Done.
///
/// `designer_name` is set exactly when the status is In Progress or Done,
/// and `result_file_url` exactly when the status is Done. The admin status
/// override is the one deliberate exception to that invariant.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "design_requests")]
pub struct Model {
    /// Opaque identifier, generated at creation, immutable.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub outlet_name: String,
    pub design_type: String,
    pub dimensions: String,
    pub elements: String,
    /// External link or self-describing blob string; empty when the
    /// requester attached nothing.
    #[sea_orm(column_type = "Text")]
    pub reference_url: String,
    pub status: RequestStatus,
    /// Identity of the claiming designer; unset until claimed.
    pub designer_name: Option<String>,
    pub result_file_name: Option<String>,
    /// The delivered asset, as external link or blob string.
    #[sea_orm(column_type = "Text", nullable)]
    pub result_file_url: Option<String>,
    /// Creation timestamp; listing order is newest-created first.
    pub created_at: DateTimeUtc,
    /// Identity of the creating user; scopes visibility for the User role.
    pub requestor_username: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// A request belongs to the user who submitted it.
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::RequestorUsername",
        to = "super::user::Column::Username"
    )]
    Requestor,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Requestor.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
