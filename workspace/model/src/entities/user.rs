use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Role of an account; drives every authorization decision in the engine.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum UserRole {
    #[sea_orm(string_value = "Admin")]
    Admin,
    #[sea_orm(string_value = "Designer")]
    Designer,
    #[sea_orm(string_value = "User")]
    User,
}

/// Represents an account of the system.
///
/// Passwords are stored as Argon2id hashes; the plaintext never touches
/// the table.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub username: String,
    pub password_hash: String,
    pub role: UserRole,
    /// Display name; doubles as the designer-assignment identity.
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// A user can have submitted multiple requests.
    #[sea_orm(has_many = "super::design_request::Entity")]
    DesignRequest,
}

impl Related<super::design_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DesignRequest.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
