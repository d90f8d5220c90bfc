//! This file serves as the root for all SeaORM entity modules.
//! The data models for the design-request workflow tracker live here:
//! tracked requests and the user accounts that act on them.

pub mod design_request;
pub mod user;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::design_request::Entity as DesignRequest;
    pub use super::user::Entity as User;
}
