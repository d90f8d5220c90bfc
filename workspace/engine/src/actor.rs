use model::entities::design_request;
use model::entities::user::{self, UserRole};

/// The acting user, passed explicitly to every engine operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub username: String,
    pub name: String,
    pub role: UserRole,
}

impl Actor {
    /// The identity recorded as `designer_name` on claim.
    /// Falls back to the username when the display name is unset.
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.username
        } else {
            &self.name
        }
    }

    /// Visibility scope: the User role only sees its own requests,
    /// Admin and Designer see everything.
    pub fn can_see(&self, request: &design_request::Model) -> bool {
        match self.role {
            UserRole::Admin | UserRole::Designer => true,
            UserRole::User => request.requestor_username == self.username,
        }
    }
}

impl From<user::Model> for Actor {
    fn from(model: user::Model) -> Self {
        Self {
            username: model.username,
            name: model.name,
            role: model.role,
        }
    }
}
