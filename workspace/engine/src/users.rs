//! Account management and credential verification.
//!
//! Passwords are hashed with Argon2id before storage; verification goes
//! through the parsed hash, so comparison is constant-time and the
//! plaintext is never persisted or logged.

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use model::entities::user::{self, UserRole};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};
use tracing::{debug, info, warn};

use crate::actor::Actor;
use crate::error::{EngineError, Result};

/// Username of the seed administrator account.
pub const SEED_ADMIN_USERNAME: &str = "admin";
const SEED_ADMIN_NAME: &str = "Super Admin";

/// A new account as submitted by an admin.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub role: UserRole,
    pub name: String,
}

/// Hash a plaintext password with Argon2id and a fresh random salt.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| EngineError::Runtime(format!("failed to hash password: {e}")))
}

fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            warn!("Stored password hash failed to parse: {}", e);
            false
        }
    }
}

/// Look up a user by username and verify the password against the stored
/// hash. Returns `None` for both unknown usernames and wrong passwords,
/// so callers cannot distinguish the two.
pub async fn authenticate(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
) -> Result<Option<user::Model>> {
    let Some(found) = user::Entity::find_by_id(username).one(db).await? else {
        debug!("Login attempt for unknown username '{}'", username);
        return Ok(None);
    };
    if verify_password(password, &found.password_hash) {
        Ok(Some(found))
    } else {
        debug!("Login attempt with wrong password for '{}'", username);
        Ok(None)
    }
}

/// Create an account. Admin only.
pub async fn create_user(
    db: &DatabaseConnection,
    actor: &Actor,
    new_user: NewUser,
) -> Result<user::Model> {
    if actor.role != UserRole::Admin {
        return Err(EngineError::Forbidden);
    }
    for (field, value) in [
        ("username", &new_user.username),
        ("password", &new_user.password),
        ("name", &new_user.name),
    ] {
        if value.trim().is_empty() {
            return Err(EngineError::Validation(format!("{field} is required")));
        }
    }
    if user::Entity::find_by_id(&new_user.username)
        .one(db)
        .await?
        .is_some()
    {
        return Err(EngineError::Validation(format!(
            "username '{}' is already taken",
            new_user.username
        )));
    }

    let account = user::ActiveModel {
        username: Set(new_user.username),
        password_hash: Set(hash_password(&new_user.password)?),
        role: Set(new_user.role),
        name: Set(new_user.name),
    };
    let inserted = account.insert(db).await?;
    info!(
        "User '{}' ({:?}) created by admin '{}'",
        inserted.username, inserted.role, actor.username
    );
    Ok(inserted)
}

/// Delete an account. Admin only; admins cannot delete themselves.
pub async fn delete_user(db: &DatabaseConnection, actor: &Actor, username: &str) -> Result<()> {
    if actor.role != UserRole::Admin {
        return Err(EngineError::Forbidden);
    }
    if actor.username == username {
        return Err(EngineError::Forbidden);
    }
    let result = user::Entity::delete_by_id(username).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(EngineError::NotFound);
    }
    info!("User '{}' deleted by admin '{}'", username, actor.username);
    Ok(())
}

/// All accounts ordered by display name. Admin only.
pub async fn list_users(db: &DatabaseConnection, actor: &Actor) -> Result<Vec<user::Model>> {
    if actor.role != UserRole::Admin {
        return Err(EngineError::Forbidden);
    }
    Ok(user::Entity::find()
        .order_by_asc(user::Column::Name)
        .all(db)
        .await?)
}

/// Idempotently ensure the seed admin account exists.
/// Returns whether the account was inserted by this call.
pub async fn ensure_seed_admin(db: &DatabaseConnection, password: &str) -> Result<bool> {
    if user::Entity::find_by_id(SEED_ADMIN_USERNAME)
        .one(db)
        .await?
        .is_some()
    {
        return Ok(false);
    }
    let admin = user::ActiveModel {
        username: Set(SEED_ADMIN_USERNAME.to_string()),
        password_hash: Set(hash_password(password)?),
        role: Set(UserRole::Admin),
        name: Set(SEED_ADMIN_NAME.to_string()),
    };
    admin.insert(db).await?;
    info!("Seed admin account created");
    Ok(true)
}
