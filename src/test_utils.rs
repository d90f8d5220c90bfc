#[cfg(test)]
pub mod test_utils {
    use crate::router::create_router;
    use crate::schemas::AppState;
    use axum::Router;
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use migration::{Migrator, MigratorTrait};
    use model::entities::user::UserRole;
    use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};
    use tracing::Level;
    use tracing_subscriber::FmtSubscriber;

    /// Create an in-memory SQLite database for testing
    pub async fn setup_test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to connect to in-memory database");

        // Run migrations
        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        db
    }

    async fn insert_user(
        db: &DatabaseConnection,
        username: &str,
        password: &str,
        role: UserRole,
        name: &str,
    ) {
        let account = model::entities::user::ActiveModel {
            username: Set(username.to_string()),
            password_hash: Set(engine::users::hash_password(password)
                .expect("Failed to hash test password")),
            role: Set(role),
            name: Set(name.to_string()),
        };
        account
            .insert(db)
            .await
            .unwrap_or_else(|e| panic!("Failed to create test user {username}: {e}"));
    }

    /// Create AppState for testing, with a fixed cast of accounts:
    /// admin (Admin), alice (User), bob and carol (Designers).
    pub async fn setup_test_app_state() -> AppState {
        let db = setup_test_db().await;

        engine::users::ensure_seed_admin(&db, "12345")
            .await
            .expect("Failed to seed admin");
        insert_user(&db, "alice", "alicepw", UserRole::User, "Alice").await;
        insert_user(&db, "bob", "bobpw", UserRole::Designer, "bob").await;
        insert_user(&db, "carol", "carolpw", UserRole::Designer, "carol").await;

        AppState { db }
    }

    /// Initialize tracing for tests with output to STDERR.
    ///
    /// The log level is determined by the RUST_LOG environment variable,
    /// defaulting to WARN if not set.
    fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
        let log_level = std::env::var("RUST_LOG")
            .ok()
            .and_then(|level| match level.to_uppercase().as_str() {
                "ERROR" => Some(Level::ERROR),
                "WARN" => Some(Level::WARN),
                "INFO" => Some(Level::INFO),
                "DEBUG" => Some(Level::DEBUG),
                "TRACE" => Some(Level::TRACE),
                _ => None,
            })
            .unwrap_or(Level::WARN);

        let subscriber = FmtSubscriber::builder()
            .with_max_level(log_level)
            .with_writer(std::io::stderr) // Output to stderr, which is captured by tests
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    /// Create axum app for testing
    pub async fn setup_test_app() -> Router {
        // Initialize tracing for tests
        let _ = init_test_tracing();

        let state = setup_test_app_state().await;
        let router = create_router(state);
        router
    }

    /// HTTP Basic Authorization header value for the given credentials
    pub fn basic_auth(username: &str, password: &str) -> String {
        format!("Basic {}", STANDARD.encode(format!("{username}:{password}")))
    }
}
