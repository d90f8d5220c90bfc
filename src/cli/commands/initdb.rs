use anyhow::Result;
use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};
use tracing::{debug, error, info, trace, warn};

pub async fn init_database(database_url: &str) -> Result<()> {
    trace!("Entering init_database function");
    info!("Initializing database");
    debug!("Database URL: {}", database_url);

    trace!("Attempting to connect to database");
    let db: DatabaseConnection = match Database::connect(database_url).await {
        Ok(connection) => {
            info!("Successfully connected to database");
            connection
        }
        Err(e) => {
            error!("Failed to connect to database '{}': {}", database_url, e);
            return Err(e.into());
        }
    };

    info!("Running database migrations");
    match Migrator::up(&db, None).await {
        Ok(_) => {
            info!("Database migrations completed successfully");
        }
        Err(e) => {
            error!("Failed to run database migrations: {}", e);
            return Err(e.into());
        }
    }

    // Seed the bootstrap admin so a fresh deployment can log in
    let admin_password =
        std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "12345".to_string());
    if admin_password == "12345" {
        warn!("ADMIN_PASSWORD not set; seeding the admin account with the default password");
    }
    match engine::users::ensure_seed_admin(&db, &admin_password).await {
        Ok(true) => info!(
            "Seed admin account '{}' created",
            engine::users::SEED_ADMIN_USERNAME
        ),
        Ok(false) => debug!("Seed admin account already exists, nothing to do"),
        Err(e) => {
            error!("Failed to seed the admin account: {}", e);
            return Err(e.into());
        }
    }

    info!("Database initialization completed successfully!");
    trace!("init_database function completed");

    Ok(())
}
