//! Session table migration.
//!
//! Business tables belong to the hosted backend; the only schema this
//! project owns is the tower-sessions table shared by both web binaries.
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `PostgreSQL` connection string

use aurelia_backend::config::{ConfigError, env};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use thiserror::Error;
use tower_sessions_sqlx_store::PostgresStore;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Create the session schema and table if they do not exist.
///
/// # Errors
///
/// Returns an error if `DATABASE_URL` is unset or the database rejects the
/// migration.
pub async fn sessions() -> Result<(), MigrationError> {
    let database_url = env::database_url("DATABASE_URL")?;

    tracing::info!("Connecting to session database...");
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    tracing::info!("Creating session table...");
    PostgresStore::new(pool).migrate().await?;

    tracing::info!("Session table ready");
    Ok(())
}
