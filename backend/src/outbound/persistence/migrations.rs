//! Embedded schema migrations applied at startup.

use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

use super::pool::PoolError;

/// Migrations compiled from `backend/migrations`.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Apply pending migrations over a short-lived synchronous connection.
///
/// Runs on a blocking thread so the async runtime stays responsive.
///
/// # Errors
///
/// Returns [`PoolError::Build`] when the database is unreachable or a
/// migration fails.
pub async fn run_migrations(database_url: &str) -> Result<(), PoolError> {
    let url = database_url.to_owned();
    tokio::task::spawn_blocking(move || {
        let mut conn =
            PgConnection::establish(&url).map_err(|err| PoolError::build(err.to_string()))?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|err| PoolError::build(format!("migration failed: {err}")))?;
        info!(count = applied.len(), "applied database migrations");
        Ok(())
    })
    .await
    .map_err(|err| PoolError::build(format!("migration task failed: {err}")))?
}
