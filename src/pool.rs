use diesel::{Connection, PgConnection};
use diesel_async::{AsyncPgConnection, pooled_connection::AsyncDieselConnectionManager};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

use crate::config::Config;
use crate::utils::error::StartupError;
use crate::utils::types::Pool;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations/");

pub async fn get_pool(config: &Config) -> Result<Pool, StartupError> {
    let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(&config.database_url);

    let pool = bb8::Pool::builder()
        .max_size(config.pool_max_size)
        .build(manager)
        .await
        .map_err(|e| StartupError::Pool(e.to_string()))?;

    Ok(pool)
}

/// Applies pending migrations over a blocking connection.
pub async fn run_migrations(database_url: &str) -> Result<(), StartupError> {
    let database_url = database_url.to_owned();

    tokio::task::spawn_blocking(move || {
        let mut conn = PgConnection::establish(&database_url)
            .map_err(|e| StartupError::Migration(e.to_string()))?;

        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| StartupError::Migration(e.to_string()))?;

        for version in applied {
            tracing::info!(%version, "applied migration");
        }

        Ok(())
    })
    .await
    .map_err(|e| StartupError::Migration(e.to_string()))?
}
