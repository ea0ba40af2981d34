// src/db.rs
use std::time::Duration;

use sqlx::{
    migrate::Migrator,
    postgres::{PgPool, PgPoolOptions},
};
use tracing::info;

use crate::config::Config;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

pub async fn create_pool(config: &Config) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.pg_max_conns)
        .min_connections(config.pg_min_conns)
        .acquire_timeout(Duration::from_secs(5))
        .test_before_acquire(true)
        .connect(&config.database_url)
        .await
}

/// Creates the `voters` table if it is missing. Seeding the roster is left
/// to the operator.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await?;
    info!("Database is up to date");
    Ok(())
}
