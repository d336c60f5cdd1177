use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::config::AppConfig;

pub type Database = PgPool;

pub async fn create_database_connection(config: &AppConfig) -> Result<Database, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&config.database_url)
        .await?;

    tracing::info!(max_connections = config.max_connections, "Database connected");
    Ok(pool)
}

pub async fn run_migrations(pool: &Database) -> Result<(), sqlx::Error> {
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("Migrations executed successfully");
    Ok(())
}
