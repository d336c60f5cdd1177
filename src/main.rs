use anyhow::Context;
use dotenvy::dotenv;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use film_katalog::config::AppConfig;
use film_katalog::database::{create_database_connection, run_migrations};
use film_katalog::state::AppState;
use film_katalog::storage::CoverStorage;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment dari .env file
    dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "film_katalog=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    let pool = create_database_connection(&config)
        .await
        .context("Gagal menghubungkan ke database PostgreSQL")?;

    run_migrations(&pool)
        .await
        .context("Failed to run migrations")?;

    let covers = CoverStorage::from_config(&config);
    tokio::fs::create_dir_all(covers.images_dir())
        .await
        .with_context(|| format!("Cannot create {}", covers.images_dir().display()))?;
    tokio::fs::create_dir_all(covers.disk_root())
        .await
        .with_context(|| format!("Cannot create {}", covers.disk_root().display()))?;

    let app = film_katalog::app(AppState::new(pool, covers), config.max_body_bytes);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Cannot bind {addr}"))?;

    tracing::info!("Server running at http://{addr}");

    axum::serve(listener, app).await?;
    Ok(())
}
