use anyhow::Context;
use cinemaspot_store::{app_config::Config, seed::seed, DbClient};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Loads reference data (categories, rooms with seats, admin account).
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "seed=info,cinemaspot_store=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    let db = DbClient::new(&config.database)
        .await
        .context("Failed to connect to Postgres")?;
    db.migrate().await.context("Failed to run migrations")?;

    seed(&db.pool, &config.seed).await?;
    tracing::info!("Seeding complete");
    Ok(())
}
