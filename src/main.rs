//! card-tracker server binary

use anyhow::Result;
use card_tracker::config::{AppConfig, ServerSettings};
use card_tracker::server::ServerBuilder;
use card_tracker::storage::{SqliteStore, load_sample_data};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = ServerSettings::from_env()?;

    let config = AppConfig::load(&settings.config_path)?;
    config.validate()?;
    tracing::info!(path = %settings.config_path.display(), "configuration loaded");
    if config.webhook_configured() {
        tracing::info!("Discord webhook configured");
    } else {
        tracing::info!("Discord webhook not configured (notifications disabled)");
    }

    let store = SqliteStore::open(&settings.database_path).await?;
    if settings.load_sample_data {
        load_sample_data(store.pool()).await?;
    }

    let addr = format!("0.0.0.0:{}", settings.port);
    ServerBuilder::new()
        .with_store(store)
        .with_event_bus(1024)
        .with_config_path(settings.config_path.clone())
        .with_static_dir(settings.static_dir.clone())
        .serve(&addr)
        .await
}
