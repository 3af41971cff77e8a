use anyhow::Result;

use vejman_sync::services::StalenessSweeper;
use vejman_sync::store::MappingStore;
use vejman_sync::{db, Config};

pub async fn run(config: &Config) -> Result<()> {
    let pool = db::connect(&config.database_url).await?;
    let store = MappingStore::new(pool.clone());
    let session = super::connect_sharepoint(config).await?;

    StalenessSweeper::new(&session, &store)
        .with_retention_days(config.retention_days)
        .sweep()
        .await?;

    db::close(pool).await;
    Ok(())
}
