use anyhow::Result;
use tracing::info;

use vejman_sync::queue::WorkQueue;
use vejman_sync::services::{CaseReconciler, StalenessSweeper};
use vejman_sync::store::MappingStore;
use vejman_sync::vejman::{CaseWindow, VejmanClient};
use vejman_sync::{db, Config};

/// Full dispatcher pass: fetch, reconcile, enqueue, sweep
pub async fn run(config: &Config) -> Result<()> {
    let pool = db::connect(&config.database_url).await?;
    let store = MappingStore::new(pool.clone());
    let queue = WorkQueue::new(pool.clone(), &config.queue_name, &config.process_name);

    let vejman = VejmanClient::new(&config.vejman_api_url, config.vejman_token()?);
    let today = chrono::Local::now().date_naive();
    let window = CaseWindow::starting(today, config.case_lookahead_days);
    let cases = vejman.fetch_cases(window).await?;

    let session = super::connect_sharepoint(config).await?;

    let reconciled = CaseReconciler::new(&session, &store, &queue, &config.sharepoint_top_folder)
        .reconcile(&cases)
        .await?;

    let swept = StalenessSweeper::new(&session, &store)
        .with_retention_days(config.retention_days)
        .sweep()
        .await?;

    info!(
        created = reconciled.created,
        adopted = reconciled.adopted,
        renamed = reconciled.renamed,
        refreshed = reconciled.refreshed,
        enqueued = reconciled.enqueued,
        swept = swept.folders_removed,
        "Dispatch finished"
    );

    db::close(pool).await;
    Ok(())
}
