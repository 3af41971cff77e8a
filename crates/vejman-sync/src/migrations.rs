//! Database migrations for the mapping table and the work queue

use sqlx::SqlitePool;

/// Migration SQL
pub const MIGRATION_SQL: &str = r#"
-- VejmanTilladelser: one row per case, folder path and last refresh
CREATE TABLE IF NOT EXISTS VejmanTilladelser (
    ID TEXT PRIMARY KEY,
    CaseNumber TEXT NOT NULL,
    SharePointFolder TEXT NOT NULL,
    LastUpdated TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_tilladelser_last_updated ON VejmanTilladelser(LastUpdated);

-- Queues: work items for downstream processes
CREATE TABLE IF NOT EXISTS Queues (
    id TEXT PRIMARY KEY,
    queue_name TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'New',
    data TEXT,
    reference TEXT,
    created_date TEXT NOT NULL,
    start_date TEXT,
    end_date TEXT,
    message TEXT,
    created_by TEXT
);
CREATE INDEX IF NOT EXISTS idx_queues_name_status ON Queues(queue_name, status);
"#;

/// Run all migrations
pub async fn run_migration(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for statement in MIGRATION_SQL.split(';') {
        let statement = statement.trim();
        if !statement.is_empty() {
            sqlx::query(statement).execute(pool).await?;
        }
    }
    Ok(())
}
