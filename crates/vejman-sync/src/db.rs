//! SQLite connection bootstrap

use crate::error::SyncResult;
use crate::migrations;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

/// Open the database, creating parent directories for file URLs, and migrate
///
/// The pool holds a single connection; the run is strictly sequential.
pub async fn connect(database_url: &str) -> SyncResult<SqlitePool> {
    tracing::info!("Connecting to database: {}", database_url);

    if let Some(parent) = sqlite_file_path(database_url)
        .as_deref()
        .and_then(|p| std::path::Path::new(p).parent())
    {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| {
                crate::SyncError::Database(format!(
                    "Failed to create database directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(database_url)
        .await?;

    migrations::run_migration(&pool).await?;
    tracing::info!("Database migrations completed");
    Ok(pool)
}

/// Close the pool at the end of a run
pub async fn close(pool: SqlitePool) {
    pool.close().await;
    tracing::debug!("Database connection closed");
}

/// File path of a `sqlite:` URL, `None` for in-memory databases
fn sqlite_file_path(database_url: &str) -> Option<String> {
    let path = database_url.strip_prefix("sqlite:")?;
    let path = path.trim_start_matches("//");
    // Remove query string for path extraction
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() || path == ":memory:" {
        return None;
    }
    Some(path.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlite_file_path() {
        assert_eq!(
            sqlite_file_path("sqlite://data/vejman.db?mode=rwc").as_deref(),
            Some("data/vejman.db")
        );
        assert_eq!(sqlite_file_path("sqlite::memory:"), None);
        assert_eq!(sqlite_file_path("postgres://x"), None);
    }

    #[tokio::test]
    async fn test_connect_creates_directory_and_schema() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("nested").join("vejman.db");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());

        let pool = connect(&url).await.unwrap();
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM VejmanTilladelser")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
        close(pool).await;
        assert!(db_path.exists());
    }
}
