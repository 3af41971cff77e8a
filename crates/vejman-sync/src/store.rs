//! Mapping table access
//!
//! Every statement runs on its own and commits immediately, so an aborted run
//! keeps whatever rows it already wrote.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::error::SyncResult;
use crate::models::FolderMapping;

/// Store for `VejmanTilladelser` rows
#[derive(Clone)]
pub struct MappingStore {
    pool: SqlitePool,
}

impl MappingStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Row for a case, if one exists
    pub async fn find(&self, case_id: &str) -> SyncResult<Option<FolderMapping>> {
        let row = sqlx::query_as::<_, FolderMapping>(
            r#"
            SELECT ID, CaseNumber, SharePointFolder, LastUpdated
            FROM VejmanTilladelser
            WHERE ID = ?
            "#,
        )
        .bind(case_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn insert(&self, mapping: &FolderMapping) -> SyncResult<()> {
        sqlx::query(
            r#"
            INSERT INTO VejmanTilladelser (ID, CaseNumber, SharePointFolder, LastUpdated)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&mapping.case_id)
        .bind(&mapping.case_number)
        .bind(&mapping.sharepoint_folder)
        .bind(mapping.last_updated)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Refresh `LastUpdated` only
    pub async fn touch(&self, case_id: &str, now: DateTime<Utc>) -> SyncResult<()> {
        sqlx::query("UPDATE VejmanTilladelser SET LastUpdated = ? WHERE ID = ?")
            .bind(now)
            .bind(case_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Point a row at a new folder and refresh `LastUpdated`
    pub async fn update_folder(
        &self,
        case_id: &str,
        sharepoint_folder: &str,
        now: DateTime<Utc>,
    ) -> SyncResult<()> {
        sqlx::query(
            r#"
            UPDATE VejmanTilladelser
            SET SharePointFolder = ?, LastUpdated = ?
            WHERE ID = ?
            "#,
        )
        .bind(sharepoint_folder)
        .bind(now)
        .bind(case_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Rows last refreshed strictly before `cutoff`
    pub async fn stale_before(&self, cutoff: DateTime<Utc>) -> SyncResult<Vec<FolderMapping>> {
        let rows = sqlx::query_as::<_, FolderMapping>(
            r#"
            SELECT ID, CaseNumber, SharePointFolder, LastUpdated
            FROM VejmanTilladelser
            WHERE LastUpdated < ?
            ORDER BY LastUpdated
            "#,
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn delete(&self, case_id: &str) -> SyncResult<()> {
        sqlx::query("DELETE FROM VejmanTilladelser WHERE ID = ?")
            .bind(case_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn count(&self) -> SyncResult<usize> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM VejmanTilladelser")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as usize)
    }
}
