//! Work queue for the downstream performer

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::SyncResult;
use crate::models::QueueElement;

/// Named queue backed by the `Queues` table
#[derive(Clone)]
pub struct WorkQueue {
    pool: SqlitePool,
    queue_name: String,
    created_by: String,
}

impl WorkQueue {
    pub fn new(
        pool: SqlitePool,
        queue_name: impl Into<String>,
        created_by: impl Into<String>,
    ) -> Self {
        Self {
            pool,
            queue_name: queue_name.into(),
            created_by: created_by.into(),
        }
    }

    /// Add an element in status `New`, referenced by its case number
    pub async fn enqueue(&self, element: &QueueElement) -> SyncResult<Uuid> {
        let id = Uuid::new_v4();
        let payload = element.payload()?;

        sqlx::query(
            r#"
            INSERT INTO Queues (id, queue_name, status, data, reference, created_date, created_by)
            VALUES (?, ?, 'New', ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(&self.queue_name)
        .bind(&payload)
        .bind(element.reference())
        .bind(Utc::now())
        .bind(&self.created_by)
        .execute(&self.pool)
        .await?;

        tracing::debug!(
            queue = %self.queue_name,
            reference = element.reference(),
            "Queue element created"
        );
        Ok(id)
    }

    /// Number of elements still waiting in this queue
    pub async fn pending_count(&self) -> SyncResult<usize> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM Queues WHERE queue_name = ? AND status = 'New'",
        )
        .bind(&self.queue_name)
        .fetch_one(&self.pool)
        .await?;
        Ok(count as usize)
    }
}
