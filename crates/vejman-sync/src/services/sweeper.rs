//! Removal of folders whose cases have gone quiet

use chrono::{DateTime, Duration, Utc};
use tracing::info;

use super::deleter::TreeDeleter;
use crate::error::SyncResult;
use crate::remote::RemoteFolders;
use crate::store::MappingStore;

/// Default retention window
pub const DEFAULT_RETENTION_DAYS: u32 = 30;

/// Counts from one sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepSummary {
    pub folders_removed: usize,
    pub files_deleted: usize,
}

pub struct StalenessSweeper<'a, R: RemoteFolders + ?Sized> {
    remote: &'a R,
    store: &'a MappingStore,
    retention: Duration,
}

impl<'a, R: RemoteFolders + ?Sized> StalenessSweeper<'a, R> {
    pub fn new(remote: &'a R, store: &'a MappingStore) -> Self {
        Self {
            remote,
            store,
            retention: Duration::days(i64::from(DEFAULT_RETENTION_DAYS)),
        }
    }

    pub fn with_retention_days(mut self, days: u32) -> Self {
        self.retention = Duration::days(i64::from(days));
        self
    }

    pub async fn sweep(&self) -> SyncResult<SweepSummary> {
        self.sweep_at(Utc::now()).await
    }

    /// Delete the folder tree and then the row of every mapping older than the window
    ///
    /// Rows are handled one at a time and each delete commits on its own, so a
    /// failure leaves processed rows gone on both sides and the rest untouched.
    pub async fn sweep_at(&self, now: DateTime<Utc>) -> SyncResult<SweepSummary> {
        let cutoff = now - self.retention;
        let stale = self.store.stale_before(cutoff).await?;
        tracing::debug!(cutoff = %cutoff, stale = stale.len(), "Sweeping old folders");

        let deleter = TreeDeleter::new(self.remote);
        let mut summary = SweepSummary::default();

        for mapping in stale {
            let deleted = deleter.delete_tree(&mapping.sharepoint_folder, false).await?;
            self.store.delete(&mapping.case_id).await?;
            summary.folders_removed += 1;
            summary.files_deleted += deleted.files_deleted;
        }

        info!("Deleted {} old folders", summary.folders_removed);
        Ok(summary)
    }
}
