//! Case reconciliation
//!
//! For every open case the reconciler makes sure exactly one folder exists at
//! the expected path, keeps the mapping row in step with it and hands the case
//! to the performer queue.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::error::{SyncError, SyncResult};
use crate::models::{Case, FolderMapping, QueueElement};
use crate::queue::WorkQueue;
use crate::remote::{split_parent, RemoteFolders};
use crate::sanitize::case_folder_name;
use crate::store::MappingStore;

/// What a case needs done to its folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FolderAction {
    /// No mapping yet
    Create,
    /// Mapped, but the stored path no longer matches
    Rename { from: String },
    /// Mapped at the expected path
    Refresh,
}

/// Decide the folder action from the stored mapping
pub fn decide(existing: Option<&FolderMapping>, expected_path: &str) -> FolderAction {
    match existing {
        None => FolderAction::Create,
        Some(row) if row.sharepoint_folder == expected_path => FolderAction::Refresh,
        Some(row) => FolderAction::Rename {
            from: row.sharepoint_folder.clone(),
        },
    }
}

/// `{top}/{sanitized leaf}` for a case
pub fn expected_path(top_folder: &str, case: &Case) -> String {
    let leaf = case_folder_name(case.street_name.as_deref(), &case.case_number);
    format!("{}/{}", top_folder.trim_end_matches('/'), leaf)
}

/// Counts from one reconciliation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub created: usize,
    /// Folder already existed without a mapping row
    pub adopted: usize,
    pub renamed: usize,
    pub refreshed: usize,
    pub enqueued: usize,
}

impl ReconcileSummary {
    pub fn processed(&self) -> usize {
        self.created + self.adopted + self.renamed + self.refreshed
    }
}

pub struct CaseReconciler<'a, R: RemoteFolders + ?Sized> {
    remote: &'a R,
    store: &'a MappingStore,
    queue: &'a WorkQueue,
    top_folder: String,
}

impl<'a, R: RemoteFolders + ?Sized> CaseReconciler<'a, R> {
    pub fn new(
        remote: &'a R,
        store: &'a MappingStore,
        queue: &'a WorkQueue,
        top_folder: impl Into<String>,
    ) -> Self {
        Self {
            remote,
            store,
            queue,
            top_folder: top_folder.into(),
        }
    }

    /// Create the folder unless it is already there; `true` when created
    ///
    /// A run that died between the remote create and the row insert leaves a
    /// folder without a row. The next run takes that folder over.
    async fn ensure_folder(&self, path: &str) -> SyncResult<bool> {
        match self.remote.resolve_folder(path).await {
            Ok(_) => {
                info!("SharePoint folder already exists, adopting: {}", path);
                Ok(false)
            }
            Err(SyncError::RemoteNotFound { .. }) => {
                self.remote.create_folder(path).await?;
                Ok(true)
            }
            Err(err) => Err(err),
        }
    }

    pub async fn reconcile(&self, cases: &[Case]) -> SyncResult<ReconcileSummary> {
        self.reconcile_at(cases, Utc::now()).await
    }

    /// Process cases in order; the first failing case aborts the pass
    pub async fn reconcile_at(
        &self,
        cases: &[Case],
        now: DateTime<Utc>,
    ) -> SyncResult<ReconcileSummary> {
        let mut summary = ReconcileSummary::default();

        for case in cases {
            let path = expected_path(&self.top_folder, case);
            let existing = self.store.find(case.case_id.as_str()).await?;

            match decide(existing.as_ref(), &path) {
                FolderAction::Create => {
                    if self.ensure_folder(&path).await? {
                        summary.created += 1;
                    } else {
                        summary.adopted += 1;
                    }
                    self.store
                        .insert(&FolderMapping {
                            case_id: case.case_id.to_string(),
                            case_number: case.case_number.clone(),
                            sharepoint_folder: path.clone(),
                            last_updated: now,
                        })
                        .await?;
                }
                FolderAction::Rename { from } => {
                    let (_, new_leaf) = split_parent(&path);
                    if split_parent(&from).0 != split_parent(&path).0 {
                        warn!(
                            case_id = %case.case_id,
                            "Stored folder {} is outside {}, renaming in place",
                            from,
                            self.top_folder
                        );
                    }
                    self.remote.rename_folder(&from, new_leaf).await?;
                    self.store
                        .update_folder(case.case_id.as_str(), &path, now)
                        .await?;
                    summary.renamed += 1;
                }
                FolderAction::Refresh => {
                    self.store.touch(case.case_id.as_str(), now).await?;
                    summary.refreshed += 1;
                }
            }

            self.queue
                .enqueue(&QueueElement {
                    case_id: case.case_id.clone(),
                    case_number: case.case_number.clone(),
                    sharepoint_folder: path,
                })
                .await?;
            summary.enqueued += 1;
        }

        info!("Processed {} cases", summary.processed());
        Ok(summary)
    }
}
