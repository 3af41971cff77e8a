//! Sync services built on the remote client, mapping store and work queue

pub mod deleter;
pub mod reconciler;
pub mod retry;
pub mod sweeper;

pub use deleter::{DeleteSummary, TreeDeleter};
pub use reconciler::{decide, expected_path, CaseReconciler, FolderAction, ReconcileSummary};
pub use retry::{retry_with_fresh_session, DEFAULT_MAX_ATTEMPTS};
pub use sweeper::{StalenessSweeper, SweepSummary, DEFAULT_RETENTION_DAYS};
