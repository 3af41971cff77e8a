//! Staged remote mutations
//!
//! A batch accumulates mutations and applies them in order on `flush`. The
//! backend offers no transaction across a flush: mutations before a failure
//! stay applied, the failing one and everything after it do not run.

use std::fmt;

use super::RemoteFolders;
use crate::error::{SyncError, SyncResult};

/// One change against the document backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    CreateFolder { parent: String, name: String },
    RenameFolder { path: String, new_name: String },
    DeleteFolder { path: String },
    DeleteFile { path: String },
}

impl Mutation {
    pub fn kind(&self) -> &'static str {
        match self {
            Mutation::CreateFolder { .. } => "create",
            Mutation::RenameFolder { .. } => "rename",
            Mutation::DeleteFolder { .. } => "delete folder",
            Mutation::DeleteFile { .. } => "delete file",
        }
    }

    /// Path the mutation acts on
    pub fn target(&self) -> String {
        match self {
            Mutation::CreateFolder { parent, name } if parent.is_empty() => name.clone(),
            Mutation::CreateFolder { parent, name } => {
                format!("{}/{}", parent.trim_end_matches('/'), name)
            }
            Mutation::RenameFolder { path, .. }
            | Mutation::DeleteFolder { path }
            | Mutation::DeleteFile { path } => path.clone(),
        }
    }
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mutation::RenameFolder { path, new_name } => {
                write!(f, "rename {} -> {}", path, new_name)
            }
            other => write!(f, "{} {}", other.kind(), other.target()),
        }
    }
}

/// Outcome of a flush
#[derive(Debug)]
pub struct FlushReport {
    /// Applied, in order
    pub committed: Vec<Mutation>,
    /// The mutation that failed and its error
    pub failure: Option<(Mutation, SyncError)>,
    /// Never attempted because an earlier mutation failed
    pub skipped: Vec<Mutation>,
}

impl FlushReport {
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }

    /// Committed mutations, or the error of the failing one
    pub fn into_result(self) -> SyncResult<Vec<Mutation>> {
        match self.failure {
            None => Ok(self.committed),
            Some((_, err)) => Err(err),
        }
    }
}

/// Mutations waiting for a flush
#[derive(Debug, Default)]
pub struct ChangeBatch {
    pending: Vec<Mutation>,
}

impl ChangeBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn push(&mut self, mutation: Mutation) -> &mut Self {
        self.pending.push(mutation);
        self
    }

    pub fn create_folder(&mut self, parent: &str, name: &str) -> &mut Self {
        self.push(Mutation::CreateFolder {
            parent: parent.to_string(),
            name: name.to_string(),
        })
    }

    pub fn rename_folder(&mut self, path: &str, new_name: &str) -> &mut Self {
        self.push(Mutation::RenameFolder {
            path: path.to_string(),
            new_name: new_name.to_string(),
        })
    }

    pub fn delete_folder(&mut self, path: &str) -> &mut Self {
        self.push(Mutation::DeleteFolder {
            path: path.to_string(),
        })
    }

    pub fn delete_file(&mut self, path: &str) -> &mut Self {
        self.push(Mutation::DeleteFile {
            path: path.to_string(),
        })
    }

    /// Apply staged mutations in order, stopping at the first failure
    pub async fn flush<R>(self, remote: &R) -> FlushReport
    where
        R: RemoteFolders + ?Sized,
    {
        let mut committed = Vec::with_capacity(self.pending.len());
        let mut pending = self.pending.into_iter();

        while let Some(mutation) = pending.next() {
            match remote.execute(&mutation).await {
                Ok(()) => committed.push(mutation),
                Err(err) => {
                    tracing::debug!(
                        committed = committed.len(),
                        error = %err,
                        "Flush stopped at {}",
                        mutation
                    );
                    return FlushReport {
                        committed,
                        failure: Some((mutation, err)),
                        skipped: pending.collect(),
                    };
                }
            }
        }

        FlushReport {
            committed,
            failure: None,
            skipped: Vec::new(),
        }
    }
}
