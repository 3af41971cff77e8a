//! Remote folder client
//!
//! Reads (resolve, list) hit the backend directly. Mutations are staged in a
//! [`ChangeBatch`] and only reach the backend when the batch is flushed.

pub mod batch;
pub mod sharepoint;

#[cfg(test)]
pub(crate) mod memory;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::SyncResult;

pub use batch::{ChangeBatch, FlushReport, Mutation};
pub use sharepoint::{SharePointCredentials, SharePointSession};

/// Folder as the backend reports it
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RemoteFolder {
    pub name: String,
    pub server_relative_url: String,
}

/// File as the backend reports it
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RemoteFile {
    pub name: String,
    pub server_relative_url: String,
}

/// Immediate children of a folder
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderListing {
    pub files: Vec<RemoteFile>,
    pub folders: Vec<RemoteFolder>,
}

/// Split `a/b/c` into (`a/b`, `c`)
pub fn split_parent(path: &str) -> (&str, &str) {
    let trimmed = path.trim_end_matches('/');
    trimmed.rsplit_once('/').unwrap_or(("", trimmed))
}

/// Document backend addressed by server-relative paths
#[async_trait]
pub trait RemoteFolders: Send + Sync {
    /// Resolve a folder, `RemoteNotFound` if the path does not exist
    async fn resolve_folder(&self, path: &str) -> SyncResult<RemoteFolder>;

    /// Files and subfolders directly under `path`
    async fn list_children(&self, path: &str) -> SyncResult<FolderListing>;

    /// Apply one staged mutation
    async fn execute(&self, mutation: &Mutation) -> SyncResult<()>;

    /// Create the leaf of `path` under its existing parent
    async fn create_folder(&self, path: &str) -> SyncResult<()> {
        tracing::info!("Creating SharePoint folder: {}", path);
        let (parent, leaf) = split_parent(path);
        let parent = self.resolve_folder(parent).await?;

        let mut batch = ChangeBatch::new();
        batch.create_folder(&parent.server_relative_url, leaf);
        batch.flush(self).await.into_result()?;
        Ok(())
    }

    /// Rename the folder at `old_path` in place; its subtree moves with it
    async fn rename_folder(&self, old_path: &str, new_name: &str) -> SyncResult<()> {
        tracing::info!("Renaming SharePoint folder: {} -> {}", old_path, new_name);
        let folder = self.resolve_folder(old_path).await?;

        let mut batch = ChangeBatch::new();
        batch.rename_folder(&folder.server_relative_url, new_name);
        batch.flush(self).await.into_result()?;
        Ok(())
    }

    /// Resolve and list one level
    async fn list_folder(&self, path: &str) -> SyncResult<FolderListing> {
        self.resolve_folder(path).await?;
        self.list_children(path).await
    }

    /// Delete a single, already emptied folder
    async fn delete_folder(&self, path: &str) -> SyncResult<()> {
        let folder = self.resolve_folder(path).await?;

        let mut batch = ChangeBatch::new();
        batch.delete_folder(&folder.server_relative_url);
        batch.flush(self).await.into_result()?;
        Ok(())
    }
}
