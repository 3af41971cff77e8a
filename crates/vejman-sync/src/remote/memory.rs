//! In-memory backend for tests
//!
//! Behaves like the document library for the operations this crate uses and
//! refuses to delete non-empty folders.

use std::collections::{BTreeSet, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{split_parent, FolderListing, Mutation, RemoteFile, RemoteFolder, RemoteFolders};
use crate::error::{SyncError, SyncResult};

#[derive(Default)]
struct Tree {
    folders: BTreeSet<String>,
    files: BTreeSet<String>,
}

#[derive(Default)]
pub(crate) struct MemoryFolders {
    tree: Mutex<Tree>,
    log: Mutex<Vec<String>>,
    failing: Mutex<HashSet<String>>,
}

fn child_of(path: &str, parent: &str) -> bool {
    split_parent(path).0 == parent
}

fn under(path: &str, root: &str) -> bool {
    path.strip_prefix(root)
        .is_some_and(|rest| rest.starts_with('/'))
}

impl MemoryFolders {
    pub(crate) fn with_folders(folders: &[&str]) -> Self {
        let remote = Self::default();
        {
            let mut tree = remote.tree.lock().unwrap();
            tree.folders.extend(folders.iter().map(|f| f.to_string()));
        }
        remote
    }

    pub(crate) fn add_file(&self, path: &str) {
        self.tree.lock().unwrap().files.insert(path.to_string());
    }

    /// Make every execution of this mutation (by its display form) fail
    pub(crate) fn fail_on(&self, mutation: &str) {
        self.failing.lock().unwrap().insert(mutation.to_string());
    }

    pub(crate) fn clear_failures(&self) {
        self.failing.lock().unwrap().clear();
    }

    pub(crate) fn folder_exists(&self, path: &str) -> bool {
        self.tree.lock().unwrap().folders.contains(path)
    }

    pub(crate) fn file_exists(&self, path: &str) -> bool {
        self.tree.lock().unwrap().files.contains(path)
    }

    pub(crate) fn folders(&self) -> Vec<String> {
        self.tree.lock().unwrap().folders.iter().cloned().collect()
    }

    /// Executed mutations in order, display form
    pub(crate) fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    pub(crate) fn count(&self, kind: &str) -> usize {
        self.log()
            .iter()
            .filter(|entry| entry.starts_with(kind))
            .count()
    }

    pub(crate) fn clear_log(&self) {
        self.log.lock().unwrap().clear();
    }
}

#[async_trait]
impl RemoteFolders for MemoryFolders {
    async fn resolve_folder(&self, path: &str) -> SyncResult<RemoteFolder> {
        let path = path.trim_end_matches('/');
        if !self.folder_exists(path) {
            return Err(SyncError::RemoteNotFound {
                path: path.to_string(),
            });
        }
        Ok(RemoteFolder {
            name: split_parent(path).1.to_string(),
            server_relative_url: path.to_string(),
        })
    }

    async fn list_children(&self, path: &str) -> SyncResult<FolderListing> {
        let tree = self.tree.lock().unwrap();
        let files = tree
            .files
            .iter()
            .filter(|f| child_of(f, path))
            .map(|f| RemoteFile {
                name: split_parent(f).1.to_string(),
                server_relative_url: f.clone(),
            })
            .collect();
        let folders = tree
            .folders
            .iter()
            .filter(|f| child_of(f, path))
            .map(|f| RemoteFolder {
                name: split_parent(f).1.to_string(),
                server_relative_url: f.clone(),
            })
            .collect();
        Ok(FolderListing { files, folders })
    }

    async fn execute(&self, mutation: &Mutation) -> SyncResult<()> {
        let display = mutation.to_string();
        if self.failing.lock().unwrap().contains(&display) {
            return Err(SyncError::remote_operation(
                mutation.kind(),
                mutation.target(),
                "injected failure",
            ));
        }

        let mut tree = self.tree.lock().unwrap();
        match mutation {
            Mutation::CreateFolder { parent, .. } => {
                let target = mutation.target();
                if !parent.is_empty() && !tree.folders.contains(parent.as_str()) {
                    return Err(SyncError::RemoteNotFound {
                        path: parent.clone(),
                    });
                }
                if !tree.folders.insert(target.clone()) {
                    return Err(SyncError::remote_operation("create", target, "already exists"));
                }
            }
            Mutation::RenameFolder { path, new_name } => {
                if !tree.folders.contains(path.as_str()) {
                    return Err(SyncError::RemoteNotFound { path: path.clone() });
                }
                let parent = split_parent(path).0;
                let renamed = if parent.is_empty() {
                    new_name.clone()
                } else {
                    format!("{}/{}", parent, new_name)
                };
                if tree.folders.contains(&renamed) {
                    return Err(SyncError::remote_operation(
                        "rename",
                        path.clone(),
                        "target exists",
                    ));
                }
                let rebase = |p: &String| {
                    format!("{}{}", renamed, p.strip_prefix(path.as_str()).unwrap_or(""))
                };
                let moved_folders: Vec<String> = tree
                    .folders
                    .iter()
                    .filter(|f| *f == path || under(f, path))
                    .cloned()
                    .collect();
                let moved_files: Vec<String> = tree
                    .files
                    .iter()
                    .filter(|f| under(f, path))
                    .cloned()
                    .collect();
                for f in moved_folders {
                    tree.folders.remove(&f);
                    tree.folders.insert(rebase(&f));
                }
                for f in moved_files {
                    tree.files.remove(&f);
                    tree.files.insert(rebase(&f));
                }
            }
            Mutation::DeleteFolder { path } => {
                if !tree.folders.contains(path.as_str()) {
                    return Err(SyncError::RemoteNotFound { path: path.clone() });
                }
                let occupied = tree.folders.iter().any(|f| under(f, path))
                    || tree.files.iter().any(|f| under(f, path));
                if occupied {
                    return Err(SyncError::remote_operation(
                        "delete folder",
                        path.clone(),
                        "folder is not empty",
                    ));
                }
                tree.folders.remove(path.as_str());
            }
            Mutation::DeleteFile { path } => {
                if !tree.files.remove(path.as_str()) {
                    return Err(SyncError::RemoteNotFound { path: path.clone() });
                }
            }
        }
        drop(tree);

        self.log.lock().unwrap().push(display);
        Ok(())
    }
}
