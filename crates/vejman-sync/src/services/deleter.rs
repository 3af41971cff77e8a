//! Recursive folder deletion
//!
//! Walks the tree with an explicit stack. At every level the folder's files go
//! first, then each subfolder's whole subtree, then the folder itself, so the
//! backend never sees a delete for a non-empty folder.

use tracing::info;

use crate::error::SyncResult;
use crate::remote::{ChangeBatch, RemoteFolders};

/// Counts from one `delete_tree` call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteSummary {
    pub files_deleted: usize,
    pub folders_deleted: usize,
}

enum Step {
    /// Empty the folder's files and schedule its subfolders
    Visit(String),
    /// All children are gone; remove the folder
    Remove(String),
}

/// Deletes folder trees on one remote
pub struct TreeDeleter<'a, R: RemoteFolders + ?Sized> {
    remote: &'a R,
    protected_root: Option<String>,
}

impl<'a, R: RemoteFolders + ?Sized> TreeDeleter<'a, R> {
    pub fn new(remote: &'a R) -> Self {
        Self {
            remote,
            protected_root: None,
        }
    }

    /// Root that survives (emptied) when `delete_tree` is called with `preserve_root`
    pub fn with_protected_root(mut self, root: impl Into<String>) -> Self {
        self.protected_root = Some(root.into());
        self
    }

    fn keeps(&self, path: &str, preserve_root: bool) -> bool {
        preserve_root
            && self
                .protected_root
                .as_deref()
                .is_some_and(|root| root.trim_end_matches('/') == path.trim_end_matches('/'))
    }

    /// Delete everything under `path`, then `path` itself
    ///
    /// The first error aborts the walk; whatever was deleted before it stays deleted.
    pub async fn delete_tree(&self, path: &str, preserve_root: bool) -> SyncResult<DeleteSummary> {
        info!("Recursively deleting SharePoint folder: {}", path);
        let mut summary = DeleteSummary::default();
        let mut stack = vec![Step::Visit(path.to_string())];

        while let Some(step) = stack.pop() {
            match step {
                Step::Visit(folder) => {
                    let listing = self.remote.list_folder(&folder).await?;

                    let mut batch = ChangeBatch::new();
                    for file in &listing.files {
                        info!("Deleting file: {}", file.server_relative_url);
                        batch.delete_file(&file.server_relative_url);
                    }
                    if !batch.is_empty() {
                        let committed = batch.flush(self.remote).await.into_result()?;
                        summary.files_deleted += committed.len();
                    }

                    stack.push(Step::Remove(folder));
                    // Reversed so the first listed subfolder is walked first
                    for sub in listing.folders.into_iter().rev() {
                        stack.push(Step::Visit(sub.server_relative_url));
                    }
                }
                Step::Remove(folder) => {
                    if folder == path && self.keeps(&folder, preserve_root) {
                        info!("Kept emptied root folder: {}", folder);
                        continue;
                    }
                    self.remote.delete_folder(&folder).await?;
                    summary.folders_deleted += 1;
                    info!("Folder deleted: {}", folder);
                }
            }
        }

        Ok(summary)
    }

    /// Delete everything under `path` but keep `path` itself
    pub async fn empty_folder(&self, path: &str) -> SyncResult<DeleteSummary> {
        TreeDeleter::new(self.remote)
            .with_protected_root(path)
            .delete_tree(path, true)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::memory::MemoryFolders;
    use crate::SyncError;

    fn sample_tree() -> MemoryFolders {
        let remote = MemoryFolders::with_folders(&[
            "Top",
            "Top/Case_1",
            "Top/Case_1/Tegninger",
            "Top/Case_1/Tegninger/Gamle",
            "Top/Case_2",
        ]);
        remote.add_file("Top/readme.txt");
        remote.add_file("Top/Case_1/ansoegning.pdf");
        remote.add_file("Top/Case_1/kort.png");
        remote.add_file("Top/Case_1/Tegninger/plan.dwg");
        remote.add_file("Top/Case_1/Tegninger/Gamle/v1.dwg");
        remote
    }

    fn position(log: &[String], entry: &str) -> usize {
        log.iter()
            .position(|e| e == entry)
            .unwrap_or_else(|| panic!("{} not in log {:?}", entry, log))
    }

    #[tokio::test]
    async fn test_delete_tree_removes_everything() {
        let remote = sample_tree();
        let summary = TreeDeleter::new(&remote)
            .delete_tree("Top/Case_1", false)
            .await
            .unwrap();

        assert_eq!(
            summary,
            DeleteSummary {
                files_deleted: 4,
                folders_deleted: 3
            }
        );
        assert!(!remote.folder_exists("Top/Case_1"));
        assert!(!remote.file_exists("Top/Case_1/kort.png"));
        assert!(remote.folder_exists("Top/Case_2"));
        assert!(remote.file_exists("Top/readme.txt"));
    }

    #[tokio::test]
    async fn test_children_go_before_parent() {
        let remote = sample_tree();
        TreeDeleter::new(&remote)
            .delete_tree("Top/Case_1", false)
            .await
            .unwrap();

        let log = remote.log();
        let parent = position(&log, "delete folder Top/Case_1");
        let sub = position(&log, "delete folder Top/Case_1/Tegninger");
        let subsub = position(&log, "delete folder Top/Case_1/Tegninger/Gamle");

        // Files of a node precede its subfolders' work
        assert!(position(&log, "delete file Top/Case_1/ansoegning.pdf") < subsub);
        assert!(
            position(&log, "delete file Top/Case_1/kort.png")
                < position(&log, "delete file Top/Case_1/Tegninger/plan.dwg")
        );
        // Every descendant precedes the node itself
        assert!(position(&log, "delete file Top/Case_1/Tegninger/plan.dwg") < sub);
        assert!(subsub < sub);
        assert!(sub < parent);
        assert_eq!(parent, log.len() - 1);
    }

    #[tokio::test]
    async fn test_sibling_subtrees_finish_in_listing_order() {
        let remote = MemoryFolders::with_folders(&["R", "R/A", "R/A/x", "R/B"]);
        TreeDeleter::new(&remote).delete_tree("R", false).await.unwrap();

        assert_eq!(
            remote.log(),
            vec![
                "delete folder R/A/x",
                "delete folder R/A",
                "delete folder R/B",
                "delete folder R",
            ]
        );
    }

    #[tokio::test]
    async fn test_preserve_root_keeps_emptied_root() {
        let remote = sample_tree();
        let summary = TreeDeleter::new(&remote)
            .with_protected_root("Top")
            .delete_tree("Top", true)
            .await
            .unwrap();

        assert_eq!(summary.folders_deleted, 4);
        assert_eq!(summary.files_deleted, 5);
        assert_eq!(remote.folders(), vec!["Top".to_string()]);
        assert!(!remote.file_exists("Top/readme.txt"));
    }

    #[tokio::test]
    async fn test_preserve_root_only_applies_to_protected_root() {
        let remote = sample_tree();
        TreeDeleter::new(&remote)
            .with_protected_root("Top")
            .delete_tree("Top/Case_2", true)
            .await
            .unwrap();
        assert!(!remote.folder_exists("Top/Case_2"));

        // Without preserve_root the protected root goes too
        TreeDeleter::new(&remote)
            .with_protected_root("Top")
            .delete_tree("Top", false)
            .await
            .unwrap();
        assert!(remote.folders().is_empty());
    }

    #[tokio::test]
    async fn test_empty_folder_keeps_any_target() {
        let remote = sample_tree();
        let summary = TreeDeleter::new(&remote)
            .with_protected_root("Top")
            .empty_folder("Top/Case_1")
            .await
            .unwrap();

        assert_eq!(
            summary,
            DeleteSummary {
                files_deleted: 4,
                folders_deleted: 2
            }
        );
        assert!(remote.folder_exists("Top/Case_1"));
        assert!(!remote.folder_exists("Top/Case_1/Tegninger"));
        assert!(!remote.file_exists("Top/Case_1/kort.png"));
        assert!(remote.folder_exists("Top/Case_2"));
        assert!(remote.file_exists("Top/readme.txt"));
    }

    #[tokio::test]
    async fn test_missing_root_is_not_found() {
        let remote = MemoryFolders::with_folders(&["Top"]);
        let err = TreeDeleter::new(&remote)
            .delete_tree("Top/Nope", false)
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::RemoteNotFound { .. }));
        assert!(remote.log().is_empty());
    }

    #[tokio::test]
    async fn test_failure_aborts_and_keeps_partial_progress() {
        let remote = sample_tree();
        remote.fail_on("delete folder Top/Case_1/Tegninger");

        let err = TreeDeleter::new(&remote)
            .delete_tree("Top/Case_1", false)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "REMOTE_OPERATION_FAILED");

        // Deeper levels were already removed, the failing folder and its parent remain
        assert!(!remote.folder_exists("Top/Case_1/Tegninger/Gamle"));
        assert!(remote.folder_exists("Top/Case_1/Tegninger"));
        assert!(remote.folder_exists("Top/Case_1"));

        // A second pass picks up where the first stopped
        remote.clear_failures();
        TreeDeleter::new(&remote)
            .delete_tree("Top/Case_1", false)
            .await
            .unwrap();
        assert!(!remote.folder_exists("Top/Case_1"));
    }

    #[tokio::test]
    async fn test_deep_tree_does_not_recurse() {
        let mut paths = vec!["D".to_string()];
        for i in 0..2000 {
            let next = format!("{}/{}", paths.last().unwrap(), i % 10);
            paths.push(next);
        }
        let refs: Vec<&str> = paths.iter().map(|p| p.as_str()).collect();
        let remote = MemoryFolders::with_folders(&refs);

        let summary = TreeDeleter::new(&remote).delete_tree("D", false).await.unwrap();
        assert_eq!(summary.folders_deleted, 2001);
        assert!(remote.folders().is_empty());
    }
}
