use anyhow::Result;
use tracing::info;

use vejman_sync::remote::{RemoteFolders, SharePointSession};
use vejman_sync::services::{retry_with_fresh_session, DeleteSummary, TreeDeleter};
use vejman_sync::{Config, SyncResult};

/// Delete `path` and its subtree; with `keep_root` only the contents go
pub(crate) async fn purge_tree<R>(
    remote: &R,
    path: &str,
    keep_root: bool,
) -> SyncResult<DeleteSummary>
where
    R: RemoteFolders + ?Sized,
{
    let deleter = TreeDeleter::new(remote);
    if keep_root {
        deleter.empty_folder(path).await
    } else {
        deleter.delete_tree(path, false).await
    }
}

/// Purge `path`, re-authenticating on every attempt
pub async fn run(config: &Config, path: &str, keep_root: bool, max_attempts: u32) -> Result<()> {
    let credentials = super::sharepoint_credentials(config)?;
    let site_url = config.site_url()?;

    let credentials = &credentials;
    let site_url = site_url.as_str();

    let summary = retry_with_fresh_session(
        max_attempts,
        move || SharePointSession::authenticate(credentials, site_url),
        move |session| async move { purge_tree(&session, path, keep_root).await },
    )
    .await?;

    info!(
        files = summary.files_deleted,
        folders = summary.folders_deleted,
        kept_root = keep_root,
        "Purged {}",
        path
    );
    Ok(())
}
