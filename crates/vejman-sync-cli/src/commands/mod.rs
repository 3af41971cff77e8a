pub mod dispatch;
pub mod purge;
pub mod sweep;

use vejman_sync::remote::{SharePointCredentials, SharePointSession};
use vejman_sync::{Config, SyncResult};

pub(crate) fn sharepoint_credentials(config: &Config) -> SyncResult<SharePointCredentials> {
    let (username, password) = config.robot_credentials()?;
    Ok(SharePointCredentials {
        username: username.to_string(),
        password: password.to_string(),
        client_id: config.azure_client_id()?.to_string(),
        token_url: config.token_url(),
    })
}

/// Authenticate the robot account against the configured site
pub(crate) async fn connect_sharepoint(config: &Config) -> SyncResult<SharePointSession> {
    let credentials = sharepoint_credentials(config)?;
    let site_url = config.site_url()?;
    SharePointSession::authenticate(&credentials, &site_url).await
}
