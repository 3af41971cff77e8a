//! Configuration management for the dispatcher

use crate::error::{SyncError, SyncResult};
use crate::services::{DEFAULT_MAX_ATTEMPTS, DEFAULT_RETENTION_DAYS};
use serde::Deserialize;

/// Dispatcher configuration
///
/// Credentials and site constants come from the environment (or a TOML file);
/// nothing here is read again after startup.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Database URL (default: sqlite://data/vejman.db?mode=rwc)
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Vejman case endpoint
    #[serde(default = "default_vejman_api_url")]
    pub vejman_api_url: String,

    /// Vejman API token
    pub vejman_token: Option<String>,

    /// Robot account used against SharePoint
    pub robot_username: Option<String>,
    pub robot_password: Option<String>,

    /// SharePoint tenant root, e.g. https://contoso.sharepoint.com
    pub sharepoint_base_url: Option<String>,

    /// Site path below the tenant root
    #[serde(default = "default_sharepoint_site_path")]
    pub sharepoint_site_path: String,

    /// Folder that holds one subfolder per case
    #[serde(default = "default_sharepoint_top_folder")]
    pub sharepoint_top_folder: String,

    /// Azure AD authority used for the token request
    #[serde(default = "default_azure_authority")]
    pub azure_authority: String,

    /// Azure AD tenant (default: organizations)
    #[serde(default = "default_azure_tenant")]
    pub azure_tenant: String,

    /// Public client application id registered for the robot account
    pub azure_client_id: Option<String>,

    /// Queue that receives one element per reconciled case
    #[serde(default = "default_queue_name")]
    pub queue_name: String,

    /// Name recorded as creator of queue elements
    #[serde(default = "default_process_name")]
    pub process_name: String,

    /// Days a mapping row may go without refresh before its folder is pruned
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,

    /// Attempts for the standalone purge
    #[serde(default = "default_purge_max_attempts")]
    pub purge_max_attempts: u32,

    /// How far ahead a case start date may lie and still be fetched
    #[serde(default = "default_case_lookahead_days")]
    pub case_lookahead_days: u32,
}

fn default_database_url() -> String {
    "sqlite://data/vejman.db?mode=rwc".to_string()
}

fn default_vejman_api_url() -> String {
    "https://vejman.vd.dk/permissions/getcases".to_string()
}

fn default_sharepoint_site_path() -> String {
    "/teams/tea-teamsite10014".to_string()
}

fn default_sharepoint_top_folder() -> String {
    "Delte dokumenter/TestTilladelser".to_string()
}

fn default_azure_authority() -> String {
    "https://login.microsoftonline.com".to_string()
}

fn default_azure_tenant() -> String {
    "organizations".to_string()
}

fn default_queue_name() -> String {
    "VejmanPerformer".to_string()
}

fn default_process_name() -> String {
    "VejmanDispatcher".to_string()
}

fn default_retention_days() -> u32 {
    DEFAULT_RETENTION_DAYS
}

fn default_purge_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_case_lookahead_days() -> u32 {
    4
}

fn parse_env<T: std::str::FromStr>(key: &str, default: fn() -> T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(default)
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> SyncResult<Self> {
        let config = Self {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| default_database_url()),
            vejman_api_url: std::env::var("VEJMAN_API_URL")
                .unwrap_or_else(|_| default_vejman_api_url()),
            vejman_token: std::env::var("VEJMAN_TOKEN").ok(),
            robot_username: std::env::var("ROBOT_USERNAME").ok(),
            robot_password: std::env::var("ROBOT_PASSWORD").ok(),
            sharepoint_base_url: std::env::var("SHAREPOINT_BASE_URL").ok(),
            sharepoint_site_path: std::env::var("SHAREPOINT_SITE_PATH")
                .unwrap_or_else(|_| default_sharepoint_site_path()),
            sharepoint_top_folder: std::env::var("SHAREPOINT_TOP_FOLDER")
                .unwrap_or_else(|_| default_sharepoint_top_folder()),
            azure_authority: std::env::var("AZURE_AUTHORITY")
                .unwrap_or_else(|_| default_azure_authority()),
            azure_tenant: std::env::var("AZURE_TENANT").unwrap_or_else(|_| default_azure_tenant()),
            azure_client_id: std::env::var("AZURE_CLIENT_ID").ok(),
            queue_name: std::env::var("QUEUE_NAME").unwrap_or_else(|_| default_queue_name()),
            process_name: std::env::var("PROCESS_NAME")
                .unwrap_or_else(|_| default_process_name()),
            retention_days: parse_env("RETENTION_DAYS", default_retention_days),
            purge_max_attempts: parse_env("PURGE_MAX_ATTEMPTS", default_purge_max_attempts),
            case_lookahead_days: parse_env("CASE_LOOKAHEAD_DAYS", default_case_lookahead_days),
        };
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &str) -> SyncResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SyncError::Configuration(format!("Failed to read config file {}: {}", path, e))
        })?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| SyncError::Configuration(format!("Failed to parse config file: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that can never produce a working run
    ///
    /// Secrets are checked by their accessors when a command needs them, so a
    /// sweep does not require the Vejman token.
    pub fn validate(&self) -> SyncResult<()> {
        // Zero would sweep the folders this run just refreshed
        if self.retention_days == 0 {
            return Err(SyncError::Configuration(
                "RETENTION_DAYS must be at least 1".to_string(),
            ));
        }
        if self.purge_max_attempts == 0 {
            return Err(SyncError::Configuration(
                "PURGE_MAX_ATTEMPTS must be at least 1".to_string(),
            ));
        }
        if self.sharepoint_top_folder.trim_matches('/').is_empty() {
            return Err(SyncError::Configuration(
                "SHAREPOINT_TOP_FOLDER must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Full site URL, base joined with site path
    pub fn site_url(&self) -> SyncResult<String> {
        let base = require(&self.sharepoint_base_url, "SHAREPOINT_BASE_URL")?;
        Ok(format!(
            "{}/{}",
            base.trim_end_matches('/'),
            self.sharepoint_site_path.trim_start_matches('/')
        ))
    }

    pub fn vejman_token(&self) -> SyncResult<&str> {
        require(&self.vejman_token, "VEJMAN_TOKEN")
    }

    pub fn robot_credentials(&self) -> SyncResult<(&str, &str)> {
        Ok((
            require(&self.robot_username, "ROBOT_USERNAME")?,
            require(&self.robot_password, "ROBOT_PASSWORD")?,
        ))
    }

    pub fn azure_client_id(&self) -> SyncResult<&str> {
        require(&self.azure_client_id, "AZURE_CLIENT_ID")
    }

    /// Token endpoint for the configured tenant
    pub fn token_url(&self) -> String {
        format!(
            "{}/{}/oauth2/v2.0/token",
            self.azure_authority.trim_end_matches('/'),
            self.azure_tenant
        )
    }
}

fn require<'a>(value: &'a Option<String>, name: &str) -> SyncResult<&'a str> {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| SyncError::Configuration(format!("{} is not set", name)))
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            vejman_api_url: default_vejman_api_url(),
            vejman_token: None,
            robot_username: None,
            robot_password: None,
            sharepoint_base_url: None,
            sharepoint_site_path: default_sharepoint_site_path(),
            sharepoint_top_folder: default_sharepoint_top_folder(),
            azure_authority: default_azure_authority(),
            azure_tenant: default_azure_tenant(),
            azure_client_id: None,
            queue_name: default_queue_name(),
            process_name: default_process_name(),
            retention_days: default_retention_days(),
            purge_max_attempts: default_purge_max_attempts(),
            case_lookahead_days: default_case_lookahead_days(),
        }
    }
}
