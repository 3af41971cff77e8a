//! SharePoint REST session
//!
//! Authenticates the robot account with the OAuth2 password grant and talks to
//! the site's `/_api/web` endpoints with the resulting bearer token.

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::{FolderListing, Mutation, RemoteFile, RemoteFolder, RemoteFolders};
use crate::error::{SyncError, SyncResult};

const ODATA_JSON: &str = "application/json;odata=nometadata";

/// Robot account and app registration used for the token request
#[derive(Debug, Clone)]
pub struct SharePointCredentials {
    pub username: String,
    pub password: String,
    pub client_id: String,
    pub token_url: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WebDescriptor {
    title: String,
}

#[derive(Deserialize)]
struct ODataList<T> {
    value: Vec<T>,
}

/// Authenticated session bound to one site
pub struct SharePointSession {
    http: reqwest::Client,
    site_url: String,
    access_token: String,
    site_title: String,
}

/// Escape a path for use inside `decodedurl='...'`
fn path_literal(path: &str) -> String {
    urlencoding::encode(&path.replace('\'', "''")).into_owned()
}

/// `https://host/teams/x` -> `https://host/.default`
fn resource_scope(site_url: &str) -> SyncResult<String> {
    let url = url::Url::parse(site_url).map_err(|e| SyncError::Authentication {
        reason: format!("Invalid site URL {}: {}", site_url, e),
    })?;
    Ok(format!("{}/.default", url.origin().ascii_serialization()))
}

impl SharePointSession {
    /// Obtain a token and verify the site answers
    pub async fn authenticate(
        credentials: &SharePointCredentials,
        site_url: &str,
    ) -> SyncResult<Self> {
        let http = reqwest::Client::new();
        let site_url = site_url.trim_end_matches('/').to_string();
        let scope = resource_scope(&site_url)?;

        let response = http
            .post(&credentials.token_url)
            .form(&[
                ("grant_type", "password"),
                ("client_id", credentials.client_id.as_str()),
                ("username", credentials.username.as_str()),
                ("password", credentials.password.as_str()),
                ("scope", scope.as_str()),
            ])
            .send()
            .await
            .map_err(|e| SyncError::Authentication {
                reason: format!("Token request failed: {}", e),
            })?;
        if !response.status().is_success() {
            return Err(SyncError::Authentication {
                reason: format!("Token endpoint returned {}", response.status()),
            });
        }
        let token: TokenResponse = response.json().await.map_err(|e| SyncError::Authentication {
            reason: format!("Malformed token response: {}", e),
        })?;

        let mut session = Self {
            http,
            site_url,
            access_token: token.access_token,
            site_title: String::new(),
        };

        let web_url = format!("{}/_api/web?$select=Title", session.site_url);
        let web: WebDescriptor = session
            .get_json(&web_url, "")
            .await
            .map_err(|e| SyncError::Authentication {
                reason: format!("Site {} is not reachable: {}", session.site_url, e),
            })?;
        session.site_title = web.title;

        tracing::info!(
            "Authenticated successfully. Site Title: {}",
            session.site_title
        );
        Ok(session)
    }

    pub fn site_url(&self) -> &str {
        &self.site_url
    }

    pub fn site_title(&self) -> &str {
        &self.site_title
    }

    fn folder_endpoint(&self, path: &str) -> String {
        format!(
            "{}/_api/web/GetFolderByServerRelativePath(decodedurl='{}')",
            self.site_url,
            path_literal(path)
        )
    }

    fn file_endpoint(&self, path: &str) -> String {
        format!(
            "{}/_api/web/GetFileByServerRelativePath(decodedurl='{}')",
            self.site_url,
            path_literal(path)
        )
    }

    fn request(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .bearer_auth(&self.access_token)
            .header("Accept", ODATA_JSON)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, path: &str) -> SyncResult<T> {
        tracing::debug!("GET {}", url);
        let response = self
            .request(Method::GET, url)
            .send()
            .await
            .map_err(|e| SyncError::remote_operation("read", path, e))?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(SyncError::RemoteNotFound {
                path: path.to_string(),
            }),
            status if !status.is_success() => {
                let body = response.text().await.unwrap_or_default();
                Err(SyncError::remote_operation(
                    "read",
                    path,
                    format!("{} {}", status, body),
                ))
            }
            _ => response
                .json()
                .await
                .map_err(|e| SyncError::remote_operation("read", path, e)),
        }
    }

    /// POST with an optional `X-HTTP-Method` override
    async fn post(
        &self,
        url: &str,
        method_override: Option<&str>,
        body: Option<serde_json::Value>,
        mutation: &Mutation,
    ) -> SyncResult<()> {
        tracing::debug!("POST {} ({})", url, mutation);
        let mut request = self.request(Method::POST, url);
        if let Some(method) = method_override {
            request = request.header("X-HTTP-Method", method).header("IF-MATCH", "*");
        }
        request = match body {
            Some(body) => request
                .header("Content-Type", ODATA_JSON)
                .body(body.to_string()),
            None => request.body(""),
        };

        let response = request
            .send()
            .await
            .map_err(|e| SyncError::remote_operation(mutation.kind(), mutation.target(), e))?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(SyncError::RemoteNotFound {
                path: mutation.target(),
            }),
            status if !status.is_success() => {
                let text = response.text().await.unwrap_or_default();
                Err(SyncError::remote_operation(
                    mutation.kind(),
                    mutation.target(),
                    format!("{} {}", status, text),
                ))
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl RemoteFolders for SharePointSession {
    async fn resolve_folder(&self, path: &str) -> SyncResult<RemoteFolder> {
        let url = format!(
            "{}?$select=Name,ServerRelativeUrl,Exists",
            self.folder_endpoint(path)
        );
        let descriptor: serde_json::Value = self.get_json(&url, path).await?;
        // Unknown paths sometimes come back as 200 with Exists = false
        if descriptor.get("Exists").and_then(|v| v.as_bool()) == Some(false) {
            return Err(SyncError::RemoteNotFound {
                path: path.to_string(),
            });
        }
        Ok(serde_json::from_value(descriptor)?)
    }

    async fn list_children(&self, path: &str) -> SyncResult<FolderListing> {
        let endpoint = self.folder_endpoint(path);
        let files: ODataList<RemoteFile> = self
            .get_json(&format!("{}/Files?$select=Name,ServerRelativeUrl", endpoint), path)
            .await?;
        let folders: ODataList<RemoteFolder> = self
            .get_json(&format!("{}/Folders?$select=Name,ServerRelativeUrl", endpoint), path)
            .await?;
        Ok(FolderListing {
            files: files.value,
            folders: folders.value,
        })
    }

    async fn execute(&self, mutation: &Mutation) -> SyncResult<()> {
        match mutation {
            Mutation::CreateFolder { .. } => {
                let url = format!(
                    "{}/_api/web/Folders/AddUsingPath(decodedurl='{}')",
                    self.site_url,
                    path_literal(&mutation.target())
                );
                self.post(&url, None, None, mutation).await
            }
            Mutation::RenameFolder { path, new_name } => {
                let url = format!("{}/ListItemAllFields", self.folder_endpoint(path));
                let body = serde_json::json!({
                    "FileLeafRef": new_name,
                    "Title": new_name,
                });
                self.post(&url, Some("MERGE"), Some(body), mutation).await
            }
            Mutation::DeleteFolder { path } => {
                let url = self.folder_endpoint(path);
                self.post(&url, Some("DELETE"), None, mutation).await
            }
            Mutation::DeleteFile { path } => {
                let url = self.file_endpoint(path);
                self.post(&url, Some("DELETE"), None, mutation).await
            }
        }
    }
}
