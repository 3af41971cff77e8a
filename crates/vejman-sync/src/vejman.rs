//! Vejman case API client

use chrono::{Days, NaiveDate, Utc};

use crate::error::{SyncError, SyncResult};
use crate::models::{Case, CaseList};

/// Fixed filters: open (state 3) excavation-equipment permits, all workers
const CASE_FILTERS: &[(&str, &str)] = &[
    ("pmCaseStates", "3"),
    ("pmCaseFields", "state,type,case_number,street_name,initials"),
    ("pmCaseWorker", "all"),
    ("pmCaseTypes", "'rovm'"),
    ("pmCaseVariant", "all"),
    ("pmCaseTags", "ignorerTags"),
    ("pmCaseShowAttachments", "false"),
    ("dontincludemap", "1"),
];

/// Date window of a case query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaseWindow {
    /// Cases must not have ended before this day
    pub end_date_from: NaiveDate,
    /// Cases must start no later than this day
    pub start_date_to: NaiveDate,
}

impl CaseWindow {
    pub fn starting(today: NaiveDate, lookahead_days: u32) -> Self {
        Self {
            end_date_from: today,
            start_date_to: today
                .checked_add_days(Days::new(lookahead_days as u64))
                .unwrap_or(NaiveDate::MAX),
        }
    }
}

/// Client for the `getcases` endpoint
pub struct VejmanClient {
    http: reqwest::Client,
    api_url: String,
    token: String,
}

impl VejmanClient {
    pub fn new(api_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: api_url.into(),
            token: token.into(),
        }
    }

    /// Query parameters for a window; `cache_buster` is the `_` value
    pub fn query_params(
        &self,
        window: CaseWindow,
        cache_buster: i64,
    ) -> Vec<(&'static str, String)> {
        let mut params: Vec<(&'static str, String)> = CASE_FILTERS
            .iter()
            .map(|(k, v)| (*k, v.to_string()))
            .collect();
        params.push(("startDateTo", window.start_date_to.format("%Y-%m-%d").to_string()));
        params.push(("endDateFrom", window.end_date_from.format("%Y-%m-%d").to_string()));
        params.push(("_", cache_buster.to_string()));
        params.push(("token", self.token.clone()));
        params
    }

    /// Fetch cases in API response order
    pub async fn fetch_cases(&self, window: CaseWindow) -> SyncResult<Vec<Case>> {
        let params = self.query_params(window, Utc::now().timestamp_millis());
        tracing::debug!(
            from = %window.end_date_from,
            to = %window.start_date_to,
            "Fetching Vejman cases"
        );

        let response = self
            .http
            .get(&self.api_url)
            .query(&params)
            .send()
            .await
            .map_err(|e| SyncError::ExternalApi(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::ExternalApi(format!(
                "Case endpoint returned {}",
                status
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SyncError::ExternalApi(format!("Failed to read response: {}", e)))?;
        let list: CaseList = serde_json::from_str(&body)
            .map_err(|e| SyncError::ExternalApi(format!("Malformed case JSON: {}", e)))?;

        tracing::info!(count = list.cases.len(), "Fetched Vejman cases");
        Ok(list.cases)
    }
}
