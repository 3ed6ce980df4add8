//! Completion-status reads over the backend's REST row API.
//!
//! The two onboarding flags live in the `profiles` and `inwestycje` tables,
//! one row per user. A missing row means the form was never submitted,
//! which reads as incomplete — only transport and remote failures surface
//! as errors.

#[cfg(test)]
#[path = "status_test.rs"]
mod tests;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use uuid::Uuid;

use gate::providers::{ProviderError, StatusReader};

use crate::auth::AuthClient;
use crate::config::BackendConfig;

const PROFILE_TABLE: &str = "profiles";
const INVESTMENT_TABLE: &str = "inwestycje";
const COMPLETION_COLUMN: &str = "setup_complete";

#[derive(Debug, thiserror::Error)]
pub enum StatusApiError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("status endpoint returned {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("malformed status response: {0}")]
    Malformed(String),
}

#[derive(Debug, Deserialize)]
struct CompletionRow {
    setup_complete: bool,
}

pub struct StatusClient {
    http: reqwest::Client,
    config: BackendConfig,
    auth: Arc<AuthClient>,
}

impl StatusClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: BackendConfig, auth: Arc<AuthClient>) -> Result<Self, StatusApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()?;
        Ok(Self { http, config, auth })
    }

    fn row_url(&self, table: &str, user_id: Uuid) -> String {
        format!(
            "{}/rest/v1/{table}?select={COMPLETION_COLUMN}&user_id=eq.{user_id}&limit=1",
            self.config.base_url
        )
    }

    /// Fetch one table's completion flag. Absent row reads as incomplete.
    async fn fetch_flag(&self, table: &str, user_id: Uuid) -> Result<bool, StatusApiError> {
        // Row-level security wants the user's token; fall back to the
        // public key so an unauthenticated read still degrades to NotFound.
        let bearer = self
            .auth
            .access_token()
            .await
            .unwrap_or_else(|| self.config.api_key.clone());

        let resp = self
            .http
            .get(self.row_url(table, user_id))
            .header("apikey", &self.config.api_key)
            .header("Authorization", format!("Bearer {bearer}"))
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(StatusApiError::Rejected { status: status.as_u16(), body });
        }
        parse_rows(&body)
    }
}

/// Parse a row-API response body into a completion flag.
fn parse_rows(body: &str) -> Result<bool, StatusApiError> {
    let rows: Vec<CompletionRow> =
        serde_json::from_str(body).map_err(|_| StatusApiError::Malformed(body.to_owned()))?;
    Ok(rows.first().is_some_and(|row| row.setup_complete))
}

fn to_provider_error(e: StatusApiError) -> ProviderError {
    match e {
        StatusApiError::Http(e) => ProviderError::Transport(e.to_string()),
        other => ProviderError::Rejected(other.to_string()),
    }
}

#[async_trait]
impl StatusReader for StatusClient {
    async fn profile_status(&self, user_id: Uuid) -> Result<bool, ProviderError> {
        self.fetch_flag(PROFILE_TABLE, user_id).await.map_err(to_provider_error)
    }

    async fn investment_status(&self, user_id: Uuid) -> Result<bool, ProviderError> {
        self.fetch_flag(INVESTMENT_TABLE, user_id).await.map_err(to_provider_error)
    }
}
