//! Hosted auth API client — password sign-in, token refresh, sign-out.
//!
//! ARCHITECTURE
//! ============
//! HTTP auth against the backend's token endpoints. The client owns the
//! live token pair and fans the latest session value out to gate
//! subscribers on every sign-in, refresh, and sign-out; subscribers always
//! observe the most recent value and the gate discards anything stale by
//! generation. Token persistence stays inside this client — nothing else
//! sees the refresh token.

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

use gate::providers::{AuthProvider, ProviderError};
use gate::session::Session;

use crate::config::BackendConfig;

const SESSION_QUEUE_CAPACITY: usize = 16;
/// Refresh this many seconds before the access token expires.
const REFRESH_MARGIN_SECS: u64 = 60;

#[derive(Debug, thiserror::Error)]
pub enum AuthApiError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("auth endpoint returned {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("malformed auth response: {0}")]
    Malformed(String),
    #[error("no active session")]
    NoSession,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    expires_in: u64,
    user: TokenUser,
}

#[derive(Debug, Deserialize)]
struct TokenUser {
    id: Uuid,
}

/// Live token state for the signed-in user.
#[derive(Debug, Clone)]
struct TokenPair {
    user_id: Uuid,
    access_token: String,
    refresh_token: String,
    expires_in_secs: u64,
}

impl TokenPair {
    fn session(&self) -> Session {
        Session::new(self.user_id, self.access_token.clone())
    }
}

pub struct AuthClient {
    http: reqwest::Client,
    config: BackendConfig,
    tokens: Mutex<Option<TokenPair>>,
    subscribers: Mutex<Vec<mpsc::Sender<Option<Session>>>>,
}

impl AuthClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: BackendConfig) -> Result<Self, AuthApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()?;
        Ok(Self { http, config, tokens: Mutex::new(None), subscribers: Mutex::new(Vec::new()) })
    }

    fn token_url(&self, grant_type: &str) -> String {
        format!("{}/auth/v1/token?grant_type={grant_type}", self.config.base_url)
    }

    fn logout_url(&self) -> String {
        format!("{}/auth/v1/logout", self.config.base_url)
    }

    /// Sign in with email + password, returning the new session.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, credential rejection, or a
    /// response the token parser does not understand.
    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, AuthApiError> {
        let resp = self
            .http
            .post(self.token_url("password"))
            .header("apikey", &self.config.api_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;
        let token = parse_token_response(resp).await?;
        let session = self.store_tokens(token).await;
        self.broadcast(Some(session.clone())).await;
        info!(user_id = %session.user_id, "signed in");
        Ok(session)
    }

    /// Exchange the stored refresh token for a fresh token pair.
    ///
    /// The user id is unchanged by a refresh, so subscribers receive the new
    /// session value but the gate will not re-fetch completion flags.
    ///
    /// # Errors
    ///
    /// Returns [`AuthApiError::NoSession`] when signed out, otherwise the
    /// same failures as sign-in.
    pub async fn refresh(&self) -> Result<Session, AuthApiError> {
        let refresh_token = {
            let tokens = self.tokens.lock().await;
            tokens.as_ref().map(|t| t.refresh_token.clone())
        }
        .ok_or(AuthApiError::NoSession)?;

        let resp = self
            .http
            .post(self.token_url("refresh_token"))
            .header("apikey", &self.config.api_key)
            .json(&serde_json::json!({ "refresh_token": refresh_token }))
            .send()
            .await?;
        let token = parse_token_response(resp).await?;
        let session = self.store_tokens(token).await;
        self.broadcast(Some(session.clone())).await;
        Ok(session)
    }

    /// Revoke an access token at the remote. Does not touch local state.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success status.
    pub async fn revoke_token(&self, access_token: &str) -> Result<(), AuthApiError> {
        let resp = self
            .http
            .post(self.logout_url())
            .header("apikey", &self.config.api_key)
            .header("Authorization", format!("Bearer {access_token}"))
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AuthApiError::Rejected { status: status.as_u16(), body });
        }
        Ok(())
    }

    /// Access token for authenticated REST reads, if signed in.
    pub async fn access_token(&self) -> Option<String> {
        let tokens = self.tokens.lock().await;
        tokens.as_ref().map(|t| t.access_token.clone())
    }

    async fn store_tokens(&self, token: TokenResponse) -> Session {
        let pair = TokenPair {
            user_id: token.user.id,
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_in_secs: token.expires_in,
        };
        let session = pair.session();
        *self.tokens.lock().await = Some(pair);
        session
    }

    async fn clear_tokens(&self) {
        *self.tokens.lock().await = None;
    }

    async fn expires_in_secs(&self) -> Option<u64> {
        let tokens = self.tokens.lock().await;
        tokens.as_ref().map(|t| t.expires_in_secs)
    }

    async fn broadcast(&self, session: Option<Session>) {
        let mut subscribers = self.subscribers.lock().await;
        subscribers.retain(|tx| match tx.try_send(session.clone()) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!("session subscriber queue full; dropping update");
                true
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        });
    }

    #[cfg(test)]
    async fn subscriber_count(&self) -> usize {
        self.subscribers.lock().await.len()
    }
}

#[async_trait]
impl AuthProvider for AuthClient {
    async fn current_session(&self) -> Result<Option<Session>, ProviderError> {
        let tokens = self.tokens.lock().await;
        Ok(tokens.as_ref().map(TokenPair::session))
    }

    async fn subscribe(&self) -> mpsc::Receiver<Option<Session>> {
        let (tx, rx) = mpsc::channel(SESSION_QUEUE_CAPACITY);
        self.subscribers.lock().await.push(tx);
        rx
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        if let Some(access_token) = self.access_token().await {
            // Best effort: a failed remote revoke must not keep the user
            // signed in locally.
            if let Err(e) = self.revoke_token(&access_token).await {
                warn!(error = %e, "remote sign-out failed; clearing local session anyway");
            }
        }
        self.clear_tokens().await;
        self.broadcast(None).await;
        info!("signed out");
        Ok(())
    }
}

async fn parse_token_response(resp: reqwest::Response) -> Result<TokenResponse, AuthApiError> {
    let status = resp.status();
    let body = resp.text().await?;
    if !status.is_success() {
        return Err(AuthApiError::Rejected { status: status.as_u16(), body });
    }
    serde_json::from_str(&body).map_err(|_| AuthApiError::Malformed(format!("unexpected response: {body}")))
}

/// Spawn a task that refreshes the token ahead of expiry.
///
/// On refresh failure the session is treated as invalidated: local tokens
/// are cleared and subscribers observe a signed-out state.
pub fn spawn_refresh_task(client: Arc<AuthClient>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let Some(expires_in) = client.expires_in_secs().await else {
                // Signed out; poll until a session appears.
                tokio::time::sleep(Duration::from_secs(REFRESH_MARGIN_SECS)).await;
                continue;
            };
            let wait = expires_in.saturating_sub(REFRESH_MARGIN_SECS).max(1);
            tokio::time::sleep(Duration::from_secs(wait)).await;

            match client.refresh().await {
                Ok(session) => info!(user_id = %session.user_id, "session refreshed"),
                Err(e) => {
                    warn!(error = %e, "token refresh failed; invalidating session");
                    client.clear_tokens().await;
                    client.broadcast(None).await;
                }
            }
        }
    })
}
