//! Collaborator seams consumed by the session gate.
//!
//! ARCHITECTURE
//! ============
//! The gate never talks to the network or the navigation layer directly.
//! Auth, status reads, and redirects sit behind these traits so the decision
//! logic is testable with channel-backed fakes, and so the production
//! adapters in the `backend` crate stay swappable.

use async_trait::async_trait;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::route::{Redirect, RouteGroup};
use crate::session::Session;

/// Error reported by auth and status collaborators.
#[derive(Clone, Debug, thiserror::Error)]
pub enum ProviderError {
    /// The request never reached the remote (network, timeout, TLS).
    #[error("transport error: {0}")]
    Transport(String),
    /// The remote answered but refused or garbled the request.
    #[error("remote rejected request: {0}")]
    Rejected(String),
}

/// Source of the authentication session.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// One-shot lookup of the current session, used once at startup.
    async fn current_session(&self) -> Result<Option<Session>, ProviderError>;

    /// Subscribe to session changes. The provider pushes the latest session
    /// value on every login, logout, and token refresh.
    async fn subscribe(&self) -> mpsc::Receiver<Option<Session>>;

    /// Revoke the current session and notify subscribers.
    async fn sign_out(&self) -> Result<(), ProviderError>;
}

/// Keyed lookups of the two onboarding completion flags.
///
/// Implementations map a missing remote row to `Ok(false)`; only transport
/// and remote failures surface as errors (which the gate then treats as
/// incomplete anyway).
#[async_trait]
pub trait StatusReader: Send + Sync {
    async fn profile_status(&self, user_id: Uuid) -> Result<bool, ProviderError>;

    async fn investment_status(&self, user_id: Uuid) -> Result<bool, ProviderError>;
}

/// Navigation layer: owns the current location and applies redirects.
pub trait Navigator: Send + Sync {
    fn current_route_group(&self) -> RouteGroup;

    fn redirect_to(&self, redirect: &Redirect);
}
