//! Gate error taxonomy.

use crate::providers::ProviderError;
use crate::route::GateTarget;

/// Which completion flag a status fetch was for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusKind {
    Profile,
    Investment,
}

impl std::fmt::Display for StatusKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Profile => f.write_str("profile"),
            Self::Investment => f.write_str("investment"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GateError {
    /// The auth provider could not resolve the initial session. The gate
    /// stays in `Loading`; the caller displays the error and may retry.
    #[error("session lookup failed: {0}")]
    SessionLookup(#[source] ProviderError),
    /// A completion-status fetch failed. Recovered locally: the flag reads
    /// as incomplete and the gate keeps deciding.
    #[error("{kind} status fetch failed: {source}")]
    StatusFetch {
        kind: StatusKind,
        #[source]
        source: ProviderError,
    },
    /// The same redirect was requested again without any navigation
    /// progress. Automatic redirects stop until an input moves.
    #[error("redirect loop detected targeting {target}")]
    RedirectLoop { target: GateTarget },
}
