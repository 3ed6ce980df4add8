//! Session model owned by the auth provider.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use uuid::Uuid;

/// Proof of authentication: an opaque access token tied to a user id.
///
/// Created by the auth provider on login, replaced on token refresh, and
/// destroyed on sign-out or invalidation. The gate holds the live value only;
/// token persistence stays with the provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub user_id: Uuid,
    pub access_token: String,
}

impl Session {
    #[must_use]
    pub fn new(user_id: Uuid, access_token: impl Into<String>) -> Self {
        Self { user_id, access_token: access_token.into() }
    }
}

/// Whether two optional sessions belong to the same user.
///
/// Token refresh swaps the access token but keeps the user id, so identity
/// is compared on user id alone.
#[must_use]
pub fn same_user(a: Option<&Session>, b: Option<&Session>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a.user_id == b.user_id,
        _ => false,
    }
}
