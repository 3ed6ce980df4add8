//! Session-gate runtime: owns the inputs, rejects stale fetch results, and
//! issues redirects through the navigation collaborator.
//!
//! ARCHITECTURE
//! ============
//! The (session, profile flag, investment flag) triple is mutated only
//! through this type, from the reactive runner; screens never write it
//! directly. Redirects go through [`Navigator`] so evaluation can be
//! asserted on in tests instead of observing real navigation.
//!
//! EDGE
//! ====
//! Token refresh keeps the user id, so it neither resets the completion
//! flags nor advances the fetch generation.

#[cfg(test)]
#[path = "session_gate_test.rs"]
mod session_gate_test;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::decision::{GateSnapshot, decide, redirect_for};
use crate::error::{GateError, StatusKind};
use crate::providers::{Navigator, ProviderError};
use crate::route::{GateTarget, RouteGroup};
use crate::session::{Session, same_user};

/// Outcome of applying a session value, telling the caller whether the
/// completion flags must be re-fetched for a new user.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionChange {
    pub user_changed: bool,
    /// Generation to stamp any fetch issued for this change.
    pub generation: u64,
}

#[derive(Clone, Copy, Debug)]
struct IssuedRedirect {
    target: GateTarget,
    /// Route group observed when the redirect was issued; if it has not
    /// moved by the time the same target comes up again, we are looping.
    observed: RouteGroup,
}

/// Single source of truth for where the user should be right now.
pub struct SessionGate {
    initialised: bool,
    session: Option<Session>,
    profile_complete: bool,
    investment_complete: bool,
    generation: u64,
    last_issued: Option<IssuedRedirect>,
}

impl SessionGate {
    #[must_use]
    pub fn new() -> Self {
        Self {
            initialised: false,
            session: None,
            profile_complete: false,
            investment_complete: false,
            generation: 0,
            last_issued: None,
        }
    }

    #[must_use]
    pub fn is_initialised(&self) -> bool {
        self.initialised
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    #[must_use]
    pub fn user_id(&self) -> Option<Uuid> {
        self.session.as_ref().map(|s| s.user_id)
    }

    /// Record the latest session value from the auth provider.
    ///
    /// Applying any value marks the gate initialised. When the user id
    /// changes (including none ↔ some), both completion flags reset to
    /// incomplete and the fetch generation advances, so results still in
    /// flight for the previous user are discarded on arrival.
    pub fn apply_session(&mut self, next: Option<Session>) -> SessionChange {
        self.initialised = true;
        let user_changed = !same_user(self.session.as_ref(), next.as_ref());
        if user_changed {
            // Flags fetched for the previous user must never leak into this one.
            self.profile_complete = false;
            self.investment_complete = false;
            self.generation += 1;
            self.last_issued = None;
        }
        self.session = next;
        SessionChange { user_changed, generation: self.generation }
    }

    /// Apply a profile fetch outcome stamped with the generation it was
    /// issued under. Returns the recovered error, if any.
    pub fn apply_profile_status(
        &mut self,
        generation: u64,
        outcome: Result<bool, ProviderError>,
    ) -> Option<GateError> {
        self.apply_status(StatusKind::Profile, generation, outcome)
    }

    /// Investment counterpart of [`Self::apply_profile_status`].
    pub fn apply_investment_status(
        &mut self,
        generation: u64,
        outcome: Result<bool, ProviderError>,
    ) -> Option<GateError> {
        self.apply_status(StatusKind::Investment, generation, outcome)
    }

    fn apply_status(
        &mut self,
        kind: StatusKind,
        generation: u64,
        outcome: Result<bool, ProviderError>,
    ) -> Option<GateError> {
        if generation != self.generation {
            debug!(%kind, generation, current = self.generation, "discarding stale status fetch");
            return None;
        }
        match outcome {
            Ok(complete) => {
                self.set_flag(kind, complete);
                None
            }
            Err(source) => {
                // Fail closed: an unreadable flag keeps the user in onboarding.
                self.set_flag(kind, false);
                let err = GateError::StatusFetch { kind, source };
                warn!(error = %err, "completion status unavailable; treating as incomplete");
                Some(err)
            }
        }
    }

    fn set_flag(&mut self, kind: StatusKind, value: bool) {
        match kind {
            StatusKind::Profile => self.profile_complete = value,
            StatusKind::Investment => self.investment_complete = value,
        }
    }

    /// Snapshot the inputs against a current location.
    #[must_use]
    pub fn snapshot(&self, current: RouteGroup) -> GateSnapshot {
        GateSnapshot {
            initialised: self.initialised,
            session: self.session.clone(),
            profile_complete: self.profile_complete,
            investment_complete: self.investment_complete,
            current,
        }
    }

    /// Run the decision table once and issue at most one redirect.
    ///
    /// Idempotent: re-running on unchanged inputs issues nothing further.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::RedirectLoop`] when the previously issued
    /// redirect to the same target produced no navigation progress; the
    /// redirect is suppressed and will stay suppressed until the session or
    /// the observed route group moves.
    pub fn evaluate(&mut self, navigator: &dyn Navigator) -> Result<GateTarget, GateError> {
        let current = navigator.current_route_group();
        let target = decide(&self.snapshot(current));
        let Some(redirect) = redirect_for(target, current, self.last_issued.map(|i| i.target)) else {
            return Ok(target);
        };
        if let Some(last) = self.last_issued {
            if last.target == target && last.observed == current {
                return Err(GateError::RedirectLoop { target });
            }
        }
        navigator.redirect_to(&redirect);
        self.last_issued = Some(IssuedRedirect { target, observed: current });
        Ok(target)
    }
}

impl Default for SessionGate {
    fn default() -> Self {
        Self::new()
    }
}
