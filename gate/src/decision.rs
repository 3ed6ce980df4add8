//! Pure decision table for the session gate.
//!
//! DESIGN
//! ======
//! `decide` is a pure function over an input snapshot so the routing rules
//! can be unit-tested without any I/O or navigation collaborator. The
//! runtime in `session_gate` owns the side effects and feeds it snapshots.

#[cfg(test)]
#[path = "decision_test.rs"]
mod decision_test;

use crate::route::{GateTarget, OnboardingStep, Redirect, RouteGroup};
use crate::session::Session;

/// Immutable view of every input the decision table reads.
#[derive(Clone, Debug)]
pub struct GateSnapshot {
    /// True once the auth provider completed its first session lookup.
    pub initialised: bool,
    pub session: Option<Session>,
    pub profile_complete: bool,
    pub investment_complete: bool,
    /// Route group the navigation layer currently shows.
    pub current: RouteGroup,
}

/// Compute the target state for a snapshot. Short-circuits top to bottom.
#[must_use]
pub fn decide(snapshot: &GateSnapshot) -> GateTarget {
    if !snapshot.initialised {
        return GateTarget::Loading;
    }
    if snapshot.session.is_none() {
        return GateTarget::Auth;
    }
    // Fresh login lands on the app root first; the next evaluation pushes
    // on to onboarding if a completion flag is still missing.
    if snapshot.current == RouteGroup::Auth {
        return GateTarget::App;
    }
    if !snapshot.profile_complete {
        return GateTarget::Onboarding(OnboardingStep::Profile);
    }
    if !snapshot.investment_complete {
        return GateTarget::Onboarding(OnboardingStep::Investment);
    }
    GateTarget::App
}

/// Derive the redirect intent for a computed target.
///
/// A redirect is needed when the target's group differs from the current
/// location, or when the target moved to a different onboarding step while
/// the group stayed put (the navigation layer cannot report which step it
/// shows, so step movement is detected against the last issued target).
/// `Loading` never redirects.
#[must_use]
pub fn redirect_for(target: GateTarget, current: RouteGroup, last_issued: Option<GateTarget>) -> Option<Redirect> {
    let group = target.route_group()?;
    if group != current {
        return target.redirect();
    }
    match (target, last_issued) {
        (GateTarget::Onboarding(step), Some(GateTarget::Onboarding(prev))) if prev != step => target.redirect(),
        _ => None,
    }
}
