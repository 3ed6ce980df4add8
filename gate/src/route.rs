//! Route groups, onboarding steps, and gate targets.

#[cfg(test)]
#[path = "route_test.rs"]
mod route_test;

use serde::{Deserialize, Serialize};

/// Top-level navigation partition gating which screens are reachable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteGroup {
    Auth,
    Onboarding,
    App,
}

impl RouteGroup {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::Onboarding => "onboarding",
            Self::App => "app",
        }
    }
}

impl std::fmt::Display for RouteGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a route group from text.
#[derive(Debug, thiserror::Error)]
#[error("unknown route group: {0}")]
pub struct ParseRouteGroupError(String);

impl std::str::FromStr for RouteGroup {
    type Err = ParseRouteGroupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auth" => Ok(Self::Auth),
            "onboarding" => Ok(Self::Onboarding),
            "app" => Ok(Self::App),
            other => Err(ParseRouteGroupError(other.to_owned())),
        }
    }
}

/// Onboarding sub-destination within the `Onboarding` route group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnboardingStep {
    Profile,
    Investment,
}

impl OnboardingStep {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Profile => "profile",
            Self::Investment => "investment",
        }
    }
}

impl std::fmt::Display for OnboardingStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State-machine position computed by the decision table.
///
/// `Loading` is the pre-initialisation state and never maps to a redirect;
/// the other variants correspond one-to-one with where the client should be.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateTarget {
    Loading,
    Auth,
    Onboarding(OnboardingStep),
    App,
}

impl GateTarget {
    /// Route group this target lives in. `None` while still loading.
    #[must_use]
    pub fn route_group(self) -> Option<RouteGroup> {
        match self {
            Self::Loading => None,
            Self::Auth => Some(RouteGroup::Auth),
            Self::Onboarding(_) => Some(RouteGroup::Onboarding),
            Self::App => Some(RouteGroup::App),
        }
    }

    /// Redirect intent that moves the client to this target.
    #[must_use]
    pub fn redirect(self) -> Option<Redirect> {
        match self {
            Self::Loading => None,
            Self::Auth => Some(Redirect { group: RouteGroup::Auth, step: None }),
            Self::Onboarding(step) => Some(Redirect { group: RouteGroup::Onboarding, step: Some(step) }),
            Self::App => Some(Redirect { group: RouteGroup::App, step: None }),
        }
    }
}

impl std::fmt::Display for GateTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Loading => f.write_str("loading"),
            Self::Auth => f.write_str("auth"),
            Self::Onboarding(step) => write!(f, "onboarding:{step}"),
            Self::App => f.write_str("app"),
        }
    }
}

/// Redirect intent handed to the navigation collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Redirect {
    pub group: RouteGroup,
    pub step: Option<OnboardingStep>,
}
