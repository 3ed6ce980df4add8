//! # gate
//!
//! Session-gated navigation for the construction-tracking client: decides
//! which route group (auth / onboarding / app) the signed-in homeowner may
//! see, based on the live session and two remotely stored onboarding
//! completion flags.
//!
//! The crate splits into a pure decision table (`decision`), a runtime that
//! owns the inputs and the redirect side effect (`session_gate`), and a
//! reactive adapter that wires both to the auth provider, status reader,
//! and navigation collaborators (`runner`).

pub mod decision;
pub mod error;
pub mod providers;
pub mod route;
pub mod runner;
pub mod session;
pub mod session_gate;
