//! # backend
//!
//! Adapters for the hosted backend-as-a-service consumed by the session
//! gate: typed environment config, the auth client (password sign-in, token
//! refresh, sign-out, session-change fan-out), and the completion-status
//! reader over the REST row API.

pub mod auth;
pub mod config;
pub mod status;
