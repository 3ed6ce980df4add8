//! Reactive adapter: subscribes to the input sources and drives the gate.
//!
//! DESIGN
//! ======
//! Event subscription and the pure decision table are kept apart: this loop
//! only moves values between the collaborators and [`SessionGate`]; every
//! routing rule lives in `decision`. Status fetches run concurrently on a
//! separate task, stamped with the generation they were issued under, so a
//! session switch landing mid-flight wins and the stale result is dropped
//! when it arrives.
//!
//! ERROR HANDLING
//! ==============
//! A failed initial session lookup is fatal to deciding: the loop returns
//! the error and the caller keeps showing a loading state and may retry.
//! Fetch failures degrade to `complete = false` inside the gate. Redirect
//! loops are logged and suppressed; the loop itself keeps running.

#[cfg(test)]
#[path = "runner_test.rs"]
mod runner_test;

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::error::{GateError, StatusKind};
use crate::providers::{AuthProvider, Navigator, ProviderError, StatusReader};
use crate::session::Session;
use crate::session_gate::SessionGate;

const RECHECK_QUEUE_CAPACITY: usize = 8;
const STATUS_QUEUE_CAPACITY: usize = 8;

/// Collaborators wired into a gate run.
pub struct GateDeps {
    pub auth: Arc<dyn AuthProvider>,
    pub status: Arc<dyn StatusReader>,
    pub navigator: Arc<dyn Navigator>,
}

/// Handle for poking a running gate from other components.
#[derive(Clone)]
pub struct GateHandle {
    recheck_tx: mpsc::Sender<()>,
}

impl GateHandle {
    /// Ask the gate to re-fetch both completion flags, e.g. after an
    /// onboarding form was submitted and the remote flag flipped.
    pub async fn recheck(&self) {
        let _ = self.recheck_tx.send(()).await;
    }
}

struct StatusUpdate {
    kind: StatusKind,
    generation: u64,
    result: Result<bool, ProviderError>,
}

/// Spawn the gate loop onto the runtime.
///
/// Returns the recheck handle and the join handle; the loop runs until the
/// auth provider's event stream closes.
#[must_use]
pub fn spawn_gate(deps: GateDeps) -> (GateHandle, JoinHandle<Result<(), GateError>>) {
    let (recheck_tx, recheck_rx) = mpsc::channel(RECHECK_QUEUE_CAPACITY);
    let join = tokio::spawn(run_gate(deps, recheck_rx));
    (GateHandle { recheck_tx }, join)
}

/// Drive the gate until the auth provider's event stream closes.
///
/// # Errors
///
/// Returns [`GateError::SessionLookup`] when the initial session lookup
/// fails; nothing has been redirected at that point and the caller may
/// retry with a fresh call.
pub async fn run_gate(deps: GateDeps, mut recheck_rx: mpsc::Receiver<()>) -> Result<(), GateError> {
    let mut gate = SessionGate::new();
    // Subscribe before the one-shot lookup so a login landing in between is
    // not lost; a duplicate value coalesces through the same-user check.
    let mut sessions = deps.auth.subscribe().await;
    let (status_tx, mut status_rx) = mpsc::channel::<StatusUpdate>(STATUS_QUEUE_CAPACITY);

    let initial = deps.auth.current_session().await.map_err(GateError::SessionLookup)?;
    handle_session(&mut gate, &deps, &status_tx, initial);
    evaluate(&mut gate, &deps);

    loop {
        tokio::select! {
            next = sessions.recv() => {
                let Some(next) = next else { break };
                handle_session(&mut gate, &deps, &status_tx, next);
                evaluate(&mut gate, &deps);
            }
            Some(()) = recheck_rx.recv() => {
                if let Some(user_id) = gate.user_id() {
                    debug!(%user_id, "recheck requested");
                    spawn_status_fetch(Arc::clone(&deps.status), user_id, gate.generation(), status_tx.clone());
                }
            }
            Some(update) = status_rx.recv() => {
                apply_status(&mut gate, update);
                evaluate(&mut gate, &deps);
            }
        }
    }

    info!("session stream closed; gate loop ending");
    Ok(())
}

fn handle_session(
    gate: &mut SessionGate,
    deps: &GateDeps,
    status_tx: &mpsc::Sender<StatusUpdate>,
    next: Option<Session>,
) {
    let change = gate.apply_session(next);
    if !change.user_changed {
        return;
    }
    match gate.user_id() {
        Some(user_id) => {
            info!(%user_id, "session user changed; refreshing completion status");
            spawn_status_fetch(Arc::clone(&deps.status), user_id, change.generation, status_tx.clone());
        }
        None => info!("session ended"),
    }
}

fn spawn_status_fetch(
    status: Arc<dyn StatusReader>,
    user_id: Uuid,
    generation: u64,
    tx: mpsc::Sender<StatusUpdate>,
) {
    tokio::spawn(async move {
        // Independent reads keyed by the same user id; issue both at once.
        let (profile, investment) =
            tokio::join!(status.profile_status(user_id), status.investment_status(user_id));
        let _ = tx
            .send(StatusUpdate { kind: StatusKind::Profile, generation, result: profile })
            .await;
        let _ = tx
            .send(StatusUpdate { kind: StatusKind::Investment, generation, result: investment })
            .await;
    });
}

fn apply_status(gate: &mut SessionGate, update: StatusUpdate) {
    // Stale generations and fetch errors are handled (and logged) inside
    // the gate; nothing to propagate here.
    let _ = match update.kind {
        StatusKind::Profile => gate.apply_profile_status(update.generation, update.result),
        StatusKind::Investment => gate.apply_investment_status(update.generation, update.result),
    };
}

fn evaluate(gate: &mut SessionGate, deps: &GateDeps) {
    match gate.evaluate(deps.navigator.as_ref()) {
        Ok(target) => debug!(%target, "gate evaluated"),
        Err(e) => error!(error = %e, "gate evaluation suppressed a redirect"),
    }
}
