//! Structured observability hooks for backport runs.
//!
//! This module provides:
//! - A run-scoped tracing span
//! - Emission functions for lifecycle events: run start, per-target state
//!   transitions, notification failures and run completion
//!
//! Events are emitted at `info!` level unless noted (filter via `RUST_LOG`).

use std::fmt;

use tracing::{info, warn, Span};

/// Span that tags every event of a run with the repository, pull request and run id.
///
/// Attach it to the run future with `tracing::Instrument::instrument` so it
/// stays correct across `.await` points.
pub fn run_span(repo: &str, pr: u64, run_id: &str) -> Span {
    tracing::info_span!("pickport.run", repo = %repo, pr = pr, run_id = %run_id)
}

/// Per-target workflow state.
///
/// `Pending → Provisioning → RequestBuilding → Notifying → Done`, or `Failed`
/// from any step. A failed target is never retried within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetState {
    Pending,
    Provisioning,
    RequestBuilding,
    Notifying,
    Done,
    Failed,
}

impl TargetState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetState::Pending => "pending",
            TargetState::Provisioning => "provisioning",
            TargetState::RequestBuilding => "request_building",
            TargetState::Notifying => "notifying",
            TargetState::Done => "done",
            TargetState::Failed => "failed",
        }
    }
}

impl fmt::Display for TargetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Emit event: run started with the number of extracted targets.
pub fn emit_run_started(pr: u64, targets: usize) {
    info!(event = "run.started", pr = pr, targets = targets);
}

/// Emit event: a target moved to a new state.
pub fn emit_target_state(target: &str, state: TargetState) {
    info!(event = "target.state", target = %target, state = %state);
}

/// Emit event: a target finished, successfully or not.
pub fn emit_target_finished(target: &str, success: bool, detail: &str) {
    if success {
        info!(event = "target.finished", target = %target, success = true, url = %detail);
    } else {
        warn!(event = "target.finished", target = %target, success = false, error = %detail);
    }
}

/// Emit event: posting a notification failed (warning level).
pub fn emit_notification_failed(target: &str, error: &dyn fmt::Display) {
    warn!(event = "notification.failed", target = %target, error = %error);
}

/// Emit event: run finished with the aggregated outcome.
pub fn emit_run_finished(pr: u64, succeeded: usize, failed: usize) {
    info!(
        event = "run.finished",
        pr = pr,
        succeeded = succeeded,
        failed = failed,
        success = failed == 0,
    );
}
