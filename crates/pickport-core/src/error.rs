//! Error types for backport orchestration.
//!
//! [`BackportError`] is the per-target taxonomy: every failure that happens
//! while processing one target branch is one of these variants and is
//! converted into a failure notification by the orchestrator.
//! [`GatewayError`] is what the hosting-service collaborators report.

use thiserror::Error;

/// Errors raised while backporting a pull request onto a single target.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackportError {
    /// The target branch does not exist in the repository.
    #[error("target branch '{branch}' was not found")]
    TargetBranchNotFound { branch: String },

    /// Creating the working branch failed for a reason other than "already exists".
    #[error("failed to create branch '{branch}': {reason}")]
    BranchCreationFailed { branch: String, reason: String },

    /// Replaying the pull request's commits onto the working branch failed.
    #[error("failed to cherry-pick commits onto '{branch}': {reason}")]
    ReplayFailed { branch: String, reason: String },

    /// Opening the backport pull request failed.
    #[error("failed to open pull request from '{head}' into '{base}': {reason}")]
    PullRequestCreationFailed {
        head: String,
        base: String,
        reason: String,
    },

    /// Posting a notification on the originating pull request failed.
    #[error("failed to notify pull request #{number}: {reason}")]
    NotificationFailed { number: u64, reason: String },

    /// Network or authentication problem surfaced by the gateway.
    #[error("gateway error: {0}")]
    GatewayTransport(String),
}

impl BackportError {
    /// Short machine-readable name of the variant, used in logs and reports.
    pub fn kind(&self) -> &'static str {
        match self {
            BackportError::TargetBranchNotFound { .. } => "target_branch_not_found",
            BackportError::BranchCreationFailed { .. } => "branch_creation_failed",
            BackportError::ReplayFailed { .. } => "replay_failed",
            BackportError::PullRequestCreationFailed { .. } => "pull_request_creation_failed",
            BackportError::NotificationFailed { .. } => "notification_failed",
            BackportError::GatewayTransport(_) => "gateway_transport",
        }
    }
}

impl From<GatewayError> for BackportError {
    fn from(err: GatewayError) -> Self {
        BackportError::GatewayTransport(err.to_string())
    }
}

/// Errors reported by a [`crate::gateway::SourceControlGateway`] or
/// [`crate::gateway::CommitReplayer`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The resource being created already exists.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// A merge could not be completed without manual conflict resolution.
    #[error("merge conflict: {0}")]
    Conflict(String),

    /// The hosting service refused the request.
    #[error("request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// Network, TLS or decoding failure.
    #[error("transport error: {0}")]
    Transport(String),
}

/// Errors that abort a run before any target is processed.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A configuration value is unusable.
    #[error("invalid configuration: {0}")]
    Invalid(String),

    /// The triggering pull request could not be read.
    #[error("malformed pull request payload: {0}")]
    MalformedPayload(String),
}

/// Convenience result alias for per-target operations.
pub type PickResult<T> = std::result::Result<T, BackportError>;

/// Convenience result alias for collaborator calls.
pub type GatewayResult<T> = std::result::Result<T, GatewayError>;
