//! Error types for pickport-github

use pickport_core::{ConfigError, GatewayError};
use thiserror::Error;

/// Errors that can occur talking to GitHub or reading its payloads
#[derive(Error, Debug)]
pub enum GitHubError {
    /// Network or TLS failure
    #[error("HTTP error: {0}")]
    Http(String),

    /// GitHub answered with a non-success status
    #[error("GitHub API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Unexpected response or payload shape
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The event payload has no `pull_request` section
    #[error("event payload does not describe a pull request")]
    MissingPullRequest,

    /// A commit cannot be cherry-picked through the API
    #[error("cannot cherry-pick {sha}: {reason}")]
    Unpickable { sha: String, reason: String },
}

impl From<reqwest::Error> for GitHubError {
    fn from(err: reqwest::Error) -> Self {
        GitHubError::Http(err.to_string())
    }
}

impl GitHubError {
    /// HTTP status of an API error.
    pub fn status(&self) -> Option<u16> {
        match self {
            GitHubError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<GitHubError> for GatewayError {
    fn from(err: GitHubError) -> Self {
        match err {
            GitHubError::Api { status: 404, message } => GatewayError::NotFound(message),
            GitHubError::Api { status: 409, message } => GatewayError::Conflict(message),
            GitHubError::Api { status, message } => GatewayError::Rejected { status, message },
            unpickable @ GitHubError::Unpickable { .. } => GatewayError::Rejected {
                status: 422,
                message: unpickable.to_string(),
            },
            other => GatewayError::Transport(other.to_string()),
        }
    }
}

impl From<GitHubError> for ConfigError {
    fn from(err: GitHubError) -> Self {
        ConfigError::MalformedPayload(err.to_string())
    }
}
