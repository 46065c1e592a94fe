//! pickport-github: GitHub integration for pickport
//!
//! Implements the `pickport-core` collaborator traits on top of the GitHub
//! REST API:
//!
//! - [`GitHubClient`] is a [`pickport_core::SourceControlGateway`] (refs,
//!   pull requests, review comments) and a [`pickport_core::CommitReplayer`]
//!   (cherry-picks through the Git Data API)
//! - [`event`] reads the GitHub Actions `pull_request` event payload

pub mod client;
pub mod error;
pub mod event;
pub mod gateway;
pub mod replay;

pub use client::{GitHubClient, GitHubConfig, DEFAULT_API_URL};
pub use error::GitHubError;
pub use event::{pull_request_from_json, pull_request_from_path};

/// Result type for GitHub operations
pub type Result<T> = std::result::Result<T, GitHubError>;
