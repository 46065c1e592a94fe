//! Backport pull request creation.

use std::sync::Arc;

use tracing::{info, warn};

use crate::error::{BackportError, PickResult};
use crate::gateway::SourceControlGateway;
use crate::model::{BackportRequest, PullRequest, WorkingBranch};

/// Title of the backport pull request for `target`.
pub fn backport_title(target: &str, pr: &PullRequest) -> String {
    format!("[{}] {}", target, pr.title)
}

/// Body of the backport pull request, linking back to the original.
pub fn backport_body(pr: &PullRequest, server_url: &str) -> String {
    format!("Cherry picked from {}", pr.html_url(server_url))
}

/// Opens (or finds) the pull request from a working branch into its target.
pub struct BackportRequestBuilder {
    gateway: Arc<dyn SourceControlGateway>,
    server_url: String,
    check_existing: bool,
}

impl BackportRequestBuilder {
    pub fn new(gateway: Arc<dyn SourceControlGateway>, server_url: &str) -> Self {
        Self {
            gateway,
            server_url: server_url.trim_end_matches('/').to_string(),
            check_existing: true,
        }
    }

    /// Skip (or perform) the lookup for an already-open pull request.
    pub fn with_existing_check(mut self, enabled: bool) -> Self {
        self.check_existing = enabled;
        self
    }

    /// Ensure a pull request from `branch` into `target` exists and return it.
    ///
    /// The lookup for an open pull request is best-effort: if it fails the
    /// builder logs the error and goes on to create one.
    pub async fn ensure_backport_pr(
        &self,
        branch: &WorkingBranch,
        target: &str,
        pr: &PullRequest,
    ) -> PickResult<BackportRequest> {
        if self.check_existing {
            match self
                .gateway
                .find_open_pull_request(&pr.repo, branch.name(), target)
                .await
            {
                Ok(Some(existing)) => {
                    info!(url = %existing.url, "Pull request is already opened");
                    return Ok(BackportRequest {
                        url: existing.url,
                        reused: true,
                    });
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(error = %e, head = %branch, base = %target, "Lookup of open pull requests failed, creating one");
                }
            }
        }

        let title = backport_title(target, pr);
        info!(base = %target, head = %branch, title = %title, "Opening pull request");

        let url = self
            .gateway
            .create_pull_request(
                &pr.repo,
                &title,
                &backport_body(pr, &self.server_url),
                branch.name(),
                target,
            )
            .await
            .map_err(|e| BackportError::PullRequestCreationFailed {
                head: branch.name().to_string(),
                base: target.to_string(),
                reason: e.to_string(),
            })?;

        info!(url = %url, "Pull request has been opened");
        Ok(BackportRequest { url, reused: false })
    }
}
