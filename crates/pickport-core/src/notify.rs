//! Notifications posted back on the originating pull request.

use std::sync::Arc;

use crate::error::{BackportError, PickResult};
use crate::gateway::SourceControlGateway;
use crate::model::{BackportRequest, PullRequest, RunContext};

/// Message reporting the backport pull request for `target`.
pub fn success_message(ctx: &RunContext, target: &str, request: &BackportRequest) -> String {
    if request.reused {
        format!(
            "@{} 👉 Pull request targeting {} already exists: {}",
            ctx.mention, target, request.url
        )
    } else {
        format!(
            "@{} 👉 Created pull request targeting {}: {}",
            ctx.mention, target, request.url
        )
    }
}

/// Message reporting that backporting onto `target` failed.
pub fn failure_message(ctx: &RunContext, target: &str, error: &BackportError) -> String {
    format!(
        "🚨 @{} Failed to create cherry-pick PR targeting {} due to error '{}'. Check {}",
        ctx.mention, target, error, ctx.diagnostics_url
    )
}

/// Posts notifications through the gateway.
pub struct Notifier {
    gateway: Arc<dyn SourceControlGateway>,
}

impl Notifier {
    pub fn new(gateway: Arc<dyn SourceControlGateway>) -> Self {
        Self { gateway }
    }

    /// Post `body` on the pull request.
    pub async fn notify(&self, pr: &PullRequest, body: &str) -> PickResult<()> {
        self.gateway
            .post_comment(&pr.repo, pr.number, body)
            .await
            .map_err(|e| BackportError::NotificationFailed {
                number: pr.number,
                reason: e.to_string(),
            })
    }
}
