//! Working branch provisioning.
//!
//! [`BranchProvisioner`] makes sure the deterministic working branch for a
//! (pull request, target) pair exists and carries the pull request's commits.
//! Creation is idempotent: when the branch already exists the replay is not
//! repeated, so a re-run resumes where the previous one left off.

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::{BackportError, PickResult};
use crate::gateway::{CommitReplayer, SourceControlGateway};
use crate::model::{PullRequest, RefCreation, WorkingBranch};

/// Ensures working branches exist at the head of their target branch.
pub struct BranchProvisioner {
    gateway: Arc<dyn SourceControlGateway>,
    replayer: Arc<dyn CommitReplayer>,
    branch_prefix: String,
}

impl BranchProvisioner {
    pub fn new(
        gateway: Arc<dyn SourceControlGateway>,
        replayer: Arc<dyn CommitReplayer>,
        branch_prefix: &str,
    ) -> Self {
        Self {
            gateway,
            replayer,
            branch_prefix: branch_prefix.to_string(),
        }
    }

    /// Working branch `target` resolves to, without touching the gateway.
    pub fn working_branch(&self, target: &str, pr: &PullRequest) -> WorkingBranch {
        WorkingBranch::for_target(&self.branch_prefix, pr, target)
    }

    /// Ensure the working branch for `target` exists.
    ///
    /// Returns the branch and `true` when this call created it (and replayed
    /// the pull request's commits onto it), `false` when it already existed.
    /// A partially replayed branch is left in place on `ReplayFailed`.
    pub async fn ensure_working_branch(
        &self,
        target: &str,
        pr: &PullRequest,
    ) -> PickResult<(WorkingBranch, bool)> {
        let target_head = self
            .gateway
            .branch_head(&pr.repo, target)
            .await?
            .ok_or_else(|| BackportError::TargetBranchNotFound {
                branch: target.to_string(),
            })?;

        let branch = self.working_branch(target, pr);
        info!(
            branch = %branch,
            base = %target_head.short(),
            "Creating working branch"
        );

        let creation = self
            .gateway
            .create_branch_ref(&pr.repo, &branch.git_ref(), &target_head)
            .await
            .map_err(|e| BackportError::BranchCreationFailed {
                branch: branch.name().to_string(),
                reason: e.to_string(),
            })?;

        match creation {
            RefCreation::AlreadyExists => {
                info!(branch = %branch, "Working branch already exists, skipping cherry-pick");
                Ok((branch, false))
            }
            RefCreation::Created => {
                let commits = self.gateway.pull_request_commits(&pr.repo, pr.number).await?;
                debug!(branch = %branch, commits = commits.len(), "Cherry-picking commits");

                let new_head = self
                    .replayer
                    .replay_commits(&pr.repo, &commits, branch.name())
                    .await
                    .map_err(|e| BackportError::ReplayFailed {
                        branch: branch.name().to_string(),
                        reason: e.to_string(),
                    })?;

                info!(branch = %branch, head = %new_head.short(), "New head after cherry-pick");
                Ok((branch, true))
            }
        }
    }
}
