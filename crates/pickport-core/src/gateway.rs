//! Capability traits over the hosting service.
//!
//! The workflow never talks to the network directly: every component receives
//! a [`SourceControlGateway`] (and the provisioner a [`CommitReplayer`]) and
//! only calls through it. Inject the GitHub client in production or
//! [`crate::fakes::MemoryGateway`] in tests.

use async_trait::async_trait;

use crate::error::GatewayResult;
use crate::model::{CommitId, PullRequestSummary, RefCreation, RepoRef};

/// Read/write operations on branches, pull requests and comments.
#[async_trait]
pub trait SourceControlGateway: Send + Sync {
    /// Current head commit of `branch`, or `None` when the branch does not exist.
    async fn branch_head(&self, repo: &RepoRef, branch: &str) -> GatewayResult<Option<CommitId>>;

    /// Create `git_ref` (fully qualified, `refs/heads/...`) pointing at `commit`.
    ///
    /// An existing ref is reported as [`RefCreation::AlreadyExists`], never as an error.
    async fn create_branch_ref(
        &self,
        repo: &RepoRef,
        git_ref: &str,
        commit: &CommitId,
    ) -> GatewayResult<RefCreation>;

    /// Commits of pull request `number`, oldest first.
    async fn pull_request_commits(&self, repo: &RepoRef, number: u64)
        -> GatewayResult<Vec<CommitId>>;

    /// First open pull request from `head` into `base`.
    async fn find_open_pull_request(
        &self,
        repo: &RepoRef,
        head: &str,
        base: &str,
    ) -> GatewayResult<Option<PullRequestSummary>>;

    /// Open a pull request and return its web URL.
    async fn create_pull_request(
        &self,
        repo: &RepoRef,
        title: &str,
        body: &str,
        head: &str,
        base: &str,
    ) -> GatewayResult<String>;

    /// Post `body` as a comment on pull request `number`.
    async fn post_comment(&self, repo: &RepoRef, number: u64, body: &str) -> GatewayResult<()>;
}

/// Replays commits onto a branch, one three-way merge per commit.
#[async_trait]
pub trait CommitReplayer: Send + Sync {
    /// Replay `commits` in order onto `branch` (short name) and return the new head.
    ///
    /// On failure the branch is left wherever the replay stopped.
    async fn replay_commits(
        &self,
        repo: &RepoRef,
        commits: &[CommitId],
        branch: &str,
    ) -> GatewayResult<CommitId>;
}
