//! Domain types shared by the backport workflow.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::naming::working_branch_name;

/// Owner/name pair identifying a hosted repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// The pull request that triggered the run. Read-only for the whole run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    /// Name of the branch the pull request was opened from.
    pub head_ref: String,
    /// Label names in the order the hosting service returned them.
    pub labels: Vec<String>,
    /// Login of the pull request author.
    pub author: String,
    /// Repository the pull request was opened against.
    pub repo: RepoRef,
}

impl PullRequest {
    /// Canonical web URL of this pull request.
    pub fn html_url(&self, server_url: &str) -> String {
        format!(
            "{}/{}/{}/pull/{}",
            server_url.trim_end_matches('/'),
            self.repo.owner,
            self.repo.name,
            self.number
        )
    }
}

/// Git object identifier of a commit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommitId(pub String);

impl CommitId {
    pub fn new(sha: impl Into<String>) -> Self {
        CommitId(sha.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Abbreviated form (first 7 chars).
    pub fn short(&self) -> &str {
        self.0.get(..7).unwrap_or(&self.0)
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CommitId {
    fn from(s: &str) -> Self {
        CommitId(s.to_string())
    }
}

/// Branch the workflow owns for one (pull request, target) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkingBranch {
    name: String,
}

impl WorkingBranch {
    /// Derive the working branch for `target` from the pull request.
    pub fn for_target(branch_prefix: &str, pr: &PullRequest, target: &str) -> Self {
        Self {
            name: working_branch_name(branch_prefix, pr.number, &pr.head_ref, target),
        }
    }

    /// Short branch name, as used for `head` when opening a pull request.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fully qualified ref (`refs/heads/<name>`).
    pub fn git_ref(&self) -> String {
        format!("refs/heads/{}", self.name)
    }
}

impl fmt::Display for WorkingBranch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Outcome of asking the gateway to create a branch ref.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefCreation {
    Created,
    AlreadyExists,
}

/// Open pull request as returned by a lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestSummary {
    pub number: u64,
    pub url: String,
    pub head: String,
    pub base: String,
}

/// Result of ensuring a backport pull request exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackportRequest {
    pub url: String,
    /// `true` when an open pull request was found instead of creating one.
    pub reused: bool,
}

/// Per-target outcome of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BackportResult {
    /// A new backport pull request was opened.
    Created { url: String },
    /// An open backport pull request from a previous run was found.
    AlreadyExisted { url: String },
    /// Processing stopped at some step; `kind` names the error variant.
    Failed { kind: String, reason: String },
}

impl BackportResult {
    pub fn is_failed(&self) -> bool {
        matches!(self, BackportResult::Failed { .. })
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            BackportResult::Created { url } | BackportResult::AlreadyExisted { url } => Some(url),
            BackportResult::Failed { .. } => None,
        }
    }
}

/// What happened to one target branch during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetReport {
    pub target: String,
    pub working_branch: String,
    /// `Some(true)` when the working branch was created by this run,
    /// `None` when processing failed before the branch was resolved.
    pub branch_created: Option<bool>,
    pub result: BackportResult,
    /// Whether the notification for this target was posted.
    pub notified: bool,
}

/// Aggregated outcome of one workflow run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub repo: RepoRef,
    pub pull_request: u64,
    pub targets: Vec<TargetReport>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    /// `true` when at least one target failed.
    pub fn failed(&self) -> bool {
        self.targets.iter().any(|t| t.result.is_failed())
    }

    pub fn failed_count(&self) -> usize {
        self.targets.iter().filter(|t| t.result.is_failed()).count()
    }

    pub fn succeeded_count(&self) -> usize {
        self.targets.len() - self.failed_count()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Per-invocation context that does not belong to the pull request itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    /// Identifier of the current CI run.
    pub run_id: String,
    /// Login mentioned in notifications.
    pub mention: String,
    /// Where a human can inspect this run's logs.
    pub diagnostics_url: String,
}

impl RunContext {
    /// Build the context for a GitHub Actions style run.
    ///
    /// `actor` falls back to the pull request author when absent.
    pub fn new(server_url: &str, pr: &PullRequest, run_id: &str, actor: Option<&str>) -> Self {
        let diagnostics_url = format!(
            "{}/{}/{}/actions/runs/{}",
            server_url.trim_end_matches('/'),
            pr.repo.owner,
            pr.repo.name,
            run_id
        );
        Self {
            run_id: run_id.to_string(),
            mention: actor
                .filter(|a| !a.is_empty())
                .unwrap_or(&pr.author)
                .to_string(),
            diagnostics_url,
        }
    }
}
