//! [`SourceControlGateway`] over the GitHub REST API.

use async_trait::async_trait;
use pickport_core::{
    CommitId, GatewayError, GatewayResult, PullRequestSummary, RefCreation, RepoRef,
    SourceControlGateway,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use crate::client::GitHubClient;
use crate::error::GitHubError;
use crate::Result;

/// Page size used when listing pull request commits.
const COMMITS_PER_PAGE: usize = 100;

#[derive(Debug, Deserialize)]
pub(crate) struct GitObject {
    pub sha: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GitRef {
    pub object: GitObject,
}

#[derive(Debug, Deserialize)]
struct PullCommit {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct BranchLabel {
    #[serde(rename = "ref")]
    name: String,
}

#[derive(Debug, Deserialize)]
struct Pull {
    number: u64,
    html_url: String,
    head: BranchLabel,
    base: BranchLabel,
}

impl From<Pull> for PullRequestSummary {
    fn from(pull: Pull) -> Self {
        PullRequestSummary {
            number: pull.number,
            url: pull.html_url,
            head: pull.head.name,
            base: pull.base.name,
        }
    }
}

pub(crate) fn repo_path(repo: &RepoRef) -> String {
    format!("/repos/{}/{}", repo.owner, repo.name)
}

/// Branch name as a URL path, each segment percent-encoded.
///
/// Git allows `#`, `%` and `?` in branch names; unencoded they would end
/// the path early. `/` stays a separator.
pub(crate) fn branch_path(branch: &str) -> String {
    branch
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// `true` when a ref creation failed only because the ref is already there.
fn is_reference_exists(err: &GitHubError) -> bool {
    matches!(
        err,
        GitHubError::Api { status: 422, message } if message.contains("Reference already exists")
    )
}

impl GitHubClient {
    /// Head commit of `branch`, `None` on 404.
    pub async fn branch_head_sha(&self, repo: &RepoRef, branch: &str) -> Result<Option<String>> {
        let path = format!("{}/git/ref/heads/{}", repo_path(repo), branch_path(branch));
        match self.get_json::<GitRef>(&path, &[]).await {
            Ok(git_ref) => Ok(Some(git_ref.object.sha)),
            Err(err) if err.status() == Some(404) => Ok(None),
            Err(err) => Err(err),
        }
    }
}

#[async_trait]
impl SourceControlGateway for GitHubClient {
    async fn branch_head(&self, repo: &RepoRef, branch: &str) -> GatewayResult<Option<CommitId>> {
        info!(branch = %branch, "Getting latest commit for branch");
        Ok(self.branch_head_sha(repo, branch).await?.map(CommitId))
    }

    async fn create_branch_ref(
        &self,
        repo: &RepoRef,
        git_ref: &str,
        commit: &CommitId,
    ) -> GatewayResult<RefCreation> {
        info!(git_ref = %git_ref, sha = %commit, "Creating branch");
        let path = format!("{}/git/refs", repo_path(repo));
        let body = json!({ "ref": git_ref, "sha": commit.as_str() });
        match self.post_json::<GitRef>(&path, &body).await {
            Ok(_) => Ok(RefCreation::Created),
            Err(err) if is_reference_exists(&err) => Ok(RefCreation::AlreadyExists),
            Err(err) => Err(err.into()),
        }
    }

    async fn pull_request_commits(
        &self,
        repo: &RepoRef,
        number: u64,
    ) -> GatewayResult<Vec<CommitId>> {
        let path = format!("{}/pulls/{}/commits", repo_path(repo), number);
        let mut commits = Vec::new();
        let mut page = 1u32;
        loop {
            let batch: Vec<PullCommit> = self
                .get_json(
                    &path,
                    &[
                        ("per_page", COMMITS_PER_PAGE.to_string()),
                        ("page", page.to_string()),
                    ],
                )
                .await?;
            let done = batch.len() < COMMITS_PER_PAGE;
            commits.extend(batch.into_iter().map(|c| CommitId(c.sha)));
            if done {
                break;
            }
            page += 1;
        }
        debug!(pr = number, commits = commits.len(), "Listed pull request commits");
        Ok(commits)
    }

    async fn find_open_pull_request(
        &self,
        repo: &RepoRef,
        head: &str,
        base: &str,
    ) -> GatewayResult<Option<PullRequestSummary>> {
        debug!(head = %head, base = %base, "Checking if pull request exists");
        let path = format!("{}/pulls", repo_path(repo));
        let pulls: Vec<Pull> = self
            .get_json(
                &path,
                &[
                    ("state", "open".to_string()),
                    ("head", format!("{}:{}", repo.owner, head)),
                    ("base", base.to_string()),
                ],
            )
            .await?;
        Ok(pulls.into_iter().next().map(PullRequestSummary::from))
    }

    async fn create_pull_request(
        &self,
        repo: &RepoRef,
        title: &str,
        body: &str,
        head: &str,
        base: &str,
    ) -> GatewayResult<String> {
        let path = format!("{}/pulls", repo_path(repo));
        let request = json!({
            "title": title,
            "body": body,
            "head": head,
            "base": base,
        });
        let pull: Pull = self.post_json(&path, &request).await?;
        Ok(pull.html_url)
    }

    async fn post_comment(&self, repo: &RepoRef, number: u64, body: &str) -> GatewayResult<()> {
        info!(pr = number, "Commenting on pull request");
        let path = format!("{}/pulls/{}/reviews", repo_path(repo), number);
        let request = json!({ "event": "COMMENT", "body": body });
        self.post_json::<serde_json::Value>(&path, &request)
            .await
            .map(|_| ())
            .map_err(GatewayError::from)
    }
}
