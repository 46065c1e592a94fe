//! Cherry-picking through the Git Data API.
//!
//! GitHub has no cherry-pick endpoint, so each commit is replayed as a merge
//! against a temporary "sibling" commit:
//!
//! 1. create a sibling of the picked commit: head tree, picked commit's parent;
//! 2. force the working branch onto the sibling and merge the picked commit
//!    into it, which yields the three-way-merged tree;
//! 3. commit that tree on top of the previous head with the picked commit's
//!    message and author, and force the branch onto the result.
//!
//! A merge conflict stops the replay with the branch pointing at the sibling.

use async_trait::async_trait;
use pickport_core::{CommitId, CommitReplayer, GatewayResult, RepoRef};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use crate::client::GitHubClient;
use crate::error::GitHubError;
use crate::gateway::{branch_path, repo_path, GitObject};
use crate::Result;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Signature {
    name: String,
    email: String,
    date: String,
}

#[derive(Debug, Deserialize)]
struct GitCommit {
    sha: String,
    tree: GitObject,
    parents: Vec<GitObject>,
    message: String,
    author: Signature,
}

/// Commit returned by `POST /merges`.
#[derive(Debug, Deserialize)]
struct MergeCommit {
    commit: MergeCommitDetail,
}

#[derive(Debug, Deserialize)]
struct MergeCommitDetail {
    tree: GitObject,
}

/// Branch head as tracked during a replay.
#[derive(Debug, Clone)]
struct Head {
    sha: String,
    tree: String,
}

/// Single parent of a commit that can be cherry-picked.
fn pick_parent(commit: &GitCommit) -> Result<&str> {
    match commit.parents.as_slice() {
        [parent] => Ok(parent.sha.as_str()),
        [] => Err(GitHubError::Unpickable {
            sha: commit.sha.clone(),
            reason: "root commits have no parent to diff against".to_string(),
        }),
        _ => Err(GitHubError::Unpickable {
            sha: commit.sha.clone(),
            reason: "merge commits are not supported".to_string(),
        }),
    }
}

impl GitHubClient {
    async fn git_commit(&self, repo: &RepoRef, sha: &str) -> Result<GitCommit> {
        let path = format!("{}/git/commits/{}", repo_path(repo), sha);
        self.get_json(&path, &[]).await
    }

    async fn create_commit(&self, repo: &RepoRef, body: serde_json::Value) -> Result<String> {
        let path = format!("{}/git/commits", repo_path(repo));
        let created: GitObject = self.post_json(&path, &body).await?;
        Ok(created.sha)
    }

    async fn force_branch(&self, repo: &RepoRef, branch: &str, sha: &str) -> Result<()> {
        let path = format!("{}/git/refs/heads/{}", repo_path(repo), branch_path(branch));
        self.patch(&path, &json!({ "sha": sha, "force": true })).await
    }

    /// Merge `sha` into `branch` and return the merged tree.
    async fn merge_tree(&self, repo: &RepoRef, branch: &str, sha: &str) -> Result<String> {
        let path = format!("{}/merges", repo_path(repo));
        let body = json!({
            "base": branch,
            "head": sha,
            "commit_message": format!("Merge {} into {}", sha, branch),
        });
        match self.post_json_optional::<MergeCommit>(&path, &body).await? {
            Some(merge) => Ok(merge.commit.tree.sha),
            None => Err(GitHubError::Unpickable {
                sha: sha.to_string(),
                reason: format!("already contained in {}", branch),
            }),
        }
    }

    /// Replay one commit on top of `head`, returning the new head.
    async fn cherry_pick_one(
        &self,
        repo: &RepoRef,
        branch: &str,
        head: &Head,
        sha: &str,
    ) -> Result<Head> {
        let commit = self.git_commit(repo, sha).await?;
        let parent = pick_parent(&commit)?;

        let sibling = self
            .create_commit(
                repo,
                json!({
                    "message": format!("Sibling of {}", commit.sha),
                    "tree": head.tree,
                    "parents": [parent],
                }),
            )
            .await?;
        self.force_branch(repo, branch, &sibling).await?;

        let tree = self.merge_tree(repo, branch, &commit.sha).await?;

        let picked = self
            .create_commit(
                repo,
                json!({
                    "message": commit.message,
                    "tree": tree,
                    "parents": [head.sha],
                    "author": commit.author,
                }),
            )
            .await?;
        self.force_branch(repo, branch, &picked).await?;

        debug!(commit = %sha, picked = %picked, "Cherry-picked commit");
        Ok(Head { sha: picked, tree })
    }

    /// Cherry-pick `commits` in order onto `branch`.
    pub async fn cherry_pick_commits(
        &self,
        repo: &RepoRef,
        commits: &[CommitId],
        branch: &str,
    ) -> Result<String> {
        info!(branch = %branch, commits = commits.len(), "Cherry picking commits");
        let head_sha = self
            .branch_head_sha(repo, branch)
            .await?
            .ok_or_else(|| GitHubError::Api {
                status: 404,
                message: format!("branch {} does not exist", branch),
            })?;
        let head_commit = self.git_commit(repo, &head_sha).await?;
        let mut head = Head {
            sha: head_sha,
            tree: head_commit.tree.sha,
        };

        for commit in commits {
            head = self
                .cherry_pick_one(repo, branch, &head, commit.as_str())
                .await?;
        }
        Ok(head.sha)
    }
}

#[async_trait]
impl CommitReplayer for GitHubClient {
    async fn replay_commits(
        &self,
        repo: &RepoRef,
        commits: &[CommitId],
        branch: &str,
    ) -> GatewayResult<CommitId> {
        Ok(CommitId(self.cherry_pick_commits(repo, commits, branch).await?))
    }
}
