//! In-memory fakes for the gateway traits (testing only)
//!
//! [`MemoryGateway`] implements both [`SourceControlGateway`] and
//! [`CommitReplayer`] over plain collections, records every mutating call and
//! lets tests inject failures per operation.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{GatewayError, GatewayResult};
use crate::gateway::{CommitReplayer, SourceControlGateway};
use crate::model::{CommitId, PullRequestSummary, RefCreation, RepoRef};

#[derive(Debug, Default)]
struct State {
    /// Short branch name -> head commit.
    branches: HashMap<String, CommitId>,
    pr_commits: HashMap<u64, Vec<CommitId>>,
    pull_requests: Vec<(PullRequestSummary, String)>,
    next_number: u64,
    comments: Vec<(u64, String)>,
    created_refs: Vec<(String, CommitId)>,
    replays: Vec<(String, Vec<CommitId>)>,
    commit_listings: usize,
    pull_request_lookups: usize,

    branch_lookup_failure: Option<GatewayError>,
    ref_creation_failures: Vec<(String, GatewayError)>,
    replay_failure: Option<GatewayError>,
    lookup_failure: Option<GatewayError>,
    creation_failures: HashMap<String, GatewayError>,
    comment_failures: Vec<(String, GatewayError)>,
}

/// In-memory hosting service.
#[derive(Debug)]
pub struct MemoryGateway {
    state: Mutex<State>,
}

impl Default for MemoryGateway {
    fn default() -> Self {
        Self {
            state: Mutex::new(State {
                next_number: 100,
                ..State::default()
            }),
        }
    }
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    // -- seeding ------------------------------------------------------------

    pub fn add_branch(&self, name: &str, head: &str) {
        let mut state = self.state.lock().unwrap();
        state
            .branches
            .insert(name.to_string(), CommitId::new(head));
    }

    pub fn set_pull_request_commits(&self, number: u64, commits: &[&str]) {
        let mut state = self.state.lock().unwrap();
        state
            .pr_commits
            .insert(number, commits.iter().map(|c| CommitId::new(*c)).collect());
    }

    // -- failure injection --------------------------------------------------

    pub fn fail_branch_lookup(&self, err: GatewayError) {
        self.state.lock().unwrap().branch_lookup_failure = Some(err);
    }

    /// Fail creation of any ref whose name ends with `suffix`.
    pub fn fail_ref_creation(&self, suffix: &str, err: GatewayError) {
        let mut state = self.state.lock().unwrap();
        state.ref_creation_failures.push((suffix.to_string(), err));
    }

    pub fn fail_replay(&self, err: GatewayError) {
        self.state.lock().unwrap().replay_failure = Some(err);
    }

    pub fn fail_pull_request_lookup(&self, err: GatewayError) {
        self.state.lock().unwrap().lookup_failure = Some(err);
    }

    /// Fail opening pull requests into `base`.
    pub fn fail_pull_request_creation(&self, base: &str, err: GatewayError) {
        let mut state = self.state.lock().unwrap();
        state.creation_failures.insert(base.to_string(), err);
    }

    /// Fail posting any comment whose body contains `needle`.
    pub fn fail_comments_containing(&self, needle: &str, err: GatewayError) {
        let mut state = self.state.lock().unwrap();
        state.comment_failures.push((needle.to_string(), err));
    }

    // -- inspection ---------------------------------------------------------

    pub fn has_branch(&self, name: &str) -> bool {
        self.state.lock().unwrap().branches.contains_key(name)
    }

    pub fn branch_head_of(&self, name: &str) -> Option<CommitId> {
        self.state.lock().unwrap().branches.get(name).cloned()
    }

    /// `(git_ref, commit)` for every ref this fake created.
    pub fn created_refs(&self) -> Vec<(String, CommitId)> {
        self.state.lock().unwrap().created_refs.clone()
    }

    /// `(branch, commits)` for every replay request.
    pub fn replays(&self) -> Vec<(String, Vec<CommitId>)> {
        self.state.lock().unwrap().replays.clone()
    }

    /// Number of times a pull request's commits were listed.
    pub fn commit_listings(&self) -> usize {
        self.state.lock().unwrap().commit_listings
    }

    pub fn pull_request_lookups(&self) -> usize {
        self.state.lock().unwrap().pull_request_lookups
    }

    /// Open pull requests, in creation order.
    pub fn pull_requests(&self) -> Vec<PullRequestSummary> {
        let state = self.state.lock().unwrap();
        state.pull_requests.iter().map(|(pr, _)| pr.clone()).collect()
    }

    pub fn pull_request_title(&self, url: &str) -> Option<String> {
        let state = self.state.lock().unwrap();
        state
            .pull_requests
            .iter()
            .find(|(pr, _)| pr.url == url)
            .map(|(_, title)| title.clone())
    }

    /// `(pr number, body)` of every posted comment.
    pub fn comments(&self) -> Vec<(u64, String)> {
        self.state.lock().unwrap().comments.clone()
    }
}

#[async_trait]
impl SourceControlGateway for MemoryGateway {
    async fn branch_head(&self, _repo: &RepoRef, branch: &str) -> GatewayResult<Option<CommitId>> {
        let state = self.state.lock().unwrap();
        if let Some(err) = &state.branch_lookup_failure {
            return Err(err.clone());
        }
        Ok(state.branches.get(branch).cloned())
    }

    async fn create_branch_ref(
        &self,
        _repo: &RepoRef,
        git_ref: &str,
        commit: &CommitId,
    ) -> GatewayResult<RefCreation> {
        let mut state = self.state.lock().unwrap();
        if let Some((_, err)) = state
            .ref_creation_failures
            .iter()
            .find(|(suffix, _)| git_ref.ends_with(suffix.as_str()))
        {
            return Err(err.clone());
        }
        let name = git_ref.strip_prefix("refs/heads/").unwrap_or(git_ref);
        if state.branches.contains_key(name) {
            return Ok(RefCreation::AlreadyExists);
        }
        state.branches.insert(name.to_string(), commit.clone());
        state
            .created_refs
            .push((git_ref.to_string(), commit.clone()));
        Ok(RefCreation::Created)
    }

    async fn pull_request_commits(
        &self,
        _repo: &RepoRef,
        number: u64,
    ) -> GatewayResult<Vec<CommitId>> {
        let mut state = self.state.lock().unwrap();
        state.commit_listings += 1;
        state
            .pr_commits
            .get(&number)
            .cloned()
            .ok_or_else(|| GatewayError::NotFound(format!("pull request #{}", number)))
    }

    async fn find_open_pull_request(
        &self,
        _repo: &RepoRef,
        head: &str,
        base: &str,
    ) -> GatewayResult<Option<PullRequestSummary>> {
        let mut state = self.state.lock().unwrap();
        state.pull_request_lookups += 1;
        if let Some(err) = &state.lookup_failure {
            return Err(err.clone());
        }
        Ok(state
            .pull_requests
            .iter()
            .map(|(pr, _)| pr)
            .find(|pr| pr.head == head && pr.base == base)
            .cloned())
    }

    async fn create_pull_request(
        &self,
        repo: &RepoRef,
        title: &str,
        _body: &str,
        head: &str,
        base: &str,
    ) -> GatewayResult<String> {
        let mut state = self.state.lock().unwrap();
        if let Some(err) = state.creation_failures.get(base) {
            return Err(err.clone());
        }
        if state
            .pull_requests
            .iter()
            .any(|(pr, _)| pr.head == head && pr.base == base)
        {
            return Err(GatewayError::Rejected {
                status: 422,
                message: format!("A pull request already exists for {}:{}", repo.owner, head),
            });
        }
        let number = state.next_number;
        state.next_number += 1;
        let url = format!("https://github.com/{}/{}/pull/{}", repo.owner, repo.name, number);
        state.pull_requests.push((
            PullRequestSummary {
                number,
                url: url.clone(),
                head: head.to_string(),
                base: base.to_string(),
            },
            title.to_string(),
        ));
        Ok(url)
    }

    async fn post_comment(&self, _repo: &RepoRef, number: u64, body: &str) -> GatewayResult<()> {
        let mut state = self.state.lock().unwrap();
        if let Some((_, err)) = state
            .comment_failures
            .iter()
            .find(|(needle, _)| body.contains(needle.as_str()))
        {
            return Err(err.clone());
        }
        state.comments.push((number, body.to_string()));
        Ok(())
    }
}

#[async_trait]
impl CommitReplayer for MemoryGateway {
    async fn replay_commits(
        &self,
        _repo: &RepoRef,
        commits: &[CommitId],
        branch: &str,
    ) -> GatewayResult<CommitId> {
        let mut state = self.state.lock().unwrap();
        state.replays.push((branch.to_string(), commits.to_vec()));
        if let Some(err) = &state.replay_failure {
            return Err(err.clone());
        }
        if !state.branches.contains_key(branch) {
            return Err(GatewayError::NotFound(format!("branch {}", branch)));
        }
        let head = CommitId::new(format!("{}+{}", branch, commits.len()));
        state.branches.insert(branch.to_string(), head.clone());
        Ok(head)
    }
}
