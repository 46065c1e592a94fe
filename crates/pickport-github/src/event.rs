//! GitHub Actions `pull_request` event payload.
//!
//! Only the fields the backport workflow needs are deserialized; everything
//! else in the payload is ignored.

use std::path::Path;

use pickport_core::{PullRequest, RepoRef};
use serde::Deserialize;

use crate::error::GitHubError;
use crate::Result;

#[derive(Debug, Deserialize)]
struct EventPayload {
    pull_request: Option<PullRequestPayload>,
}

#[derive(Debug, Deserialize)]
struct PullRequestPayload {
    number: u64,
    title: String,
    head: HeadPayload,
    base: BasePayload,
    #[serde(default)]
    labels: Vec<LabelPayload>,
    user: UserPayload,
}

#[derive(Debug, Deserialize)]
struct HeadPayload {
    #[serde(rename = "ref")]
    name: String,
}

#[derive(Debug, Deserialize)]
struct BasePayload {
    repo: RepoPayload,
}

#[derive(Debug, Deserialize)]
struct RepoPayload {
    name: String,
    owner: UserPayload,
}

#[derive(Debug, Deserialize)]
struct LabelPayload {
    name: String,
}

#[derive(Debug, Deserialize)]
struct UserPayload {
    login: String,
}

impl From<PullRequestPayload> for PullRequest {
    fn from(payload: PullRequestPayload) -> Self {
        PullRequest {
            number: payload.number,
            title: payload.title,
            head_ref: payload.head.name,
            labels: payload.labels.into_iter().map(|l| l.name).collect(),
            author: payload.user.login,
            repo: RepoRef::new(payload.base.repo.owner.login, payload.base.repo.name),
        }
    }
}

/// Parse the pull request out of an event payload.
pub fn pull_request_from_json(json: &str) -> Result<PullRequest> {
    let payload: EventPayload = serde_json::from_str(json)?;
    payload
        .pull_request
        .map(PullRequest::from)
        .ok_or(GitHubError::MissingPullRequest)
}

/// Read and parse the event payload file (`GITHUB_EVENT_PATH`).
pub fn pull_request_from_path(path: &Path) -> Result<PullRequest> {
    let json = std::fs::read_to_string(path)?;
    pull_request_from_json(&json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const EVENT: &str = r#"{
        "action": "closed",
        "number": 42,
        "pull_request": {
            "number": 42,
            "title": "Handle empty manifests",
            "merged": true,
            "user": { "login": "octocat" },
            "head": { "ref": "feature-x", "sha": "ffff" },
            "base": {
                "ref": "main",
                "repo": { "name": "widgets", "full_name": "acme/widgets", "owner": { "login": "acme" } }
            },
            "labels": [
                { "id": 1, "name": "bug" },
                { "id": 2, "name": "cherry-pick:release-1.0" }
            ]
        }
    }"#;

    #[test]
    fn test_parses_pull_request_event() {
        let pr = pull_request_from_json(EVENT).unwrap();
        assert_eq!(pr.number, 42);
        assert_eq!(pr.title, "Handle empty manifests");
        assert_eq!(pr.head_ref, "feature-x");
        assert_eq!(pr.author, "octocat");
        assert_eq!(pr.repo, RepoRef::new("acme", "widgets"));
        assert_eq!(pr.labels, vec!["bug", "cherry-pick:release-1.0"]);
    }

    #[test]
    fn test_missing_pull_request_section() {
        let err = pull_request_from_json(r#"{"action":"push"}"#).unwrap_err();
        assert!(matches!(err, GitHubError::MissingPullRequest));
    }

    #[test]
    fn test_malformed_pull_request_section() {
        let err = pull_request_from_json(r#"{"pull_request":{"number":"x"}}"#).unwrap_err();
        assert!(matches!(err, GitHubError::Json(_)));
    }

    #[test]
    fn test_reads_event_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(EVENT.as_bytes()).unwrap();
        let pr = pull_request_from_path(file.path()).unwrap();
        assert_eq!(pr.number, 42);
    }

    #[test]
    fn test_missing_event_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = pull_request_from_path(&dir.path().join("event.json")).unwrap_err();
        assert!(matches!(err, GitHubError::Io(_)));
    }
}
