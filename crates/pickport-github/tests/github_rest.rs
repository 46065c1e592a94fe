//! GitHub REST behaviour of the gateway and the replay engine against a mock server.

use httpmock::prelude::*;
use pickport_core::{
    CommitId, CommitReplayer, GatewayError, RefCreation, RepoRef, SourceControlGateway,
};
use pickport_github::{GitHubClient, GitHubConfig};
use serde_json::json;

fn client(server: &MockServer) -> GitHubClient {
    GitHubClient::new(GitHubConfig::new(&server.base_url()).with_token("t0k3n")).unwrap()
}

fn repo() -> RepoRef {
    RepoRef::new("acme", "widgets")
}

fn git_commit(sha: &str, tree: &str, parents: &[&str], message: &str) -> serde_json::Value {
    json!({
        "sha": sha,
        "tree": { "sha": tree },
        "parents": parents.iter().map(|p| json!({ "sha": p })).collect::<Vec<_>>(),
        "message": message,
        "author": {
            "name": "Octo Cat",
            "email": "octo@example.com",
            "date": "2024-01-01T00:00:00Z"
        }
    })
}

#[tokio::test]
async fn test_branch_head_reads_ref_with_auth() {
    let server = MockServer::start();
    let lookup = server.mock(|when, then| {
        when.method(GET)
            .path("/repos/acme/widgets/git/ref/heads/release/1.0")
            .header("authorization", "Bearer t0k3n")
            .header("x-github-api-version", "2022-11-28");
        then.status(200).json_body(json!({
            "ref": "refs/heads/release/1.0",
            "object": { "sha": "abc123", "type": "commit" }
        }));
    });

    let head = client(&server)
        .branch_head(&repo(), "release/1.0")
        .await
        .unwrap();

    assert_eq!(head, Some(CommitId::new("abc123")));
    lookup.assert_calls(1);
}

#[tokio::test]
async fn test_missing_branch_is_none() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET)
            .path("/repos/acme/widgets/git/ref/heads/release-2.0");
        then.status(404).json_body(json!({ "message": "Not Found" }));
    });

    let head = client(&server)
        .branch_head(&repo(), "release-2.0")
        .await
        .unwrap();

    assert_eq!(head, None);
}

#[tokio::test]
async fn test_create_branch_ref_reports_created_and_existing() {
    let server = MockServer::start();
    let created = server.mock(|when, then| {
        when.method(POST)
            .path("/repos/acme/widgets/git/refs")
            .body_includes("refs/heads/cherry-pick/42/feature-x-release-1.0")
            .body_includes("abc123");
        then.status(201).json_body(json!({
            "ref": "refs/heads/cherry-pick/42/feature-x-release-1.0",
            "object": { "sha": "abc123" }
        }));
    });
    let existing = server.mock(|when, then| {
        when.method(POST)
            .path("/repos/acme/widgets/git/refs")
            .body_includes("refs/heads/cherry-pick/42/feature-x-release-2.0");
        then.status(422)
            .json_body(json!({ "message": "Reference already exists" }));
    });
    let github = client(&server);

    let first = github
        .create_branch_ref(
            &repo(),
            "refs/heads/cherry-pick/42/feature-x-release-1.0",
            &CommitId::new("abc123"),
        )
        .await
        .unwrap();
    let second = github
        .create_branch_ref(
            &repo(),
            "refs/heads/cherry-pick/42/feature-x-release-2.0",
            &CommitId::new("def456"),
        )
        .await
        .unwrap();

    assert_eq!(first, RefCreation::Created);
    assert_eq!(second, RefCreation::AlreadyExists);
    created.assert_calls(1);
    existing.assert_calls(1);
}

#[tokio::test]
async fn test_other_ref_rejection_is_an_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/repos/acme/widgets/git/refs");
        then.status(422)
            .json_body(json!({ "message": "Reference update failed" }));
    });

    let err = client(&server)
        .create_branch_ref(&repo(), "refs/heads/x", &CommitId::new("abc123"))
        .await
        .unwrap_err();

    assert!(matches!(err, GatewayError::Rejected { status: 422, .. }));
}

#[tokio::test]
async fn test_pull_request_commits_follow_pages_until_short_page() {
    let server = MockServer::start();
    let full: Vec<_> = (0..100).map(|i| json!({ "sha": format!("c{}", i) })).collect();
    let first = server.mock(|when, then| {
        when.method(GET)
            .path("/repos/acme/widgets/pulls/42/commits")
            .query_param("per_page", "100")
            .query_param("page", "1");
        then.status(200).json_body(json!(full));
    });
    let second = server.mock(|when, then| {
        when.method(GET)
            .path("/repos/acme/widgets/pulls/42/commits")
            .query_param("per_page", "100")
            .query_param("page", "2");
        then.status(200).json_body(json!([{ "sha": "c100" }]));
    });

    let commits = client(&server)
        .pull_request_commits(&repo(), 42)
        .await
        .unwrap();

    assert_eq!(commits.len(), 101);
    assert_eq!(commits[0], CommitId::new("c0"));
    assert_eq!(commits[100], CommitId::new("c100"));
    first.assert_calls(1);
    second.assert_calls(1);
}

#[tokio::test]
async fn test_open_pull_request_lookup_qualifies_head_with_owner() {
    let server = MockServer::start();
    let lookup = server.mock(|when, then| {
        when.method(GET)
            .path("/repos/acme/widgets/pulls")
            .query_param("state", "open")
            .query_param("head", "acme:cherry-pick/42/feature-x-release-1.0")
            .query_param("base", "release-1.0");
        then.status(200).json_body(json!([{
            "number": 101,
            "html_url": "https://github.com/acme/widgets/pull/101",
            "head": { "ref": "cherry-pick/42/feature-x-release-1.0" },
            "base": { "ref": "release-1.0" }
        }]));
    });

    let found = client(&server)
        .find_open_pull_request(&repo(), "cherry-pick/42/feature-x-release-1.0", "release-1.0")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(found.number, 101);
    assert_eq!(found.url, "https://github.com/acme/widgets/pull/101");
    lookup.assert_calls(1);
}

#[tokio::test]
async fn test_create_pull_request_returns_html_url() {
    let server = MockServer::start();
    let create = server.mock(|when, then| {
        when.method(POST)
            .path("/repos/acme/widgets/pulls")
            .body_includes("[release-1.0] Fix parser")
            .body_includes("\"base\":\"release-1.0\"");
        then.status(201).json_body(json!({
            "number": 102,
            "html_url": "https://github.com/acme/widgets/pull/102",
            "head": { "ref": "cherry-pick/42/feature-x-release-1.0" },
            "base": { "ref": "release-1.0" }
        }));
    });

    let url = client(&server)
        .create_pull_request(
            &repo(),
            "[release-1.0] Fix parser",
            "Cherry picked from https://github.com/acme/widgets/pull/42",
            "cherry-pick/42/feature-x-release-1.0",
            "release-1.0",
        )
        .await
        .unwrap();

    assert_eq!(url, "https://github.com/acme/widgets/pull/102");
    create.assert_calls(1);
}

#[tokio::test]
async fn test_comment_is_posted_as_review() {
    let server = MockServer::start();
    let review = server.mock(|when, then| {
        when.method(POST)
            .path("/repos/acme/widgets/pulls/42/reviews")
            .body_includes("\"event\":\"COMMENT\"")
            .body_includes("Created pull request");
        then.status(200).json_body(json!({ "id": 1, "state": "COMMENTED" }));
    });

    client(&server)
        .post_comment(&repo(), 42, "@octocat 👉 Created pull request targeting release-1.0")
        .await
        .unwrap();

    review.assert_calls(1);
}

#[tokio::test]
async fn test_replay_uses_sibling_merge_and_final_commit() {
    let server = MockServer::start();
    let branch = "cherry-pick/42/feature-x-release-1.0";
    server.mock(|when, then| {
        when.method(GET)
            .path(format!("/repos/acme/widgets/git/ref/heads/{}", branch));
        then.status(200).json_body(json!({ "object": { "sha": "h0" } }));
    });
    server.mock(|when, then| {
        when.method(GET).path("/repos/acme/widgets/git/commits/h0");
        then.status(200)
            .json_body(git_commit("h0", "t0", &["r0"], "Release 1.0"));
    });
    server.mock(|when, then| {
        when.method(GET).path("/repos/acme/widgets/git/commits/c1");
        then.status(200)
            .json_body(git_commit("c1", "t1", &["p1"], "Fix parser"));
    });
    let sibling = server.mock(|when, then| {
        when.method(POST)
            .path("/repos/acme/widgets/git/commits")
            .body_includes("Sibling of c1")
            .body_includes("\"tree\":\"t0\"")
            .body_includes("\"p1\"");
        then.status(201).json_body(json!({ "sha": "s1" }));
    });
    let move_to_sibling = server.mock(|when, then| {
        when.method(PATCH)
            .path(format!("/repos/acme/widgets/git/refs/heads/{}", branch))
            .body_includes("\"s1\"")
            .body_includes("\"force\":true");
        then.status(200).json_body(json!({ "object": { "sha": "s1" } }));
    });
    let merge = server.mock(|when, then| {
        when.method(POST)
            .path("/repos/acme/widgets/merges")
            .body_includes("\"head\":\"c1\"");
        then.status(201).json_body(json!({
            "sha": "m1",
            "commit": { "message": "Merge", "tree": { "sha": "t2" } }
        }));
    });
    let picked = server.mock(|when, then| {
        when.method(POST)
            .path("/repos/acme/widgets/git/commits")
            .body_includes("Fix parser")
            .body_includes("\"tree\":\"t2\"")
            .body_includes("\"h0\"");
        then.status(201).json_body(json!({ "sha": "n1" }));
    });
    let move_to_picked = server.mock(|when, then| {
        when.method(PATCH)
            .path(format!("/repos/acme/widgets/git/refs/heads/{}", branch))
            .body_includes("\"n1\"");
        then.status(200).json_body(json!({ "object": { "sha": "n1" } }));
    });

    let head = client(&server)
        .replay_commits(&repo(), &[CommitId::new("c1")], branch)
        .await
        .unwrap();

    assert_eq!(head, CommitId::new("n1"));
    sibling.assert_calls(1);
    move_to_sibling.assert_calls(1);
    merge.assert_calls(1);
    picked.assert_calls(1);
    move_to_picked.assert_calls(1);
}

#[tokio::test]
async fn test_merge_conflict_surfaces_as_conflict() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/repos/acme/widgets/git/ref/heads/work");
        then.status(200).json_body(json!({ "object": { "sha": "h0" } }));
    });
    server.mock(|when, then| {
        when.method(GET).path("/repos/acme/widgets/git/commits/h0");
        then.status(200)
            .json_body(git_commit("h0", "t0", &["r0"], "Release 1.0"));
    });
    server.mock(|when, then| {
        when.method(GET).path("/repos/acme/widgets/git/commits/c1");
        then.status(200)
            .json_body(git_commit("c1", "t1", &["p1"], "Fix parser"));
    });
    server.mock(|when, then| {
        when.method(POST).path("/repos/acme/widgets/git/commits");
        then.status(201).json_body(json!({ "sha": "s1" }));
    });
    server.mock(|when, then| {
        when.method(PATCH)
            .path("/repos/acme/widgets/git/refs/heads/work");
        then.status(200).json_body(json!({ "object": { "sha": "s1" } }));
    });
    server.mock(|when, then| {
        when.method(POST).path("/repos/acme/widgets/merges");
        then.status(409).json_body(json!({ "message": "Merge conflict" }));
    });

    let err = client(&server)
        .replay_commits(&repo(), &[CommitId::new("c1")], "work")
        .await
        .unwrap_err();

    assert_eq!(err, GatewayError::Conflict("Merge conflict".to_string()));
}

#[tokio::test]
async fn test_merge_commit_is_rejected_before_any_write() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/repos/acme/widgets/git/ref/heads/work");
        then.status(200).json_body(json!({ "object": { "sha": "h0" } }));
    });
    server.mock(|when, then| {
        when.method(GET).path("/repos/acme/widgets/git/commits/h0");
        then.status(200)
            .json_body(git_commit("h0", "t0", &["r0"], "Release 1.0"));
    });
    server.mock(|when, then| {
        when.method(GET).path("/repos/acme/widgets/git/commits/m1");
        then.status(200)
            .json_body(git_commit("m1", "t1", &["p1", "p2"], "Merge branch"));
    });
    let writes = server.mock(|when, then| {
        when.method(POST).path("/repos/acme/widgets/git/commits");
        then.status(201).json_body(json!({ "sha": "s1" }));
    });

    let err = client(&server)
        .replay_commits(&repo(), &[CommitId::new("m1")], "work")
        .await
        .unwrap_err();

    assert!(matches!(err, GatewayError::Rejected { status: 422, .. }));
    writes.assert_calls(0);
}
