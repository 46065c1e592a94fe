//! GitHub REST client
//!
//! Thin wrapper around a shared `reqwest::Client` that adds the GitHub
//! headers and turns non-success responses into [`GitHubError::Api`].

use std::time::Duration;

use reqwest::{header, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::GitHubError;
use crate::Result;

/// Default REST endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// REST API version pinned on every request.
pub const API_VERSION: &str = "2022-11-28";

/// GitHub client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// REST API base URL
    pub api_url: String,
    /// Bearer token (optional for read-only access to public repositories)
    pub token: Option<String>,
    /// User agent sent with every request
    pub user_agent: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        GitHubConfig {
            api_url: std::env::var("GITHUB_API_URL")
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            token: std::env::var("GITHUB_TOKEN").ok().filter(|t| !t.is_empty()),
            user_agent: format!("pickport/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 30,
        }
    }
}

impl GitHubConfig {
    /// Create a new config from environment variables
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Create config for a specific API endpoint
    pub fn new(api_url: &str) -> Self {
        GitHubConfig {
            api_url: api_url.trim_end_matches('/').to_string(),
            token: None,
            user_agent: format!("pickport/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 30,
        }
    }

    /// Set authentication token
    pub fn with_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Absolute URL of `path` (which starts with `/`).
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_url.trim_end_matches('/'), path)
    }
}

/// Body of a GitHub error response.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Extract GitHub's `message` from an error body, falling back to the raw text.
pub(crate) fn api_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .map(|b| b.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

/// GitHub client for REST operations
#[derive(Debug, Clone)]
pub struct GitHubClient {
    config: GitHubConfig,
    http_client: reqwest::Client,
}

impl GitHubClient {
    /// Create a new GitHub client
    pub fn new(config: GitHubConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(GitHubClient {
            config,
            http_client,
        })
    }

    /// Create client from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(GitHubConfig::from_env())
    }

    pub fn config(&self) -> &GitHubConfig {
        &self.config
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let request = self
            .http_client
            .request(method, self.config.endpoint(path))
            .header(header::ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION);
        match &self.config.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Send a request and return the status and body, failing on non-2xx.
    async fn send(&self, request: RequestBuilder) -> Result<(StatusCode, String)> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(GitHubError::Api {
                status: status.as_u16(),
                message: api_message(&body),
            });
        }
        Ok((status, body))
    }

    /// GET `path`, returns deserialized JSON.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        debug!(path = %path, "GET");
        let (_, body) = self.send(self.request(Method::GET, path).query(query)).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// POST a JSON body to `path`, returns deserialized JSON.
    pub(crate) async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T> {
        debug!(path = %path, "POST");
        let (_, text) = self.send(self.request(Method::POST, path).json(body)).await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// POST a JSON body to `path`; `None` when GitHub answers `204 No Content`.
    pub(crate) async fn post_json_optional<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<Option<T>> {
        debug!(path = %path, "POST");
        let (status, text) = self.send(self.request(Method::POST, path).json(body)).await?;
        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&text)?))
    }

    /// PATCH `path` with a JSON body, discarding the response.
    pub(crate) async fn patch(&self, path: &str, body: &serde_json::Value) -> Result<()> {
        debug!(path = %path, "PATCH");
        self.send(self.request(Method::PATCH, path).json(body))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_github_config_new() {
        let config = GitHubConfig::new("https://ghe.example.com/api/v3/");
        assert_eq!(config.api_url, "https://ghe.example.com/api/v3");
        assert!(config.token.is_none());
        assert!(config.user_agent.starts_with("pickport/"));
    }

    #[test]
    fn test_github_config_with_token() {
        let config = GitHubConfig::new(DEFAULT_API_URL).with_token("secret-token");
        assert_eq!(config.token, Some("secret-token".to_string()));
    }

    #[test]
    fn test_endpoint_joins_path() {
        let config = GitHubConfig::new("https://api.github.com/");
        assert_eq!(
            config.endpoint("/repos/acme/widgets/pulls"),
            "https://api.github.com/repos/acme/widgets/pulls"
        );
    }

    #[test]
    fn test_api_message_reads_github_error_body() {
        let body = r#"{"message":"Reference already exists","documentation_url":"https://docs.github.com"}"#;
        assert_eq!(api_message(body), "Reference already exists");
        assert_eq!(api_message("  Bad Gateway \n"), "Bad Gateway");
    }

    #[test]
    fn test_client_builds() {
        let client = GitHubClient::new(GitHubConfig::new(DEFAULT_API_URL).with_timeout(5)).unwrap();
        assert_eq!(client.config().timeout_secs, 5);
    }
}
