//! Workflow configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default label prefix marking a backport request.
pub const DEFAULT_LABEL_PREFIX: &str = "cherry-pick";

/// Default namespace for working branches.
pub const DEFAULT_BRANCH_PREFIX: &str = "cherry-pick";

/// Default web host used for canonical and diagnostics URLs.
pub const DEFAULT_SERVER_URL: &str = "https://github.com";

/// Settings that shape the backport workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackportConfig {
    /// Labels starting with this prefix request a backport.
    pub label_prefix: String,
    /// First path segment of every working branch name.
    pub branch_prefix: String,
    /// Web host of the hosting service, without trailing slash.
    pub server_url: String,
    /// Look for an already-open backport pull request before creating one.
    pub check_existing_pull_request: bool,
}

impl Default for BackportConfig {
    fn default() -> Self {
        BackportConfig {
            label_prefix: std::env::var("PICKPORT_LABEL_PREFIX")
                .unwrap_or_else(|_| DEFAULT_LABEL_PREFIX.to_string()),
            branch_prefix: std::env::var("PICKPORT_BRANCH_PREFIX")
                .unwrap_or_else(|_| DEFAULT_BRANCH_PREFIX.to_string()),
            server_url: std::env::var("GITHUB_SERVER_URL")
                .unwrap_or_else(|_| DEFAULT_SERVER_URL.to_string()),
            check_existing_pull_request: true,
        }
    }
}

impl BackportConfig {
    /// Create a config from environment variables
    pub fn from_env() -> Self {
        Self::default()
    }

    pub fn with_label_prefix(mut self, prefix: &str) -> Self {
        self.label_prefix = prefix.to_string();
        self
    }

    pub fn with_branch_prefix(mut self, prefix: &str) -> Self {
        self.branch_prefix = prefix.to_string();
        self
    }

    pub fn with_server_url(mut self, url: &str) -> Self {
        self.server_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_existing_check(mut self, enabled: bool) -> Self {
        self.check_existing_pull_request = enabled;
        self
    }

    /// Reject settings that would make label parsing or branch naming ambiguous.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.label_prefix.is_empty() {
            return Err(ConfigError::Invalid("label prefix must not be empty".into()));
        }
        if self.label_prefix.contains(':') {
            return Err(ConfigError::Invalid(format!(
                "label prefix '{}' must not contain ':'",
                self.label_prefix
            )));
        }
        if self.branch_prefix.is_empty() {
            return Err(ConfigError::Invalid("branch prefix must not be empty".into()));
        }
        if self.server_url.is_empty() {
            return Err(ConfigError::Invalid("server url must not be empty".into()));
        }
        Ok(())
    }
}
