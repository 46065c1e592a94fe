//! pickport core library
//!
//! Backports a merged pull request onto the branches named by its
//! `cherry-pick:<target>` labels. For each target the workflow:
//!
//! 1. ensures a deterministically named working branch exists at the head of
//!    the target, replaying the pull request's commits when it creates it
//!    ([`provisioner::BranchProvisioner`]);
//! 2. ensures a pull request from the working branch into the target exists
//!    ([`request::BackportRequestBuilder`]);
//! 3. reports the outcome on the originating pull request ([`notify`]).
//!
//! [`orchestrator::Orchestrator`] runs these steps for every target and keeps
//! failures isolated per target. All hosting-service access goes through the
//! [`gateway`] traits.

pub mod config;
pub mod error;
pub mod fakes;
pub mod gateway;
pub mod labels;
pub mod model;
pub mod naming;
pub mod notify;
pub mod obs;
pub mod orchestrator;
pub mod provisioner;
pub mod request;
pub mod telemetry;

pub use config::BackportConfig;
pub use error::{BackportError, ConfigError, GatewayError, GatewayResult, PickResult};
pub use gateway::{CommitReplayer, SourceControlGateway};
pub use labels::extract_targets;
pub use model::{
    BackportRequest, BackportResult, CommitId, PullRequest, PullRequestSummary, RefCreation,
    RepoRef, RunContext, RunReport, TargetReport, WorkingBranch,
};
pub use naming::working_branch_name;
pub use obs::TargetState;
pub use orchestrator::Orchestrator;
pub use provisioner::BranchProvisioner;
pub use request::BackportRequestBuilder;
pub use telemetry::init_tracing;

/// pickport version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
