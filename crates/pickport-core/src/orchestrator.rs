//! Backport workflow engine.
//!
//! [`Orchestrator::run`] extracts the targets from the pull request's labels
//! and processes them one after another. Every target goes through
//! provisioning, pull request building and notification; whatever fails is
//! caught at the target boundary, reported on the pull request and recorded
//! in the [`RunReport`]. One target failing never stops the others.

use std::sync::Arc;

use chrono::Utc;
use tracing::Instrument;

use crate::config::BackportConfig;
use crate::error::{ConfigError, PickResult};
use crate::gateway::{CommitReplayer, SourceControlGateway};
use crate::labels::extract_targets;
use crate::model::{
    BackportRequest, BackportResult, PullRequest, RunContext, RunReport, TargetReport,
    WorkingBranch,
};
use crate::notify::{failure_message, success_message, Notifier};
use crate::obs::{self, TargetState};
use crate::provisioner::BranchProvisioner;
use crate::request::BackportRequestBuilder;

/// Targets requested by `pr`, each paired with the working branch it resolves to.
///
/// Pure: nothing is read from or written to the hosting service.
pub fn plan(config: &BackportConfig, pr: &PullRequest) -> Vec<(String, WorkingBranch)> {
    extract_targets(&config.label_prefix, &pr.labels)
        .into_iter()
        .map(|target| {
            let branch = WorkingBranch::for_target(&config.branch_prefix, pr, &target);
            (target, branch)
        })
        .collect()
}

/// Drives the backport of one pull request onto all of its targets.
pub struct Orchestrator {
    config: BackportConfig,
    provisioner: BranchProvisioner,
    requests: BackportRequestBuilder,
    notifier: Notifier,
}

impl Orchestrator {
    /// Wire the workflow components to the given collaborators.
    pub fn new(
        config: BackportConfig,
        gateway: Arc<dyn SourceControlGateway>,
        replayer: Arc<dyn CommitReplayer>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let provisioner =
            BranchProvisioner::new(Arc::clone(&gateway), replayer, &config.branch_prefix);
        let requests = BackportRequestBuilder::new(Arc::clone(&gateway), &config.server_url)
            .with_existing_check(config.check_existing_pull_request);
        let notifier = Notifier::new(gateway);
        Ok(Self {
            config,
            provisioner,
            requests,
            notifier,
        })
    }

    pub fn config(&self) -> &BackportConfig {
        &self.config
    }

    /// Targets requested by the pull request's labels, in label order.
    pub fn targets(&self, pr: &PullRequest) -> Vec<String> {
        extract_targets(&self.config.label_prefix, &pr.labels)
    }

    /// Targets paired with the working branch each one resolves to.
    pub fn plan(&self, pr: &PullRequest) -> Vec<(String, WorkingBranch)> {
        plan(&self.config, pr)
    }

    /// Backport `pr` onto every target and report the per-target outcomes.
    ///
    /// Targets are processed sequentially. The report's [`RunReport::failed`]
    /// is derived from the collected results once all targets completed.
    pub async fn run(&self, pr: &PullRequest, ctx: &RunContext) -> RunReport {
        let span = obs::run_span(&pr.repo.to_string(), pr.number, &ctx.run_id);
        async {
            let started_at = Utc::now();
            let targets = self.targets(pr);
            obs::emit_run_started(pr.number, targets.len());

            let mut reports = Vec::with_capacity(targets.len());
            for target in &targets {
                reports.push(self.process_target(target, pr, ctx).await);
            }

            let report = RunReport {
                repo: pr.repo.clone(),
                pull_request: pr.number,
                targets: reports,
                started_at,
                finished_at: Utc::now(),
            };
            obs::emit_run_finished(pr.number, report.succeeded_count(), report.failed_count());
            report
        }
        .instrument(span)
        .await
    }

    /// Process a single target. Never fails: errors become a failed report
    /// and a failure notification.
    pub async fn process_target(
        &self,
        target: &str,
        pr: &PullRequest,
        ctx: &RunContext,
    ) -> TargetReport {
        obs::emit_target_state(target, TargetState::Pending);
        let working_branch = self.provisioner.working_branch(target, pr);
        let mut branch_created = None;

        match self.attempt(target, pr, ctx, &mut branch_created).await {
            Ok(request) => {
                obs::emit_target_state(target, TargetState::Done);
                obs::emit_target_finished(target, true, &request.url);
                let result = if request.reused {
                    BackportResult::AlreadyExisted { url: request.url }
                } else {
                    BackportResult::Created { url: request.url }
                };
                TargetReport {
                    target: target.to_string(),
                    working_branch: working_branch.name().to_string(),
                    branch_created,
                    result,
                    notified: true,
                }
            }
            Err(err) => {
                obs::emit_target_state(target, TargetState::Failed);
                obs::emit_target_finished(target, false, &err.to_string());

                let notified = match self
                    .notifier
                    .notify(pr, &failure_message(ctx, target, &err))
                    .await
                {
                    Ok(()) => true,
                    Err(notify_err) => {
                        obs::emit_notification_failed(target, &notify_err);
                        false
                    }
                };

                TargetReport {
                    target: target.to_string(),
                    working_branch: working_branch.name().to_string(),
                    branch_created,
                    result: BackportResult::Failed {
                        kind: err.kind().to_string(),
                        reason: err.to_string(),
                    },
                    notified,
                }
            }
        }
    }

    async fn attempt(
        &self,
        target: &str,
        pr: &PullRequest,
        ctx: &RunContext,
        branch_created: &mut Option<bool>,
    ) -> PickResult<BackportRequest> {
        obs::emit_target_state(target, TargetState::Provisioning);
        let (branch, created) = self.provisioner.ensure_working_branch(target, pr).await?;
        *branch_created = Some(created);

        obs::emit_target_state(target, TargetState::RequestBuilding);
        let request = self.requests.ensure_backport_pr(&branch, target, pr).await?;

        obs::emit_target_state(target, TargetState::Notifying);
        self.notifier
            .notify(pr, &success_message(ctx, target, &request))
            .await?;

        Ok(request)
    }
}
