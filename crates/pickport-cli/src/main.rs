//! pickport - label-driven cherry-pick backporting
//!
//! Runs inside a GitHub Actions `pull_request` workflow. Every
//! `cherry-pick:<branch>` label on the pull request produces a backport pull
//! request into `<branch>`, and the outcome is reported back as a review
//! comment.
//!
//! ## Commands
//!
//! - `run`: perform the backports; exits non-zero when any target failed
//! - `plan`: print the targets and working branches without touching GitHub

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use pickport_core::orchestrator::plan;
use pickport_core::{
    BackportConfig, BackportResult, Orchestrator, PullRequest, RunContext, RunReport,
};
use pickport_github::{pull_request_from_path, GitHubClient, GitHubConfig};
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "pickport")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Backport pull requests onto the branches named by their labels", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Backport the pull request onto every labelled target branch
    Run {
        #[command(flatten)]
        workflow: WorkflowArgs,

        /// GitHub token used for all API calls
        #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
        token: String,

        /// GitHub REST API endpoint
        #[arg(long, env = "GITHUB_API_URL", default_value = pickport_github::DEFAULT_API_URL)]
        api_url: String,

        /// Identifier of the current workflow run (for the diagnostics link)
        #[arg(long, env = "GITHUB_RUN_ID", default_value = "local")]
        run_id: String,

        /// User to mention in comments (default: pull request author)
        #[arg(long, env = "GITHUB_ACTOR")]
        actor: Option<String>,

        /// Always open a new pull request without looking for an open one
        #[arg(long)]
        skip_existing_check: bool,

        /// Print the run report as JSON on stdout
        #[arg(long)]
        report: bool,
    },

    /// Show which targets and working branches a run would use
    Plan {
        #[command(flatten)]
        workflow: WorkflowArgs,
    },
}

/// Settings shared by every command.
#[derive(Args)]
struct WorkflowArgs {
    /// Path to the `pull_request` event payload
    #[arg(long, env = "GITHUB_EVENT_PATH")]
    event_path: PathBuf,

    /// Labels starting with this prefix request a backport
    #[arg(long, env = "PICKPORT_LABEL_PREFIX", default_value = pickport_core::config::DEFAULT_LABEL_PREFIX)]
    label_prefix: String,

    /// Namespace for working branches
    #[arg(long, env = "PICKPORT_BRANCH_PREFIX", default_value = pickport_core::config::DEFAULT_BRANCH_PREFIX)]
    branch_prefix: String,

    /// GitHub web host used in links
    #[arg(long, env = "GITHUB_SERVER_URL", default_value = pickport_core::config::DEFAULT_SERVER_URL)]
    server_url: String,
}

impl WorkflowArgs {
    fn config(&self) -> BackportConfig {
        BackportConfig::default()
            .with_label_prefix(&self.label_prefix)
            .with_branch_prefix(&self.branch_prefix)
            .with_server_url(&self.server_url)
    }
}

fn load_pull_request(path: &Path) -> Result<PullRequest> {
    pull_request_from_path(path)
        .with_context(|| format!("Failed to read pull request from {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    pickport_core::init_tracing(cli.json, level);

    match cli.command {
        Commands::Run {
            workflow,
            token,
            api_url,
            run_id,
            actor,
            skip_existing_check,
            report,
        } => {
            let config = workflow.config().with_existing_check(!skip_existing_check);
            let github = GitHubConfig::new(&api_url).with_token(&token);
            cmd_run(
                &workflow.event_path,
                config,
                github,
                &run_id,
                actor.as_deref(),
                report,
            )
            .await
        }
        Commands::Plan { workflow } => cmd_plan(&workflow.event_path, workflow.config()),
    }
}

async fn cmd_run(
    event_path: &Path,
    config: BackportConfig,
    github: GitHubConfig,
    run_id: &str,
    actor: Option<&str>,
    print_report: bool,
) -> Result<()> {
    let pr = load_pull_request(event_path)?;
    let ctx = RunContext::new(&config.server_url, &pr, run_id, actor);

    let client = Arc::new(GitHubClient::new(github).context("Failed to create GitHub client")?);
    let orchestrator = Orchestrator::new(config, client.clone(), client)
        .context("Invalid backport configuration")?;

    info!(pr = pr.number, repo = %pr.repo, "Backporting pull request");
    let report = orchestrator.run(&pr, &ctx).await;

    if print_report {
        println!("{}", report.to_json()?);
    } else {
        print_summary(&report);
    }

    if report.failed() {
        anyhow::bail!("Failed to create one of the cherry-pick PRs. Check the details above.")
    }
    Ok(())
}

fn cmd_plan(event_path: &Path, config: BackportConfig) -> Result<()> {
    config.validate()?;
    let pr = load_pull_request(event_path)?;
    let targets = plan_lines(&pr, &config);

    if targets.is_empty() {
        println!(
            "No '{}:<branch>' labels on #{}, nothing to backport.",
            config.label_prefix, pr.number
        );
        return Ok(());
    }

    println!("Backport plan for {}#{}:", pr.repo, pr.number);
    for line in targets {
        println!("  {}", line);
    }
    Ok(())
}

/// `target <- working branch` lines for the plan output.
fn plan_lines(pr: &PullRequest, config: &BackportConfig) -> Vec<String> {
    plan(config, pr)
        .into_iter()
        .map(|(target, branch)| format!("{} <- {}", target, branch))
        .collect()
}

fn print_summary(report: &RunReport) {
    println!();
    for target in &report.targets {
        match &target.result {
            BackportResult::Created { url } => {
                println!("  ✓ {} → {} (created)", target.target, url)
            }
            BackportResult::AlreadyExisted { url } => {
                println!("  ✓ {} → {} (already existed)", target.target, url)
            }
            BackportResult::Failed { reason, .. } => {
                println!("  ✗ {}: {}", target.target, reason)
            }
        }
    }
    println!();
    println!(
        "Summary: {}/{} backports succeeded",
        report.succeeded_count(),
        report.targets.len()
    );
}
