//! Log output for the `pickport` binary.
//!
//! Logs always go to stderr. Stdout carries only command output (the plan,
//! the run summary or the `--report` JSON), so a workflow step can pipe the
//! report without filtering log lines out of it.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the stderr subscriber.
///
/// `level` applies when `RUST_LOG` is unset; `json` switches to
/// newline-delimited JSON, which the Actions log viewer keeps one event per
/// line. Later calls are no-ops, so tests may call it freely.
pub fn init_tracing(json: bool, level: Level) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));
    let stderr = fmt::layer().with_target(false).with_writer(std::io::stderr);
    let registry = tracing_subscriber::registry().with(filter);

    let installed = if json {
        registry.with(stderr.json()).try_init()
    } else {
        registry.with(stderr).try_init()
    };
    // A subscriber is already installed (tests, embedding); keep it.
    installed.ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_twice_is_harmless() {
        init_tracing(false, Level::DEBUG);
        init_tracing(true, Level::INFO);
        tracing::info!("still logging");
    }
}
