use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use dialoguer::Confirm;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use forksync::config::AppConfig;
use forksync::error::AppError;
use forksync::flow::{FlowOutcome, Orchestrator, SyncContext};
use forksync::git::ShellRunner;
use forksync::report::{Console, Reporter};
use forksync::update;

#[derive(Parser)]
#[command(
    name = "forksync",
    version,
    about = "Sync a forked git repository with its upstream"
)]
struct Cli {
    /// Add the upstream remote pointing at URL, then exit
    #[arg(short, long, value_name = "URL", conflicts_with_all = ["remove", "reset", "log_only"])]
    add: Option<String>,

    /// Remove the upstream remote, then exit
    #[arg(short, long, conflicts_with_all = ["reset", "log_only"])]
    remove: bool,

    /// Hard-reset the branch to upstream and force-push it (discards local work)
    #[arg(long, conflicts_with = "log_only")]
    reset: bool,

    /// Print the last 10 commits and exit
    #[arg(short = 'o', long)]
    log_only: bool,

    /// Upstream remote name
    #[arg(short, long, value_name = "NAME")]
    upstream: Option<String>,

    /// Branch to sync
    #[arg(short, long, value_name = "NAME")]
    branch: Option<String>,

    /// Print recent history after a successful sync
    #[arg(short, long)]
    log: bool,

    /// Skip the confirmation prompt before --reset
    #[arg(short, long)]
    yes: bool,

    /// Print command, stdout and stderr for every step
    #[arg(short, long)]
    diagnostics: bool,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Skip the registry version check
    #[arg(long)]
    no_update_check: bool,
}

/// Exit status for configuration and usage errors, the same as clap's.
const USAGE_ERROR: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    ExitCode::from(exit_status(run(cli).await))
}

fn exit_status(result: anyhow::Result<u8>) -> u8 {
    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            USAGE_ERROR
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<u8> {
    let mut config = AppConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(upstream) = &cli.upstream {
        config.sync.upstream = upstream.clone();
    }
    if let Some(branch) = &cli.branch {
        config.sync.branch = branch.clone();
    }
    config.sync.log_after_sync |= cli.log;
    config.output.diagnostics |= cli.diagnostics;

    let ctx = SyncContext::from_config(&config.sync)?;

    init_tracing(config.output.log_json);

    let reporter: Arc<dyn Reporter> = Arc::new(Console::new(config.output.diagnostics));

    if config.update_check.enabled && !cli.no_update_check {
        match update::check_for_update(&config.update_check).await {
            Ok(Some(latest)) => reporter.warning(&format!(
                "forksync {latest} is available (installed {})",
                env!("CARGO_PKG_VERSION")
            )),
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "Update check failed"),
        }
    }

    if cli.reset && !cli.yes && !confirm_reset(&ctx)? {
        reporter.message("Reset cancelled");
        return Ok(0);
    }

    tracing::info!(
        upstream = %ctx.upstream,
        branch = %ctx.branch,
        "Starting forksync"
    );

    let orchestrator = Orchestrator::new(Arc::new(ShellRunner::new()), reporter, ctx);

    let outcome = if let Some(url) = &cli.add {
        orchestrator.add_remote(url).await
    } else if cli.remove {
        orchestrator.remove_remote().await
    } else if cli.reset {
        orchestrator.reset().await
    } else if cli.log_only {
        orchestrator.log_only().await
    } else {
        orchestrator.sync().await
    };

    if let FlowOutcome::Failed(signals) = &outcome {
        tracing::info!(signals = %signals, "Flow failed");
    }

    Ok(outcome.exit_code())
}

fn init_tracing(json: bool) {
    // Quiet by default so the progress line stays readable; RUST_LOG overrides.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn confirm_reset(ctx: &SyncContext) -> Result<bool, AppError> {
    let confirmed = Confirm::new()
        .with_prompt(format!(
            "Reset {} to {}/{} and force-push to {}? Local commits and changes will be lost",
            ctx.branch, ctx.upstream, ctx.branch, ctx.origin
        ))
        .default(false)
        .interact()?;
    Ok(confirmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flow_exit_code_passes_through() {
        assert_eq!(exit_status(Ok(0)), 0);
        assert_eq!(exit_status(Ok(1)), 1);
    }

    #[tokio::test]
    async fn test_invalid_branch_name_is_usage_error() {
        let cli = Cli::parse_from(["forksync", "--branch=-x", "--no-update-check"]);
        assert_eq!(exit_status(run(cli).await), USAGE_ERROR);
    }

    #[tokio::test]
    async fn test_unreadable_config_is_usage_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("forksync.toml");
        std::fs::write(&path, "[sync\nbranch = ").unwrap();

        let cli = Cli::parse_from(["forksync", "--config", path.to_str().unwrap()]);
        assert_eq!(exit_status(run(cli).await), USAGE_ERROR);
    }
}
