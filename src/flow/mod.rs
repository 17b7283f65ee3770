pub mod history;
pub mod remote;
pub mod reset;
pub mod sync;

#[cfg(test)]
pub mod testing;

use std::fmt;
use std::sync::Arc;

use crate::classify::{classify, SignalSet};
use crate::config::SyncConfig;
use crate::error::Result;
use crate::git::commands::validate_name;
use crate::git::{CommandResult, CommandRunner};
use crate::remedy;
use crate::report::Reporter;

/// Names a flow operates on. Validated once, read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncContext {
    pub upstream: String,
    pub origin: String,
    pub branch: String,
    pub log_after_sync: bool,
}

impl SyncContext {
    pub fn new(
        upstream: impl Into<String>,
        origin: impl Into<String>,
        branch: impl Into<String>,
        log_after_sync: bool,
    ) -> Result<Self> {
        let ctx = Self {
            upstream: upstream.into(),
            origin: origin.into(),
            branch: branch.into(),
            log_after_sync,
        };
        validate_name("remote", &ctx.upstream)?;
        validate_name("remote", &ctx.origin)?;
        validate_name("branch", &ctx.branch)?;
        Ok(ctx)
    }

    pub fn from_config(config: &SyncConfig) -> Result<Self> {
        Self::new(
            config.upstream.as_str(),
            config.origin.as_str(),
            config.branch.as_str(),
            config.log_after_sync,
        )
    }
}

impl Default for SyncContext {
    fn default() -> Self {
        Self {
            upstream: "upstream".to_string(),
            origin: "origin".to_string(),
            branch: "master".to_string(),
            log_after_sync: false,
        }
    }
}

/// Why a flow stopped before its last step without failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The branch carries commits origin does not have.
    BranchAhead,
    /// Upstream had nothing new; there is nothing to push.
    AlreadyUpToDate,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::BranchAhead => write!(f, "branch is ahead of origin"),
            StopReason::AlreadyUpToDate => write!(f, "already up to date"),
        }
    }
}

/// Terminal result of a flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowOutcome {
    Completed,
    StoppedEarly(StopReason),
    /// Problem signals of the step that failed; empty when none was recognized.
    Failed(SignalSet),
}

impl FlowOutcome {
    /// Process exit code the binary reports for this outcome.
    pub fn exit_code(&self) -> u8 {
        match self {
            FlowOutcome::Completed => 0,
            FlowOutcome::StoppedEarly(_) => 1,
            FlowOutcome::Failed(_) => 2,
        }
    }
}

/// Steps of a flow that end it. Lets flow bodies use `?`.
pub(crate) type Halt = FlowOutcome;

/// Drives version-control commands one at a time and interprets their output.
pub struct Orchestrator {
    runner: Arc<dyn CommandRunner>,
    reporter: Arc<dyn Reporter>,
    ctx: SyncContext,
}

impl Orchestrator {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        reporter: Arc<dyn Reporter>,
        ctx: SyncContext,
    ) -> Self {
        Self {
            runner,
            reporter,
            ctx,
        }
    }

    pub fn context(&self) -> &SyncContext {
        &self.ctx
    }

    /// Run one command, showing `progress` while it runs.
    ///
    /// A failed command is classified and its remedies printed; the flow
    /// then ends with `Failed`.
    pub(crate) async fn step(
        &self,
        progress: &str,
        command: &str,
    ) -> std::result::Result<(CommandResult, SignalSet), Halt> {
        self.reporter.progress(progress);
        let result = self.runner.run(command).await;
        self.reporter.step(&result);

        if !result.success {
            return Err(self.fail(&result).await);
        }

        let signals = classify(&result);
        Ok((result, signals))
    }

    /// Classify a failed command, print remedies, and produce `Failed`.
    pub(crate) async fn fail(&self, result: &CommandResult) -> FlowOutcome {
        let signals = classify(result);
        tracing::info!(
            command = %result.command,
            signals = %signals,
            "Command failed"
        );
        remedy::report_failure(
            self.runner.as_ref(),
            self.reporter.as_ref(),
            result,
            &signals,
        )
        .await;
        FlowOutcome::Failed(signals.errors())
    }

    pub(crate) fn reporter(&self) -> &dyn Reporter {
        self.reporter.as_ref()
    }
}

/// Collapse a flow body's early exit into its outcome.
pub(crate) fn settle(result: std::result::Result<FlowOutcome, Halt>) -> FlowOutcome {
    match result {
        Ok(outcome) | Err(outcome) => outcome,
    }
}
