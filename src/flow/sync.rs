use crate::classify::Signal;
use crate::git::commands;

use super::{settle, FlowOutcome, Halt, Orchestrator, StopReason};

/// Steps of a sync, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStep {
    VerifyTool,
    Checkout,
    Fetch,
    Merge,
    Push,
}

impl Orchestrator {
    /// Bring the fork's branch up to date with upstream and push it to origin.
    ///
    /// Stops early when the branch has unpushed local commits or when
    /// upstream has nothing new. A failed command ends the sync with its
    /// remedies printed; the working copy is left as git left it.
    pub async fn sync(&self) -> FlowOutcome {
        let outcome = settle(self.sync_steps().await);

        if outcome == FlowOutcome::Completed && self.context().log_after_sync {
            // Its result does not change the sync outcome.
            let trailing = self.log_only().await;
            if trailing != FlowOutcome::Completed {
                tracing::warn!(outcome = ?trailing, "History after sync did not complete");
            }
        }

        outcome
    }

    async fn sync_steps(&self) -> Result<FlowOutcome, Halt> {
        let ctx = self.context();

        tracing::info!(step = ?SyncStep::VerifyTool, "Sync step");
        let (version, _) = self.step("Checking git…", commands::VERSION).await?;
        if !version.stdout.trim_start().starts_with("git version") {
            tracing::warn!(banner = %version.stdout.trim(), "Unexpected git version banner");
            self.reporter().warning(&format!(
                "Unexpected output from `{}`: {}",
                commands::VERSION,
                version.stdout.trim()
            ));
        }

        tracing::info!(step = ?SyncStep::Checkout, branch = %ctx.branch, "Sync step");
        let (_, signals) = self
            .step(
                &format!("Checking out {}…", ctx.branch),
                &commands::checkout(&ctx.branch),
            )
            .await?;
        if signals.contains(Signal::BranchAhead) {
            self.reporter().failure(&format!(
                "{} has local commits that are not on {}. Push or drop them before syncing.",
                ctx.branch, ctx.origin
            ));
            return Ok(FlowOutcome::StoppedEarly(StopReason::BranchAhead));
        }

        tracing::info!(step = ?SyncStep::Fetch, upstream = %ctx.upstream, "Sync step");
        let (_, signals) = self
            .step(
                &format!("Fetching {}…", ctx.upstream),
                &commands::fetch(&ctx.upstream),
            )
            .await?;
        if signals.contains(Signal::FetchSucceeded) {
            self.reporter()
                .progress(&format!("Fetched {}", ctx.upstream));
        }

        tracing::info!(step = ?SyncStep::Merge, "Sync step");
        let (_, signals) = self
            .step(
                &format!("Merging {}/{} into {}…", ctx.upstream, ctx.branch, ctx.branch),
                &commands::merge(&ctx.upstream, &ctx.branch),
            )
            .await?;
        if signals.contains(Signal::AlreadyUpToDate) {
            self.reporter().success(&format!(
                "{} is already up to date with {}/{}",
                ctx.branch, ctx.upstream, ctx.branch
            ));
            return Ok(FlowOutcome::StoppedEarly(StopReason::AlreadyUpToDate));
        }
        if signals.contains(Signal::UpdatingBranch) {
            self.reporter()
                .progress(&format!("Merged {}/{}", ctx.upstream, ctx.branch));
        }

        tracing::info!(step = ?SyncStep::Push, origin = %ctx.origin, "Sync step");
        let (_, signals) = self
            .step(
                &format!("Pushing {} to {}…", ctx.branch, ctx.origin),
                &commands::push(&ctx.origin, &ctx.branch),
            )
            .await?;
        if signals.contains(Signal::PushSucceeded) {
            self.reporter()
                .progress(&format!("Pushed {} to {}", ctx.branch, ctx.origin));
        }

        self.reporter().success(&format!(
            "{} is in sync with {}/{}",
            ctx.branch, ctx.upstream, ctx.branch
        ));
        tracing::info!(branch = %ctx.branch, "Sync completed");
        Ok(FlowOutcome::Completed)
    }
}
