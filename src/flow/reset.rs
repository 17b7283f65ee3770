use crate::git::commands;

use super::{settle, FlowOutcome, Halt, Orchestrator};

/// `git status` wording for a merge that is still in progress.
const UNMERGED_PATHS: &str = "have unmerged paths";

impl Orchestrator {
    /// Make the branch identical to upstream and force-push it to origin.
    ///
    /// Destroys local commits and working-copy changes. Asking the operator
    /// for confirmation is the caller's job.
    pub async fn reset(&self) -> FlowOutcome {
        settle(self.reset_steps().await)
    }

    async fn reset_steps(&self) -> Result<FlowOutcome, Halt> {
        let ctx = self.context();

        let (status, _) = self
            .step("Checking repository status…", commands::STATUS)
            .await?;
        if status.stdout.contains(UNMERGED_PATHS) {
            tracing::info!("Aborting unfinished merge before reset");
            self.step("Aborting unfinished merge…", commands::ABORT_MERGE)
                .await?;
        }

        self.step(
            &format!("Checking out {}…", ctx.branch),
            &commands::checkout(&ctx.branch),
        )
        .await?;
        self.step(
            &format!("Fetching {}…", ctx.upstream),
            &commands::fetch(&ctx.upstream),
        )
        .await?;
        self.step(
            &format!("Resetting {} to {}/{}…", ctx.branch, ctx.upstream, ctx.branch),
            &commands::hard_reset(&ctx.upstream, &ctx.branch),
        )
        .await?;
        self.step(
            &format!("Force-pushing {} to {}…", ctx.branch, ctx.origin),
            &commands::force_push(&ctx.origin, &ctx.branch),
        )
        .await?;

        tracing::warn!(
            branch = %ctx.branch,
            upstream = %ctx.upstream,
            "Branch hard-reset and force-pushed"
        );
        self.reporter().success(&format!(
            "{} reset to {}/{} and force-pushed to {}",
            ctx.branch, ctx.upstream, ctx.branch, ctx.origin
        ));
        Ok(FlowOutcome::Completed)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::classify::{Signal, SignalSet};
    use crate::flow::testing::{orchestrator, RecordingReporter, ScriptedRunner};
    use crate::flow::SyncContext;

    const MID_MERGE_STATUS: &str = "On branch master\n\
You have unmerged paths.\n  (fix conflicts and run \"git commit\")\n\
  (use \"git merge --abort\" to abort the merge)\n";

    #[tokio::test]
    async fn test_reset_aborts_unfinished_merge_first() {
        let runner = Arc::new(ScriptedRunner::new().succeed("git status", MID_MERGE_STATUS, ""));
        let reporter = Arc::new(RecordingReporter::default());
        let orch = orchestrator(&runner, &reporter, SyncContext::default());

        let outcome = orch.reset().await;

        assert_eq!(outcome, FlowOutcome::Completed);
        assert_eq!(
            runner.calls(),
            vec![
                "git status",
                "git merge --abort",
                "git checkout master",
                "git fetch upstream -v",
                "git reset --hard upstream/master",
                "git push origin master --force -v",
            ]
        );
    }

    #[tokio::test]
    async fn test_reset_skips_abort_on_clean_status() {
        let runner = Arc::new(ScriptedRunner::new().succeed(
            "git status",
            "On branch master\nnothing to commit, working tree clean\n",
            "",
        ));
        let reporter = Arc::new(RecordingReporter::default());
        let orch = orchestrator(&runner, &reporter, SyncContext::default());

        let outcome = orch.reset().await;

        assert_eq!(outcome, FlowOutcome::Completed);
        assert!(!runner.called("git merge --abort"));
        assert_eq!(runner.calls().len(), 5);
    }

    #[tokio::test]
    async fn test_reset_stops_when_fetch_fails() {
        let runner = Arc::new(ScriptedRunner::new().fail(
            "git fetch upstream -v",
            "",
            "fatal: 'upstream' does not appear to be a git repository\n",
        ));
        let reporter = Arc::new(RecordingReporter::default());
        let orch = orchestrator(&runner, &reporter, SyncContext::default());

        let outcome = orch.reset().await;

        let expected: SignalSet = [Signal::NoRemote].into_iter().collect();
        assert_eq!(outcome, FlowOutcome::Failed(expected));
        assert!(!runner.called("git reset --hard upstream/master"));
        assert!(!runner.called("git push origin master --force -v"));
    }

    #[tokio::test]
    async fn test_reset_outside_repository() {
        let runner = Arc::new(ScriptedRunner::new().fail(
            "git status",
            "",
            "fatal: not a git repository (or any of the parent directories): .git\n",
        ));
        let reporter = Arc::new(RecordingReporter::default());
        let orch = orchestrator(&runner, &reporter, SyncContext::default());

        let outcome = orch.reset().await;

        let expected: SignalSet = [Signal::NotARepository].into_iter().collect();
        assert_eq!(outcome, FlowOutcome::Failed(expected));
        assert_eq!(runner.calls(), vec!["git status"]);
    }
}
