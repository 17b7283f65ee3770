//! What to tell the operator about each recognized signal.

use crate::classify::{Signal, SignalSet};
use crate::git::{commands, CommandResult, CommandRunner};
use crate::report::Reporter;

/// Follow-up shown after a remedy message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Print,
    PrintWithConflicts,
    PrintWithBranches,
    PrintWithRemotes,
    Silent,
}

impl Action {
    /// Listing command whose raw output is appended to the message.
    pub fn listing(self) -> Option<&'static str> {
        match self {
            Action::PrintWithConflicts => Some(commands::SHORT_STATUS),
            Action::PrintWithBranches => Some(commands::LIST_BRANCHES),
            Action::PrintWithRemotes => Some(commands::LIST_REMOTES),
            Action::Print | Action::Silent => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Remedy {
    pub message: &'static str,
    pub action: Action,
}

const fn remedy_of(message: &'static str, action: Action) -> Remedy {
    Remedy { message, action }
}

pub fn remedy(signal: Signal) -> Remedy {
    match signal {
        Signal::NoRemote => remedy_of(
            "The upstream remote is missing or unreachable. Add it with `forksync --add <url>`. Configured remotes:",
            Action::PrintWithRemotes,
        ),
        Signal::PathspecAmbiguous => remedy_of(
            "Git could not tell what the branch name refers to. Local branches:",
            Action::PrintWithBranches,
        ),
        Signal::NoCommonHistory => remedy_of(
            "Upstream has nothing to merge under that name. Check the upstream branch name.",
            Action::Print,
        ),
        Signal::NotARepository => remedy_of(
            "This directory is not a git repository. Run forksync inside your fork's working copy.",
            Action::Print,
        ),
        Signal::CheckFailed => remedy_of(
            "The branch does not exist in this working copy. Local branches:",
            Action::PrintWithBranches,
        ),
        Signal::MergeConflict => remedy_of(
            "Merge conflict. Resolve these files, commit, then run forksync again:",
            Action::PrintWithConflicts,
        ),
        Signal::UnresolvedIndex => remedy_of(
            "A previous merge is unfinished. Resolve it or run `git merge --abort` first:",
            Action::PrintWithConflicts,
        ),
        Signal::BranchAhead => remedy_of(
            "Your branch has commits that are not on origin. Push or drop them before syncing.",
            Action::Print,
        ),
        Signal::WouldBeOverwritten => remedy_of(
            "Local changes would be overwritten. Commit or stash them first:",
            Action::PrintWithConflicts,
        ),
        Signal::BadPathspec => remedy_of(
            "Git did not recognize a branch or path. Local branches:",
            Action::PrintWithBranches,
        ),
        Signal::RemoteAlreadyExists => remedy_of(
            "A remote with that name already exists. Configured remotes:",
            Action::PrintWithRemotes,
        ),
        Signal::AlreadyUpToDate
        | Signal::UpdatingBranch
        | Signal::FetchSucceeded
        | Signal::PushSucceeded => remedy_of("", Action::Silent),
    }
}

/// Print the remedies for a failed command.
///
/// Listing commands are run at most once each and their output is printed
/// verbatim; it is never classified. A failure without any recognized
/// problem prints its raw diagnostic text instead.
pub async fn report_failure(
    runner: &dyn CommandRunner,
    reporter: &dyn Reporter,
    failure: &CommandResult,
    signals: &SignalSet,
) {
    let errors = signals.errors();
    if errors.is_empty() {
        reporter.failure(&raw_diagnostic(failure));
        return;
    }

    let mut listed: Vec<&'static str> = Vec::new();
    for signal in errors.iter() {
        let fix = remedy(signal);
        if fix.action == Action::Silent {
            continue;
        }
        reporter.failure(fix.message);

        if let Some(listing) = fix.action.listing() {
            if listed.contains(&listing) {
                continue;
            }
            listed.push(listing);
            let output = runner.run(listing).await;
            reporter.step(&output);
            let text = if output.stdout.trim().is_empty() {
                output.stderr.trim_end()
            } else {
                output.stdout.trim_end()
            };
            if !text.is_empty() {
                reporter.message(text);
            }
        }
    }
}

fn raw_diagnostic(failure: &CommandResult) -> String {
    if let Some(message) = &failure.message {
        return message.trim_end().to_string();
    }
    if !failure.stderr.trim().is_empty() {
        return failure.stderr.trim_end().to_string();
    }
    format!("Command failed: {}", failure.command)
}
