//! Output classification.
//!
//! Maps the text of a [`CommandResult`] to the set of [`Signal`]s it
//! contains. Every rule is a plain substring test evaluated independently,
//! so one result can carry several signals. Classification depends on the
//! text alone.

pub mod signal;

pub use signal::{Category, Signal, SignalSet};

use crate::git::CommandResult;

/// A text stream of a command result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Message,
    Stdout,
    Stderr,
}

impl Field {
    fn text(self, result: &CommandResult) -> &str {
        match self {
            Field::Message => result.message_detail(),
            Field::Stdout => &result.stdout,
            Field::Stderr => &result.stderr,
        }
    }
}

/// One entry of the rule table: `fragment` found in any of `fields`.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub signal: Signal,
    pub fragment: &'static str,
    pub fields: &'static [Field],
}

impl Rule {
    pub fn matches(&self, result: &CommandResult) -> bool {
        self.fields
            .iter()
            .any(|field| field.text(result).contains(self.fragment))
    }
}

/// Which field git writes a diagnostic to depends on how the command
/// failed, so problem fragments are searched in every stream.
const ALL: &[Field] = &[Field::Message, Field::Stderr, Field::Stdout];
const STDOUT: &[Field] = &[Field::Stdout];
const STDERR: &[Field] = &[Field::Stderr];

/// The rule table, in remedy order.
pub const RULES: &[Rule] = &[
    Rule {
        signal: Signal::NoRemote,
        fragment: "does not appear to be a git repository",
        fields: ALL,
    },
    Rule {
        signal: Signal::PathspecAmbiguous,
        fragment: "fatal: ambiguous argument",
        fields: ALL,
    },
    Rule {
        signal: Signal::NoCommonHistory,
        fragment: "not something we can merge",
        fields: ALL,
    },
    Rule {
        signal: Signal::NotARepository,
        fragment: "fatal: not a git repository",
        fields: ALL,
    },
    Rule {
        signal: Signal::CheckFailed,
        fragment: "did not match any",
        fields: ALL,
    },
    Rule {
        signal: Signal::MergeConflict,
        fragment: "CONFLICT",
        fields: ALL,
    },
    Rule {
        signal: Signal::UnresolvedIndex,
        fragment: "you need to resolve your current index",
        fields: ALL,
    },
    Rule {
        signal: Signal::BranchAhead,
        fragment: "Your branch is ahead of",
        fields: ALL,
    },
    Rule {
        signal: Signal::WouldBeOverwritten,
        fragment: "would be overwritten",
        fields: ALL,
    },
    Rule {
        signal: Signal::BadPathspec,
        fragment: "pathspec",
        fields: ALL,
    },
    Rule {
        signal: Signal::RemoteAlreadyExists,
        fragment: "already exists",
        fields: ALL,
    },
    // Progress markers stay bound to the stream git prints them on;
    // "Updating" in particular also shows up in checkout progress on stderr.
    Rule {
        signal: Signal::AlreadyUpToDate,
        fragment: "Already up to date",
        fields: STDOUT,
    },
    Rule {
        signal: Signal::UpdatingBranch,
        fragment: "Updating",
        fields: STDOUT,
    },
    Rule {
        signal: Signal::FetchSucceeded,
        fragment: "POST git-upload-pack",
        fields: STDERR,
    },
    Rule {
        signal: Signal::PushSucceeded,
        fragment: "POST git-receive-pack",
        fields: STDERR,
    },
];

/// Classify a command result against [`RULES`].
pub fn classify(result: &CommandResult) -> SignalSet {
    classify_with(RULES, result)
}

/// Classify against a caller-supplied rule table.
pub fn classify_with(rules: &[Rule], result: &CommandResult) -> SignalSet {
    rules
        .iter()
        .filter(|rule| rule.matches(result))
        .map(|rule| rule.signal)
        .collect()
}
