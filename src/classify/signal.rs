use std::collections::BTreeSet;
use std::fmt;

/// A condition recognized in the text of a command's output.
///
/// Declaration order is the rule-table order, which is also the order
/// remedies are printed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Signal {
    NoRemote,
    PathspecAmbiguous,
    NoCommonHistory,
    NotARepository,
    CheckFailed,
    MergeConflict,
    UnresolvedIndex,
    BranchAhead,
    WouldBeOverwritten,
    BadPathspec,
    RemoteAlreadyExists,
    AlreadyUpToDate,
    UpdatingBranch,
    FetchSucceeded,
    PushSucceeded,
}

/// Grouping of signals by what the operator has to do about them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// Tool missing or misbehaving, or not inside a repository.
    Environment,
    /// Local and upstream history disagree.
    Divergence,
    /// Working copy needs manual resolution.
    Conflict,
    /// A name or argument was wrong.
    Input,
    /// Positive markers used only for flow control.
    Progress,
}

impl Signal {
    pub fn category(self) -> Category {
        match self {
            Signal::NoRemote | Signal::NotARepository => Category::Environment,
            Signal::BranchAhead | Signal::NoCommonHistory => Category::Divergence,
            Signal::MergeConflict | Signal::UnresolvedIndex | Signal::WouldBeOverwritten => {
                Category::Conflict
            }
            Signal::PathspecAmbiguous
            | Signal::BadPathspec
            | Signal::RemoteAlreadyExists
            | Signal::CheckFailed => Category::Input,
            Signal::AlreadyUpToDate
            | Signal::UpdatingBranch
            | Signal::FetchSucceeded
            | Signal::PushSucceeded => Category::Progress,
        }
    }

    pub fn is_error(self) -> bool {
        self.category() != Category::Progress
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// The signals recognized in one command result, in rule-table order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignalSet(BTreeSet<Signal>);

impl SignalSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, signal: Signal) {
        self.0.insert(signal);
    }

    pub fn contains(&self, signal: Signal) -> bool {
        self.0.contains(&signal)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Signal> + '_ {
        self.0.iter().copied()
    }

    /// Only the signals that describe a problem.
    pub fn errors(&self) -> SignalSet {
        self.iter().filter(|s| s.is_error()).collect()
    }
}

impl FromIterator<Signal> for SignalSet {
    fn from_iter<I: IntoIterator<Item = Signal>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for SignalSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.iter().map(|s| s.to_string()).collect();
        write!(f, "[{}]", names.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_iterates_in_table_order() {
        let set: SignalSet = [Signal::PushSucceeded, Signal::MergeConflict, Signal::NoRemote]
            .into_iter()
            .collect();
        let order: Vec<Signal> = set.iter().collect();
        assert_eq!(
            order,
            vec![Signal::NoRemote, Signal::MergeConflict, Signal::PushSucceeded]
        );
    }

    #[test]
    fn test_errors_drops_progress_markers() {
        let set: SignalSet = [Signal::FetchSucceeded, Signal::UnresolvedIndex]
            .into_iter()
            .collect();
        let errors = set.errors();
        assert_eq!(errors.len(), 1);
        assert!(errors.contains(Signal::UnresolvedIndex));
    }

    #[test]
    fn test_display() {
        let set: SignalSet = [Signal::MergeConflict, Signal::UnresolvedIndex]
            .into_iter()
            .collect();
        assert_eq!(set.to_string(), "[MergeConflict, UnresolvedIndex]");
    }
}
