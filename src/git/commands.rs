//! Command lines issued against the `git` CLI.
//!
//! Remote and branch names are interpolated verbatim, so they must pass
//! [`validate_name`] first. URLs are single-quoted.

use crate::error::{AppError, Result};

pub const VERSION: &str = "git --version";
pub const STATUS: &str = "git status";
pub const SHORT_STATUS: &str = "git status -s";
pub const ABORT_MERGE: &str = "git merge --abort";
pub const LIST_BRANCHES: &str = "git branch";
pub const LIST_REMOTES: &str = "git remote -v";

/// Number of entries shown by the history command.
pub const HISTORY_LIMIT: usize = 10;

/// Fields are tab-separated: hash, author, relative date, subject.
pub fn history() -> String {
    format!("git log -n {HISTORY_LIMIT} --pretty=format:'%h%x09%an%x09%ar%x09%s'")
}

pub fn checkout(branch: &str) -> String {
    format!("git checkout {branch}")
}

pub fn fetch(remote: &str) -> String {
    format!("git fetch {remote} -v")
}

pub fn merge(upstream: &str, branch: &str) -> String {
    format!("git merge {upstream}/{branch} {branch}")
}

pub fn push(origin: &str, branch: &str) -> String {
    format!("git push {origin} {branch} -v")
}

pub fn force_push(origin: &str, branch: &str) -> String {
    format!("git push {origin} {branch} --force -v")
}

pub fn hard_reset(upstream: &str, branch: &str) -> String {
    format!("git reset --hard {upstream}/{branch}")
}

pub fn add_remote(name: &str, url: &str) -> String {
    format!("git remote add {name} {}", shell_quote(url))
}

pub fn remove_remote(name: &str) -> String {
    format!("git remote remove {name}")
}

/// Reject names that could be read as options or as shell syntax.
pub fn validate_name(kind: &'static str, name: &str) -> Result<()> {
    let reason = if name.is_empty() {
        Some("empty")
    } else if name.starts_with('-') {
        Some("starts with '-'")
    } else if name.chars().any(char::is_whitespace) {
        Some("contains whitespace")
    } else if name.chars().any(|c| SHELL_META.contains(&c)) {
        Some("contains shell metacharacters")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(AppError::InvalidName {
            kind,
            name: name.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

const SHELL_META: &[char] = &[
    ';', '&', '|', '$', '`', '<', '>', '(', ')', '\'', '"', '\\', '*', '?', '!', '{', '}', '#', '~',
];

/// POSIX single-quote `value` for `sh -c`.
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_command_lines() {
        assert_eq!(checkout("master"), "git checkout master");
        assert_eq!(fetch("upstream"), "git fetch upstream -v");
        assert_eq!(merge("upstream", "master"), "git merge upstream/master master");
        assert_eq!(push("origin", "master"), "git push origin master -v");
        assert_eq!(hard_reset("upstream", "main"), "git reset --hard upstream/main");
        assert_eq!(force_push("origin", "main"), "git push origin main --force -v");
    }

    #[test]
    fn test_add_remote_quotes_url() {
        assert_eq!(
            add_remote("upstream", "https://github.com/owner/repo.git"),
            "git remote add upstream 'https://github.com/owner/repo.git'"
        );
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
    }

    #[test]
    fn test_validate_name_rejects_option_and_shell_syntax() {
        assert!(validate_name("branch", "-evil").is_err());
        assert!(validate_name("branch", "--upload-pack").is_err());
        assert!(validate_name("remote", "up stream").is_err());
        assert!(validate_name("remote", "x;rm -rf .").is_err());
        assert!(validate_name("remote", "$(id)").is_err());
        assert!(validate_name("branch", "").is_err());
    }

    #[test]
    fn test_validate_name_accepts_normal() {
        assert!(validate_name("branch", "main").is_ok());
        assert!(validate_name("branch", "feature/my-branch").is_ok());
        assert!(validate_name("branch", "release-1.2_x").is_ok());
        assert!(validate_name("remote", "upstream").is_ok());
    }
}
