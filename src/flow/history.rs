use crate::git::commands;

use super::{settle, FlowOutcome, Halt, Orchestrator};

/// One line of `git log` output in the history format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub hash: String,
    pub author: String,
    pub when: String,
    pub subject: String,
}

impl LogEntry {
    /// Parse a tab-separated `hash, author, date, subject` line.
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.splitn(4, '\t');
        let hash = parts.next()?.trim();
        let author = parts.next()?;
        let when = parts.next()?;
        let subject = parts.next()?;
        if hash.is_empty() {
            return None;
        }
        Some(Self {
            hash: hash.to_string(),
            author: author.to_string(),
            when: when.to_string(),
            subject: subject.to_string(),
        })
    }

    pub fn render(&self) -> String {
        format!("{}  {}  ({}, {})", self.hash, self.subject, self.when, self.author)
    }
}

/// Render history output, keeping lines that do not parse as they are.
pub fn format_history(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .take(commands::HISTORY_LIMIT)
        .map(|line| match LogEntry::parse(line) {
            Some(entry) => entry.render(),
            None => line.to_string(),
        })
        .collect()
}

impl Orchestrator {
    /// Print the most recent commits without touching anything.
    pub async fn log_only(&self) -> FlowOutcome {
        settle(self.history_steps().await)
    }

    async fn history_steps(&self) -> Result<FlowOutcome, Halt> {
        let (result, _) = self
            .step("Reading history…", &commands::history())
            .await?;

        let lines = format_history(&result.stdout);
        if lines.is_empty() {
            self.reporter().message("No commits found");
        } else {
            self.reporter().message(&lines.join("\n"));
        }
        Ok(FlowOutcome::Completed)
    }
}
