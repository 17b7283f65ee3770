use console::{Style, Term};

use crate::git::CommandResult;

/// Where flows send user-facing text.
pub trait Reporter: Send + Sync {
    /// Transient status; the next call replaces it.
    fn progress(&self, line: &str);

    /// Permanent line, e.g. a result or a remedy.
    fn message(&self, text: &str);

    /// Final success line.
    fn success(&self, text: &str);

    /// Final failure line.
    fn failure(&self, text: &str);

    /// Advisory that does not change control flow.
    fn warning(&self, text: &str);

    /// Called after every executed step with its raw output.
    fn step(&self, result: &CommandResult);
}

/// Terminal reporter writing to stderr.
///
/// In diagnostic mode nothing is overwritten and every step prints its
/// command line with the captured stdout and stderr.
pub struct Console {
    term: Term,
    diagnostics: bool,
}

impl Console {
    pub fn new(diagnostics: bool) -> Self {
        Self::with_term(Term::stderr(), diagnostics)
    }

    pub fn with_term(term: Term, diagnostics: bool) -> Self {
        Self { term, diagnostics }
    }

    fn clear(&self) {
        if !self.diagnostics && self.term.is_term() {
            let _ = self.term.clear_line();
        }
    }

    fn line(&self, text: &str) {
        self.clear();
        let _ = self.term.write_line(text);
    }
}

impl Reporter for Console {
    fn progress(&self, line: &str) {
        if self.diagnostics || !self.term.is_term() {
            let _ = self.term.write_line(line);
        } else {
            let _ = self.term.clear_line();
            let _ = self.term.write_str(line);
        }
    }

    fn message(&self, text: &str) {
        self.line(text);
    }

    fn success(&self, text: &str) {
        let style = Style::new().green();
        self.line(&format!("{} {}", style.apply_to("✓"), text));
    }

    fn failure(&self, text: &str) {
        let style = Style::new().red();
        self.line(&format!("{} {}", style.apply_to("✗"), text));
    }

    fn warning(&self, text: &str) {
        let style = Style::new().yellow();
        self.line(&format!("{} {}", style.apply_to("⚠"), text));
    }

    fn step(&self, result: &CommandResult) {
        tracing::debug!(
            command = %result.command,
            success = result.success,
            stdout_len = result.stdout.len(),
            stderr_len = result.stderr.len(),
            "Step finished"
        );

        if !self.diagnostics {
            return;
        }

        let dim = Style::new().dim();
        let _ = self.term.write_line(&format!(
            "{} {}\n{}\n{}\n{}\n{}",
            dim.apply_to("command:"),
            result.command,
            dim.apply_to("stdout:"),
            result.stdout.trim_end(),
            dim.apply_to("stderr:"),
            result.stderr.trim_end(),
        ));
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::fs::File;
    use std::path::Path;

    use super::*;

    fn file_console(path: &Path, diagnostics: bool) -> Console {
        let write = File::create(path).unwrap();
        let read = File::open(path).unwrap();
        Console::with_term(Term::read_write_pair(read, write), diagnostics)
    }

    fn sample_step() -> CommandResult {
        CommandResult::failed(
            "git fetch upstream -v",
            "From https://github.com/owner/repo\n",
            "fatal: Could not read from remote repository.\n",
        )
    }

    #[test]
    fn test_diagnostics_print_every_step() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("console.txt");
        let console = file_console(&path, true);

        console.progress("Fetching upstream…");
        console.step(&sample_step());

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("Fetching upstream…"));
        assert!(written.contains("command:"));
        assert!(written.contains("git fetch upstream -v"));
        assert!(written.contains("From https://github.com/owner/repo"));
        assert!(written.contains("fatal: Could not read from remote repository."));
    }

    #[test]
    fn test_steps_are_quiet_without_diagnostics() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("console.txt");
        let console = file_console(&path, false);

        console.step(&sample_step());
        console.failure("Upstream is unreachable");

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(!written.contains("command:"));
        assert!(!written.contains("git fetch upstream -v"));
        assert!(written.contains("Upstream is unreachable"));
    }
}
