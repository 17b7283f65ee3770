use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

/// Captured text of one external command.
///
/// Produced once per invocation and never interpreted by the runner itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandResult {
    pub command: String,
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
    /// Set on failure: `Command failed: <command>` plus stderr for a non-zero
    /// exit, or the launch error text when the process never started.
    pub message: Option<String>,
}

impl CommandResult {
    pub fn succeeded(command: &str, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            command: command.to_string(),
            stdout: stdout.into(),
            stderr: stderr.into(),
            success: true,
            message: None,
        }
    }

    pub fn failed(command: &str, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        let stderr = stderr.into();
        let message = if stderr.is_empty() {
            format!("Command failed: {command}")
        } else {
            format!("Command failed: {command}\n{stderr}")
        };
        Self {
            command: command.to_string(),
            stdout: stdout.into(),
            stderr,
            success: false,
            message: Some(message),
        }
    }

    pub fn launch_error(command: &str, error: &std::io::Error) -> Self {
        Self {
            command: command.to_string(),
            success: false,
            message: Some(format!("Failed to launch `{command}`: {error}")),
            ..Default::default()
        }
    }

    /// The message text, or empty when the command succeeded.
    pub fn message_text(&self) -> &str {
        self.message.as_deref().unwrap_or("")
    }

    /// The message without the header naming the command line.
    ///
    /// User-supplied names end up in the command line, so only the text
    /// after the header describes what went wrong.
    pub fn message_detail(&self) -> &str {
        let message = self.message_text();
        let failed = format!("Command failed: {}", self.command);
        let launch = format!("Failed to launch `{}`: ", self.command);
        if let Some(rest) = message.strip_prefix(failed.as_str()) {
            rest.strip_prefix('\n').unwrap_or(rest)
        } else if let Some(rest) = message.strip_prefix(launch.as_str()) {
            rest
        } else {
            message
        }
    }
}

/// Executes one shell command line and captures its output.
///
/// Implementations never fail: launch errors and non-zero exits come back as
/// a `CommandResult` with `success == false`.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, command: &str) -> CommandResult;
}

/// Runs command lines through `sh -c`.
///
/// Command strings quote arguments for a POSIX shell, so there is no
/// `cmd.exe` fallback.
#[derive(Debug, Clone, Default)]
pub struct ShellRunner {
    cwd: Option<PathBuf>,
}

impl ShellRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run commands in `dir` instead of the process working directory.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            cwd: Some(dir.into()),
        }
    }

    fn shell_command(command: &str) -> Command {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(command);
        cmd
    }
}

#[async_trait]
impl CommandRunner for ShellRunner {
    async fn run(&self, command: &str) -> CommandResult {
        let mut cmd = Self::shell_command(command);
        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        tracing::debug!(command, "Running command");

        let output = match cmd.output().await {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!(command, error = %e, "Failed to launch command");
                return CommandResult::launch_error(command, &e);
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if output.status.success() {
            CommandResult::succeeded(command, stdout, stderr)
        } else {
            tracing::debug!(
                command,
                exit_code = output.status.code().unwrap_or(-1),
                "Command exited with failure"
            );
            CommandResult::failed(command, stdout, stderr)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_message_includes_stderr() {
        let result = CommandResult::failed(
            "git fetch upstream -v",
            "",
            "fatal: 'upstream' does not appear to be a git repository",
        );
        assert!(!result.success);
        assert_eq!(
            result.message_text(),
            "Command failed: git fetch upstream -v\nfatal: 'upstream' does not appear to be a git repository"
        );
    }

    #[test]
    fn test_launch_error_keeps_command() {
        let err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let result = CommandResult::launch_error("git --version", &err);
        assert!(!result.success);
        assert_eq!(result.command, "git --version");
        assert!(result.message_text().contains("no such file"));
        assert_eq!(result.message_detail(), "no such file");
    }

    #[test]
    fn test_message_detail_drops_command_header() {
        let result = CommandResult::failed(
            "git push origin fix-pathspec -v",
            "",
            "remote: Permission denied",
        );
        assert_eq!(result.message_detail(), "remote: Permission denied");

        let silent = CommandResult::failed("git checkout CONFLICT-notes", "", "");
        assert_eq!(silent.message_detail(), "");

        let bare = CommandResult {
            message: Some("fatal: not a git repository".to_string()),
            ..Default::default()
        };
        assert_eq!(bare.message_detail(), "fatal: not a git repository");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_shell_runner_captures_both_streams() {
        let runner = ShellRunner::new();
        let result = runner.run("echo out; echo err 1>&2").await;
        assert!(result.success);
        assert_eq!(result.stdout, "out\n");
        assert_eq!(result.stderr, "err\n");
        assert!(result.message.is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_shell_runner_nonzero_exit_is_failure() {
        let runner = ShellRunner::new();
        let result = runner.run("echo partial; echo broken 1>&2; exit 3").await;
        assert!(!result.success);
        assert_eq!(result.stdout, "partial\n");
        assert!(result.message_text().contains("broken"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_quoted_url_reaches_command_verbatim() {
        let url = "https://example.com/o'brien/repo name.git";
        let runner = ShellRunner::new();
        let result = runner
            .run(&format!("printf '%s' {}", crate::git::commands::shell_quote(url)))
            .await;
        assert!(result.success);
        assert_eq!(result.stdout, url);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_shell_runner_respects_working_dir() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("marker.txt"), "x").unwrap();

        let runner = ShellRunner::in_dir(tmp.path());
        let result = runner.run("ls").await;
        assert!(result.stdout.contains("marker.txt"));
    }
}
