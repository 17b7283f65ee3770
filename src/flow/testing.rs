//! Test doubles for the runner and reporter.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::git::{CommandResult, CommandRunner};
use crate::report::Reporter;

use super::{Orchestrator, SyncContext};

/// Answers commands from a script and records every call in order.
///
/// Unscripted commands succeed with empty output.
#[derive(Default)]
pub struct ScriptedRunner {
    responses: HashMap<String, CommandResult>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn succeed(mut self, command: &str, stdout: &str, stderr: &str) -> Self {
        self.responses.insert(
            command.to_string(),
            CommandResult::succeeded(command, stdout, stderr),
        );
        self
    }

    pub fn fail(mut self, command: &str, stdout: &str, stderr: &str) -> Self {
        self.responses.insert(
            command.to_string(),
            CommandResult::failed(command, stdout, stderr),
        );
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn called(&self, command: &str) -> bool {
        self.calls().iter().any(|c| c == command)
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, command: &str) -> CommandResult {
        self.calls.lock().unwrap().push(command.to_string());
        self.responses
            .get(command)
            .cloned()
            .unwrap_or_else(|| CommandResult::succeeded(command, "", ""))
    }
}

/// Keeps every line it is given.
#[derive(Default)]
pub struct RecordingReporter {
    lines: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|l| l.contains(needle))
    }

    fn push(&self, line: &str) {
        self.lines.lock().unwrap().push(line.to_string());
    }
}

impl Reporter for RecordingReporter {
    fn progress(&self, line: &str) {
        self.push(line);
    }

    fn message(&self, text: &str) {
        self.push(text);
    }

    fn success(&self, text: &str) {
        self.push(text);
    }

    fn failure(&self, text: &str) {
        self.push(text);
    }

    fn warning(&self, text: &str) {
        self.push(text);
    }

    fn step(&self, _result: &CommandResult) {}
}

pub fn orchestrator(
    runner: &Arc<ScriptedRunner>,
    reporter: &Arc<RecordingReporter>,
    ctx: SyncContext,
) -> Orchestrator {
    Orchestrator::new(runner.clone(), reporter.clone(), ctx)
}
