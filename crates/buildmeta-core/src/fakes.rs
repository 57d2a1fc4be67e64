//! Deterministic fakes for external commands (testing only).
//!
//! `ScriptedCommands` answers each command line from a fixed table and
//! records every invocation, so collectors can be tested without git.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::process::CommandRunner;

/// Scripted response for one command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scripted {
    /// Exit 0 with this stdout.
    Output(String),
    /// Non-zero exit.
    Fail,
}

/// [`CommandRunner`] answering from a table keyed by the full command line
/// (`"git rev-parse --abbrev-ref HEAD"`). Unknown commands fail.
#[derive(Debug, Default)]
pub struct ScriptedCommands {
    responses: HashMap<String, Scripted>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedCommands {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output(mut self, command_line: &str, stdout: &str) -> Self {
        self.responses
            .insert(command_line.to_string(), Scripted::Output(stdout.to_string()));
        self
    }

    pub fn with_failure(mut self, command_line: &str) -> Self {
        self.responses
            .insert(command_line.to_string(), Scripted::Fail);
        self
    }

    /// A working git in a repository with the given state. `None` fields fail.
    pub fn git_repo(
        commit_id: Option<&str>,
        branch: Option<&str>,
        status: Option<&str>,
        origin_url: Option<&str>,
    ) -> Self {
        let mut commands = Self::new().with_output("git --version", "git version 2.45.0");
        for (line, out) in [
            ("git rev-parse --short=8 --verify HEAD", commit_id),
            ("git rev-parse --abbrev-ref HEAD", branch),
            ("git status --porcelain", status),
            ("git config --get remote.origin.url", origin_url),
        ] {
            commands = match out {
                Some(out) => commands.with_output(line, out),
                None => commands.with_failure(line),
            };
        }
        commands
    }

    /// Command lines invoked so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn respond(&self, program: &str, args: &[&str]) -> Scripted {
        let line = std::iter::once(program)
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ");
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).push(line.clone());
        self.responses.get(&line).cloned().unwrap_or(Scripted::Fail)
    }
}

#[async_trait]
impl CommandRunner for ScriptedCommands {
    async fn stdout(&self, program: &str, args: &[&str]) -> Option<String> {
        match self.respond(program, args) {
            Scripted::Output(out) => Some(out.trim_end().to_string()),
            Scripted::Fail => None,
        }
    }

    async fn succeeds(&self, program: &str, args: &[&str]) -> bool {
        matches!(self.respond(program, args), Scripted::Output(_))
    }
}
