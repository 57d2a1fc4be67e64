//! External command execution.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::{BuildMetaError, Result};

/// Runs external commands for collectors.
///
/// Failures are reported as absence: `stdout` returns `None` and `succeeds`
/// returns `false` for a launch error, a non-zero exit or a timeout.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Stdout of a successful run, with trailing whitespace trimmed.
    async fn stdout(&self, program: &str, args: &[&str]) -> Option<String>;

    /// Whether the command ran and exited with status 0.
    async fn succeeds(&self, program: &str, args: &[&str]) -> bool;
}

/// Output of a finished command.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub success: bool,
}

/// [`CommandRunner`] backed by `tokio::process`.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    work_dir: Option<PathBuf>,
    timeout: Option<Duration>,
}

impl ProcessRunner {
    pub fn new(work_dir: Option<PathBuf>, timeout: Option<Duration>) -> Self {
        Self { work_dir, timeout }
    }

    /// Run `program` with `args` and capture its output.
    ///
    /// Without a configured timeout the call waits as long as the child runs.
    pub async fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput> {
        let command_line = render(program, args);

        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.work_dir {
            command.current_dir(dir);
        }
        let child = command.spawn()?;

        let output = match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, child.wait_with_output())
                .await
                .map_err(|_| BuildMetaError::CommandTimedOut {
                    command: command_line.clone(),
                    timeout,
                })??,
            None => child.wait_with_output().await?,
        };

        Ok(CommandOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            success: output.status.success(),
        })
    }

    async fn run_checked(&self, program: &str, args: &[&str]) -> Result<CommandOutput> {
        let output = self.run(program, args).await?;
        if !output.success {
            return Err(BuildMetaError::CommandFailed {
                command: render(program, args),
                code: Some(output.exit_code),
            });
        }
        Ok(output)
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn stdout(&self, program: &str, args: &[&str]) -> Option<String> {
        match self.run_checked(program, args).await {
            Ok(output) => Some(output.stdout.trim_end().to_string()),
            Err(e) => {
                debug!(event = "command.failed", command = %render(program, args), error = %e);
                None
            }
        }
    }

    async fn succeeds(&self, program: &str, args: &[&str]) -> bool {
        match self.run_checked(program, args).await {
            Ok(_) => true,
            Err(e) => {
                debug!(event = "command.failed", command = %render(program, args), error = %e);
                false
            }
        }
    }
}

fn render(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stdout_trims_trailing_whitespace_only() {
        let runner = ProcessRunner::default();
        let out = runner.stdout("printf", &["  x\\n\\n"]).await;
        assert_eq!(out.as_deref(), Some("  x"));
    }

    #[tokio::test]
    async fn test_failing_command_is_absent() {
        let runner = ProcessRunner::default();
        assert_eq!(runner.stdout("false", &[]).await, None);
        assert!(!runner.succeeds("false", &[]).await);
        assert!(runner.succeeds("true", &[]).await);
    }

    #[tokio::test]
    async fn test_missing_program_is_absent() {
        let runner = ProcessRunner::default();
        assert!(!runner.succeeds("buildmeta-no-such-binary", &["--version"]).await);
        let err = runner.run("buildmeta-no-such-binary", &[]).await.unwrap_err();
        assert!(matches!(err, BuildMetaError::Io(_)));
    }

    #[tokio::test]
    async fn test_timeout() {
        let runner = ProcessRunner::new(None, Some(Duration::from_millis(50)));
        let err = runner.run("sleep", &["5"]).await.unwrap_err();
        assert!(matches!(err, BuildMetaError::CommandTimedOut { .. }));
        assert_eq!(runner.stdout("sleep", &["5"]).await, None);
    }

    #[tokio::test]
    async fn test_work_dir() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ProcessRunner::new(Some(dir.path().to_path_buf()), None);
        let out = runner.stdout("pwd", &[]).await.unwrap();
        let expected = dir.path().canonicalize().unwrap();
        assert_eq!(std::path::Path::new(&out).canonicalize().unwrap(), expected);
    }

    #[test]
    fn test_render() {
        assert_eq!(render("git", &["status", "--porcelain"]), "git status --porcelain");
    }
}
