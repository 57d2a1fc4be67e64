//! Enrichment orchestration.
//!
//! The host drives two explicit phases:
//!
//! 1. [`Enricher::run_immediate`] at configuration time: OS, CI/LOCAL and all
//!    environment-only CI facts are written synchronously, and git collection
//!    is handed to the [`BackgroundExecutor`].
//! 2. [`ProjectReadyPhase::run_after_project_ready`] once the project graph is
//!    evaluated: IDE detection, TeamCity extraction and the per-test-task
//!    hooks.
//!
//! `run_immediate` consumes the enricher and `run_after_project_ready`
//! consumes the phase value, so neither can run twice.

use std::sync::Arc;

use futures::FutureExt;
use tracing::Instrument;

use crate::config::EnricherConfig;
use crate::env::EnvSnapshot;
use crate::extract::extract_ci_metadata;
use crate::fact::Fact;
use crate::git::GitCollector;
use crate::ide::detect_ide;
use crate::obs::{self, EnrichSpan};
use crate::parallelism::register_test_parallelism;
use crate::process::{CommandRunner, ProcessRunner};
use crate::project::ProjectGraph;
use crate::provider::{detect_all, is_ci, CiProvider};
use crate::sink::{BackgroundExecutor, FactSink};
use crate::teamcity::extract_teamcity;

/// Facts of the immediate phase. A pure function of its inputs.
pub fn immediate_facts(
    env: &EnvSnapshot,
    server: Option<&str>,
    config: &EnricherConfig,
) -> Vec<Fact> {
    let mut facts = Vec::new();

    if let Some(os) = env.property("os.name") {
        facts.push(Fact::tag(os));
    }

    facts.push(Fact::tag(if is_ci(env) { "CI" } else { "LOCAL" }));

    if config.capture_ci {
        facts.extend(extract_ci_metadata(env, server));
    }

    facts
}

/// Facts of the project-ready phase, excluding the per-task hooks.
pub fn project_ready_facts(
    env: &EnvSnapshot,
    project: &dyn ProjectGraph,
    server: Option<&str>,
    config: &EnricherConfig,
) -> Vec<Fact> {
    let mut facts = Vec::new();

    if config.capture_ide {
        facts.extend(detect_ide(env, project));
    }

    if config.capture_ci && CiProvider::TeamCity.detect(env) {
        facts.extend(extract_teamcity(project, server));
    }

    facts
}

/// Entry point: owns the collaborators for one build.
pub struct Enricher {
    env: Arc<EnvSnapshot>,
    sink: Arc<dyn FactSink>,
    background: Arc<dyn BackgroundExecutor>,
    commands: Arc<dyn CommandRunner>,
    config: EnricherConfig,
}

impl Enricher {
    /// Create an enricher that runs git through `tokio::process`.
    pub fn new(
        env: EnvSnapshot,
        sink: Arc<dyn FactSink>,
        background: Arc<dyn BackgroundExecutor>,
        config: EnricherConfig,
    ) -> Self {
        let commands = Arc::new(ProcessRunner::new(
            config.work_dir.clone(),
            config.command_timeout(),
        ));
        Self {
            env: Arc::new(env),
            sink,
            background,
            commands,
            config,
        }
    }

    /// Replace the command runner used for git.
    pub fn with_command_runner(mut self, commands: Arc<dyn CommandRunner>) -> Self {
        self.commands = commands;
        self
    }

    /// Run the immediate phase and schedule background git collection.
    pub fn run_immediate(self) -> ProjectReadyPhase {
        {
            let _span = EnrichSpan::enter("immediate");
            if self.config.capture_ci {
                for provider in detect_all(&self.env) {
                    obs::emit_provider_detected(provider);
                }
            }

            let server = self.sink.server();
            let facts = immediate_facts(&self.env, server.as_deref(), &self.config);
            self.sink.record_all(&facts);
            obs::emit_phase_completed("immediate", facts.len());
        }

        if self.config.capture_git {
            self.schedule_git();
        }

        ProjectReadyPhase {
            env: self.env,
            sink: self.sink,
            config: self.config,
        }
    }

    fn schedule_git(&self) {
        let collector =
            GitCollector::new(self.commands.clone(), self.config.git_executable.clone());
        let sink = self.sink.clone();
        let work = async move {
            let server = sink.server();
            let facts = collector.collect_facts(server.as_deref()).await;
            sink.record_all(&facts);
            obs::emit_phase_completed("git", facts.len());
        }
        .instrument(tracing::info_span!("buildmeta.phase", phase = "git"));
        self.background.background(work.boxed());
    }
}

/// Pending project-ready work, returned by [`Enricher::run_immediate`].
pub struct ProjectReadyPhase {
    env: Arc<EnvSnapshot>,
    sink: Arc<dyn FactSink>,
    config: EnricherConfig,
}

impl ProjectReadyPhase {
    /// Run once the host's project graph is fully evaluated.
    pub fn run_after_project_ready(self, project: &dyn ProjectGraph) {
        let _span = EnrichSpan::enter("project_ready");

        let server = self.sink.server();
        let facts = project_ready_facts(&self.env, project, server.as_deref(), &self.config);
        self.sink.record_all(&facts);

        if self.config.capture_test_parallelism {
            let tasks = register_test_parallelism(project, &self.sink);
            tracing::debug!(event = "parallelism.registered", tasks = tasks);
        }

        obs::emit_phase_completed("project_ready", facts.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::StaticProject;

    #[test]
    fn test_immediate_local() {
        let env = EnvSnapshot::builder().property("os.name", "Linux").build();
        assert_eq!(
            immediate_facts(&env, None, &EnricherConfig::default()),
            vec![Fact::tag("Linux"), Fact::tag("LOCAL")]
        );
    }

    #[test]
    fn test_immediate_ci_capture_disabled() {
        let env = EnvSnapshot::builder()
            .var("CIRCLE_BUILD_URL", "https://circleci.com/gh/a/b/1")
            .build();
        let config = EnricherConfig {
            capture_ci: false,
            ..Default::default()
        };
        assert_eq!(immediate_facts(&env, None, &config), vec![Fact::tag("CI")]);
    }

    #[test]
    fn test_project_ready_teamcity_only_when_detected() {
        let project = StaticProject::new().with_property("build.number", "9");
        let local = EnvSnapshot::default();
        assert_eq!(
            project_ready_facts(&local, &project, None, &EnricherConfig::default()),
            vec![Fact::tag("Cmd Line")]
        );

        let tc = EnvSnapshot::builder().var("TEAMCITY_VERSION", "2024.1").build();
        assert_eq!(
            project_ready_facts(&tc, &project, None, &EnricherConfig::default()),
            vec![Fact::value("CI build number", "9")]
        );
    }
}
