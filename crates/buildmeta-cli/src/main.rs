//! buildmeta - build environment metadata
//!
//! Runs enrichment against the current process environment and prints the
//! resulting tags, custom values and links.
//!
//! ```text
//! buildmeta --server https://ge.example.com -P build.number=42 --test-task :app:test=4
//! ```

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, Level};

use buildmeta_core::{
    BackgroundExecutor, CommandRunner, Enricher, EnricherConfig, EnvSnapshot, Fact, FactSink,
    MemorySink, ProcessRunner, StaticProject, TokioBackground,
};

#[derive(Parser, Debug)]
#[command(name = "buildmeta")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Detect CI, IDE and git metadata for a build", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    log_json: bool,

    /// Print facts as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Build-scan server URL; enables search links
    #[arg(long, env = "BUILDMETA_SERVER")]
    server: Option<String>,

    /// Git executable
    #[arg(long, env = "BUILDMETA_GIT")]
    git: Option<String>,

    /// Directory to collect git metadata in (default: current directory)
    #[arg(long)]
    dir: Option<PathBuf>,

    /// Timeout for each external command, in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// JSON file with enrichment settings; flags take precedence
    #[arg(long)]
    config: Option<PathBuf>,

    /// Skip git collection
    #[arg(long)]
    no_git: bool,

    /// Project property (repeatable)
    #[arg(short = 'P', value_name = "KEY=VALUE", value_parser = parse_key_value)]
    project_properties: Vec<(String, String)>,

    /// System property (repeatable)
    #[arg(short = 'D', value_name = "KEY=VALUE", value_parser = parse_key_value)]
    system_properties: Vec<(String, String)>,

    /// Test task and its max parallel forks (repeatable)
    #[arg(long = "test-task", value_name = "PATH=FORKS", value_parser = parse_test_task)]
    test_tasks: Vec<(String, u32)>,
}

/// JSON output shape.
#[derive(Debug, Serialize)]
struct Report<'a> {
    version: &'static str,
    server: Option<&'a str>,
    facts: &'a [Fact],
}

fn parse_key_value(s: &str) -> std::result::Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, _)) if key.is_empty() => Err(format!("empty key in '{s}'")),
        Some((key, value)) => Ok((key.to_string(), value.to_string())),
        None => Err(format!("expected KEY=VALUE, got '{s}'")),
    }
}

fn parse_test_task(s: &str) -> std::result::Result<(String, u32), String> {
    let (path, forks) = s
        .rsplit_once('=')
        .ok_or_else(|| format!("expected PATH=FORKS, got '{s}'"))?;
    if path.is_empty() {
        return Err(format!("empty task path in '{s}'"));
    }
    let forks = forks
        .parse::<u32>()
        .map_err(|e| format!("invalid fork count '{forks}': {e}"))?;
    Ok((path.to_string(), forks))
}

fn load_config(cli: &Cli) -> Result<EnricherConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("Invalid config {}", path.display()))?
        }
        None => EnricherConfig::default(),
    };

    if let Some(git) = &cli.git {
        config.git_executable = git.clone();
    }
    if let Some(dir) = &cli.dir {
        if !dir.is_dir() {
            bail!("Not a directory: {}", dir.display());
        }
        config.work_dir = Some(dir.clone());
    }
    if cli.timeout_secs.is_some() {
        config.command_timeout_secs = cli.timeout_secs;
    }
    if cli.no_git {
        config.capture_git = false;
    }
    Ok(config)
}

fn build_project(cli: &Cli) -> StaticProject {
    let project = cli
        .project_properties
        .iter()
        .fold(StaticProject::new(), |p, (k, v)| p.with_property(k, v));
    cli.test_tasks
        .iter()
        .fold(project, |p, (path, forks)| p.with_test_task(path, *forks))
}

/// Run both phases and the test-task hooks, then wait for git.
async fn enrich(
    env: EnvSnapshot,
    project: &StaticProject,
    config: EnricherConfig,
    server: Option<&str>,
    commands: Arc<dyn CommandRunner>,
) -> Vec<Fact> {
    let sink = Arc::new(match server {
        Some(server) => MemorySink::with_server(server),
        None => MemorySink::new(),
    });
    let background = Arc::new(TokioBackground::current());

    let fact_sink: Arc<dyn FactSink> = sink.clone();
    let executor: Arc<dyn BackgroundExecutor> = background.clone();
    Enricher::new(env, fact_sink, executor, config)
        .with_command_runner(commands)
        .run_immediate()
        .run_after_project_ready(project);

    project.execute_test_tasks();
    debug!(pending = background.pending(), "Waiting for background work");
    background.join_all().await;

    sink.facts()
}

fn print_facts(facts: &[Fact], server: Option<&str>, json: bool) -> Result<()> {
    if json {
        let report = Report {
            version: buildmeta_core::VERSION,
            server,
            facts,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for fact in facts {
            println!("{fact}");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    buildmeta_core::init_tracing(cli.log_json, level);

    let config = load_config(&cli)?;
    let commands = Arc::new(ProcessRunner::new(
        config.work_dir.clone(),
        config.command_timeout(),
    ));
    let env = EnvSnapshot::from_process(cli.system_properties.iter().cloned());
    let project = build_project(&cli);
    let server = cli.server.as_deref();

    let facts = enrich(env, &project, config, server, commands).await;
    print_facts(&facts, server, cli.json)
}
