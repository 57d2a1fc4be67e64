//! buildmeta Core Library
//!
//! Detects where and how a build runs (OS, IDE or command line, CI provider,
//! git state, test parallelism) and writes the result as tags, custom values
//! and links to a [`FactSink`].

pub mod background;
pub mod config;
pub mod enricher;
pub mod env;
pub mod error;
pub mod extract;
pub mod fact;
pub mod fakes;
pub mod git;
pub mod ide;
pub mod memory;
pub mod obs;
pub mod parallelism;
pub mod process;
pub mod project;
pub mod properties;
pub mod provider;
pub mod search;
pub mod sink;
pub mod teamcity;
pub mod telemetry;

pub use background::TokioBackground;
pub use config::EnricherConfig;
pub use enricher::{immediate_facts, project_ready_facts, Enricher, ProjectReadyPhase};
pub use env::{EnvSnapshot, EnvSnapshotBuilder};
pub use error::{BuildMetaError, Result};
pub use extract::{extract_ci_metadata, Rule, CI_BUILD_NUMBER};
pub use fact::Fact;
pub use git::{git_facts, source_link, GitCollector, GitState, HostPattern, HOST_PATTERNS};
pub use ide::detect_ide;
pub use memory::{MemorySink, StaticProject, StaticTestTask};
pub use obs::{
    emit_fact_recorded, emit_git_host_matched, emit_git_step_skipped, emit_input_unreadable,
    emit_phase_completed, emit_provider_detected, EnrichSpan,
};
pub use parallelism::{
    capture_max_parallel_forks, max_parallel_forks_key, register_test_parallelism,
};
pub use process::{CommandOutput, CommandRunner, ProcessRunner};
pub use project::{ProjectGraph, TaskAction, TestTask};
pub use properties::read_properties_file;
pub use provider::{detect_all, is_ci, CiProvider};
pub use search::{search_link, value_with_search_link, SCAN_ID_PLACEHOLDER};
pub use sink::{BackgroundExecutor, FactSink};
pub use teamcity::extract_teamcity;
pub use telemetry::init_tracing;

/// buildmeta version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
