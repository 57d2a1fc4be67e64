//! In-memory collaborators.
//!
//! Provides `MemorySink`, `StaticProject` and `StaticTestTask`, used by the
//! `buildmeta` binary to run enrichment outside a real build tool and by
//! tests to observe exactly what was written.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::fact::Fact;
use crate::project::{ProjectGraph, TaskAction, TestTask};
use crate::sink::FactSink;

// ---------------------------------------------------------------------------
// MemorySink
// ---------------------------------------------------------------------------

/// Append-only sink backed by a `Vec<Fact>`.
#[derive(Debug, Default)]
pub struct MemorySink {
    server: Option<String>,
    facts: Mutex<Vec<Fact>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_server(server: impl Into<String>) -> Self {
        Self {
            server: Some(server.into()),
            facts: Mutex::new(Vec::new()),
        }
    }

    fn push(&self, fact: Fact) {
        self.facts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(fact);
    }

    /// Everything written so far, in write order.
    pub fn facts(&self) -> Vec<Fact> {
        self.facts.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn contains(&self, fact: &Fact) -> bool {
        self.facts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(fact)
    }

    /// Values written under `key`, in write order.
    pub fn values(&self, key: &str) -> Vec<String> {
        self.facts()
            .into_iter()
            .filter_map(|f| match f {
                Fact::Value { key: k, value } if k == key => Some(value),
                _ => None,
            })
            .collect()
    }
}

impl FactSink for MemorySink {
    fn tag(&self, label: &str) {
        self.push(Fact::tag(label));
    }

    fn value(&self, key: &str, value: &str) {
        self.push(Fact::value(key, value));
    }

    fn link(&self, label: &str, url: &str) {
        self.push(Fact::link(label, url));
    }

    fn server(&self) -> Option<String> {
        self.server.clone()
    }
}

// ---------------------------------------------------------------------------
// StaticTestTask
// ---------------------------------------------------------------------------

/// Test task with fixed settings; `execute` fires its registered actions.
#[derive(Default)]
pub struct StaticTestTask {
    identity_path: String,
    max_parallel_forks: u32,
    actions: Mutex<Vec<TaskAction>>,
}

impl StaticTestTask {
    pub fn new(identity_path: impl Into<String>, max_parallel_forks: u32) -> Self {
        Self {
            identity_path: identity_path.into(),
            max_parallel_forks,
            actions: Mutex::new(Vec::new()),
        }
    }

    pub fn action_count(&self) -> usize {
        self.actions.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Run the before-execute actions.
    pub fn execute(&self) {
        let actions = self.actions.lock().unwrap_or_else(|e| e.into_inner());
        for action in actions.iter() {
            action(self);
        }
    }
}

impl std::fmt::Debug for StaticTestTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticTestTask")
            .field("identity_path", &self.identity_path)
            .field("max_parallel_forks", &self.max_parallel_forks)
            .field("actions", &self.action_count())
            .finish()
    }
}

impl TestTask for StaticTestTask {
    fn identity_path(&self) -> String {
        self.identity_path.clone()
    }

    fn max_parallel_forks(&self) -> u32 {
        self.max_parallel_forks
    }

    fn do_first(&self, action: TaskAction) {
        // Newest action runs first.
        self.actions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(0, action);
    }
}

// ---------------------------------------------------------------------------
// StaticProject
// ---------------------------------------------------------------------------

/// Project graph with fixed root properties and test tasks.
#[derive(Debug, Default)]
pub struct StaticProject {
    properties: HashMap<String, String>,
    tasks: Vec<Arc<StaticTestTask>>,
}

impl StaticProject {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    pub fn with_test_task(mut self, identity_path: impl Into<String>, forks: u32) -> Self {
        self.tasks
            .push(Arc::new(StaticTestTask::new(identity_path, forks)));
        self
    }

    pub fn tasks(&self) -> &[Arc<StaticTestTask>] {
        &self.tasks
    }

    /// Execute every test task, as the host would once the build runs.
    pub fn execute_test_tasks(&self) {
        for task in &self.tasks {
            task.execute();
        }
    }
}

impl ProjectGraph for StaticProject {
    fn root_property(&self, name: &str) -> Option<String> {
        self.properties.get(name).cloned()
    }

    fn test_tasks(&self) -> Vec<Arc<dyn TestTask>> {
        self.tasks
            .iter()
            .map(|t| t.clone() as Arc<dyn TestTask>)
            .collect()
    }
}
