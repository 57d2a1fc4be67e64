//! Host build-tool seams: the evaluated project graph and its test tasks.

use std::sync::Arc;

/// Action run right before a task executes. It receives the task it is
/// attached to, so the closure never needs to capture a task instance.
pub type TaskAction = Box<dyn Fn(&dyn TestTask) + Send + Sync>;

/// A test-type task of the host build.
pub trait TestTask: Send + Sync {
    /// Build-wide unique path, e.g. `:app:test`.
    fn identity_path(&self) -> String;

    /// Configured maximum number of parallel test forks.
    fn max_parallel_forks(&self) -> u32;

    /// Register `action` to run before this task executes.
    fn do_first(&self, action: TaskAction);
}

/// The host's project graph, readable once evaluation has finished.
pub trait ProjectGraph: Send + Sync {
    /// Property of the root project, by exact name.
    fn root_property(&self, name: &str) -> Option<String>;

    /// Every test task across all projects.
    fn test_tasks(&self) -> Vec<Arc<dyn TestTask>>;

    fn has_root_property(&self, name: &str) -> bool {
        self.root_property(name).is_some()
    }
}
