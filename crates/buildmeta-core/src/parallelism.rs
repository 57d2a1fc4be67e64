//! Per-test-task parallelism capture.

use std::sync::Arc;

use crate::project::{ProjectGraph, TaskAction, TestTask};
use crate::sink::FactSink;

/// Key under which a task's fork count is recorded.
pub fn max_parallel_forks_key(identity_path: &str) -> String {
    format!("{identity_path}#maxParallelForks")
}

/// Before-execute action recording the fork count of the task it runs on.
///
/// The closure captures only the sink; the task arrives as an argument, so
/// no task instance is held by the action.
pub fn capture_max_parallel_forks(sink: Arc<dyn FactSink>) -> TaskAction {
    Box::new(move |task: &dyn TestTask| {
        sink.value(
            &max_parallel_forks_key(&task.identity_path()),
            &task.max_parallel_forks().to_string(),
        );
    })
}

/// Register the capture action once on every test task. Returns how many
/// tasks were instrumented.
pub fn register_test_parallelism(project: &dyn ProjectGraph, sink: &Arc<dyn FactSink>) -> usize {
    let tasks = project.test_tasks();
    for task in &tasks {
        task.do_first(capture_max_parallel_forks(sink.clone()));
    }
    tasks.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemorySink, StaticProject};

    #[test]
    fn test_value_written_only_on_execute() {
        let sink = Arc::new(MemorySink::new());
        let dyn_sink: Arc<dyn FactSink> = sink.clone();
        let project = StaticProject::new()
            .with_test_task(":app:test", 4)
            .with_test_task(":lib:integrationTest", 1);

        assert_eq!(register_test_parallelism(&project, &dyn_sink), 2);
        assert!(sink.facts().is_empty());

        project.execute_test_tasks();
        assert_eq!(sink.values(":app:test#maxParallelForks"), vec!["4"]);
        assert_eq!(sink.values(":lib:integrationTest#maxParallelForks"), vec!["1"]);
    }

    #[test]
    fn test_one_action_per_task() {
        let sink: Arc<dyn FactSink> = Arc::new(MemorySink::new());
        let project = StaticProject::new().with_test_task(":test", 2);
        register_test_parallelism(&project, &sink);
        assert_eq!(project.tasks()[0].action_count(), 1);
    }

    #[test]
    fn test_key_format() {
        assert_eq!(max_parallel_forks_key(":a:test"), ":a:test#maxParallelForks");
    }
}
