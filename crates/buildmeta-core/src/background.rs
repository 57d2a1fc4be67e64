//! Tokio-backed [`BackgroundExecutor`].

use std::sync::Mutex;

use futures::future::BoxFuture;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::sink::BackgroundExecutor;

/// Spawns background work on a tokio runtime and keeps the join handles so
/// the host can wait for (or abandon) it before final reporting.
#[derive(Debug)]
pub struct TokioBackground {
    handle: Handle,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl TokioBackground {
    pub fn new(handle: Handle) -> Self {
        Self {
            handle,
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Executor on the runtime of the calling context.
    ///
    /// Panics outside a tokio runtime, like [`Handle::current`].
    pub fn current() -> Self {
        Self::new(Handle::current())
    }

    fn take_tasks(&self) -> Vec<JoinHandle<()>> {
        let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        std::mem::take(&mut *tasks)
    }

    /// Number of submitted units not yet joined or aborted.
    pub fn pending(&self) -> usize {
        self.tasks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Wait for every submitted unit. A unit that panicked is logged and
    /// otherwise ignored.
    pub async fn join_all(&self) {
        let results = futures::future::join_all(self.take_tasks()).await;
        for result in results {
            if let Err(e) = result {
                if !e.is_cancelled() {
                    warn!(event = "background.failed", error = %e);
                }
            }
        }
    }

    /// Drop all outstanding work. Facts not yet written are never written.
    pub fn abort_all(&self) {
        for task in self.take_tasks() {
            task.abort();
        }
    }
}

impl BackgroundExecutor for TokioBackground {
    fn background(&self, work: BoxFuture<'static, ()>) {
        let task = self.handle.spawn(work);
        self.tasks
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(task);
    }
}
