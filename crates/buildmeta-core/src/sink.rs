//! Consumed collaborator seams: the fact sink and the background executor.

use futures::future::BoxFuture;

use crate::fact::Fact;

/// Append-only recipient of build metadata.
///
/// Implementations are shared across the immediate phase, project-ready
/// callbacks and background work, so they synchronise internally.
pub trait FactSink: Send + Sync {
    fn tag(&self, label: &str);

    fn value(&self, key: &str, value: &str);

    fn link(&self, label: &str, url: &str);

    /// Base URL of the server the record is published to, if configured.
    fn server(&self) -> Option<String>;

    /// Dispatch a [`Fact`] to the matching write method.
    fn record(&self, fact: &Fact) {
        crate::obs::emit_fact_recorded(fact);
        match fact {
            Fact::Tag { label } => self.tag(label),
            Fact::Value { key, value } => self.value(key, value),
            Fact::Link { label, url } => self.link(label, url),
        }
    }

    fn record_all(&self, facts: &[Fact]) {
        for fact in facts {
            self.record(fact);
        }
    }
}

/// Runs work off the build's critical path. The submitter never observes a
/// result; completion before final reporting is the executor's guarantee.
pub trait BackgroundExecutor: Send + Sync {
    fn background(&self, work: BoxFuture<'static, ()>);
}
