//! Structured observability hooks for the enrichment lifecycle.
//!
//! This module provides:
//! - A phase-scoped tracing span via the `EnrichSpan` RAII guard
//! - Emission functions for detection, fact writes, skipped git steps and
//!   unreadable inputs
//!
//! Lifecycle events are emitted at `info!`, per-fact and per-step events at
//! `debug!` (filter with `RUST_LOG`).

use tracing::{debug, info, warn};

use crate::fact::Fact;
use crate::provider::CiProvider;

/// RAII guard that enters a phase-scoped span.
///
/// # Example
///
/// ```ignore
/// let _span = EnrichSpan::enter("immediate");
/// // every event below carries phase = "immediate"
/// ```
pub struct EnrichSpan {
    _span: tracing::span::EnteredSpan,
}

impl EnrichSpan {
    pub fn enter(phase: &str) -> Self {
        let span = tracing::info_span!("buildmeta.phase", phase = %phase);
        Self {
            _span: span.entered(),
        }
    }
}

/// Emit event: a CI provider signature matched.
pub fn emit_provider_detected(provider: CiProvider) {
    info!(event = "provider.detected", provider = %provider);
}

/// Emit event: one fact handed to the sink.
pub fn emit_fact_recorded(fact: &Fact) {
    match fact {
        Fact::Tag { label } => debug!(event = "fact.recorded", kind = "tag", label = %label),
        Fact::Value { key, .. } => debug!(event = "fact.recorded", kind = "value", key = %key),
        Fact::Link { label, .. } => debug!(event = "fact.recorded", kind = "link", label = %label),
    }
}

/// Emit event: a git step produced nothing.
pub fn emit_git_step_skipped(step: &str) {
    debug!(event = "git.step_skipped", step = %step);
}

/// Emit event: an origin URL matched a known code host.
pub fn emit_git_host_matched(host: &str) {
    debug!(event = "git.host_matched", host = %host);
}

/// Emit event: a phase finished and how many facts it wrote.
pub fn emit_phase_completed(phase: &str, facts: usize) {
    info!(event = "phase.completed", phase = %phase, facts = facts);
}

/// Emit event: an input existed but could not be read (warning level).
pub fn emit_input_unreadable(input: &str, error: &dyn std::fmt::Display) {
    warn!(event = "input.unreadable", input = %input, error = %error);
}
