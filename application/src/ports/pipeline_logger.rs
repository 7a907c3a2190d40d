//! Port for structured pipeline transcripts.
//!
//! Defines the [`PipelineLogger`] trait for recording pipeline events
//! (opinions, consensus decisions, plans, task results, feedback) to a
//! structured log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures the
//! transcript in a machine-readable format (JSONL).

use serde_json::Value;

/// A structured pipeline event for logging.
pub struct PipelineEvent {
    /// Event type identifier (e.g., "opinion", "consensus", "task_result").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl PipelineEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging pipeline events.
///
/// `log` is synchronous and infallible; implementations swallow their own
/// write errors.
pub trait PipelineLogger: Send + Sync {
    /// Record a pipeline event.
    fn log(&self, event: PipelineEvent);
}

/// No-op implementation for tests and when transcripts are disabled.
pub struct NoPipelineLogger;

impl PipelineLogger for NoPipelineLogger {
    fn log(&self, _event: PipelineEvent) {}
}
