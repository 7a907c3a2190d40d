//! Orchestration parameters for the pipeline.
//!
//! [`OrchestrationConfig`] groups the static knobs of the discussion loop,
//! task extraction and the execution engine. These are application-layer
//! concerns, not domain policy.

use serde::{Deserialize, Serialize};

/// Round from which per-round consensus checks are attempted
pub const CONSENSUS_MIN_ROUND: usize = 2;

/// Most tasks a single extraction may produce
pub const MAX_TASKS: usize = 6;

/// Pipeline control parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrchestrationConfig {
    /// Discussion rounds before a consensus is forced.
    pub max_rounds: usize,
    /// Team size used when the caller does not specify one.
    pub default_agent_count: usize,
    /// Upper bound on task executions running at the same time.
    pub max_concurrency: usize,
    /// Earlier messages shown to an agent when asking for its opinion.
    pub context_window: usize,
    /// Maximum tasks kept from one extraction.
    pub max_tasks: usize,
    /// Number of generic tasks created when extraction yields nothing.
    pub fallback_task_count: usize,
}

impl Default for OrchestrationConfig {
    fn default() -> Self {
        Self {
            max_rounds: 3,
            default_agent_count: 3,
            max_concurrency: 4,
            context_window: 3,
            max_tasks: MAX_TASKS,
            fallback_task_count: 3,
        }
    }
}

impl OrchestrationConfig {
    // ==================== Builder Methods ====================

    pub fn with_max_rounds(mut self, rounds: usize) -> Self {
        self.max_rounds = rounds;
        self
    }

    pub fn with_default_agent_count(mut self, count: usize) -> Self {
        self.default_agent_count = count;
        self
    }

    /// Zero is treated as one so execution always makes progress.
    pub fn with_max_concurrency(mut self, limit: usize) -> Self {
        self.max_concurrency = limit.max(1);
        self
    }

    pub fn with_context_window(mut self, window: usize) -> Self {
        self.context_window = window;
        self
    }

    /// Clamped to `1..=MAX_TASKS`.
    pub fn with_max_tasks(mut self, max: usize) -> Self {
        self.max_tasks = max.clamp(1, MAX_TASKS);
        self
    }
}
