//! Progress notification port
//!
//! Defines the interface for reporting progress while a requirement moves
//! through the pipeline and while plan tasks execute.

use crew_domain::{Agent, PipelineStage, Task};

/// Callback for progress updates
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (console bars, plain text, etc.)
pub trait ProgressNotifier: Send + Sync {
    /// Called when the pipeline enters a new stage
    fn on_stage(&self, _stage: PipelineStage, _message: &str) {}

    /// Called when a discussion round starts
    fn on_round_start(&self, _round: usize, _max_rounds: usize, _participants: usize) {}

    /// Called after an agent's opinion was requested
    fn on_opinion(&self, _agent: &Agent, _success: bool) {}

    /// Called when every agent had its turn in a round
    fn on_round_complete(&self, _round: usize) {}

    /// Called when a discussion closes; `forced` marks the end-of-run synthesis
    fn on_consensus(&self, _consensus: Option<&str>, _forced: bool) {}

    /// Called when task execution fans out
    fn on_execution_start(&self, _total: usize) {}

    /// Called as each executed task comes back through the barrier
    fn on_task_executed(&self, _task: &Task, _completed: usize, _total: usize) {}

    /// Called once all tasks are back and aggregation finished
    fn on_execution_complete(&self, _success: bool) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {}
