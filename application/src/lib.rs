//! Application layer for agent-crew
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use config::{MAX_TASKS, OrchestrationConfig};
pub use ports::{
    pipeline_logger::{NoPipelineLogger, PipelineEvent, PipelineLogger},
    progress::{NoProgress, ProgressNotifier},
    state_repository::StateRepository,
    text_generator::{Generation, GenerationError, TextGenerator},
};
pub use use_cases::detect_consensus::{ConsensusEngine, SentinelConsensusEngine};
pub use use_cases::execute_plan::{
    ExecutePlanError, ExecutePlanUseCase, ExecutionOutcome, ExecutionState, ExecutionStatus,
    ExecutionTracker, TaskResultSummary,
};
pub use use_cases::extract_tasks::{ExtractTasksError, ExtractTasksUseCase, TaskAssignment};
pub use use_cases::form_team::FormTeamUseCase;
pub use use_cases::run_discussion::RunDiscussionUseCase;
pub use use_cases::team_orchestrator::{
    OrchestratorError, RequirementOutcome, StatusSnapshot, TaskProgressUpdate, TeamOrchestrator,
};
