//! Domain layer for agent-crew
//!
//! This crate contains the entities, value objects and pure text handling of
//! the collaboration pipeline. It has no dependencies on infrastructure or
//! presentation concerns.
//!
//! # Core Concepts
//!
//! - **Team**: a fixed group of [`Agent`]s, each with a role and skills
//! - **Discussion**: round-based opinions that end in a [`Consensus`] or fail
//! - **Plan**: ordered [`Task`]s extracted from a consensus toward a goal
//!
//! Prompts for every generation call live in [`prompt`]; the parsers that
//! turn generated lists back into structure live in [`plan::parsing`].

pub mod core;
pub mod discussion;
pub mod pipeline;
pub mod plan;
pub mod prompt;
pub mod team;

// Re-export commonly used types
pub use core::{
    error::DomainError,
    ids::{AgentId, DiscussionId, PlanId, TaskId, TeamId},
};
pub use discussion::{Consensus, Discussion, DiscussionStatus, Message};
pub use pipeline::{PipelineStage, PipelineStatus};
pub use plan::{Plan, RoleSpec, Task, TaskStatus, parse_delimited_lines, parse_role_lines};
pub use prompt::{
    AGGREGATION_FAILURE_MARKER, NO_CONSENSUS_MARKER, PromptTemplate, TASK_FAILURE_MARKER,
    TaskReport,
};
pub use team::{Agent, AgentStatus, Team};
