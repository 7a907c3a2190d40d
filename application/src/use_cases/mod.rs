//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod detect_consensus;
pub mod execute_plan;
pub mod extract_tasks;
pub mod form_team;
pub mod run_discussion;
pub mod team_orchestrator;
