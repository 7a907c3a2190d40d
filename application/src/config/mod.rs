//! Application-level configuration.
//!
//! - [`OrchestrationConfig`]: discussion, extraction and execution limits

pub mod orchestration;

pub use orchestration::{CONSENSUS_MIN_ROUND, MAX_TASKS, OrchestrationConfig};
