//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod pipeline_logger;
pub mod progress;
pub mod state_repository;
pub mod text_generator;
