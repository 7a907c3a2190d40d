//! Core domain concepts shared across all subdomains.
//!
//! - [`ids`]: typed identifiers for agents, teams, discussions, tasks and plans
//! - [`timestamp`]: local wall-clock timestamps and their serde format
//! - [`error::DomainError`]: domain-level errors

pub mod error;
pub mod ids;
pub mod string;
pub mod timestamp;
