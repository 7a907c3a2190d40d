//! Team domain
//!
//! Agents, the team that owns them, and the defaults used to form one.

pub mod entities;
pub mod roster;

pub use entities::{Agent, AgentStatus, Team};
