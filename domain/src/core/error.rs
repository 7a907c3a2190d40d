//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Discussion {0} is already finished")]
    DiscussionClosed(String),

    #[error("Task {0} already exists in plan")]
    DuplicateTask(String),

    #[error("Team has no agents")]
    EmptyTeam,

    #[error("Invalid requirement: {0}")]
    InvalidRequirement(String),
}

impl DomainError {
    /// Check if this error was caused by mutating a finished discussion
    pub fn is_closed(&self) -> bool {
        matches!(self, DomainError::DiscussionClosed(_))
    }
}
