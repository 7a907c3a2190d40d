//! Pipeline stages reported while a requirement is being handled.

use serde::{Deserialize, Serialize};

/// Stage of the requirement → discussion → plan pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    #[default]
    Idle,
    /// Forming the team from the requirement
    Analyzing,
    /// Agents are exchanging opinions
    Discussing,
    /// A consensus was recorded
    Consensus,
    /// Extracting and assigning tasks
    Planning,
    Completed,
    Error,
}

impl PipelineStage {
    pub fn as_str(&self) -> &str {
        match self {
            PipelineStage::Idle => "idle",
            PipelineStage::Analyzing => "analyzing",
            PipelineStage::Discussing => "discussing",
            PipelineStage::Consensus => "consensus",
            PipelineStage::Planning => "planning",
            PipelineStage::Completed => "completed",
            PipelineStage::Error => "error",
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            PipelineStage::Idle => "Idle",
            PipelineStage::Analyzing => "Analyzing",
            PipelineStage::Discussing => "Discussing",
            PipelineStage::Consensus => "Consensus",
            PipelineStage::Planning => "Planning",
            PipelineStage::Completed => "Completed",
            PipelineStage::Error => "Error",
        }
    }

    /// Coarse status exposed to callers polling the pipeline
    pub fn status(&self) -> PipelineStatus {
        match self {
            PipelineStage::Idle => PipelineStatus::Idle,
            PipelineStage::Completed => PipelineStatus::Completed,
            PipelineStage::Error => PipelineStatus::Error,
            _ => PipelineStatus::Processing,
        }
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Coarse pipeline status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStatus {
    #[default]
    Idle,
    Processing,
    Completed,
    Error,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_to_status() {
        assert_eq!(PipelineStage::Idle.status(), PipelineStatus::Idle);
        assert_eq!(PipelineStage::Analyzing.status(), PipelineStatus::Processing);
        assert_eq!(PipelineStage::Discussing.status(), PipelineStatus::Processing);
        assert_eq!(PipelineStage::Planning.status(), PipelineStatus::Processing);
        assert_eq!(PipelineStage::Completed.status(), PipelineStatus::Completed);
        assert_eq!(PipelineStage::Error.status(), PipelineStatus::Error);
    }

    #[test]
    fn test_serialized_names() {
        assert_eq!(
            serde_json::to_string(&PipelineStage::Discussing).unwrap(),
            "\"discussing\""
        );
        assert_eq!(
            serde_json::to_string(&PipelineStatus::Processing).unwrap(),
            "\"processing\""
        );
    }
}
