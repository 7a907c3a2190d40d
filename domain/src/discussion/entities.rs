//! Discussion domain entities

use crate::core::error::DomainError;
use crate::core::ids::{AgentId, DiscussionId};
use crate::core::timestamp::{self, local_time, local_time_opt};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Lifecycle of a discussion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscussionStatus {
    #[default]
    InProgress,
    ConsensusReached,
    Failed,
}

impl DiscussionStatus {
    pub fn as_str(&self) -> &str {
        match self {
            DiscussionStatus::InProgress => "in_progress",
            DiscussionStatus::ConsensusReached => "consensus_reached",
            DiscussionStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, DiscussionStatus::InProgress)
    }
}

impl std::fmt::Display for DiscussionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One opinion contributed to a discussion.
///
/// Carries both the agent id and name so transcripts can be rendered
/// without a team lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub agent_id: AgentId,
    pub agent_name: String,
    pub content: String,
    pub round: usize,
    #[serde(with = "local_time")]
    pub timestamp: DateTime<Local>,
}

/// A round-based discussion among the agents of a team
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discussion {
    pub id: DiscussionId,
    pub topic: String,
    messages: Vec<Message>,
    current_round: usize,
    pub max_rounds: usize,
    status: DiscussionStatus,
    consensus: Option<String>,
    #[serde(with = "local_time")]
    pub started_at: DateTime<Local>,
    #[serde(with = "local_time_opt")]
    ended_at: Option<DateTime<Local>>,
}

impl Discussion {
    pub fn new(topic: impl Into<String>, max_rounds: usize) -> Self {
        Self {
            id: DiscussionId::generate(),
            topic: topic.into(),
            messages: Vec::new(),
            current_round: 0,
            max_rounds,
            status: DiscussionStatus::InProgress,
            consensus: None,
            started_at: timestamp::now(),
            ended_at: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<DiscussionId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn current_round(&self) -> usize {
        self.current_round
    }

    pub fn status(&self) -> DiscussionStatus {
        self.status
    }

    pub fn consensus(&self) -> Option<&str> {
        self.consensus.as_deref()
    }

    pub fn ended_at(&self) -> Option<DateTime<Local>> {
        self.ended_at
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn has_reached_max_rounds(&self) -> bool {
        self.current_round >= self.max_rounds
    }

    fn ensure_open(&self) -> Result<(), DomainError> {
        if self.is_finished() {
            Err(DomainError::DiscussionClosed(self.id.to_string()))
        } else {
            Ok(())
        }
    }

    /// Advance to the next round, returning its number
    pub fn start_new_round(&mut self) -> Result<usize, DomainError> {
        self.ensure_open()?;
        self.current_round += 1;
        Ok(self.current_round)
    }

    /// Append an opinion stamped with the current round
    pub fn add_message(
        &mut self,
        agent_id: AgentId,
        agent_name: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<&Message, DomainError> {
        self.ensure_open()?;
        self.messages.push(Message {
            agent_id,
            agent_name: agent_name.into(),
            content: content.into(),
            round: self.current_round,
            timestamp: timestamp::now(),
        });
        Ok(&self.messages[self.messages.len() - 1])
    }

    pub fn reach_consensus(&mut self, consensus: impl Into<String>) -> Result<(), DomainError> {
        self.ensure_open()?;
        self.status = DiscussionStatus::ConsensusReached;
        self.consensus = Some(consensus.into());
        self.ended_at = Some(timestamp::now());
        Ok(())
    }

    pub fn fail(&mut self) -> Result<(), DomainError> {
        self.ensure_open()?;
        self.status = DiscussionStatus::Failed;
        self.ended_at = Some(timestamp::now());
        Ok(())
    }

    /// The last `count` messages in insertion order
    pub fn recent_messages(&self, count: usize) -> &[Message] {
        let start = self.messages.len().saturating_sub(count);
        &self.messages[start..]
    }

    /// Messages contributed during `round`
    pub fn round_messages(&self, round: usize) -> Vec<&Message> {
        self.messages.iter().filter(|m| m.round == round).collect()
    }

    /// Messages contributed during the current round
    pub fn current_round_messages(&self) -> Vec<&Message> {
        self.round_messages(self.current_round)
    }
}
