//! Team domain entities

use crate::core::ids::{AgentId, TaskId, TeamId};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

/// What an agent is currently doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    #[default]
    Idle,
    Discussing,
    Working,
}

impl AgentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            AgentStatus::Idle => "idle",
            AgentStatus::Discussing => "discussing",
            AgentStatus::Working => "working",
        }
    }
}

impl std::fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A role-playing participant with a name, a role label and skills
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    pub role: String,
    pub skills: Vec<String>,
    pub status: AgentStatus,
    pub current_task: Option<TaskId>,
}

impl Agent {
    pub fn new(name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            id: AgentId::generate(),
            name: name.into(),
            role: role.into(),
            skills: Vec::new(),
            status: AgentStatus::Idle,
            current_task: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<AgentId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_skills<I, S>(mut self, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skills = skills.into_iter().map(Into::into).collect();
        self
    }

    pub fn start_discussion(&mut self) {
        self.status = AgentStatus::Discussing;
    }

    pub fn start_working(&mut self, task: TaskId) {
        self.status = AgentStatus::Working;
        self.current_task = Some(task);
    }

    pub fn finish_work(&mut self) {
        self.status = AgentStatus::Idle;
        self.current_task = None;
    }

    pub fn is_available(&self) -> bool {
        self.status == AgentStatus::Idle
    }

    /// Comma-joined skill list for prompts and display
    pub fn skills_label(&self) -> String {
        self.skills.join(", ")
    }
}

/// The fixed set of agents working on one requirement.
///
/// Agents keep the order they were added in; that order drives discussion
/// turns and the fallback assignee for task extraction.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    agents: Vec<Agent>,
}

impl Team {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: TeamId::generate(),
            name: name.into(),
            agents: Vec::new(),
        }
    }

    /// Add an agent; an agent with the same id is replaced in place
    pub fn add_agent(&mut self, agent: Agent) {
        match self.agents.iter_mut().find(|a| a.id == agent.id) {
            Some(existing) => *existing = agent,
            None => self.agents.push(agent),
        }
    }

    pub fn with_agent(mut self, agent: Agent) -> Self {
        self.add_agent(agent);
        self
    }

    pub fn remove_agent(&mut self, id: &AgentId) -> Option<Agent> {
        let index = self.agents.iter().position(|a| &a.id == id)?;
        Some(self.agents.remove(index))
    }

    pub fn agent(&self, id: &AgentId) -> Option<&Agent> {
        self.agents.iter().find(|a| &a.id == id)
    }

    pub fn agent_by_name(&self, name: &str) -> Option<&Agent> {
        self.agents.iter().find(|a| a.name == name)
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn available_agents(&self) -> Vec<&Agent> {
        self.agents.iter().filter(|a| a.is_available()).collect()
    }

    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn start_discussion(&mut self) {
        self.agents.iter_mut().for_each(Agent::start_discussion);
    }

    pub fn finish_discussion(&mut self) {
        self.agents.iter_mut().for_each(Agent::finish_work);
    }
}

impl Serialize for Team {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Team", 4)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("agents", &self.agents)?;
        state.serialize_field("agent_count", &self.agent_count())?;
        state.end()
    }
}
