//! Plan domain entities

use crate::core::error::DomainError;
use crate::core::ids::{AgentId, PlanId, TaskId};
use crate::core::timestamp::{self, local_time, local_time_opt};
use crate::discussion::Consensus;
use chrono::{DateTime, Local};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

/// Status of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task is waiting to be picked up
    #[default]
    Pending,
    /// Task has an assignee and is being worked on
    InProgress,
    /// Task reached 100% progress
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single unit of assigned work within a plan.
///
/// `progress == 100` holds exactly when `status == Completed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub description: String,
    assignee_id: Option<AgentId>,
    assignee_name: Option<String>,
    status: TaskStatus,
    progress: u8,
    result: Option<String>,
    #[serde(with = "local_time")]
    pub created_at: DateTime<Local>,
    #[serde(with = "local_time_opt")]
    completed_at: Option<DateTime<Local>>,
}

impl Task {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            id: TaskId::generate(),
            description: description.into(),
            assignee_id: None,
            assignee_name: None,
            status: TaskStatus::Pending,
            progress: 0,
            result: None,
            created_at: timestamp::now(),
            completed_at: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<TaskId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn assignee_id(&self) -> Option<&AgentId> {
        self.assignee_id.as_ref()
    }

    pub fn assignee_name(&self) -> Option<&str> {
        self.assignee_name.as_deref()
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn result(&self) -> Option<&str> {
        self.result.as_deref()
    }

    pub fn completed_at(&self) -> Option<DateTime<Local>> {
        self.completed_at
    }

    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    /// Assign to an agent; the task moves to `InProgress`
    pub fn assign_to(&mut self, agent_id: AgentId, agent_name: impl Into<String>) {
        self.assignee_id = Some(agent_id);
        self.assignee_name = Some(agent_name.into());
        self.status = TaskStatus::InProgress;
    }

    /// Change the displayed assignee without touching status or progress
    pub fn reassign(&mut self, agent_id: Option<AgentId>, agent_name: impl Into<String>) {
        self.assignee_id = agent_id;
        self.assignee_name = Some(agent_name.into());
    }

    pub fn rename(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn set_result(&mut self, result: impl Into<String>) {
        self.result = Some(result.into());
    }

    /// Set progress, clamped to `0..=100`.
    ///
    /// Reaching 100 completes the task. Dropping a completed task below 100
    /// reopens it as `Pending`.
    pub fn update_progress(&mut self, progress: i64) {
        self.progress = progress.clamp(0, 100) as u8;
        if self.progress == 100 {
            self.complete();
        } else if self.status == TaskStatus::Completed {
            self.status = TaskStatus::Pending;
            self.completed_at = None;
        }
    }

    pub fn complete(&mut self) {
        self.status = TaskStatus::Completed;
        self.progress = 100;
        self.completed_at = Some(timestamp::now());
    }

    /// Back to a fresh pending task; the assignee is kept
    pub fn reset(&mut self) {
        self.status = TaskStatus::Pending;
        self.progress = 0;
        self.result = None;
        self.completed_at = None;
    }
}

/// The ordered set of tasks derived from a consensus toward a goal
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Plan {
    pub id: PlanId,
    pub goal: String,
    consensus: Consensus,
    tasks: Vec<Task>,
    #[serde(with = "local_time")]
    pub created_at: DateTime<Local>,
    #[serde(with = "local_time_opt")]
    completed_at: Option<DateTime<Local>>,
}

impl Plan {
    pub fn new(goal: impl Into<String>, consensus: Consensus) -> Self {
        Self {
            id: PlanId::generate(),
            goal: goal.into(),
            consensus,
            tasks: Vec::new(),
            created_at: timestamp::now(),
            completed_at: None,
        }
    }

    pub fn consensus(&self) -> &Consensus {
        &self.consensus
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn tasks_mut(&mut self) -> &mut [Task] {
        &mut self.tasks
    }

    pub fn completed_at(&self) -> Option<DateTime<Local>> {
        self.completed_at
    }

    pub fn add_task(&mut self, task: Task) -> Result<(), DomainError> {
        if self.task(&task.id).is_some() {
            return Err(DomainError::DuplicateTask(task.id.to_string()));
        }
        self.tasks.push(task);
        Ok(())
    }

    pub fn task(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    pub fn task_mut(&mut self, id: &TaskId) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| &t.id == id)
    }

    /// Index of a task in plan order
    pub fn position_of(&self, id: &TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| &t.id == id)
    }

    pub fn pending_tasks(&self) -> Vec<&Task> {
        self.tasks.iter().filter(|t| !t.is_completed()).collect()
    }

    /// Mean task progress; 0 for an empty plan
    pub fn progress(&self) -> f64 {
        if self.tasks.is_empty() {
            return 0.0;
        }
        let total: u32 = self.tasks.iter().map(|t| u32::from(t.progress)).sum();
        f64::from(total) / self.tasks.len() as f64
    }

    /// All tasks completed; false for an empty plan
    pub fn is_completed(&self) -> bool {
        !self.tasks.is_empty() && self.tasks.iter().all(Task::is_completed)
    }

    pub fn complete(&mut self) {
        self.completed_at = Some(timestamp::now());
    }

    /// Clear the completion stamp after a task was reopened
    pub fn reopen(&mut self) {
        self.completed_at = None;
    }
}

impl Serialize for Plan {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let created_at = self.created_at.format(timestamp::TIMESTAMP_FORMAT).to_string();
        let completed_at = self
            .completed_at
            .map(|t| t.format(timestamp::TIMESTAMP_FORMAT).to_string());

        let mut state = serializer.serialize_struct("Plan", 8)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("goal", &self.goal)?;
        state.serialize_field("consensus", &self.consensus)?;
        state.serialize_field("tasks", &self.tasks)?;
        state.serialize_field("progress", &self.progress())?;
        state.serialize_field("created_at", &created_at)?;
        state.serialize_field("completed_at", &completed_at)?;
        state.serialize_field("is_completed", &self.is_completed())?;
        state.end()
    }
}
