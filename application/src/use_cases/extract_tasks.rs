//! Extract Tasks use case
//!
//! Turns a free-text consensus into a short list of assigned tasks and
//! builds the [`Plan`] holding them.

use crate::config::MAX_TASKS;
use crate::ports::pipeline_logger::{NoPipelineLogger, PipelineEvent, PipelineLogger};
use crate::ports::text_generator::TextGenerator;
use crew_domain::{Agent, Consensus, DomainError, Plan, PromptTemplate, Task, parse_delimited_lines};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur while extracting tasks
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractTasksError {
    #[error("Cannot assign tasks without agents")]
    NoAgents,

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// A task description paired with the agent that will carry it out
#[derive(Debug, Clone, PartialEq)]
pub struct TaskAssignment<'a> {
    pub description: String,
    pub agent: &'a Agent,
}

/// Use case for extracting an assigned task list from a consensus
pub struct ExtractTasksUseCase<G: TextGenerator> {
    generator: Arc<G>,
    max_tasks: usize,
    fallback_count: usize,
    logger: Arc<dyn PipelineLogger>,
}

impl<G: TextGenerator> ExtractTasksUseCase<G> {
    pub fn new(generator: Arc<G>) -> Self {
        Self {
            generator,
            max_tasks: MAX_TASKS,
            fallback_count: 3,
            logger: Arc::new(NoPipelineLogger),
        }
    }

    /// Clamped to `1..=MAX_TASKS`.
    pub fn with_max_tasks(mut self, max: usize) -> Self {
        self.max_tasks = max.clamp(1, MAX_TASKS);
        self
    }

    pub fn with_fallback_count(mut self, count: usize) -> Self {
        self.fallback_count = count.max(1);
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn PipelineLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Extract between one and `max_tasks` assignments.
    ///
    /// Generation is attempted once. A failed call, or output without a
    /// single `description | assignee` line, yields the generic fallback
    /// tasks assigned round-robin.
    pub async fn extract<'a>(
        &self,
        goal: &str,
        consensus: &Consensus,
        agents: &'a [Agent],
    ) -> Result<Vec<TaskAssignment<'a>>, ExtractTasksError> {
        let Some(first) = agents.first() else {
            return Err(ExtractTasksError::NoAgents);
        };

        let prompt = PromptTemplate::extract_tasks(goal, consensus.content(), agents);
        let lines = match self.generator.generate(&prompt, None).await.into_text() {
            Some(text) => parse_delimited_lines(&text),
            None => {
                warn!("Task extraction failed, using fallback tasks");
                Vec::new()
            }
        };

        if lines.is_empty() {
            return Ok(self.fallback(agents));
        }

        let assignments = lines
            .into_iter()
            .take(self.max_tasks)
            .map(|(description, assignee)| {
                let agent = agents.iter().find(|a| a.name == assignee).unwrap_or_else(|| {
                    debug!("Unknown assignee '{}', assigning to {}", assignee, first.name);
                    first
                });
                TaskAssignment { description, agent }
            })
            .collect::<Vec<_>>();

        info!("Extracted {} tasks", assignments.len());
        Ok(assignments)
    }

    /// Extract tasks and build a plan holding them
    pub async fn create_plan(
        &self,
        goal: &str,
        consensus: Consensus,
        agents: &[Agent],
    ) -> Result<Plan, ExtractTasksError> {
        let assignments = self.extract(goal, &consensus, agents).await?;

        let mut plan = Plan::new(goal, consensus);
        for assignment in assignments {
            let mut task = Task::new(assignment.description);
            task.assign_to(assignment.agent.id.clone(), assignment.agent.name.clone());
            plan.add_task(task)?;
        }

        self.logger.log(PipelineEvent::new(
            "plan",
            json!({
                "plan_id": plan.id,
                "goal": plan.goal,
                "tasks": plan
                    .tasks()
                    .iter()
                    .map(|t| json!({"description": t.description, "assignee": t.assignee_name()}))
                    .collect::<Vec<_>>(),
            }),
        ));
        Ok(plan)
    }

    fn fallback<'a>(&self, agents: &'a [Agent]) -> Vec<TaskAssignment<'a>> {
        (0..self.fallback_count)
            .map(|i| TaskAssignment {
                description: format!("Execute task {}", i + 1),
                agent: &agents[i % agents.len()],
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockGenerator, ok};
    use crew_domain::{DiscussionId, TaskStatus};

    fn agents() -> Vec<Agent> {
        vec![
            Agent::new("Alice", "Developer"),
            Agent::new("Bob", "Designer"),
        ]
    }

    fn consensus() -> Consensus {
        Consensus::new("Use Rust and a static frontend", DiscussionId::new("d-1"))
    }

    fn extractor(text: &'static str) -> ExtractTasksUseCase<MockGenerator> {
        ExtractTasksUseCase::new(Arc::new(MockGenerator::new(move |_| ok(text))))
    }

    #[tokio::test]
    async fn test_extract_parses_and_assigns() {
        let agents = agents();
        let tasks = extractor("Write the API | Bob\nDesign pages | Alice")
            .extract("Build a blog", &consensus(), &agents)
            .await
            .unwrap();

        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].description, "Write the API");
        assert_eq!(tasks[0].agent.name, "Bob");
        assert_eq!(tasks[1].agent.name, "Alice");
    }

    #[tokio::test]
    async fn test_unknown_assignee_goes_to_first_agent() {
        let agents = agents();
        let tasks = extractor("Deploy | Zed\nReview | bob")
            .extract("goal", &consensus(), &agents)
            .await
            .unwrap();

        assert!(tasks.iter().all(|t| t.agent.name == "Alice"));
    }

    #[tokio::test]
    async fn test_malformed_lines_are_dropped_and_list_truncated() {
        let agents = agents();
        let text = "Tasks:\n1 | Alice\n2 | Alice\nbad | line | here\n3 | Bob\n4 | Bob\n5 | Alice\n6 | Bob\n7 | Alice";
        let tasks = extractor(text)
            .extract("goal", &consensus(), &agents)
            .await
            .unwrap();

        let descriptions: Vec<&str> = tasks.iter().map(|t| t.description.as_str()).collect();
        assert_eq!(descriptions, vec!["1", "2", "3", "4", "5", "6"]);
    }

    #[tokio::test]
    async fn test_max_tasks_cannot_exceed_six() {
        let agents = agents();
        let text = "a | Alice\nb | Bob\nc | Alice\nd | Bob\ne | Alice\nf | Bob\ng | Alice\nh | Bob";
        let tasks = extractor(text)
            .with_max_tasks(20)
            .extract("goal", &consensus(), &agents)
            .await
            .unwrap();

        assert_eq!(tasks.len(), MAX_TASKS);
    }

    #[tokio::test]
    async fn test_nothing_parsed_gives_round_robin_fallback() {
        let agents = agents();
        let tasks = extractor("I cannot split this into tasks.")
            .extract("goal", &consensus(), &agents)
            .await
            .unwrap();

        assert_eq!(tasks.len(), 3);
        assert_eq!(tasks[0].description, "Execute task 1");
        let names: Vec<&str> = tasks.iter().map(|t| t.agent.name.as_str()).collect();
        assert_eq!(names, vec!["Alice", "Bob", "Alice"]);
    }

    #[tokio::test]
    async fn test_generation_failure_gives_fallback() {
        let agents = agents();
        let generator = Arc::new(MockGenerator::failing());
        let tasks = ExtractTasksUseCase::new(Arc::clone(&generator))
            .extract("goal", &consensus(), &agents)
            .await
            .unwrap();

        assert_eq!(tasks.len(), 3);
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn test_no_agents_is_rejected() {
        let result = extractor("a | b").extract("goal", &consensus(), &[]).await;
        assert_eq!(result.unwrap_err(), ExtractTasksError::NoAgents);
    }

    #[tokio::test]
    async fn test_create_plan() {
        let agents = agents();
        let plan = extractor("Write the API | Bob\nDesign pages | Alice")
            .create_plan("Build a blog", consensus(), &agents)
            .await
            .unwrap();

        assert_eq!(plan.goal, "Build a blog");
        assert_eq!(plan.consensus().content(), "Use Rust and a static frontend");
        assert_eq!(plan.tasks().len(), 2);
        let task = &plan.tasks()[0];
        assert_eq!(task.assignee_name(), Some("Bob"));
        assert_eq!(task.assignee_id(), Some(&agents[1].id));
        assert_eq!(task.status(), TaskStatus::InProgress);
        assert_eq!(plan.progress(), 0.0);
    }
}
