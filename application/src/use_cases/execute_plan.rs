//! Execute Plan use case
//!
//! Fans the selected tasks of a plan out to concurrent workers, waits for
//! all of them, writes each result back at its task's position and asks the
//! generator for one aggregated feedback over the results in selection order.
//!
//! ```text
//! resolve ids ──▶ spawn workers (≤ max_concurrency) ──▶ drain JoinSet
//!                                                          │
//!                 aggregate (selection order) ◀── write back by position
//! ```

use crate::ports::pipeline_logger::{NoPipelineLogger, PipelineEvent, PipelineLogger};
use crate::ports::progress::ProgressNotifier;
use crate::ports::text_generator::TextGenerator;
use crew_domain::{
    AGGREGATION_FAILURE_MARKER, Plan, PromptTemplate, TASK_FAILURE_MARKER, Task, TaskId,
    TaskReport,
};
use serde::Serialize;
use serde_json::json;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Assignee shown in the execution prompt for an unassigned task
const UNASSIGNED: &str = "Team member";

/// Errors that can occur before any task is launched
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutePlanError {
    #[error("No tasks selected for execution")]
    NoTasksSelected,

    #[error("Task not found: {0}")]
    TaskNotFound(TaskId),
}

/// Phase of the most recent execution
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionState {
    #[default]
    Idle,
    Processing,
    Completed,
}

/// Result of one executed task, as reported in [`ExecutionStatus`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskResultSummary {
    pub task_id: TaskId,
    pub description: String,
    pub assignee: Option<String>,
    pub result: Option<String>,
}

impl From<&Task> for TaskResultSummary {
    fn from(task: &Task) -> Self {
        Self {
            task_id: task.id.clone(),
            description: task.description.clone(),
            assignee: task.assignee_name().map(str::to_string),
            result: task.result().map(str::to_string),
        }
    }
}

/// Snapshot of the execution engine's progress
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionStatus {
    pub status: ExecutionState,
    pub message: String,
    pub completed_tasks: usize,
    pub total_tasks: usize,
    pub final_feedback: Option<String>,
    pub task_results: Vec<TaskResultSummary>,
}

impl Default for ExecutionStatus {
    fn default() -> Self {
        Self {
            status: ExecutionState::Idle,
            message: "No tasks executed yet".to_string(),
            completed_tasks: 0,
            total_tasks: 0,
            final_feedback: None,
            task_results: Vec::new(),
        }
    }
}

/// Shared progress state of the execution engine.
///
/// Workers only touch the atomic counter; the status blob is written from
/// the coordinating task.
#[derive(Debug, Default)]
pub struct ExecutionTracker {
    completed: Arc<AtomicUsize>,
    status: Mutex<ExecutionStatus>,
}

impl ExecutionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn begin(&self, total: usize) -> Arc<AtomicUsize> {
        self.completed.store(0, Ordering::SeqCst);
        *self.lock() = ExecutionStatus {
            status: ExecutionState::Processing,
            message: format!("Executing {} tasks", total),
            total_tasks: total,
            ..ExecutionStatus::default()
        };
        Arc::clone(&self.completed)
    }

    fn finish(&self, feedback: &str, results: Vec<TaskResultSummary>) {
        let mut status = self.lock();
        status.status = ExecutionState::Completed;
        status.message = "Task execution completed".to_string();
        status.final_feedback = Some(feedback.to_string());
        status.task_results = results;
    }

    /// Current status with the live completion count
    pub fn snapshot(&self) -> ExecutionStatus {
        let mut status = self.lock().clone();
        status.completed_tasks = self.completed.load(Ordering::SeqCst);
        status
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ExecutionStatus> {
        self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// What an execution call hands back to its caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionOutcome {
    pub success: bool,
    pub final_feedback: String,
}

/// Use case for executing plan tasks in parallel
pub struct ExecutePlanUseCase<G: TextGenerator + 'static> {
    generator: Arc<G>,
    max_concurrency: usize,
    logger: Arc<dyn PipelineLogger>,
}

impl<G: TextGenerator + 'static> ExecutePlanUseCase<G> {
    pub fn new(generator: Arc<G>) -> Self {
        Self {
            generator,
            max_concurrency: 4,
            logger: Arc::new(NoPipelineLogger),
        }
    }

    pub fn with_max_concurrency(mut self, limit: usize) -> Self {
        self.max_concurrency = limit.max(1);
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn PipelineLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Execute the tasks named by `ids` and aggregate their results.
    ///
    /// Every id is resolved before any work starts; duplicates collapse to
    /// their first occurrence. Individual task failures become
    /// [`TASK_FAILURE_MARKER`] results and never fail the call.
    pub async fn execute(
        &self,
        plan: &mut Plan,
        ids: &[TaskId],
        tracker: &ExecutionTracker,
        progress: &dyn ProgressNotifier,
    ) -> Result<ExecutionOutcome, ExecutePlanError> {
        let positions = resolve(plan, ids)?;
        Ok(self.run(plan, &positions, tracker, progress).await)
    }

    /// Reset every task of the plan and execute them all again.
    ///
    /// A plan without tasks still aggregates (over nothing) and succeeds.
    pub async fn reexecute(
        &self,
        plan: &mut Plan,
        tracker: &ExecutionTracker,
        progress: &dyn ProgressNotifier,
    ) -> Result<ExecutionOutcome, ExecutePlanError> {
        for task in plan.tasks_mut() {
            task.reset();
        }
        plan.reopen();

        let positions: Vec<usize> = (0..plan.tasks().len()).collect();
        Ok(self.run(plan, &positions, tracker, progress).await)
    }

    async fn run(
        &self,
        plan: &mut Plan,
        positions: &[usize],
        tracker: &ExecutionTracker,
        progress: &dyn ProgressNotifier,
    ) -> ExecutionOutcome {
        let total = positions.len();
        info!("Executing {} tasks (concurrency {})", total, self.max_concurrency);

        let counter = tracker.begin(total);
        progress.on_execution_start(total);

        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut join_set = JoinSet::new();

        for (slot, &position) in positions.iter().enumerate() {
            let generator = Arc::clone(&self.generator);
            let semaphore = Arc::clone(&semaphore);
            let counter = Arc::clone(&counter);
            let task = plan.tasks()[position].clone();

            join_set.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                let task = Self::run_task(&generator, task).await;
                counter.fetch_add(1, Ordering::SeqCst);
                (slot, task)
            });
        }

        let mut executed: Vec<Option<Task>> = vec![None; total];
        while let Some(result) = join_set.join_next().await {
            match result {
                Ok((slot, task)) => {
                    progress.on_task_executed(&task, counter.load(Ordering::SeqCst), total);
                    executed[slot] = Some(task);
                }
                Err(e) => warn!("Task worker failed: {}", e),
            }
        }

        for (slot, &position) in positions.iter().enumerate() {
            let target = &mut plan.tasks_mut()[position];
            match executed[slot].take() {
                Some(task) => *target = task,
                None => {
                    mark_failed(target);
                    counter.fetch_add(1, Ordering::SeqCst);
                }
            }
            self.logger.log(PipelineEvent::new(
                "task_result",
                json!({
                    "task_id": target.id,
                    "description": target.description,
                    "assignee": target.assignee_name(),
                    "result": target.result(),
                }),
            ));
        }

        let selected: Vec<&Task> = positions.iter().map(|&p| &plan.tasks()[p]).collect();
        let final_feedback = self.aggregate(&plan.goal, &selected).await;
        let summaries = selected.iter().map(|t| TaskResultSummary::from(*t)).collect();

        if plan.is_completed() {
            plan.complete();
        }
        tracker.finish(&final_feedback, summaries);
        progress.on_execution_complete(true);

        ExecutionOutcome {
            success: true,
            final_feedback,
        }
    }

    async fn run_task(generator: &G, mut task: Task) -> Task {
        let assignee = task.assignee_name().unwrap_or(UNASSIGNED).to_string();
        let prompt = PromptTemplate::execute_task(&assignee, &task.description);

        match generator.generate(&prompt, None).await.into_text() {
            Some(result) => {
                debug!("Task '{}' executed by {}", task.description, assignee);
                task.set_result(result);
                task.update_progress(100);
            }
            None => {
                warn!("Task '{}' failed", task.description);
                mark_failed(&mut task);
            }
        }
        task
    }

    async fn aggregate(&self, goal: &str, tasks: &[&Task]) -> String {
        let reports: Vec<TaskReport<'_>> = tasks
            .iter()
            .map(|t| TaskReport {
                description: &t.description,
                assignee: t.assignee_name().unwrap_or(UNASSIGNED),
                result: t.result().unwrap_or(TASK_FAILURE_MARKER),
            })
            .collect();

        let prompt = PromptTemplate::aggregate_results(goal, &reports);
        let feedback = match self.generator.generate(&prompt, None).await.into_text() {
            Some(feedback) => feedback,
            None => {
                warn!("Aggregation failed");
                AGGREGATION_FAILURE_MARKER.to_string()
            }
        };

        self.logger.log(PipelineEvent::new(
            "aggregation",
            json!({ "goal": goal, "feedback": feedback }),
        ));
        feedback
    }
}

/// Dedupe `ids` keeping first occurrences and map them to plan positions
fn resolve(plan: &Plan, ids: &[TaskId]) -> Result<Vec<usize>, ExecutePlanError> {
    if ids.is_empty() {
        return Err(ExecutePlanError::NoTasksSelected);
    }

    let mut seen = HashSet::new();
    ids.iter()
        .filter(|id| seen.insert(*id))
        .map(|id| {
            plan.position_of(id)
                .ok_or_else(|| ExecutePlanError::TaskNotFound(id.clone()))
        })
        .collect()
}

fn mark_failed(task: &mut Task) {
    task.set_result(TASK_FAILURE_MARKER);
    task.update_progress(100);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::progress::NoProgress;
    use crate::ports::text_generator::Generation;
    use crate::testing::{MockGenerator, ok};
    use crew_domain::{Agent, Consensus, DiscussionId, TaskStatus};
    use std::time::Duration;

    fn plan_with(descriptions: &[&str]) -> Plan {
        let agent = Agent::new("Alice", "Developer");
        let mut plan = Plan::new("Build a blog", Consensus::new("Use Rust", DiscussionId::new("d")));
        for (i, description) in descriptions.iter().enumerate() {
            let mut task = Task::new(*description).with_id(format!("t{}", i + 1));
            task.assign_to(agent.id.clone(), agent.name.clone());
            plan.add_task(task).unwrap();
        }
        plan
    }

    fn ids(ids: &[&str]) -> Vec<TaskId> {
        ids.iter().map(|id| TaskId::new(*id)).collect()
    }

    fn is_aggregation(prompt: &str) -> bool {
        prompt.starts_with("You are the lead agent")
    }

    /// Answers execution prompts with the task description echoed back
    fn echo_generator() -> MockGenerator {
        MockGenerator::new(|prompt| {
            if is_aggregation(prompt) {
                ok("All good")
            } else {
                let description = prompt
                    .split("Complete the following task: ")
                    .nth(1)
                    .and_then(|rest| rest.lines().next())
                    .unwrap_or_default();
                Generation::success(format!("done {}", description), 5)
            }
        })
    }

    #[derive(Default)]
    struct RecordingProgress {
        executed: Mutex<Vec<String>>,
    }

    impl ProgressNotifier for RecordingProgress {
        fn on_task_executed(&self, task: &Task, _completed: usize, _total: usize) {
            self.executed.lock().unwrap().push(task.description.clone());
        }
    }

    #[tokio::test]
    async fn test_all_generation_fails() {
        let mut plan = plan_with(&["a", "b", "c", "d"]);
        let tracker = ExecutionTracker::new();
        let use_case = ExecutePlanUseCase::new(Arc::new(MockGenerator::failing()));

        let outcome = use_case
            .execute(&mut plan, &ids(&["t1", "t2", "t3", "t4"]), &tracker, &NoProgress)
            .await
            .unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.final_feedback, AGGREGATION_FAILURE_MARKER);
        for task in plan.tasks() {
            assert_eq!(task.result(), Some(TASK_FAILURE_MARKER));
            assert_eq!(task.progress(), 100);
            assert_eq!(task.status(), TaskStatus::Completed);
        }
        assert!(plan.is_completed());
        assert!(plan.completed_at().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_aggregation_follows_selection_order() {
        let generator = Arc::new(echo_generator().with_delay(|prompt| {
            if prompt.contains("task: slow") {
                Duration::from_millis(300)
            } else if prompt.contains("task: medium") {
                Duration::from_millis(200)
            } else {
                Duration::from_millis(10)
            }
        }));
        let mut plan = plan_with(&["slow", "medium", "fast"]);
        let tracker = ExecutionTracker::new();
        let progress = RecordingProgress::default();

        ExecutePlanUseCase::new(Arc::clone(&generator))
            .execute(&mut plan, &ids(&["t1", "t2", "t3"]), &tracker, &progress)
            .await
            .unwrap();

        assert_eq!(*progress.executed.lock().unwrap(), vec!["fast", "medium", "slow"]);

        let prompts = generator.prompts();
        let aggregation = prompts.iter().find(|p| is_aggregation(p)).unwrap();
        let slow = aggregation.find("Task: slow").unwrap();
        let medium = aggregation.find("Task: medium").unwrap();
        let fast = aggregation.find("Task: fast").unwrap();
        assert!(slow < medium && medium < fast);
        assert!(aggregation.contains("Result: done slow"));
        assert_eq!(plan.tasks()[0].result(), Some("done slow"));
    }

    #[tokio::test]
    async fn test_selection_order_not_plan_order() {
        let generator = Arc::new(echo_generator());
        let mut plan = plan_with(&["first", "second", "third"]);

        ExecutePlanUseCase::new(Arc::clone(&generator))
            .execute(&mut plan, &ids(&["t3", "t1"]), &ExecutionTracker::new(), &NoProgress)
            .await
            .unwrap();

        let prompts = generator.prompts();
        let aggregation = prompts.iter().find(|p| is_aggregation(p)).unwrap();
        assert!(aggregation.find("Task: third").unwrap() < aggregation.find("Task: first").unwrap());
        assert!(!aggregation.contains("Task: second"));
        assert_eq!(plan.tasks()[1].progress(), 0);
        assert!(!plan.is_completed());
    }

    #[tokio::test]
    async fn test_unknown_id_fails_before_any_work() {
        let generator = Arc::new(echo_generator());
        let mut plan = plan_with(&["a", "b"]);
        let before = plan.clone();

        let err = ExecutePlanUseCase::new(Arc::clone(&generator))
            .execute(&mut plan, &ids(&["t1", "missing"]), &ExecutionTracker::new(), &NoProgress)
            .await
            .unwrap_err();

        assert_eq!(err, ExecutePlanError::TaskNotFound(TaskId::new("missing")));
        assert_eq!(generator.calls(), 0);
        assert_eq!(plan, before);
    }

    #[tokio::test]
    async fn test_empty_selection_is_rejected() {
        let mut plan = plan_with(&["a"]);
        let err = ExecutePlanUseCase::new(Arc::new(echo_generator()))
            .execute(&mut plan, &[], &ExecutionTracker::new(), &NoProgress)
            .await
            .unwrap_err();
        assert_eq!(err, ExecutePlanError::NoTasksSelected);
    }

    #[tokio::test]
    async fn test_duplicate_ids_run_once() {
        let generator = Arc::new(echo_generator());
        let mut plan = plan_with(&["a", "b"]);
        let tracker = ExecutionTracker::new();

        ExecutePlanUseCase::new(Arc::clone(&generator))
            .execute(&mut plan, &ids(&["t2", "t2", "t2"]), &tracker, &NoProgress)
            .await
            .unwrap();

        // One execution plus the aggregation
        assert_eq!(generator.calls(), 2);
        assert_eq!(tracker.snapshot().total_tasks, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrency_is_bounded() {
        let generator =
            Arc::new(echo_generator().with_delay(|_| Duration::from_millis(100)));
        let mut plan = plan_with(&["a", "b", "c"]);
        let started = tokio::time::Instant::now();

        ExecutePlanUseCase::new(generator)
            .with_max_concurrency(1)
            .execute(&mut plan, &ids(&["t1", "t2", "t3"]), &ExecutionTracker::new(), &NoProgress)
            .await
            .unwrap();

        // Three serialized executions plus the aggregation call
        assert!(started.elapsed() >= Duration::from_millis(400));
    }

    #[tokio::test]
    async fn test_tracker_reports_completion() {
        let mut plan = plan_with(&["a", "b", "c", "d"]);
        let tracker = ExecutionTracker::new();
        assert_eq!(tracker.snapshot().status, ExecutionState::Idle);

        ExecutePlanUseCase::new(Arc::new(echo_generator()))
            .with_max_concurrency(2)
            .execute(&mut plan, &ids(&["t1", "t2", "t3", "t4"]), &tracker, &NoProgress)
            .await
            .unwrap();

        let status = tracker.snapshot();
        assert_eq!(status.status, ExecutionState::Completed);
        assert_eq!(status.completed_tasks, 4);
        assert_eq!(status.total_tasks, 4);
        assert_eq!(status.final_feedback.as_deref(), Some("All good"));
        let results: Vec<&str> = status
            .task_results
            .iter()
            .map(|r| r.result.as_deref().unwrap())
            .collect();
        assert_eq!(results, vec!["done a", "done b", "done c", "done d"]);
    }

    #[tokio::test]
    async fn test_panicking_worker_is_marked_failed() {
        let generator = Arc::new(MockGenerator::new(|prompt| {
            if prompt.contains("task: explode") {
                panic!("generator blew up");
            }
            ok("fine")
        }));
        let mut plan = plan_with(&["explode", "calm"]);
        let tracker = ExecutionTracker::new();

        let outcome = ExecutePlanUseCase::new(generator)
            .execute(&mut plan, &ids(&["t1", "t2"]), &tracker, &NoProgress)
            .await
            .unwrap();

        assert!(outcome.success);
        assert_eq!(plan.tasks()[0].result(), Some(TASK_FAILURE_MARKER));
        assert_eq!(plan.tasks()[0].progress(), 100);
        assert_eq!(plan.tasks()[1].result(), Some("fine"));
        assert_eq!(tracker.snapshot().completed_tasks, 2);
    }

    #[tokio::test]
    async fn test_reexecute_resets_and_runs_everything() {
        let generator = Arc::new(echo_generator());
        let mut plan = plan_with(&["a", "b"]);
        plan.task_mut(&TaskId::new("t1")).unwrap().set_result("stale");
        plan.task_mut(&TaskId::new("t1")).unwrap().update_progress(100);

        let use_case = ExecutePlanUseCase::new(Arc::clone(&generator));
        use_case
            .reexecute(&mut plan, &ExecutionTracker::new(), &NoProgress)
            .await
            .unwrap();

        assert_eq!(plan.tasks()[0].result(), Some("done a"));
        assert_eq!(plan.tasks()[1].result(), Some("done b"));
        assert!(plan.is_completed());
        assert_eq!(generator.calls(), 3);
    }

    #[tokio::test]
    async fn test_reexecute_empty_plan_aggregates_nothing() {
        let generator = Arc::new(echo_generator());
        let mut plan = plan_with(&[]);
        let tracker = ExecutionTracker::new();

        let outcome = ExecutePlanUseCase::new(Arc::clone(&generator))
            .reexecute(&mut plan, &tracker, &NoProgress)
            .await
            .unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.final_feedback, "All good");
        assert_eq!(generator.calls(), 1);
        assert!(!plan.is_completed());
        assert_eq!(tracker.snapshot().total_tasks, 0);
    }
}
