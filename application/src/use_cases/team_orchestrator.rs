//! Team orchestrator
//!
//! The facade the presentation layer talks to. It owns the generator, the
//! state repository and the pipeline stage, and wires the individual use
//! cases into the requirement → team → discussion → plan pipeline.
//!
//! Only one requirement is handled at a time: a second call while one is in
//! flight is rejected immediately with [`OrchestratorError::Busy`].
//!
//! Every write to the current plan goes through one lock held from load to
//! save. Executions run on a snapshot and merge their task results back by
//! id, so edits and other executions that land meanwhile are kept.

use crate::config::OrchestrationConfig;
use crate::ports::pipeline_logger::{NoPipelineLogger, PipelineLogger};
use crate::ports::progress::ProgressNotifier;
use crate::ports::state_repository::StateRepository;
use crate::ports::text_generator::TextGenerator;
use crate::use_cases::detect_consensus::{ConsensusEngine, SentinelConsensusEngine};
use crate::use_cases::execute_plan::{
    ExecutePlanError, ExecutePlanUseCase, ExecutionOutcome, ExecutionStatus, ExecutionTracker,
};
use crate::use_cases::extract_tasks::{ExtractTasksError, ExtractTasksUseCase};
use crate::use_cases::form_team::FormTeamUseCase;
use crate::use_cases::run_discussion::RunDiscussionUseCase;
use crew_domain::{
    Consensus, Discussion, PipelineStage, PipelineStatus, Plan, TASK_FAILURE_MARKER, Task, TaskId,
    Team,
};
use serde::Serialize;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{info, warn};

/// Errors returned by orchestrator operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrchestratorError {
    #[error("A requirement is already being processed")]
    Busy,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No current plan")]
    NoCurrentPlan,

    #[error("Task not found: {0}")]
    TaskNotFound(TaskId),

    #[error("No tasks selected for execution")]
    NoTasksSelected,

    #[error("Planning failed: {0}")]
    Planning(#[from] ExtractTasksError),
}

impl OrchestratorError {
    /// Whether the call was turned away by the concurrency guard
    pub fn is_rejected(&self) -> bool {
        matches!(self, OrchestratorError::Busy)
    }
}

impl From<ExecutePlanError> for OrchestratorError {
    fn from(e: ExecutePlanError) -> Self {
        match e {
            ExecutePlanError::NoTasksSelected => OrchestratorError::NoTasksSelected,
            ExecutePlanError::TaskNotFound(id) => OrchestratorError::TaskNotFound(id),
        }
    }
}

/// Result of handling one requirement
#[derive(Debug, Clone, Serialize)]
pub struct RequirementOutcome {
    pub team: Team,
    pub discussion: Discussion,
    pub consensus: Option<Consensus>,
    pub plan: Option<Plan>,
    pub success: bool,
    pub message: String,
}

/// Result of a task progress update
#[derive(Debug, Clone, Serialize)]
pub struct TaskProgressUpdate {
    pub task: Task,
    pub plan_progress: f64,
}

/// Snapshot of the pipeline for status polling
#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    pub status: PipelineStatus,
    pub stage: PipelineStage,
    pub message: String,
    pub team: Option<Team>,
    pub discussion: Option<Discussion>,
    pub plan: Option<Plan>,
    pub total_tokens: u64,
}

struct StageState {
    stage: PipelineStage,
    message: String,
}

/// Facade over the whole collaboration pipeline
pub struct TeamOrchestrator<G: TextGenerator + 'static, S: StateRepository> {
    generator: Arc<G>,
    store: Arc<S>,
    config: OrchestrationConfig,
    consensus: Arc<dyn ConsensusEngine>,
    logger: Arc<dyn PipelineLogger>,
    busy: Semaphore,
    plan_write: Mutex<()>,
    stage: Mutex<StageState>,
    tracker: ExecutionTracker,
}

impl<G: TextGenerator + 'static, S: StateRepository> TeamOrchestrator<G, S> {
    pub fn new(generator: Arc<G>, store: Arc<S>, config: OrchestrationConfig) -> Self {
        let consensus = Arc::new(SentinelConsensusEngine::new(Arc::clone(&generator)));
        Self {
            generator,
            store,
            config,
            consensus,
            logger: Arc::new(NoPipelineLogger),
            busy: Semaphore::new(1),
            plan_write: Mutex::new(()),
            stage: Mutex::new(StageState {
                stage: PipelineStage::Idle,
                message: "Waiting for a requirement".to_string(),
            }),
            tracker: ExecutionTracker::new(),
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn PipelineLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_consensus_engine(mut self, engine: Arc<dyn ConsensusEngine>) -> Self {
        self.consensus = engine;
        self
    }

    pub fn config(&self) -> &OrchestrationConfig {
        &self.config
    }

    // ==================== Requirement pipeline ====================

    /// Form a team, discuss the requirement and derive a plan.
    ///
    /// A discussion that ends without consensus is not an error: the outcome
    /// carries `success == false` with the team and discussion.
    pub async fn handle_requirement(
        &self,
        requirement: &str,
        agent_count: usize,
        progress: &dyn ProgressNotifier,
    ) -> Result<RequirementOutcome, OrchestratorError> {
        let _permit = self.busy.try_acquire().map_err(|_| {
            warn!("Rejecting requirement: another one is in progress");
            OrchestratorError::Busy
        })?;

        let requirement = requirement.trim();
        if requirement.is_empty() {
            return Err(OrchestratorError::InvalidInput(
                "requirement must not be empty".to_string(),
            ));
        }
        if agent_count == 0 {
            return Err(OrchestratorError::InvalidInput(
                "agent count must be at least 1".to_string(),
            ));
        }

        self.set_stage(PipelineStage::Analyzing, "Analyzing requirement", progress);
        let mut team = FormTeamUseCase::new(Arc::clone(&self.generator))
            .form(requirement, agent_count)
            .await;
        team.start_discussion();
        self.store.save_team(&team);

        self.set_stage(
            PipelineStage::Discussing,
            &format!("{} agents are discussing", team.agent_count()),
            progress,
        );
        let mut discussion = Discussion::new(
            format!("How to implement: {}", requirement),
            self.config.max_rounds,
        );
        self.store.save_discussion(&discussion);

        let store = Arc::clone(&self.store);
        RunDiscussionUseCase::new(Arc::clone(&self.generator), Arc::clone(&self.consensus))
            .with_context_window(self.config.context_window)
            .with_logger(Arc::clone(&self.logger))
            .run_with_callback(
                &mut discussion,
                team.agents(),
                &move |d: &Discussion| store.save_discussion(d),
                progress,
            )
            .await;

        team.finish_discussion();
        self.store.save_team(&team);

        let Some(content) = discussion.consensus().map(str::to_string) else {
            let message = "The team could not reach a consensus".to_string();
            self.set_stage(PipelineStage::Error, &message, progress);
            return Ok(RequirementOutcome {
                team,
                discussion,
                consensus: None,
                plan: None,
                success: false,
                message,
            });
        };
        let consensus = Consensus::new(content, discussion.id.clone());
        self.set_stage(PipelineStage::Consensus, "Consensus reached", progress);

        self.set_stage(PipelineStage::Planning, "Extracting tasks", progress);
        let plan = match ExtractTasksUseCase::new(Arc::clone(&self.generator))
            .with_max_tasks(self.config.max_tasks)
            .with_fallback_count(self.config.fallback_task_count)
            .with_logger(Arc::clone(&self.logger))
            .create_plan(requirement, consensus.clone(), team.agents())
            .await
        {
            Ok(plan) => plan,
            Err(e) => {
                self.set_stage(PipelineStage::Error, &e.to_string(), progress);
                return Err(e.into());
            }
        };
        self.store.save_plan(&plan);

        let message = format!("Plan created with {} tasks", plan.tasks().len());
        self.set_stage(PipelineStage::Completed, &message, progress);
        info!("Requirement handled: {}", message);

        Ok(RequirementOutcome {
            team,
            discussion,
            consensus: Some(consensus),
            plan: Some(plan),
            success: true,
            message,
        })
    }

    // ==================== Plan editing ====================

    /// Set a task's progress (clamped to 0..=100) on the current plan
    pub fn update_task_progress(
        &self,
        task_id: &TaskId,
        progress: i64,
    ) -> Result<TaskProgressUpdate, OrchestratorError> {
        self.edit_plan(|plan| {
            let task = plan
                .task_mut(task_id)
                .ok_or_else(|| OrchestratorError::TaskNotFound(task_id.clone()))?;
            task.update_progress(progress);
            let task = task.clone();
            sync_completion(plan);

            Ok(TaskProgressUpdate {
                task,
                plan_progress: plan.progress(),
            })
        })
    }

    pub fn update_goal(&self, goal: &str) -> Result<Plan, OrchestratorError> {
        self.edit_plan(|plan| {
            plan.goal = goal.to_string();
            Ok(plan.clone())
        })
    }

    /// Rename and reassign a task of the current plan.
    ///
    /// The assignee is looked up by exact name in the current team; an
    /// unknown name is kept for display without an agent id.
    pub fn update_task(
        &self,
        task_id: &TaskId,
        description: &str,
        assignee_name: &str,
    ) -> Result<Task, OrchestratorError> {
        let assignee_id = self
            .store
            .current_team()
            .and_then(|team| team.agent_by_name(assignee_name).map(|a| a.id.clone()));

        self.edit_plan(|plan| {
            let task = plan
                .task_mut(task_id)
                .ok_or_else(|| OrchestratorError::TaskNotFound(task_id.clone()))?;
            task.rename(description);
            task.reassign(assignee_id, assignee_name);
            Ok(task.clone())
        })
    }

    // ==================== Execution ====================

    pub async fn execute_tasks(
        &self,
        task_ids: &[TaskId],
        progress: &dyn ProgressNotifier,
    ) -> Result<ExecutionOutcome, OrchestratorError> {
        let mut plan = self.current_plan()?;
        let outcome = self
            .executor()
            .execute(&mut plan, task_ids, &self.tracker, progress)
            .await?;
        self.merge_results(&plan, task_ids);
        Ok(outcome)
    }

    pub async fn reexecute_plan(
        &self,
        progress: &dyn ProgressNotifier,
    ) -> Result<ExecutionOutcome, OrchestratorError> {
        let mut plan = self.current_plan()?;
        let outcome = self
            .executor()
            .reexecute(&mut plan, &self.tracker, progress)
            .await?;
        let ids: Vec<TaskId> = plan.tasks().iter().map(|t| t.id.clone()).collect();
        self.merge_results(&plan, &ids);
        Ok(outcome)
    }

    pub fn execution_status(&self) -> ExecutionStatus {
        self.tracker.snapshot()
    }

    // ==================== Status ====================

    pub fn current_status(&self) -> StatusSnapshot {
        let (stage, message) = {
            let state = self.stage.lock().unwrap_or_else(PoisonError::into_inner);
            (state.stage, state.message.clone())
        };
        StatusSnapshot {
            status: stage.status(),
            stage,
            message,
            team: self.store.current_team(),
            discussion: self.store.current_discussion(),
            plan: self.store.current_plan(),
            total_tokens: self.generator.total_tokens(),
        }
    }

    fn executor(&self) -> ExecutePlanUseCase<G> {
        ExecutePlanUseCase::new(Arc::clone(&self.generator))
            .with_max_concurrency(self.config.max_concurrency)
            .with_logger(Arc::clone(&self.logger))
    }

    fn current_plan(&self) -> Result<Plan, OrchestratorError> {
        self.store.current_plan().ok_or(OrchestratorError::NoCurrentPlan)
    }

    /// Load, edit and save the current plan under the plan-write lock
    fn edit_plan<T>(
        &self,
        edit: impl FnOnce(&mut Plan) -> Result<T, OrchestratorError>,
    ) -> Result<T, OrchestratorError> {
        let _guard = self.plan_write.lock().unwrap_or_else(PoisonError::into_inner);
        let mut plan = self.current_plan()?;
        let value = edit(&mut plan)?;
        self.store.save_plan(&plan);
        Ok(value)
    }

    /// Copy the results of `ids` from an executed snapshot into the stored plan
    fn merge_results(&self, executed: &Plan, ids: &[TaskId]) {
        let _guard = self.plan_write.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(mut plan) = self.store.plan(&executed.id) else {
            warn!("Plan {} disappeared during execution", executed.id);
            return;
        };
        for id in ids {
            let (Some(done), Some(task)) = (executed.task(id), plan.task_mut(id)) else {
                continue;
            };
            task.set_result(done.result().unwrap_or(TASK_FAILURE_MARKER));
            task.update_progress(i64::from(done.progress()));
        }
        sync_completion(&mut plan);
        self.store.save_plan(&plan);
    }

    fn set_stage(&self, stage: PipelineStage, message: &str, progress: &dyn ProgressNotifier) {
        {
            let mut state = self.stage.lock().unwrap_or_else(PoisonError::into_inner);
            state.stage = stage;
            state.message = message.to_string();
        }
        progress.on_stage(stage, message);
    }
}

fn sync_completion(plan: &mut Plan) {
    if plan.is_completed() {
        if plan.completed_at().is_none() {
            plan.complete();
        }
    } else {
        plan.reopen();
    }
}
