//! Test doubles shared by the use case tests.

use crate::ports::state_repository::StateRepository;
use crate::ports::text_generator::{Generation, GenerationError, TextGenerator};
use async_trait::async_trait;
use crew_domain::{Discussion, DiscussionId, Plan, PlanId, Team, TeamId};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

type Responder = Box<dyn Fn(&str) -> Generation + Send + Sync>;
type Delay = Box<dyn Fn(&str) -> Duration + Send + Sync>;

/// Generator answering through a closure, recording every prompt it sees
pub struct MockGenerator {
    responder: Responder,
    delay: Option<Delay>,
    prompts: Mutex<Vec<String>>,
    tokens: AtomicU64,
}

impl MockGenerator {
    pub fn new(responder: impl Fn(&str) -> Generation + Send + Sync + 'static) -> Self {
        Self {
            responder: Box::new(responder),
            delay: None,
            prompts: Mutex::new(Vec::new()),
            tokens: AtomicU64::new(0),
        }
    }

    /// Every call fails
    pub fn failing() -> Self {
        Self::new(|_| Generation::failure(&GenerationError::ConnectionError("down".into())))
    }

    /// Sleep before answering, per prompt
    pub fn with_delay(mut self, delay: impl Fn(&str) -> Duration + Send + Sync + 'static) -> Self {
        self.delay = Some(Box::new(delay));
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(&self, prompt: &str, _max_tokens: Option<u32>) -> Generation {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if let Some(delay) = &self.delay {
            tokio::time::sleep(delay(prompt)).await;
        }
        let generation = (self.responder)(prompt);
        self.tokens.fetch_add(generation.tokens, Ordering::SeqCst);
        generation
    }

    fn total_tokens(&self) -> u64 {
        self.tokens.load(Ordering::SeqCst)
    }
}

pub fn ok(text: &str) -> Generation {
    Generation::success(text, 10)
}

pub fn failed() -> Generation {
    Generation::failure(&GenerationError::Timeout)
}

#[derive(Default)]
struct MemoryState {
    teams: HashMap<TeamId, Team>,
    discussions: HashMap<DiscussionId, Discussion>,
    plans: HashMap<PlanId, Plan>,
    current_team: Option<TeamId>,
    current_discussion: Option<DiscussionId>,
    current_plan: Option<PlanId>,
    saves: usize,
}

/// Minimal in-memory repository with a save counter
#[derive(Default)]
pub struct MemoryRepository {
    state: Mutex<MemoryState>,
}

impl MemoryRepository {
    pub fn saves(&self) -> usize {
        self.state.lock().unwrap().saves
    }
}

impl StateRepository for MemoryRepository {
    fn save_team(&self, team: &Team) {
        let mut s = self.state.lock().unwrap();
        s.saves += 1;
        s.teams.insert(team.id.clone(), team.clone());
        if s.current_team.is_none() {
            s.current_team = Some(team.id.clone());
        }
    }

    fn team(&self, id: &TeamId) -> Option<Team> {
        self.state.lock().unwrap().teams.get(id).cloned()
    }

    fn current_team(&self) -> Option<Team> {
        let s = self.state.lock().unwrap();
        s.current_team.as_ref().and_then(|id| s.teams.get(id).cloned())
    }

    fn set_current_team(&self, id: &TeamId) -> bool {
        let mut s = self.state.lock().unwrap();
        if s.teams.contains_key(id) {
            s.current_team = Some(id.clone());
            true
        } else {
            false
        }
    }

    fn save_discussion(&self, discussion: &Discussion) {
        let mut s = self.state.lock().unwrap();
        s.saves += 1;
        s.discussions
            .insert(discussion.id.clone(), discussion.clone());
        s.current_discussion = Some(discussion.id.clone());
    }

    fn discussion(&self, id: &DiscussionId) -> Option<Discussion> {
        self.state.lock().unwrap().discussions.get(id).cloned()
    }

    fn current_discussion(&self) -> Option<Discussion> {
        let s = self.state.lock().unwrap();
        s.current_discussion
            .as_ref()
            .and_then(|id| s.discussions.get(id).cloned())
    }

    fn discussions(&self) -> Vec<Discussion> {
        self.state.lock().unwrap().discussions.values().cloned().collect()
    }

    fn clear_current_discussion(&self) {
        self.state.lock().unwrap().current_discussion = None;
    }

    fn save_plan(&self, plan: &Plan) {
        let mut s = self.state.lock().unwrap();
        s.saves += 1;
        s.plans.insert(plan.id.clone(), plan.clone());
        s.current_plan = Some(plan.id.clone());
    }

    fn plan(&self, id: &PlanId) -> Option<Plan> {
        self.state.lock().unwrap().plans.get(id).cloned()
    }

    fn current_plan(&self) -> Option<Plan> {
        let s = self.state.lock().unwrap();
        s.current_plan.as_ref().and_then(|id| s.plans.get(id).cloned())
    }

    fn plans(&self) -> Vec<Plan> {
        self.state.lock().unwrap().plans.values().cloned().collect()
    }

    fn clear(&self) {
        *self.state.lock().unwrap() = MemoryState::default();
    }
}
