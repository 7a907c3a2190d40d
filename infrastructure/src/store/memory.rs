//! In-memory state store
//!
//! Holds every team, discussion and plan created during the life of the
//! process. Constructed once by the entry point and shared through an `Arc`;
//! nothing is evicted and nothing survives a restart.

use crew_application::StateRepository;
use crew_domain::{Discussion, DiscussionId, Plan, PlanId, Team, TeamId};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

#[derive(Default)]
struct Entries {
    teams: HashMap<TeamId, Team>,
    discussions: HashMap<DiscussionId, Discussion>,
    plans: HashMap<PlanId, Plan>,
    current_team: Option<TeamId>,
    current_discussion: Option<DiscussionId>,
    current_plan: Option<PlanId>,
}

/// [`StateRepository`] keeping snapshots in process memory
#[derive(Default)]
pub struct InMemoryStateStore {
    entries: RwLock<Entries>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Entries> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Entries> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl StateRepository for InMemoryStateStore {
    fn save_team(&self, team: &Team) {
        let mut entries = self.write();
        entries.teams.insert(team.id.clone(), team.clone());
        if entries.current_team.is_none() {
            debug!("Current team is now {}", team.id);
            entries.current_team = Some(team.id.clone());
        }
    }

    fn team(&self, id: &TeamId) -> Option<Team> {
        self.read().teams.get(id).cloned()
    }

    fn current_team(&self) -> Option<Team> {
        let entries = self.read();
        entries
            .current_team
            .as_ref()
            .and_then(|id| entries.teams.get(id).cloned())
    }

    fn set_current_team(&self, id: &TeamId) -> bool {
        let mut entries = self.write();
        if !entries.teams.contains_key(id) {
            return false;
        }
        entries.current_team = Some(id.clone());
        true
    }

    fn save_discussion(&self, discussion: &Discussion) {
        let mut entries = self.write();
        entries
            .discussions
            .insert(discussion.id.clone(), discussion.clone());
        entries.current_discussion = Some(discussion.id.clone());
    }

    fn discussion(&self, id: &DiscussionId) -> Option<Discussion> {
        self.read().discussions.get(id).cloned()
    }

    fn current_discussion(&self) -> Option<Discussion> {
        let entries = self.read();
        entries
            .current_discussion
            .as_ref()
            .and_then(|id| entries.discussions.get(id).cloned())
    }

    fn discussions(&self) -> Vec<Discussion> {
        let mut discussions: Vec<Discussion> = self.read().discussions.values().cloned().collect();
        discussions.sort_by_key(|d| d.started_at);
        discussions
    }

    fn clear_current_discussion(&self) {
        self.write().current_discussion = None;
    }

    fn save_plan(&self, plan: &Plan) {
        let mut entries = self.write();
        entries.plans.insert(plan.id.clone(), plan.clone());
        entries.current_plan = Some(plan.id.clone());
    }

    fn plan(&self, id: &PlanId) -> Option<Plan> {
        self.read().plans.get(id).cloned()
    }

    fn current_plan(&self) -> Option<Plan> {
        let entries = self.read();
        entries
            .current_plan
            .as_ref()
            .and_then(|id| entries.plans.get(id).cloned())
    }

    fn plans(&self) -> Vec<Plan> {
        let mut plans: Vec<Plan> = self.read().plans.values().cloned().collect();
        plans.sort_by_key(|p| p.created_at);
        plans
    }

    fn clear(&self) {
        *self.write() = Entries::default();
    }
}
