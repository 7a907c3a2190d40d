//! State repository port
//!
//! Keyed storage for teams, discussions and plans, with one "current"
//! pointer per kind. Entries accumulate for the life of the store.

use crew_domain::{Discussion, DiscussionId, Plan, PlanId, Team, TeamId};

/// Storage for pipeline entities.
///
/// Values are stored and returned as snapshots: callers load, mutate and
/// save back. Pointer rules:
///
/// - the current team is set by the first `save_team` only
/// - the current discussion and plan follow the latest save
pub trait StateRepository: Send + Sync {
    fn save_team(&self, team: &Team);
    fn team(&self, id: &TeamId) -> Option<Team>;
    fn current_team(&self) -> Option<Team>;
    /// Point "current team" at a stored team; false if unknown
    fn set_current_team(&self, id: &TeamId) -> bool;

    fn save_discussion(&self, discussion: &Discussion);
    fn discussion(&self, id: &DiscussionId) -> Option<Discussion>;
    fn current_discussion(&self) -> Option<Discussion>;
    fn discussions(&self) -> Vec<Discussion>;
    fn clear_current_discussion(&self);

    fn save_plan(&self, plan: &Plan);
    fn plan(&self, id: &PlanId) -> Option<Plan>;
    fn current_plan(&self) -> Option<Plan>;
    fn plans(&self) -> Vec<Plan>;

    /// Drop every entry and pointer
    fn clear(&self);
}
