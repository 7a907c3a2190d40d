//! Form Team use case
//!
//! Builds the team for a requirement from roles recommended by the
//! generator, falling back to a fixed trio when nothing usable comes back.

use crate::ports::text_generator::TextGenerator;
use crew_domain::team::roster::{DEFAULT_TEAM_NAME, agent_name, default_roles};
use crew_domain::{Agent, PromptTemplate, RoleSpec, Team, parse_role_lines};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Use case for assembling a team around a requirement
pub struct FormTeamUseCase<G: TextGenerator> {
    generator: Arc<G>,
}

impl<G: TextGenerator> FormTeamUseCase<G> {
    pub fn new(generator: Arc<G>) -> Self {
        Self { generator }
    }

    /// Form a team of at most `agent_count` agents.
    ///
    /// The team is smaller when fewer roles are available than requested.
    pub async fn form(&self, requirement: &str, agent_count: usize) -> Team {
        let roles = self.recommend_roles(requirement, agent_count).await;

        let mut team = Team::new(DEFAULT_TEAM_NAME);
        for (i, spec) in roles.into_iter().take(agent_count).enumerate() {
            team.add_agent(Agent::new(agent_name(i), spec.role).with_skills(spec.skills));
        }

        if team.agent_count() < agent_count {
            warn!(
                "Requested {} agents but only {} roles are available",
                agent_count,
                team.agent_count()
            );
        }
        info!("Formed team of {} agents", team.agent_count());
        team
    }

    /// Ask the generator for roles; defaults on failure or unparsable output
    pub async fn recommend_roles(&self, requirement: &str, count: usize) -> Vec<RoleSpec> {
        let prompt = PromptTemplate::recommend_roles(requirement, count);
        let generation = self.generator.generate(&prompt, None).await;

        let Some(text) = generation.into_text() else {
            warn!("Role recommendation failed, using default roles");
            return default_roles();
        };

        let roles = parse_role_lines(&text);
        if roles.is_empty() {
            warn!("No roles could be parsed, using default roles");
            return default_roles();
        }
        debug!("Recommended roles: {:?}", roles.iter().map(|r| &r.role).collect::<Vec<_>>());
        roles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockGenerator, ok};

    #[tokio::test]
    async fn test_form_from_recommendation() {
        let generator = Arc::new(MockGenerator::new(|_| {
            ok("Backend Engineer | Rust, PostgreSQL\nTester | QA, Automation\nnot a role line")
        }));
        let team = FormTeamUseCase::new(generator).form("Build an API", 2).await;

        assert_eq!(team.name, "AI Collaboration Team");
        assert_eq!(team.agent_count(), 2);
        let alice = &team.agents()[0];
        assert_eq!(alice.name, "Alice");
        assert_eq!(alice.role, "Backend Engineer");
        assert_eq!(alice.skills, vec!["Rust", "PostgreSQL"]);
        assert_eq!(team.agents()[1].name, "Bob");
        assert_eq!(team.agents()[1].role, "Tester");
    }

    #[tokio::test]
    async fn test_form_falls_back_to_default_roles() {
        let team = FormTeamUseCase::new(Arc::new(MockGenerator::failing()))
            .form("Build an API", 3)
            .await;

        let roles: Vec<&str> = team.agents().iter().map(|a| a.role.as_str()).collect();
        assert_eq!(roles, vec!["Developer", "Product Manager", "Designer"]);
    }

    #[tokio::test]
    async fn test_unparsable_output_uses_defaults() {
        let generator = Arc::new(MockGenerator::new(|_| ok("I would suggest a developer.")));
        let roles = FormTeamUseCase::new(generator)
            .recommend_roles("anything", 3)
            .await;
        assert_eq!(roles, default_roles());
    }

    #[tokio::test]
    async fn test_team_is_truncated_to_available_roles() {
        let team = FormTeamUseCase::new(Arc::new(MockGenerator::failing()))
            .form("Build an API", 5)
            .await;
        assert_eq!(team.agent_count(), 3);
    }

    #[tokio::test]
    async fn test_prompt_asks_for_requested_count() {
        let generator = Arc::new(MockGenerator::new(|_| ok("Dev | Rust")));
        FormTeamUseCase::new(Arc::clone(&generator))
            .form("Build a CLI", 4)
            .await;
        let prompt = &generator.prompts()[0];
        assert!(prompt.contains("Build a CLI"));
        assert!(prompt.contains("recommend the 4 most suitable"));
    }
}
