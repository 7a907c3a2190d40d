//! Default names and roles used when forming a team.

use crate::plan::parsing::RoleSpec;

/// Display names handed out to agents in team order
pub const AGENT_NAMES: [&str; 8] = [
    "Alice", "Bob", "Charlie", "David", "Eve", "Frank", "Grace", "Henry",
];

/// Name given to every formed team
pub const DEFAULT_TEAM_NAME: &str = "AI Collaboration Team";

/// Name for the agent at `index` (0-based); `Agent{n}` past the fixed list
pub fn agent_name(index: usize) -> String {
    AGENT_NAMES
        .get(index)
        .map(|n| n.to_string())
        .unwrap_or_else(|| format!("Agent{}", index + 1))
}

/// Roles used when no usable recommendation could be generated
pub fn default_roles() -> Vec<RoleSpec> {
    vec![
        RoleSpec::new("Developer", ["Programming", "Design", "Testing"]),
        RoleSpec::new(
            "Product Manager",
            ["Requirements analysis", "Planning", "Communication"],
        ),
        RoleSpec::new("Designer", ["UI design", "UX design", "Prototyping"]),
    ]
}
