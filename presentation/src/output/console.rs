//! Console output formatter for pipeline results

use crate::output::formatter::OutputFormatter;
use colored::Colorize;
use crew_application::{ExecutionOutcome, RequirementOutcome};
use crew_domain::{Plan, Task, TaskStatus};

/// Formats pipeline results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the complete outcome
    pub fn format(outcome: &RequirementOutcome) -> String {
        let mut output = String::new();

        output.push_str(&Self::header(&outcome.team.name));
        output.push('\n');

        // Team
        output.push_str(&Self::section_header("Team"));
        for agent in outcome.team.agents() {
            output.push_str(&format!(
                "  {} {} {}\n",
                agent.name.yellow().bold(),
                format!("({})", agent.role).cyan(),
                agent.skills_label().dimmed()
            ));
        }

        // Discussion, grouped by round
        let discussion = &outcome.discussion;
        output.push_str(&Self::section_header(&format!(
            "Discussion: {}",
            discussion.topic
        )));
        for round in 1..=discussion.current_round() {
            output.push_str(&format!("\n{}\n", format!("── Round {} ──", round).bold()));
            for message in discussion.round_messages(round) {
                output.push_str(&format!(
                    "{}\n{}\n\n",
                    format!("{}:", message.agent_name).yellow(),
                    Self::indent(&message.content, "  ")
                ));
            }
        }

        // Consensus
        output.push_str(&Self::section_header("Consensus"));
        match &outcome.consensus {
            Some(consensus) => output.push_str(&format!("{}\n", consensus)),
            None => output.push_str(&format!("{}\n", outcome.message.red())),
        }

        if let Some(plan) = &outcome.plan {
            output.push_str(&Self::section_header("Plan"));
            output.push_str(&Self::format_tasks(plan));
        }

        output.push_str(&Self::footer());
        output
    }

    /// Format as JSON
    pub fn format_json(outcome: &RequirementOutcome) -> String {
        serde_json::to_string_pretty(outcome).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format the plan only (concise output)
    pub fn format_plan_only(outcome: &RequirementOutcome) -> String {
        let Some(plan) = &outcome.plan else {
            return format!("{}\n", outcome.message.red());
        };

        let mut output = String::new();
        output.push_str(&format!("{}\n\n", "=== Plan ===".cyan().bold()));
        output.push_str(&format!("{} {}\n\n", "Goal:".bold(), plan.goal));
        output.push_str(&Self::format_tasks(plan));
        output
    }

    pub fn format_execution(outcome: &ExecutionOutcome) -> String {
        format!(
            "{}\n{}\n",
            Self::section_header("Final Feedback"),
            outcome.final_feedback
        )
    }

    fn format_tasks(plan: &Plan) -> String {
        let mut output = String::new();
        for (i, task) in plan.tasks().iter().enumerate() {
            output.push_str(&format!(
                "  {}. {} {} {}\n",
                i + 1,
                Self::status_mark(task),
                task.description,
                format!("→ {}", task.assignee_name().unwrap_or("unassigned")).dimmed()
            ));
            if let Some(result) = task.result() {
                output.push_str(&format!("{}\n", Self::indent(result, "       ")));
            }
        }
        output.push_str(&format!(
            "\n  {} {:.0}%\n",
            "Progress:".bold(),
            plan.progress()
        ));
        output
    }

    fn status_mark(task: &Task) -> String {
        match task.status() {
            TaskStatus::Completed => "[done]".green().to_string(),
            TaskStatus::InProgress => "[....]".yellow().to_string(),
            TaskStatus::Pending => "[    ]".normal().to_string(),
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format(&self, outcome: &RequirementOutcome) -> String {
        Self::format(outcome)
    }

    fn format_json(&self, outcome: &RequirementOutcome) -> String {
        Self::format_json(outcome)
    }

    fn format_plan_only(&self, outcome: &RequirementOutcome) -> String {
        Self::format_plan_only(outcome)
    }

    fn format_execution(&self, outcome: &ExecutionOutcome) -> String {
        Self::format_execution(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crew_domain::{Agent, AgentId, Consensus, Discussion, Team};

    fn outcome(with_plan: bool) -> RequirementOutcome {
        colored::control::set_override(false);

        let alice = Agent::new("Alice", "Developer").with_skills(["Rust"]);
        let team = Team::new("AI Collaboration Team").with_agent(alice.clone());
        let mut discussion = Discussion::new("How to implement: a wiki", 3);
        discussion.start_new_round().unwrap();
        discussion
            .add_message(AgentId::new("a"), "Alice", "Use Markdown files")
            .unwrap();
        discussion.reach_consensus("Markdown in git").unwrap();
        let consensus = Consensus::new("Markdown in git", discussion.id.clone());

        let plan = with_plan.then(|| {
            let mut plan = Plan::new("a wiki", consensus.clone());
            let mut task = Task::new("Set up the repo");
            task.assign_to(alice.id.clone(), alice.name.clone());
            plan.add_task(task).unwrap();
            plan
        });

        RequirementOutcome {
            team,
            discussion,
            consensus: with_plan.then_some(consensus),
            plan,
            success: with_plan,
            message: if with_plan {
                "Plan created with 1 tasks".to_string()
            } else {
                "The team could not reach a consensus".to_string()
            },
        }
    }

    #[test]
    fn test_format_full() {
        let text = ConsoleFormatter::format(&outcome(true));
        assert!(text.contains("Alice (Developer) Rust"));
        assert!(text.contains("── Round 1 ──"));
        assert!(text.contains("  Use Markdown files"));
        assert!(text.contains("Markdown in git"));
        assert!(text.contains("1. [....] Set up the repo → Alice"));
        assert!(text.contains("Progress: 0%"));
    }

    #[test]
    fn test_plan_only_without_plan() {
        let text = ConsoleFormatter::format_plan_only(&outcome(false));
        assert!(text.contains("could not reach a consensus"));
    }

    #[test]
    fn test_format_json() {
        let json: serde_json::Value =
            serde_json::from_str(&ConsoleFormatter::format_json(&outcome(true))).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["team"]["agent_count"], 1);
        assert_eq!(json["discussion"]["status"], "consensus_reached");
        assert_eq!(json["plan"]["tasks"][0]["status"], "in_progress");
        assert_eq!(json["plan"]["progress"], 0.0);
    }

    #[test]
    fn test_indent() {
        assert_eq!(ConsoleFormatter::indent("a\nb", "> "), "> a\n> b");
    }
}
