//! Prompt templates for the discussion → plan → execution flow

use crate::core::string::truncate_str;
use crate::discussion::Message;
use crate::team::Agent;

/// Marker the consensus check answers with when the team still disagrees.
///
/// Matched as a substring of the generated text.
pub const NO_CONSENSUS_MARKER: &str = "NO CONSENSUS";

/// Result text written onto a task whose execution could not be generated
pub const TASK_FAILURE_MARKER: &str = "Task execution failed";

/// Feedback returned when the aggregation call fails
pub const AGGREGATION_FAILURE_MARKER: &str = "Aggregating task results failed";

/// Byte budget per earlier message in an opinion prompt
const OPINION_CONTEXT_BYTES: usize = 100;

/// Byte budget per message in a forced-consensus prompt
const FORCE_CONTEXT_BYTES: usize = 150;

/// One task outcome fed into the aggregation prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskReport<'a> {
    pub description: &'a str,
    pub assignee: &'a str,
    pub result: &'a str,
}

/// Templates for generating prompts at each stage
pub struct PromptTemplate;

impl PromptTemplate {
    /// Ask for `count` team roles suited to a requirement
    pub fn recommend_roles(requirement: &str, count: usize) -> String {
        format!(
            r#"Based on the requirement "{requirement}", recommend the {count} most suitable team roles.

One role per line, in the format:
Role name | skill1, skill2, skill3

For example:
Frontend Engineer | React, TypeScript, CSS
Backend Architect | Rust, Databases, API design

Return only the list of roles, nothing else."#
        )
    }

    /// Ask an agent for its opinion in the current round.
    ///
    /// `recent` is the sliding window of earlier messages; each is cut to a
    /// short excerpt.
    pub fn opinion(agent: &Agent, topic: &str, round: usize, recent: &[Message]) -> String {
        let context = if recent.is_empty() {
            "This is the first round of discussion.".to_string()
        } else {
            recent
                .iter()
                .map(|m| {
                    format!(
                        "{}: {}",
                        m.agent_name,
                        truncate_str(&m.content, OPINION_CONTEXT_BYTES)
                    )
                })
                .collect::<Vec<_>>()
                .join("\n")
        };

        format!(
            r#"As {name} ({role}), give your professional opinion on the following topic:

Topic: {topic}
Current round: {round}

Previous discussion:
{context}

Requirements:
1. Speak in the first person and give concrete recommendations
2. Do not explain your reasoning process
3. Do not repeat earlier points, only add new ones
4. Keep it concise and focused
5. Use professional, formal language
6. Aim for 300-500 words

Start directly with your opinion, without any preamble."#,
            name = agent.name,
            role = agent.role,
        )
    }

    /// Ask whether the current round's opinions agree.
    ///
    /// The generator answers with a consensus summary or [`NO_CONSENSUS_MARKER`].
    pub fn consensus_check(topic: &str, round_messages: &[&Message]) -> String {
        let opinions = round_messages
            .iter()
            .map(|m| format!("{}: {}", m.agent_name, m.content))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            r#"Analyze the following team discussion and decide whether a consensus has been reached.

Topic: {topic}

Opinions from this round:
{opinions}

If the members broadly agree, summarize the consensus.
If the opinions differ significantly, reply with "{NO_CONSENSUS_MARKER}".

Return only the consensus or "{NO_CONSENSUS_MARKER}", without any further explanation."#
        )
    }

    /// Ask for a balanced consensus over the whole discussion
    pub fn force_consensus(topic: &str, rounds: usize, messages: &[Message]) -> String {
        let opinions = messages
            .iter()
            .map(|m| {
                format!(
                    "{}: {}",
                    m.agent_name,
                    truncate_str(&m.content, FORCE_CONTEXT_BYTES)
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            r#"The team has discussed "{topic}" for {rounds} rounds.

Full discussion:
{opinions}

Based on the discussion above, summarize a balanced consensus. Give the consensus directly, without explanation."#
        )
    }

    /// Ask for 3-6 `description | assignee` task lines
    pub fn extract_tasks(goal: &str, consensus: &str, agents: &[Agent]) -> String {
        let members = agents
            .iter()
            .map(|a| format!("- {} ({}): {}", a.name, a.role, a.skills_label()))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            r#"Based on the following consensus, extract concrete tasks to execute:

Goal: {goal}
Consensus: {consensus}

Team members:
{members}

Extract 3-6 concrete tasks, one per line, in the format:
Task description | Assignee name

Return only the task list, nothing else."#
        )
    }

    /// Ask the assignee to carry out a task
    pub fn execute_task(assignee: &str, description: &str) -> String {
        format!(
            r#"You are {assignee}. Complete the following task: {description}

Give the result of the task directly, without any reasoning process."#
        )
    }

    /// Ask the lead agent to summarize task results against the goal.
    ///
    /// Reports are listed in the order given.
    pub fn aggregate_results(goal: &str, reports: &[TaskReport<'_>]) -> String {
        let results = reports
            .iter()
            .map(|r| {
                format!(
                    "- Task: {}\n  Assignee: {}\n  Result: {}",
                    r.description, r.assignee, r.result
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            r#"You are the lead agent, responsible for summarizing and analyzing the results of the sub-tasks against the goal and giving final feedback.

Goal: {goal}

Sub-task results:
{results}

Based on the above, give final feedback covering:
1. A summary of how the sub-tasks went
2. How well the goal was achieved
3. Final conclusions and recommendations

Give the final feedback directly, without any reasoning process."#
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ids::AgentId;
    use crate::discussion::Discussion;

    fn agent() -> Agent {
        Agent::new("Alice", "Developer").with_skills(["Rust", "SQL"])
    }

    #[test]
    fn test_opinion_first_round() {
        let prompt = PromptTemplate::opinion(&agent(), "Build a blog", 1, &[]);
        assert!(prompt.contains("As Alice (Developer)"));
        assert!(prompt.contains("Topic: Build a blog"));
        assert!(prompt.contains("Current round: 1"));
        assert!(prompt.contains("This is the first round"));
    }

    #[test]
    fn test_opinion_context_is_truncated() {
        let mut discussion = Discussion::new("topic", 3);
        discussion.start_new_round().unwrap();
        discussion
            .add_message(AgentId::new("b"), "Bob", "x".repeat(300))
            .unwrap();

        let prompt = PromptTemplate::opinion(&agent(), "topic", 2, discussion.messages());
        assert!(prompt.contains(&format!("Bob: {}", "x".repeat(100))));
        assert!(!prompt.contains(&"x".repeat(101)));
    }

    #[test]
    fn test_consensus_check_mentions_marker() {
        let mut discussion = Discussion::new("topic", 3);
        discussion.start_new_round().unwrap();
        discussion
            .add_message(AgentId::new("b"), "Bob", "Use Postgres")
            .unwrap();

        let prompt =
            PromptTemplate::consensus_check("topic", &discussion.current_round_messages());
        assert!(prompt.contains("Bob: Use Postgres"));
        assert!(prompt.contains(NO_CONSENSUS_MARKER));
    }

    #[test]
    fn test_extract_tasks_lists_members() {
        let prompt = PromptTemplate::extract_tasks("goal", "consensus", &[agent()]);
        assert!(prompt.contains("- Alice (Developer): Rust, SQL"));
        assert!(prompt.contains("Task description | Assignee name"));
    }

    #[test]
    fn test_aggregate_keeps_report_order() {
        let reports = vec![
            TaskReport {
                description: "first",
                assignee: "Alice",
                result: "r1",
            },
            TaskReport {
                description: "second",
                assignee: "Bob",
                result: "r2",
            },
        ];
        let prompt = PromptTemplate::aggregate_results("goal", &reports);
        let first = prompt.find("Task: first").unwrap();
        let second = prompt.find("Task: second").unwrap();
        assert!(first < second);
        assert!(prompt.contains("Assignee: Bob"));
    }
}
