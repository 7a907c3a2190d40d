//! Output formatter trait

use crew_application::{ExecutionOutcome, RequirementOutcome};

/// Trait for formatting pipeline results
pub trait OutputFormatter {
    /// Format the complete outcome: team, discussion, consensus and plan
    fn format(&self, outcome: &RequirementOutcome) -> String;

    /// Format as JSON
    fn format_json(&self, outcome: &RequirementOutcome) -> String;

    /// Format the plan only (concise output)
    fn format_plan_only(&self, outcome: &RequirementOutcome) -> String;

    /// Format the aggregated feedback of an execution
    fn format_execution(&self, outcome: &ExecutionOutcome) -> String;
}
