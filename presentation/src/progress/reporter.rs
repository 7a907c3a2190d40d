//! Progress reporting for the collaboration pipeline

use colored::Colorize;
use crew_application::ProgressNotifier;
use crew_domain::core::string::truncate;
use crew_domain::{Agent, PipelineStage, Task};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::{Mutex, PoisonError};

/// Reports progress with indicatif bars: one per discussion round and one
/// for task execution
pub struct ProgressReporter {
    multi: MultiProgress,
    active_bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            active_bar: Mutex::new(None),
        }
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn start_bar(&self, prefix: String, len: usize) {
        let pb = self.multi.add(ProgressBar::new(len as u64));
        pb.set_style(Self::bar_style());
        pb.set_prefix(prefix);
        pb.set_message("Starting...");
        *self.bar() = Some(pb);
    }

    fn finish_bar(&self, message: String) {
        if let Some(pb) = self.bar().take() {
            pb.finish_with_message(message);
        }
    }

    fn bar(&self) -> std::sync::MutexGuard<'_, Option<ProgressBar>> {
        self.active_bar.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressNotifier for ProgressReporter {
    fn on_stage(&self, stage: PipelineStage, message: &str) {
        let line = format!("{} {}", format!("[{}]", stage.display_name()).bold(), message);
        let _ = self.multi.println(match stage {
            PipelineStage::Error => line.red().to_string(),
            PipelineStage::Completed => line.green().to_string(),
            _ => line,
        });
    }

    fn on_round_start(&self, round: usize, max_rounds: usize, participants: usize) {
        self.start_bar(format!("Round {}/{}", round, max_rounds), participants);
    }

    fn on_opinion(&self, agent: &Agent, success: bool) {
        if let Some(pb) = self.bar().as_ref() {
            let mark = if success { "v".green() } else { "x".red() };
            pb.set_message(format!("{} {}", mark, agent.name));
            pb.inc(1);
        }
    }

    fn on_round_complete(&self, round: usize) {
        self.finish_bar(format!("Round {} complete", round).green().to_string());
    }

    fn on_consensus(&self, consensus: Option<&str>, forced: bool) {
        let line = match (consensus, forced) {
            (Some(_), false) => "Consensus reached".green().to_string(),
            (Some(_), true) => "Consensus synthesized after the last round".yellow().to_string(),
            (None, _) => "No consensus".red().to_string(),
        };
        let _ = self.multi.println(line);
    }

    fn on_execution_start(&self, total: usize) {
        self.start_bar("Executing".to_string(), total);
    }

    fn on_task_executed(&self, task: &Task, completed: usize, _total: usize) {
        if let Some(pb) = self.bar().as_ref() {
            pb.set_message(truncate(&task.description, 50));
            pb.set_position(completed as u64);
        }
    }

    fn on_execution_complete(&self, _success: bool) {
        self.finish_bar("Execution complete".green().to_string());
    }
}

/// Simple text-based progress on stderr (no fancy UI)
pub struct SimpleProgress;

impl ProgressNotifier for SimpleProgress {
    fn on_stage(&self, stage: PipelineStage, message: &str) {
        eprintln!("{} {}: {}", "->".cyan(), stage.display_name().bold(), message);
    }

    fn on_round_start(&self, round: usize, max_rounds: usize, participants: usize) {
        eprintln!("  Round {}/{} ({} agents)", round, max_rounds, participants);
    }

    fn on_opinion(&self, agent: &Agent, success: bool) {
        if success {
            eprintln!("    {} {}", "v".green(), agent.name);
        } else {
            eprintln!("    {} {} (no opinion)", "x".red(), agent.name);
        }
    }

    fn on_consensus(&self, consensus: Option<&str>, forced: bool) {
        match consensus {
            Some(_) if forced => eprintln!("  {} consensus synthesized", "~".yellow()),
            Some(_) => eprintln!("  {} consensus reached", "v".green()),
            None => eprintln!("  {} no consensus", "x".red()),
        }
    }

    fn on_execution_start(&self, total: usize) {
        eprintln!("{} Executing {} tasks", "->".cyan(), total);
    }

    fn on_task_executed(&self, task: &Task, completed: usize, total: usize) {
        eprintln!("  [{}/{}] {}", completed, total, task.description);
    }

    fn on_execution_complete(&self, _success: bool) {
        eprintln!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indicatif::ProgressDrawTarget;

    fn hidden_reporter() -> ProgressReporter {
        ProgressReporter {
            multi: MultiProgress::with_draw_target(ProgressDrawTarget::hidden()),
            active_bar: Mutex::new(None),
        }
    }

    #[test]
    fn test_round_bar_counts_opinions() {
        let reporter = hidden_reporter();
        let alice = Agent::new("Alice", "Developer");

        reporter.on_round_start(1, 3, 2);
        reporter.on_opinion(&alice, true);
        reporter.on_opinion(&alice, false);

        let bar = reporter.bar().clone().unwrap();
        assert_eq!(bar.length(), Some(2));
        assert_eq!(bar.position(), 2);

        reporter.on_round_complete(1);
        assert!(reporter.bar().is_none());
        assert!(bar.is_finished());
    }

    #[test]
    fn test_execution_bar_tracks_completed_count() {
        let reporter = hidden_reporter();
        let task = Task::new("Write the migration");

        reporter.on_execution_start(4);
        reporter.on_task_executed(&task, 3, 4);
        assert_eq!(reporter.bar().as_ref().unwrap().position(), 3);

        reporter.on_execution_complete(true);
        assert!(reporter.bar().is_none());
    }

    #[test]
    fn test_events_without_a_bar_are_ignored() {
        let reporter = hidden_reporter();
        reporter.on_opinion(&Agent::new("Bob", "Designer"), true);
        reporter.on_round_complete(1);
        assert!(reporter.bar().is_none());
    }
}
