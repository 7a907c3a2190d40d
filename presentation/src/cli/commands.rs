//! CLI command definitions

use clap::builder::RangedU64ValueParser;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for pipeline results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Team, discussion, consensus and plan
    Full,
    /// Only the plan and its tasks
    Plan,
    /// JSON output
    Json,
}

/// CLI arguments for agent-crew
#[derive(Parser, Debug)]
#[command(name = "agent-crew")]
#[command(author, version, about = "A crew of AI agents discusses a requirement and plans the work")]
#[command(long_about = r#"
Agent Crew forms a small team of role-playing agents around a requirement.

The pipeline has four stages:
1. Team formation: roles and skills are recommended for the requirement
2. Discussion: agents give opinions round by round until they agree
3. Planning: the consensus is split into tasks assigned to team members
4. Execution (--execute): tasks run in parallel and the results are summarized

Configuration is merged from (lowest to highest priority):
1. ~/.config/agent-crew/config.toml   Global config
2. ./crew.toml or ./.crew.toml        Project-level config
3. --config <path>                    Explicit config file
4. CREW_* environment variables       e.g. CREW_GENERATION__API_KEY

Example:
  agent-crew "A command-line todo manager with sync"
  agent-crew -n 4 --max-rounds 5 --execute "An internal wiki for a small team"
  agent-crew --output json "A URL shortener" > plan.json
"#)]
pub struct Cli {
    /// The requirement to hand to the crew
    pub requirement: Option<String>,

    /// Number of agents in the team
    #[arg(short = 'n', long = "agents", value_name = "N", value_parser = at_least_one())]
    pub agents: Option<usize>,

    /// Discussion rounds before a consensus is forced
    #[arg(long, value_name = "N", value_parser = at_least_one())]
    pub max_rounds: Option<usize>,

    /// Execute every task of the plan once it is created
    #[arg(short, long)]
    pub execute: bool,

    /// Output format (defaults to the config file, then "full")
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Also write diagnostic logs to a daily file in this directory
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,
}

fn at_least_one() -> RangedU64ValueParser<usize> {
    RangedU64ValueParser::<usize>::new().range(1..)
}
