//! CLI command definitions

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for run results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary
    Summary,
    /// The full run record as JSON
    Json,
}

/// CLI arguments for deliberation
#[derive(Parser, Debug)]
#[command(name = "deliberation")]
#[command(author, version, about = "Multi-participant deliberation over a reasoning engine")]
#[command(long_about = r#"
Deliberation runs a panel of personas against a reasoning engine and turns
their answers into a decision.

Commands:
  escalate   Confidence-gated tiers: one answer, then a panel consensus,
             then rebuttals with an oversight review
  crowd      Idea cards scored blind by the panel over several rounds
  vote       Rapid ideas followed by a dot vote
  catalog    List the capability cards in the catalog directory

Configuration files are loaded from (in priority order):
1. DELIBERATION_* environment variables (e.g. DELIBERATION_BUDGETS__DEEP_TOKENS)
2. --config <path>          Explicit config file
3. ./deliberation.toml      Project-level config
4. ~/.config/deliberation/config.toml   Global config

Example:
  deliberation escalate "Should we enter the Japanese market next year?"
  deliberation crowd --rounds 3 "How do we halve onboarding time?"
  deliberation --output json vote "What should the offsite focus on?"
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Output format (overrides [output] format)
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration sources and the merged configuration, then exit
    #[arg(long)]
    pub show_config: bool,

    /// Write a JSONL call trace to this file (enables tracing)
    #[arg(long, value_name = "PATH", global = true)]
    pub trace: Option<PathBuf>,

    /// Also write diagnostic logs to this file
    #[arg(long, value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Answer a question, escalating through tiers until confident
    Escalate {
        /// The question to deliberate
        question: String,
    },

    /// Generate idea cards and score them blind across rounds
    Crowd {
        /// The challenge to generate ideas for
        challenge: String,

        /// Scoring rounds (overrides [scoring] rounds)
        #[arg(long)]
        rounds: Option<usize>,

        /// Seed for scoring target selection
        #[arg(long)]
        seed: Option<u64>,
    },

    /// List ideas rapidly, then dot vote for the best ones
    Vote {
        /// The question to generate ideas for
        question: String,

        /// Re-rank the winners with a Borda runoff (overrides [dot_vote] runoff)
        #[arg(long)]
        runoff: bool,
    },

    /// Show the capability catalog
    Catalog {
        /// Catalog directory (overrides [catalog] dir)
        #[arg(long, value_name = "DIR")]
        dir: Option<PathBuf>,
    },
}
