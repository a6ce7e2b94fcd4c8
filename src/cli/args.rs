//! Command-line argument definitions

use clap::{Parser, Subcommand, ValueEnum};

use crate::cli::commands::analyze::AnalyzeArgs;
use crate::cli::commands::completions::CompletionsArgs;
use crate::cli::commands::config::ConfigCommands;
use crate::cli::commands::fit::FitArgs;
use crate::cli::commands::optimize::OptimizeArgs;
use crate::cli::commands::simulate::SimulateArgs;

/// Relia - reliability analytics for maintained equipment
#[derive(Parser, Debug)]
#[command(name = "relia")]
#[command(version)]
#[command(about = "Weibull life analysis, maintenance interval optimization and failure simulation")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options accepted by every command
#[derive(clap::Args, Debug, Clone)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, value_enum, default_value_t = OutputFormat::Auto)]
    pub format: OutputFormat,

    /// Show debug logging on stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Show trace logging on stderr (includes regression sums)
    #[arg(long, global = true)]
    pub trace: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fit a Weibull model to a failure history (median-rank regression)
    Fit(FitArgs),

    /// Reliability curves, MTBF, B-lives and failure pattern for a model
    Analyze(AnalyzeArgs),

    /// Find the cost-optimal preventive maintenance interval
    Optimize(OptimizeArgs),

    /// Monte Carlo simulation of failures and maintenance cost
    Simulate(SimulateArgs),

    /// Show the effective configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human readable report
    #[default]
    Auto,
    /// YAML document of the full result
    Yaml,
    /// JSON document of the full result
    Json,
    /// Table of the primary rows
    Table,
    /// CSV of the primary rows
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Auto => write!(f, "auto"),
            OutputFormat::Yaml => write!(f, "yaml"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}
