//! `relia simulate` command - Monte Carlo failure and cost simulation

use std::time::Duration;

use console::style;
use miette::Result;

use crate::cli::commands::ModelArgs;
use crate::cli::helpers::{engine_err, format_number};
use crate::cli::output::{effective_format, print_rows, print_structured, Cell};
use crate::cli::viz;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::config::Config;
use crate::core::engine::ReliabilityEngine;
use crate::core::simulation::{Cancellation, SimulationParameters, SimulationResult};

#[derive(clap::Args, Debug)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    /// Length of each simulated timeline
    #[arg(long)]
    pub horizon: f64,

    /// Cost of one preventive action
    #[arg(long, default_value_t = 0.0)]
    pub pm_cost: f64,

    /// Cost of one failure
    #[arg(long)]
    pub failure_cost: f64,

    /// Number of runs (default from config)
    #[arg(long, short = 'n')]
    pub runs: Option<usize>,

    /// Preventive maintenance age; omit to run to failure
    #[arg(long)]
    pub pm_interval: Option<f64>,

    /// Seed for a reproducible result
    #[arg(long)]
    pub seed: Option<u64>,

    /// Histogram bins for failure times (default from config)
    #[arg(long)]
    pub bins: Option<usize>,

    /// Abandon the simulation after this many milliseconds
    #[arg(long, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Print the failure-time histogram
    #[arg(long)]
    pub histogram: bool,
}

const BIN_HEADERS: &[&str] = &["start", "end", "failures"];

fn bin_rows(result: &SimulationResult) -> Vec<Vec<Cell>> {
    result
        .histogram
        .iter()
        .map(|b| vec![Cell::from(b.start), Cell::from(b.end), Cell::from(b.count)])
        .collect()
}

pub fn run(args: SimulateArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let (model, unit) = args.model.model()?;

    let mut params = SimulationParameters::new(
        args.runs.unwrap_or(config.default_runs),
        args.horizon,
        args.pm_cost,
        args.failure_cost,
    );
    params.pm_interval = args.pm_interval;
    params.rng_seed = args.seed;
    params.histogram_bins = args.bins.unwrap_or(config.histogram_bins);

    let cancel = match args.timeout_ms {
        Some(ms) => Cancellation::with_timeout(Duration::from_millis(ms)),
        None => Cancellation::new(),
    };

    let engine = ReliabilityEngine::new(config);
    let result = engine
        .simulate_with_cancel(&model, &params, &cancel)
        .map_err(engine_err)?;

    let format = effective_format(global.format, true);
    if print_structured(&result, format)? {
        return Ok(());
    }
    if matches!(format, OutputFormat::Table | OutputFormat::Csv) {
        return print_rows(BIN_HEADERS, &bin_rows(&result), format);
    }

    let policy = match params.pm_interval {
        Some(t) => format!("preventive every {} {}", format_number(t), unit),
        None => "run to failure".to_string(),
    };
    println!(
        "{} Simulated {} runs over {} {} ({})",
        style("✓").green(),
        result.runs,
        format_number(params.time_horizon),
        unit,
        policy
    );
    if let Some(seed) = result.seed {
        println!("   {}", style(format!("seed {}", seed)).dim());
    }

    println!();
    println!("   {}", style("Per Run").bold());
    println!(
        "     Total cost: {} (σ {})",
        format_number(result.total_cost),
        format_number(result.cost_std_dev)
    );
    println!("     Failures:   {}", format_number(result.average_failures));
    println!("     PM events:  {}", format_number(result.average_pm_events));
    println!(
        "     Cost rate:  {} per {}",
        format_number(result.cost_per_unit_time),
        unit
    );

    if args.histogram {
        println!();
        println!("{}", viz::render_histogram(&result.histogram, "Failure times"));
    }

    Ok(())
}
