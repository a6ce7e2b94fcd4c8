//! `relia optimize` command - preventive maintenance interval

use console::style;
use miette::Result;

use crate::cli::commands::ModelArgs;
use crate::cli::helpers::{engine_err, format_number, format_percent};
use crate::cli::output::{effective_format, print_rows, print_structured, Cell};
use crate::cli::viz;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::config::Config;
use crate::core::engine::{MaintenancePlan, ReliabilityEngine};
use crate::core::maintenance::{CostModel, CostParameters, MaintenanceStrategy};

#[derive(clap::Args, Debug)]
pub struct OptimizeArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    /// Cost of one preventive action
    #[arg(long)]
    pub pm_cost: f64,

    /// Cost of one corrective repair
    #[arg(long)]
    pub cm_cost: f64,

    /// Longest interval considered
    #[arg(long)]
    pub horizon: f64,

    /// Minimum acceptable reliability at the service interval (0-1)
    #[arg(long)]
    pub target_reliability: Option<f64>,

    /// Maximum acceptable fraction of time spent down (0-1)
    #[arg(long)]
    pub max_downtime: Option<f64>,

    /// Duration of one preventive action
    #[arg(long, default_value_t = 0.0)]
    pub pm_downtime: f64,

    /// Duration of one corrective repair
    #[arg(long, default_value_t = 0.0)]
    pub cm_downtime: f64,

    /// Number of candidate intervals
    #[arg(long)]
    pub resolution: Option<usize>,

    /// Cost-rate formula
    #[arg(long, value_enum)]
    pub cost_model: Option<CostModel>,

    /// Show the cost curve
    #[arg(long)]
    pub curve: bool,
}

const CURVE_HEADERS: &[&str] = &["interval", "cost_rate"];

fn curve_rows(plan: &MaintenancePlan) -> Vec<Vec<Cell>> {
    plan.optimization
        .cost_curve
        .iter()
        .map(|p| vec![Cell::from(p.interval), Cell::from(p.cost)])
        .collect()
}

pub fn run(args: OptimizeArgs, global: &GlobalOpts) -> Result<()> {
    let config = Config::load();
    let (model, unit) = args.model.model()?;

    let mut costs = CostParameters::new(args.pm_cost, args.cm_cost, args.horizon);
    costs.target_reliability = args.target_reliability;
    costs.max_downtime = args.max_downtime;
    costs.pm_downtime = args.pm_downtime;
    costs.cm_downtime = args.cm_downtime;
    costs.grid_resolution = args.resolution.unwrap_or(config.grid_resolution);
    costs.cost_model = args.cost_model.unwrap_or(config.cost_model);

    let engine = ReliabilityEngine::new(config);
    let plan = engine
        .plan_maintenance(&model, &costs)
        .map_err(engine_err)?;

    let format = effective_format(global.format, true);
    if print_structured(&plan, format)? {
        return Ok(());
    }
    if matches!(format, OutputFormat::Table | OutputFormat::Csv) {
        return print_rows(CURVE_HEADERS, &curve_rows(&plan), format);
    }

    let opt = &plan.optimization;
    let rec = &plan.recommendation;

    println!(
        "{} Optimized over {} intervals up to {} {} ({} cost model)",
        style("⚙").cyan(),
        opt.cost_curve.len(),
        format_number(costs.time_horizon),
        unit,
        opt.cost_model
    );
    println!();
    println!("   {}", style("Cost Optimum").bold());
    println!(
        "     Interval:  {} {}",
        format_number(opt.optimal_interval),
        unit
    );
    println!(
        "     Cost rate: {} per {}",
        format_number(opt.optimal_cost),
        unit
    );

    println!();
    println!("   {}", style("Recommendation").bold());
    let strategy = match rec.strategy {
        MaintenanceStrategy::PeriodicPreventive => style(rec.strategy.to_string()).green(),
        MaintenanceStrategy::RunToFailure => style(rec.strategy.to_string()).yellow(),
    };
    println!("     Strategy:  {}", strategy);
    if let Some(interval) = rec.interval {
        println!("     Interval:  {} {}", format_number(interval), unit);
    }
    if let Some(r) = rec.reliability_at_interval {
        println!("     R(T):      {}", format_percent(r));
    }
    println!(
        "     Cost rate: {} (run-to-failure {}, savings {:.1}%)",
        format_number(rec.policy_cost_rate),
        format_number(rec.run_to_failure_cost_rate),
        rec.cost_savings_percent
    );
    println!(
        "     Downtime:  {}",
        format_percent(rec.expected_downtime_fraction)
    );
    println!("     {}", style(&rec.rationale).dim());

    if rec.reliability_limited_interval.is_some() {
        println!();
        println!(
            "{} Interval shortened to meet the target reliability",
            style("⚠").yellow()
        );
    }
    if rec.downtime_exceeded {
        println!();
        println!(
            "{} Expected downtime {} exceeds the allowed maximum",
            style("⚠").yellow(),
            format_percent(rec.expected_downtime_fraction)
        );
    }

    if args.curve {
        println!();
        println!("{}", viz::render_cost_curve(&opt.cost_curve, &unit.to_string()));
    }

    Ok(())
}
