//! `relia analyze` command - curves, MTBF and B-lives of a Weibull model

use console::style;
use miette::Result;

use crate::cli::commands::ModelArgs;
use crate::cli::helpers::{engine_err, format_number, format_percent};
use crate::cli::output::{effective_format, print_rows, print_structured, Cell};
use crate::cli::viz;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::config::Config;
use crate::core::engine::{AnalysisOptions, ReliabilityEngine, WeibullAnalysis};

#[derive(clap::Args, Debug)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    /// End of the curves (default: twice the larger of eta and MTBF)
    #[arg(long)]
    pub horizon: Option<f64>,

    /// Samples per curve
    #[arg(long)]
    pub points: Option<usize>,

    /// B-life percentages to report, comma separated
    #[arg(long, value_delimiter = ',', value_name = "PCT")]
    pub b_life: Vec<f64>,

    /// Render R(t) and h(t) charts
    #[arg(long)]
    pub plot: bool,

    /// Dump the three curves as CSV
    #[arg(long)]
    pub csv: bool,
}

const CURVE_HEADERS: &[&str] = &["time", "reliability", "failure_rate", "cumulative_failure"];

fn curve_rows(analysis: &WeibullAnalysis) -> Vec<Vec<Cell>> {
    analysis
        .reliability_curve
        .iter()
        .zip(&analysis.failure_rate_curve)
        .zip(&analysis.cumulative_failure_probability)
        .map(|((r, h), f)| {
            vec![
                Cell::from(r.time),
                Cell::from(r.value),
                Cell::from(h.value),
                Cell::from(f.value),
            ]
        })
        .collect()
}

pub fn run(args: AnalyzeArgs, global: &GlobalOpts) -> Result<()> {
    let engine = ReliabilityEngine::new(Config::load());
    let params = args.model.parameters()?;
    let options = AnalysisOptions {
        time_horizon: args.horizon,
        points: args.points,
        b_lives: args.b_life.clone(),
    };
    let analysis = engine
        .analyze_weibull(&params, &options)
        .map_err(engine_err)?;

    let format = if args.csv {
        OutputFormat::Csv
    } else {
        effective_format(global.format, true)
    };
    if print_structured(&analysis, format)? {
        return Ok(());
    }
    if matches!(format, OutputFormat::Table | OutputFormat::Csv) {
        return print_rows(CURVE_HEADERS, &curve_rows(&analysis), format);
    }

    let unit = params.time_unit;
    println!(
        "{} Weibull model β = {}, η = {} {}",
        style("⚙").cyan(),
        format_number(params.beta),
        format_number(params.eta),
        unit
    );
    println!();
    println!("   {}", style("Life Characteristics").bold());
    println!("     MTBF:    {} {}", format_number(analysis.mtbf), unit);
    println!(
        "     Pattern: {} ({})",
        style(analysis.pattern).yellow(),
        analysis.pattern.description()
    );
    for b in &analysis.b_lives {
        println!(
            "     {:<8} {} {}",
            format!("B{}:", b.percentage),
            format_number(b.time),
            unit
        );
    }

    // Reliability at a few landmarks along the horizon
    println!();
    println!("   {}", style("Reliability").bold());
    let curve = &analysis.reliability_curve;
    for frac in [0.25, 0.5, 0.75, 1.0] {
        let idx = ((curve.len() - 1) as f64 * frac).round() as usize;
        if let Some(p) = curve.get(idx) {
            println!(
                "     R({}) = {}",
                format_number(p.time),
                format_percent(p.value)
            );
        }
    }

    if args.plot {
        println!();
        println!(
            "{}",
            viz::render_curve("Reliability R(t)", &analysis.reliability_curve, &unit.to_string())
        );
        println!();
        println!(
            "{}",
            viz::render_curve(
                "Failure rate h(t)",
                &analysis.failure_rate_curve,
                &unit.to_string()
            )
        );
    }

    Ok(())
}
