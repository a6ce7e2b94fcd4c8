//! `relia fit` command - Weibull fit of a failure history

use std::path::PathBuf;

use console::style;
use miette::Result;

use crate::cli::helpers::{engine_err, format_number};
use crate::cli::output::{effective_format, print_rows, print_structured, Cell};
use crate::cli::viz;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::config::Config;
use crate::core::engine::ReliabilityEngine;
use crate::core::fit::WeibullFitResult;
use crate::core::history::load_failure_records;
use crate::entities::failure::{FailureSample, SampleBasis};

#[derive(clap::Args, Debug)]
pub struct FitArgs {
    /// Failure records (CSV with a header row, or YAML)
    pub file: PathBuf,

    /// Use calendar days between failures instead of operating hours
    #[arg(long)]
    pub days: bool,

    /// Minimum number of usable failure times
    #[arg(long, value_name = "N")]
    pub min_samples: Option<usize>,

    /// Draw the Weibull probability plot
    #[arg(long)]
    pub plot: bool,
}

const POINT_HEADERS: &[&str] = &["rank", "time", "median_rank", "adjusted"];

fn point_rows(fit: &WeibullFitResult) -> Vec<Vec<Cell>> {
    fit.data_points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            vec![
                Cell::from((i + 1) as u64),
                Cell::from(p.time),
                Cell::from(p.median_rank),
                Cell::from(p.adjusted),
            ]
        })
        .collect()
}

pub fn run(args: FitArgs, global: &GlobalOpts) -> Result<()> {
    let mut config = Config::load();
    if let Some(n) = args.min_samples {
        config.min_fit_samples = n;
    }
    let engine = ReliabilityEngine::new(config);

    let records = load_failure_records(&args.file).map_err(engine_err)?;
    let basis = SampleBasis::from_flag(!args.days);
    let sample = FailureSample::from_records(&records, basis);
    let fit = engine.fit_sample(&sample).map_err(engine_err)?;

    let format = effective_format(global.format, true);
    if print_structured(&fit, format)? {
        return Ok(());
    }
    if matches!(format, OutputFormat::Table | OutputFormat::Csv) {
        return print_rows(POINT_HEADERS, &point_rows(&fit), format);
    }

    let model = fit.model().map_err(engine_err)?;
    let mtbf = model.mtbf().map_err(engine_err)?;

    println!(
        "{} Fitted {} failure times ({}) from {}",
        style("✓").green(),
        fit.sample_size,
        basis,
        style(args.file.display()).cyan()
    );
    if records.len() > fit.sample_size {
        println!(
            "{} {} record(s) had no usable {} value and were skipped",
            style("⚠").yellow(),
            records.len() - fit.sample_size,
            basis
        );
    }

    println!();
    println!("   {}", style("Weibull Parameters").bold());
    println!("     Shape β: {}", format_number(fit.beta));
    println!("     Scale η: {} {}", format_number(fit.eta), fit.time_unit);
    println!("     R²:      {:.4}", fit.r2);
    println!(
        "     Pattern: {} ({})",
        style(fit.pattern()).yellow(),
        fit.pattern().description()
    );
    println!("     MTBF:    {} {}", format_number(mtbf), fit.time_unit);

    if fit.r2 < 0.9 {
        println!();
        println!(
            "{} Poor linear fit (R² = {:.3}); the data may not follow a single Weibull mode",
            style("⚠").yellow(),
            fit.r2
        );
    }
    if fit.data_points.iter().any(|p| p.adjusted) {
        println!(
            "{} Tied failure times were ranked sequentially",
            style("⚠").yellow()
        );
    }

    println!();
    print_rows(POINT_HEADERS, &point_rows(&fit), OutputFormat::Table)?;

    if args.plot {
        println!();
        println!("{}", viz::render_probability_plot(&fit));
    }

    Ok(())
}
