//! Monte Carlo simulation of the failure/renewal process
//!
//! Each run walks a timeline from 0 to the horizon. A cycle ends with a
//! failure (Weibull life drawn by inverse-CDF sampling) or, when a PM
//! interval is set, with preventive maintenance at that age, whichever comes
//! first. Either event renews the unit to age zero and accrues its cost.
//!
//! # Reproducibility
//!
//! With `rng_seed = Some(seed)` a call is fully reproducible: the same inputs
//! give a bit-identical [`SimulationResult`]. With `None` every call seeds
//! from OS entropy and results vary between calls.
//!
//! # Cancellation
//!
//! [`Cancellation`] is checked between runs, never inside one.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::error::{ensure_non_negative, ensure_positive, EngineError, EngineResult};
use crate::core::weibull::WeibullModel;

/// Default cap on the number of runs per call
pub const DEFAULT_MAX_RUNS: usize = 10_000;

/// Default cap on failure/PM events inside a single run
pub const DEFAULT_MAX_EVENTS_PER_RUN: usize = 1_000_000;

/// Default number of histogram bins
pub const DEFAULT_HISTOGRAM_BINS: usize = 20;

/// Upper bound on histogram bins
pub const MAX_HISTOGRAM_BINS: usize = 100_000;

/// Simulation inputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationParameters {
    /// Independent runs to average over
    pub number_of_runs: usize,

    /// Length of each simulated timeline
    pub time_horizon: f64,

    /// Preventive maintenance age, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pm_interval: Option<f64>,

    /// Cost of one preventive action
    pub pm_cost: f64,

    /// Cost of one failure
    pub failure_cost: f64,

    /// Seed for a reproducible result
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rng_seed: Option<u64>,

    /// Equal-width bins over [0, horizon] for failure times
    #[serde(default = "default_histogram_bins")]
    pub histogram_bins: usize,

    /// Upper bound on `number_of_runs`
    #[serde(default = "default_max_runs")]
    pub max_runs: usize,

    /// Upper bound on events inside one run
    #[serde(default = "default_max_events")]
    pub max_events_per_run: usize,
}

fn default_histogram_bins() -> usize {
    DEFAULT_HISTOGRAM_BINS
}

fn default_max_runs() -> usize {
    DEFAULT_MAX_RUNS
}

fn default_max_events() -> usize {
    DEFAULT_MAX_EVENTS_PER_RUN
}

impl SimulationParameters {
    pub fn new(number_of_runs: usize, time_horizon: f64, pm_cost: f64, failure_cost: f64) -> Self {
        Self {
            number_of_runs,
            time_horizon,
            pm_interval: None,
            pm_cost,
            failure_cost,
            rng_seed: None,
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
            max_runs: DEFAULT_MAX_RUNS,
            max_events_per_run: DEFAULT_MAX_EVENTS_PER_RUN,
        }
    }

    pub fn with_pm_interval(mut self, interval: f64) -> Self {
        self.pm_interval = Some(interval);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.number_of_runs == 0 {
            return Err(EngineError::invalid("number of runs must be at least 1"));
        }
        if self.number_of_runs > self.max_runs {
            return Err(EngineError::invalid(format!(
                "number of runs {} exceeds the limit of {}",
                self.number_of_runs, self.max_runs
            )));
        }
        ensure_positive("time horizon", self.time_horizon)?;
        if let Some(interval) = self.pm_interval {
            ensure_positive("pm interval", interval)?;
        }
        ensure_non_negative("pm cost", self.pm_cost)?;
        ensure_non_negative("failure cost", self.failure_cost)?;
        if !(1..=MAX_HISTOGRAM_BINS).contains(&self.histogram_bins) {
            return Err(EngineError::invalid(format!(
                "histogram needs between 1 and {} bins, got {}",
                MAX_HISTOGRAM_BINS, self.histogram_bins
            )));
        }
        if self.max_events_per_run == 0 {
            return Err(EngineError::invalid("max events per run must be at least 1"));
        }
        Ok(())
    }
}

/// Count of failures whose absolute time fell in [start, end)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: u64,
}

/// Aggregate over all runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Mean total cost per run
    pub total_cost: f64,

    /// Mean failures per run
    pub average_failures: f64,

    /// Mean preventive actions per run
    pub average_pm_events: f64,

    /// Standard deviation of total cost across runs
    pub cost_std_dev: f64,

    /// Mean total cost divided by the horizon
    pub cost_per_unit_time: f64,

    /// Runs performed
    pub runs: usize,

    /// Seed used, when the caller supplied one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Failure times across all runs
    pub histogram: Vec<HistogramBin>,
}

/// Cooperative cancellation for long simulations.
///
/// Clones share the same flag, so a handle kept by the caller can stop a
/// simulation running elsewhere.
#[derive(Debug, Clone, Default)]
pub struct Cancellation {
    flag: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl Cancellation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trip automatically once `timeout` has elapsed from now
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            deadline: Instant::now().checked_add(timeout),
        }
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed) || self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

/// Per-run tallies
#[derive(Debug, Default)]
struct RunOutcome {
    cost: f64,
    failures: u64,
    pm_events: u64,
}

/// Simulate without a cancellation handle
pub fn simulate(model: &WeibullModel, params: &SimulationParameters) -> EngineResult<SimulationResult> {
    simulate_with_cancel(model, params, &Cancellation::new())
}

/// Simulate, checking `cancel` before each run.
///
/// # Errors
/// - [`EngineError::InvalidArgument`] for zero or too many runs, a
///   non-positive horizon or PM interval, negative costs, or a run that
///   exceeds the event limit
/// - [`EngineError::Cancelled`] when `cancel` trips
pub fn simulate_with_cancel(
    model: &WeibullModel,
    params: &SimulationParameters,
    cancel: &Cancellation,
) -> EngineResult<SimulationResult> {
    params.validate()?;

    let started = Instant::now();
    let mut rng = match params.rng_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let bins = params.histogram_bins;
    let bin_width = params.time_horizon / bins as f64;
    let mut counts = vec![0u64; bins];

    let mut costs = Vec::with_capacity(params.number_of_runs);
    let mut total_failures: u64 = 0;
    let mut total_pm: u64 = 0;

    for run in 0..params.number_of_runs {
        if cancel.is_cancelled() {
            warn!(completed_runs = run, "simulation cancelled");
            return Err(EngineError::Cancelled {
                completed_runs: run,
            });
        }

        let outcome = simulate_run(model, params, &mut rng, |failure_time| {
            let bin = ((failure_time / bin_width) as usize).min(bins - 1);
            counts[bin] += 1;
        })?;

        costs.push(outcome.cost);
        total_failures += outcome.failures;
        total_pm += outcome.pm_events;
    }

    let runs = params.number_of_runs as f64;
    let total_cost = costs.iter().sum::<f64>() / runs;
    let variance = costs.iter().map(|c| (c - total_cost).powi(2)).sum::<f64>() / runs;

    let histogram = counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            start: i as f64 * bin_width,
            end: if i + 1 == bins {
                params.time_horizon
            } else {
                (i + 1) as f64 * bin_width
            },
            count,
        })
        .collect();

    debug!(
        runs = params.number_of_runs,
        seed = ?params.rng_seed,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "simulation complete"
    );

    Ok(SimulationResult {
        total_cost,
        average_failures: total_failures as f64 / runs,
        average_pm_events: total_pm as f64 / runs,
        cost_std_dev: variance.sqrt(),
        cost_per_unit_time: total_cost / params.time_horizon,
        runs: params.number_of_runs,
        seed: params.rng_seed,
        histogram,
    })
}

/// One timeline from 0 to the horizon
fn simulate_run<R: Rng>(
    model: &WeibullModel,
    params: &SimulationParameters,
    rng: &mut R,
    mut on_failure: impl FnMut(f64),
) -> EngineResult<RunOutcome> {
    let mut outcome = RunOutcome::default();
    let mut clock = 0.0;
    let mut events = 0usize;

    loop {
        let life = model.sample_life(rng.random::<f64>());

        let (cycle, failed) = match params.pm_interval {
            Some(pm) if pm <= life => (pm, false),
            _ => (life, true),
        };

        clock += cycle;
        if clock > params.time_horizon {
            break;
        }

        if failed {
            outcome.failures += 1;
            outcome.cost += params.failure_cost;
            on_failure(clock);
        } else {
            outcome.pm_events += 1;
            outcome.cost += params.pm_cost;
        }

        events += 1;
        if events > params.max_events_per_run {
            return Err(EngineError::invalid(format!(
                "a single run exceeded {} events; the horizon is too long for this model",
                params.max_events_per_run
            )));
        }
    }

    Ok(outcome)
}
