//! Preventive maintenance interval optimization (age replacement)
//!
//! A unit is serviced at age T or at failure, whichever comes first. For each
//! candidate T on a grid over (0, horizon] the expected cost per unit time is
//! evaluated and the cheapest candidate is returned.
//!
//! Two cost-rate formulas are available (see [`CostModel`]):
//!
//! ```text
//! renewal-reward: C(T) = (Cp * R(T) + Cf * F(T)) / ∫₀ᵀ R(t) dt
//! simple ratio:   C(T) = (Cp * R(T) + Cf * F(T)) / T
//! ```
//!
//! The renewal-reward form divides by the expected cycle length and is the
//! default. The simple ratio divides by the full interval, which overstates
//! cycle length whenever failures cut cycles short, so the two disagree more
//! the further beta is from 1.
//!
//! Turning the optimum into a policy is a separate step, [`recommend`].

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::error::{ensure_non_negative, ensure_positive, EngineError, EngineResult};
use crate::core::weibull::{FailurePattern, WeibullModel};

/// Default number of candidate intervals
pub const DEFAULT_GRID_RESOLUTION: usize = 200;

/// Upper bound on candidate intervals per optimization
pub const MAX_GRID_RESOLUTION: usize = 1_000_000;

/// Simpson panels per grid step when integrating R(t)
const PANELS_PER_STEP: usize = 8;

/// Cost-rate formula
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum CostModel {
    /// Expected cycle cost over expected cycle length
    #[default]
    RenewalReward,
    /// Expected cycle cost over the nominal interval
    SimpleRatio,
}

impl std::fmt::Display for CostModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CostModel::RenewalReward => write!(f, "renewal-reward"),
            CostModel::SimpleRatio => write!(f, "simple-ratio"),
        }
    }
}

impl std::str::FromStr for CostModel {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "renewal-reward" | "renewal" => Ok(CostModel::RenewalReward),
            "simple-ratio" | "simple" => Ok(CostModel::SimpleRatio),
            other => Err(EngineError::invalid(format!(
                "unknown cost model '{}' (expected renewal-reward or simple-ratio)",
                other
            ))),
        }
    }
}

/// Cost and constraint inputs for an optimization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostParameters {
    /// Cost of one preventive maintenance action
    pub pm_cost: f64,

    /// Cost of one corrective action (failure repair)
    pub cm_cost: f64,

    /// Largest interval considered
    pub time_horizon: f64,

    /// Minimum acceptable reliability at the maintenance interval
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_reliability: Option<f64>,

    /// Maximum acceptable fraction of time spent down, in (0, 1]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_downtime: Option<f64>,

    /// Downtime of one preventive action
    #[serde(default)]
    pub pm_downtime: f64,

    /// Downtime of one corrective action
    #[serde(default)]
    pub cm_downtime: f64,

    /// Number of candidate intervals
    #[serde(default = "default_grid_resolution")]
    pub grid_resolution: usize,

    /// Cost-rate formula
    #[serde(default)]
    pub cost_model: CostModel,
}

fn default_grid_resolution() -> usize {
    DEFAULT_GRID_RESOLUTION
}

impl CostParameters {
    pub fn new(pm_cost: f64, cm_cost: f64, time_horizon: f64) -> Self {
        Self {
            pm_cost,
            cm_cost,
            time_horizon,
            target_reliability: None,
            max_downtime: None,
            pm_downtime: 0.0,
            cm_downtime: 0.0,
            grid_resolution: DEFAULT_GRID_RESOLUTION,
            cost_model: CostModel::default(),
        }
    }

    pub fn validate(&self) -> EngineResult<()> {
        ensure_non_negative("pm cost", self.pm_cost)?;
        ensure_positive("cm cost", self.cm_cost)?;
        ensure_positive("time horizon", self.time_horizon)?;
        ensure_non_negative("pm downtime", self.pm_downtime)?;
        ensure_non_negative("cm downtime", self.cm_downtime)?;

        if self.grid_resolution == 0 || self.grid_resolution > MAX_GRID_RESOLUTION {
            return Err(EngineError::invalid(format!(
                "grid resolution must be in 1..={}, got {}",
                MAX_GRID_RESOLUTION, self.grid_resolution
            )));
        }
        if let Some(target) = self.target_reliability {
            if !(target > 0.0 && target < 1.0) {
                return Err(EngineError::invalid(format!(
                    "target reliability must be in (0, 1), got {}",
                    target
                )));
            }
        }
        if let Some(max) = self.max_downtime {
            if !(max > 0.0 && max <= 1.0) {
                return Err(EngineError::invalid(format!(
                    "max downtime is a fraction of time and must be in (0, 1], got {}",
                    max
                )));
            }
        }
        Ok(())
    }
}

/// Cost rate at one candidate interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostPoint {
    pub interval: f64,
    pub cost: f64,
}

/// Outcome of an interval search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceOptimizationResult {
    /// Grid interval with minimum cost rate (smallest on ties)
    pub optimal_interval: f64,

    /// Cost rate at the optimal interval
    pub optimal_cost: f64,

    /// Cost rate for every candidate, ascending by interval
    pub cost_curve: Vec<CostPoint>,

    /// Formula used for the cost rate
    pub cost_model: CostModel,
}

/// ∫ R(t) dt over [a, b] by composite Simpson's rule (`panels` is rounded up to even)
pub fn integrate_reliability(model: &WeibullModel, a: f64, b: f64, panels: usize) -> f64 {
    if b <= a {
        return 0.0;
    }
    let panels = (panels.max(2) + 1) & !1;
    let h = (b - a) / panels as f64;
    let mut sum = model.reliability(a) + model.reliability(b);
    for k in 1..panels {
        let weight = if k % 2 == 1 { 4.0 } else { 2.0 };
        sum += weight * model.reliability(a + k as f64 * h);
    }
    sum * h / 3.0
}

/// Expected length of an age-replacement cycle with interval T: ∫₀ᵀ R(t) dt
pub fn expected_cycle_length(model: &WeibullModel, interval: f64) -> f64 {
    integrate_reliability(model, 0.0, interval, 512)
}

fn expected_cycle_cost(model: &WeibullModel, pm_cost: f64, cm_cost: f64, interval: f64) -> f64 {
    let r = model.reliability(interval);
    pm_cost * r + cm_cost * (1.0 - r)
}

/// Cost per unit time of servicing at `interval`
pub fn cost_rate(
    model: &WeibullModel,
    pm_cost: f64,
    cm_cost: f64,
    interval: f64,
    cost_model: CostModel,
) -> EngineResult<f64> {
    ensure_positive("interval", interval)?;
    let cycle_cost = expected_cycle_cost(model, pm_cost, cm_cost, interval);
    let denominator = match cost_model {
        CostModel::RenewalReward => expected_cycle_length(model, interval),
        CostModel::SimpleRatio => interval,
    };
    Ok(cycle_cost / denominator)
}

/// Search the interval grid for the minimum expected cost rate.
///
/// Candidates are `k * horizon / resolution` for `k = 1..=resolution`. Ties
/// go to the smaller interval. When `pm_cost >= cm_cost` servicing early can
/// never pay off, the cost rate only falls with T, and the horizon itself
/// is returned.
pub fn optimize(
    model: &WeibullModel,
    params: &CostParameters,
) -> EngineResult<MaintenanceOptimizationResult> {
    params.validate()?;

    let resolution = params.grid_resolution;
    let horizon = params.time_horizon;
    let step = horizon / resolution as f64;

    let mut cost_curve = Vec::with_capacity(resolution);
    let mut cycle_length = 0.0;
    let mut previous = 0.0;

    for k in 1..=resolution {
        let interval = if k == resolution {
            horizon
        } else {
            step * k as f64
        };
        let cycle_cost = expected_cycle_cost(model, params.pm_cost, params.cm_cost, interval);
        let cost = match params.cost_model {
            CostModel::RenewalReward => {
                cycle_length += integrate_reliability(model, previous, interval, PANELS_PER_STEP);
                cycle_cost / cycle_length
            }
            CostModel::SimpleRatio => cycle_cost / interval,
        };
        previous = interval;
        cost_curve.push(CostPoint { interval, cost });
    }

    let best = if params.pm_cost >= params.cm_cost {
        cost_curve.last().copied()
    } else {
        select_minimum(&cost_curve)
    }
    .ok_or_else(|| EngineError::invalid("empty interval grid"))?;

    debug!(
        optimal_interval = best.interval,
        optimal_cost = best.cost,
        cost_model = %params.cost_model,
        candidates = resolution,
        "maintenance optimization complete"
    );

    Ok(MaintenanceOptimizationResult {
        optimal_interval: best.interval,
        optimal_cost: best.cost,
        cost_curve,
        cost_model: params.cost_model,
    })
}

/// Cheapest point, first one wins on equal cost
fn select_minimum(points: &[CostPoint]) -> Option<CostPoint> {
    points.iter().copied().fold(None, |best, p| match best {
        Some(b) if b.cost <= p.cost => Some(b),
        _ => Some(p),
    })
}

/// Maintenance strategy label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MaintenanceStrategy {
    /// Repair on failure only
    RunToFailure,
    /// Service at a fixed age
    PeriodicPreventive,
}

impl std::fmt::Display for MaintenanceStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MaintenanceStrategy::RunToFailure => write!(f, "run-to-failure"),
            MaintenanceStrategy::PeriodicPreventive => write!(f, "periodic-preventive"),
        }
    }
}

/// Policy derived from an optimization result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceRecommendation {
    pub strategy: MaintenanceStrategy,

    /// Recommended service interval (None for run-to-failure)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<f64>,

    pub pattern: FailurePattern,

    /// R(interval)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reliability_at_interval: Option<f64>,

    /// Interval tightened to meet the target reliability, when it had to be
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reliability_limited_interval: Option<f64>,

    /// Long-run fraction of time spent down under the recommended policy
    pub expected_downtime_fraction: f64,

    /// Whether that fraction exceeds the configured maximum
    pub downtime_exceeded: bool,

    /// Cost rate of running to failure: Cf / MTBF
    pub run_to_failure_cost_rate: f64,

    /// Cost rate under the recommended policy
    pub policy_cost_rate: f64,

    /// Savings of the policy relative to run-to-failure
    pub cost_savings_percent: f64,

    pub rationale: String,
}

/// Label an optimization result with a strategy.
///
/// | beta    | optimum            | strategy                 |
/// |---------|--------------------|--------------------------|
/// | ≤ 1     | any                | run-to-failure           |
/// | > 1     | at the horizon     | run-to-failure           |
/// | > 1     | inside the horizon | periodic at the optimum  |
///
/// With a target reliability, a periodic interval whose R(T) falls below the
/// target is shortened to R⁻¹(target).
pub fn recommend(
    model: &WeibullModel,
    result: &MaintenanceOptimizationResult,
    params: &CostParameters,
) -> EngineResult<MaintenanceRecommendation> {
    params.validate()?;

    let mtbf = model.mtbf()?;
    let run_to_failure_cost_rate = params.cm_cost / mtbf;
    let run_to_failure_downtime = params.cm_downtime / (mtbf + params.cm_downtime);

    let at_boundary = result.optimal_interval >= params.time_horizon;

    let (strategy, rationale) = if model.beta() <= 1.0 {
        (
            MaintenanceStrategy::RunToFailure,
            format!(
                "beta = {:.3} <= 1: failure rate does not increase with age, servicing early cannot reduce failures",
                model.beta()
            ),
        )
    } else if at_boundary {
        (
            MaintenanceStrategy::RunToFailure,
            "cost rate keeps falling up to the horizon: no preventive interval beats running to failure"
                .to_string(),
        )
    } else {
        (
            MaintenanceStrategy::PeriodicPreventive,
            format!(
                "beta = {:.3} > 1: wear-out, cost rate minimized at {:.4}",
                model.beta(),
                result.optimal_interval
            ),
        )
    };

    if strategy == MaintenanceStrategy::RunToFailure {
        let downtime_exceeded = params
            .max_downtime
            .is_some_and(|max| run_to_failure_downtime > max);
        return Ok(MaintenanceRecommendation {
            strategy,
            interval: None,
            pattern: model.pattern(),
            reliability_at_interval: None,
            reliability_limited_interval: None,
            expected_downtime_fraction: run_to_failure_downtime,
            downtime_exceeded,
            run_to_failure_cost_rate,
            policy_cost_rate: run_to_failure_cost_rate,
            cost_savings_percent: 0.0,
            rationale,
        });
    }

    let mut interval = result.optimal_interval;
    let mut reliability_limited_interval = None;
    let mut rationale = rationale;
    if let Some(target) = params.target_reliability {
        if model.reliability(interval) < target {
            let limited = model.reliable_life(target)?;
            interval = limited;
            reliability_limited_interval = Some(limited);
            rationale.push_str(&format!(
                "; shortened to {:.4} to keep reliability at or above {}",
                limited, target
            ));
        }
    }

    let r = model.reliability(interval);
    let uptime = expected_cycle_length(model, interval);
    let downtime = params.pm_downtime * r + params.cm_downtime * (1.0 - r);
    let expected_downtime_fraction = downtime / (uptime + downtime);
    let downtime_exceeded = params
        .max_downtime
        .is_some_and(|max| expected_downtime_fraction > max);

    let policy_cost_rate = cost_rate(
        model,
        params.pm_cost,
        params.cm_cost,
        interval,
        CostModel::RenewalReward,
    )?;
    let cost_savings_percent =
        (run_to_failure_cost_rate - policy_cost_rate) / run_to_failure_cost_rate * 100.0;

    Ok(MaintenanceRecommendation {
        strategy,
        interval: Some(interval),
        pattern: model.pattern(),
        reliability_at_interval: Some(r),
        reliability_limited_interval,
        expected_downtime_fraction,
        downtime_exceeded,
        run_to_failure_cost_rate,
        policy_cost_rate,
        cost_savings_percent,
        rationale,
    })
}
