//! Reliability engine - the four operations offered to request handlers
//!
//! - [`ReliabilityEngine::fit_weibull`]: failure records -> fitted parameters
//! - [`ReliabilityEngine::analyze_weibull`]: parameters -> curves and MTBF
//! - [`ReliabilityEngine::optimize_maintenance`]: model + costs -> optimal interval
//! - [`ReliabilityEngine::simulate`]: model + policy -> Monte Carlo estimate
//!
//! The engine holds only configuration. Every call is independent and safe
//! to run concurrently with any other.

use serde::{Deserialize, Serialize};

use crate::core::config::Config;
use crate::core::error::{ensure_positive, EngineResult};
use crate::core::fit::{self, WeibullFitResult};
use crate::core::history::FailureHistory;
use crate::core::maintenance::{
    self, CostParameters, MaintenanceOptimizationResult, MaintenanceRecommendation,
};
use crate::core::simulation::{self, Cancellation, SimulationParameters, SimulationResult};
use crate::core::weibull::{CurvePoint, FailurePattern, WeibullModel, WeibullParameters};
use crate::entities::failure::{FailureRecord, FailureSample, SampleBasis};

/// B-lives reported when the caller asks for none
pub const DEFAULT_B_LIVES: [f64; 3] = [1.0, 10.0, 50.0];

/// Time at which a given percentage of units has failed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BLife {
    pub percentage: f64,
    pub time: f64,
}

/// Options for [`ReliabilityEngine::analyze_weibull`]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnalysisOptions {
    /// End of the curves; defaults to twice the larger of eta and MTBF
    pub time_horizon: Option<f64>,

    /// Samples per curve; defaults to the configured value
    pub points: Option<usize>,

    /// B-life percentages; defaults to [`DEFAULT_B_LIVES`]
    pub b_lives: Vec<f64>,
}

/// Everything derived from one set of Weibull parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeibullAnalysis {
    pub parameters: WeibullParameters,
    pub mtbf: f64,
    pub pattern: FailurePattern,
    pub time_horizon: f64,
    pub b_lives: Vec<BLife>,
    pub reliability_curve: Vec<CurvePoint>,
    pub failure_rate_curve: Vec<CurvePoint>,
    pub cumulative_failure_probability: Vec<CurvePoint>,
}

/// Optimization result together with its policy label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenancePlan {
    pub optimization: MaintenanceOptimizationResult,
    pub recommendation: MaintenanceRecommendation,
}

/// Stateless facade over the numerical modules
#[derive(Debug, Clone, Default)]
pub struct ReliabilityEngine {
    config: Config,
}

impl ReliabilityEngine {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Fit Weibull parameters to failure records on one time basis
    pub fn fit_weibull(
        &self,
        records: &[FailureRecord],
        use_operating_hours: bool,
    ) -> EngineResult<WeibullFitResult> {
        let sample = FailureSample::from_records(records, SampleBasis::from_flag(use_operating_hours));
        self.fit_sample(&sample)
    }

    /// Fit an already extracted sample
    pub fn fit_sample(&self, sample: &FailureSample) -> EngineResult<WeibullFitResult> {
        fit::fit_weibull(sample, self.config.min_fit_samples)
    }

    /// Fit the failure history of one asset
    pub fn fit_asset(
        &self,
        history: &dyn FailureHistory,
        asset_id: &str,
        use_operating_hours: bool,
    ) -> EngineResult<WeibullFitResult> {
        let records = history.failure_records(asset_id)?;
        self.fit_weibull(&records, use_operating_hours)
    }

    /// Stored parameters of an asset, used when no explicit ones are given
    pub fn asset_parameters(
        &self,
        history: &dyn FailureHistory,
        asset_id: &str,
    ) -> EngineResult<WeibullParameters> {
        history.asset(asset_id)?.require_parameters()
    }

    /// Curves, MTBF, B-lives and failure pattern for a parameter set
    pub fn analyze_weibull(
        &self,
        params: &WeibullParameters,
        options: &AnalysisOptions,
    ) -> EngineResult<WeibullAnalysis> {
        let model = params.model()?;
        let mtbf = model.mtbf()?;

        let time_horizon = match options.time_horizon {
            Some(h) => ensure_positive("time horizon", h)?,
            None => 2.0 * model.characteristic_life().max(mtbf),
        };
        let points = options.points.unwrap_or(self.config.curve_points);

        let percentages: &[f64] = if options.b_lives.is_empty() {
            &DEFAULT_B_LIVES
        } else {
            &options.b_lives
        };
        let b_lives = percentages
            .iter()
            .map(|&percentage| {
                Ok(BLife {
                    percentage,
                    time: model.b_life(percentage)?,
                })
            })
            .collect::<EngineResult<Vec<_>>>()?;

        Ok(WeibullAnalysis {
            parameters: *params,
            mtbf,
            pattern: model.pattern(),
            time_horizon,
            b_lives,
            reliability_curve: model.reliability_curve(time_horizon, points)?.collect(),
            failure_rate_curve: model.failure_rate_curve(time_horizon, points)?.collect(),
            cumulative_failure_probability: model.cdf_curve(time_horizon, points)?.collect(),
        })
    }

    /// Minimum-cost preventive maintenance interval
    pub fn optimize_maintenance(
        &self,
        model: &WeibullModel,
        costs: &CostParameters,
    ) -> EngineResult<MaintenanceOptimizationResult> {
        maintenance::optimize(model, costs)
    }

    /// Optimize and label the result with a maintenance strategy
    pub fn plan_maintenance(
        &self,
        model: &WeibullModel,
        costs: &CostParameters,
    ) -> EngineResult<MaintenancePlan> {
        let optimization = maintenance::optimize(model, costs)?;
        let recommendation = maintenance::recommend(model, &optimization, costs)?;
        Ok(MaintenancePlan {
            optimization,
            recommendation,
        })
    }

    /// Monte Carlo estimate of cost and failures, bounded by the configured limits
    pub fn simulate(
        &self,
        model: &WeibullModel,
        params: &SimulationParameters,
    ) -> EngineResult<SimulationResult> {
        self.simulate_with_cancel(model, params, &Cancellation::new())
    }

    pub fn simulate_with_cancel(
        &self,
        model: &WeibullModel,
        params: &SimulationParameters,
        cancel: &Cancellation,
    ) -> EngineResult<SimulationResult> {
        let mut bounded = params.clone();
        bounded.max_runs = bounded.max_runs.min(self.config.max_runs);
        bounded.max_events_per_run = bounded.max_events_per_run.min(self.config.max_events_per_run);
        simulation::simulate_with_cancel(model, &bounded, cancel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::EngineError;
    use crate::core::history::MemoryHistory;
    use crate::core::weibull::TimeUnit;
    use crate::entities::asset::Asset;
    use chrono::NaiveDate;

    fn records() -> Vec<FailureRecord> {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        [410.0, 650.0, 820.0, 1010.0, 1240.0, 1500.0]
            .iter()
            .enumerate()
            .map(|(i, &hours)| {
                FailureRecord::new(start + chrono::Duration::days(30 * i as i64))
                    .with_operating_hours(hours)
            })
            .collect()
    }

    #[test]
    fn test_fit_weibull_operating_hours() {
        let engine = ReliabilityEngine::default();
        let fit = engine.fit_weibull(&records(), true).unwrap();
        assert_eq!(fit.sample_size, 6);
        assert_eq!(fit.time_unit, TimeUnit::Hours);
        assert!(fit.beta > 1.0);
    }

    #[test]
    fn test_fit_weibull_calendar_days() {
        // Dates are 30 days apart, so every derived gap is identical
        let engine = ReliabilityEngine::default();
        let err = engine.fit_weibull(&records(), false).unwrap_err();
        assert!(matches!(err, EngineError::DegenerateFit { .. }));
    }

    #[test]
    fn test_fit_respects_configured_minimum() {
        let mut config = Config::default();
        config.min_fit_samples = 10;
        let engine = ReliabilityEngine::new(config);
        assert!(matches!(
            engine.fit_weibull(&records(), true),
            Err(EngineError::InsufficientData { required: 10, actual: 6 })
        ));
    }

    #[test]
    fn test_analyze_weibull() {
        let engine = ReliabilityEngine::default();
        let params = WeibullParameters::new(2.0, 100.0, TimeUnit::Hours);
        let analysis = engine
            .analyze_weibull(&params, &AnalysisOptions::default())
            .unwrap();

        assert!((analysis.mtbf - 88.6227).abs() < 1e-3);
        assert_eq!(analysis.pattern, FailurePattern::WearOut);
        assert_eq!(analysis.time_horizon, 200.0);
        assert_eq!(analysis.reliability_curve.len(), engine.config().curve_points);
        assert_eq!(analysis.b_lives.len(), DEFAULT_B_LIVES.len());
        for (r, f) in analysis
            .reliability_curve
            .iter()
            .zip(&analysis.cumulative_failure_probability)
        {
            assert!((r.value + f.value - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_analyze_rejects_invalid_parameters() {
        let engine = ReliabilityEngine::default();
        let params = WeibullParameters::new(-1.0, 100.0, TimeUnit::Hours);
        assert!(matches!(
            engine.analyze_weibull(&params, &AnalysisOptions::default()),
            Err(EngineError::InvalidArgument { .. })
        ));

        let params = WeibullParameters::new(1.0, 100.0, TimeUnit::Hours);
        let options = AnalysisOptions {
            b_lives: vec![100.0],
            ..Default::default()
        };
        assert!(engine.analyze_weibull(&params, &options).is_err());
    }

    #[test]
    fn test_asset_defaults_feed_optimizer_and_simulator() {
        let mut asset = Asset::new("F-9", "Fan");
        asset.weibull_beta = Some(2.0);
        asset.weibull_eta = Some(1000.0);
        let history = MemoryHistory::new(vec![asset]);

        let engine = ReliabilityEngine::default();
        let model = engine.asset_parameters(&history, "F-9").unwrap().model().unwrap();

        let plan = engine
            .plan_maintenance(&model, &CostParameters::new(100.0, 1000.0, 3000.0))
            .unwrap();
        let interval = plan.recommendation.interval.unwrap();

        let sim = SimulationParameters::new(400, 20_000.0, 100.0, 1000.0)
            .with_pm_interval(interval)
            .with_seed(42);
        let with_pm = engine.simulate(&model, &sim).unwrap();
        let without = engine
            .simulate(&model, &SimulationParameters::new(400, 20_000.0, 100.0, 1000.0).with_seed(42))
            .unwrap();

        // The analytical optimum should also be cheaper in simulation
        assert!(with_pm.total_cost < without.total_cost);
    }

    #[test]
    fn test_configured_run_cap_applies() {
        let mut config = Config::default();
        config.max_runs = 50;
        let engine = ReliabilityEngine::new(config);
        let model = WeibullModel::new(2.0, 100.0).unwrap();
        let params = SimulationParameters::new(51, 100.0, 1.0, 1.0).with_seed(1);
        assert!(engine.simulate(&model, &params).is_err());
    }
}
