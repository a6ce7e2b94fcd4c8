//! Weibull model - closed-form reliability metrics over (beta, eta)
//!
//! Given shape beta > 0 and scale eta > 0:
//! - Reliability: R(t) = exp(-(t/eta)^beta)
//! - Failure rate: h(t) = (beta/eta) * (t/eta)^(beta-1)
//! - CDF: F(t) = 1 - R(t)
//! - MTBF: eta * Γ(1 + 1/beta)
//!
//! All functions are pure. Curves are lazy, finite and restartable: cloning a
//! [`Curve`] (or asking the model for a new one) replays the same samples.

use serde::{Deserialize, Serialize};

use crate::core::error::{ensure_positive, EngineError, EngineResult};
use crate::core::gamma::gamma;

/// Shape below which failures are classified as early-life
pub const EARLY_LIFE_MAX_BETA: f64 = 0.95;

/// Shape above which failures are classified as wear-out
pub const WEAR_OUT_MIN_BETA: f64 = 1.05;

/// Value substituted for an infinite failure rate in curve output
pub const RATE_CEILING: f64 = f64::MAX;

/// Upper bound on samples per generated curve
pub const MAX_CURVE_POINTS: usize = 1_000_000;

/// Time unit of a Weibull scale parameter
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    #[default]
    Hours,
    Days,
    Months,
    Years,
}

impl TimeUnit {
    /// Number of hours in one unit (months and years use the Julian year)
    pub fn hours_per_unit(&self) -> f64 {
        match self {
            TimeUnit::Hours => 1.0,
            TimeUnit::Days => 24.0,
            TimeUnit::Months => 730.5,
            TimeUnit::Years => 8766.0,
        }
    }

    /// Convert a duration expressed in `self` into `to`
    pub fn convert(&self, value: f64, to: TimeUnit) -> f64 {
        value * self.hours_per_unit() / to.hours_per_unit()
    }
}

impl std::fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeUnit::Hours => write!(f, "hours"),
            TimeUnit::Days => write!(f, "days"),
            TimeUnit::Months => write!(f, "months"),
            TimeUnit::Years => write!(f, "years"),
        }
    }
}

/// Weibull parameters as stored on an asset or supplied by a caller
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeibullParameters {
    /// Shape parameter (beta)
    pub beta: f64,

    /// Scale parameter (eta), a.k.a. characteristic life
    pub eta: f64,

    /// Unit of eta
    #[serde(default)]
    pub time_unit: TimeUnit,
}

impl WeibullParameters {
    pub fn new(beta: f64, eta: f64, time_unit: TimeUnit) -> Self {
        Self {
            beta,
            eta,
            time_unit,
        }
    }

    /// Validate and build the model
    pub fn model(&self) -> EngineResult<WeibullModel> {
        WeibullModel::new(self.beta, self.eta)
    }
}

/// Failure pattern implied by the shape parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePattern {
    /// Decreasing failure rate (infant mortality)
    EarlyLife,
    /// Roughly constant failure rate
    Random,
    /// Increasing failure rate
    WearOut,
}

impl FailurePattern {
    /// Classify a shape parameter.
    ///
    /// The band [0.95, 1.05] is treated as random failures. The boundaries
    /// are fixed constants so that every report classifies the same beta the
    /// same way.
    pub fn classify(beta: f64) -> Self {
        if beta < EARLY_LIFE_MAX_BETA {
            FailurePattern::EarlyLife
        } else if beta <= WEAR_OUT_MIN_BETA {
            FailurePattern::Random
        } else {
            FailurePattern::WearOut
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            FailurePattern::EarlyLife => {
                "Decreasing failure rate: infant mortality, burn-in or installation defects"
            }
            FailurePattern::Random => {
                "Constant failure rate: failures independent of age, preventive replacement gains nothing"
            }
            FailurePattern::WearOut => {
                "Increasing failure rate: aging or wear, preventive maintenance can pay off"
            }
        }
    }
}

impl std::fmt::Display for FailurePattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailurePattern::EarlyLife => write!(f, "early-life"),
            FailurePattern::Random => write!(f, "random"),
            FailurePattern::WearOut => write!(f, "wear-out"),
        }
    }
}

/// Validated two-parameter Weibull distribution
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeibullModel {
    beta: f64,
    eta: f64,
}

impl WeibullModel {
    /// Create a model; both parameters must be finite and strictly positive.
    ///
    /// ```
    /// use relia::core::weibull::WeibullModel;
    /// let model = WeibullModel::new(2.0, 100.0).unwrap();
    /// assert!((model.mtbf().unwrap() - 88.6227).abs() < 1e-3);
    /// assert!(WeibullModel::new(0.0, 100.0).is_err());
    /// ```
    pub fn new(beta: f64, eta: f64) -> EngineResult<Self> {
        let beta = ensure_positive("beta", beta)?;
        let eta = ensure_positive("eta", eta)?;
        Ok(Self { beta, eta })
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }

    pub fn eta(&self) -> f64 {
        self.eta
    }

    /// R(eta) = e^-1 for every shape
    pub fn characteristic_life(&self) -> f64 {
        self.eta
    }

    pub fn pattern(&self) -> FailurePattern {
        FailurePattern::classify(self.beta)
    }

    /// R(t) = exp(-(t/eta)^beta), with R(t) = 1 for t ≤ 0
    pub fn reliability(&self, t: f64) -> f64 {
        if t <= 0.0 {
            return 1.0;
        }
        (-(t / self.eta).powf(self.beta)).exp()
    }

    /// F(t) = 1 - R(t)
    pub fn cdf(&self, t: f64) -> f64 {
        1.0 - self.reliability(t)
    }

    /// Instantaneous failure rate h(t).
    ///
    /// At t = 0 the formula is singular for beta < 1, so the limits are
    /// returned explicitly:
    /// - beta > 1: 0
    /// - beta = 1: 1/eta
    /// - beta < 1: `f64::INFINITY`
    ///
    /// Negative times return 0. Curve generators saturate the infinity to
    /// [`RATE_CEILING`].
    pub fn failure_rate(&self, t: f64) -> f64 {
        if t < 0.0 {
            return 0.0;
        }
        if t == 0.0 {
            return if self.beta > 1.0 {
                0.0
            } else if self.beta == 1.0 {
                1.0 / self.eta
            } else {
                f64::INFINITY
            };
        }
        (self.beta / self.eta) * (t / self.eta).powf(self.beta - 1.0)
    }

    /// Mean time between failures: eta * Γ(1 + 1/beta)
    ///
    /// Very small shapes (beta below about 0.006) overflow Γ and are
    /// rejected rather than reported as an infinite MTBF.
    pub fn mtbf(&self) -> EngineResult<f64> {
        let mtbf = self.eta * gamma(1.0 + 1.0 / self.beta)?;
        self.finite_time("MTBF", mtbf)
    }

    fn finite_time(&self, what: &str, value: f64) -> EngineResult<f64> {
        if value.is_finite() {
            Ok(value)
        } else {
            Err(EngineError::invalid(format!(
                "{} overflows for beta = {} (shape too small)",
                what, self.beta
            )))
        }
    }

    /// Inverse CDF: the time by which a fraction `p` ∈ [0, 1) has failed
    pub fn quantile(&self, p: f64) -> EngineResult<f64> {
        if !(0.0..1.0).contains(&p) {
            return Err(EngineError::invalid(format!(
                "probability must be in [0, 1), got {}",
                p
            )));
        }
        let t = self.eta * (-(1.0 - p).ln()).powf(1.0 / self.beta);
        self.finite_time("quantile", t)
    }

    /// B-life: time by which `percentage` percent of the population has failed.
    ///
    /// `percentage` must lie strictly inside (0, 100).
    pub fn b_life(&self, percentage: f64) -> EngineResult<f64> {
        if !(percentage > 0.0 && percentage < 100.0) {
            return Err(EngineError::invalid(format!(
                "B-life percentage must be in (0, 100), got {}",
                percentage
            )));
        }
        self.quantile(percentage / 100.0)
    }

    /// Time at which reliability drops to `target` ∈ (0, 1)
    pub fn reliable_life(&self, target: f64) -> EngineResult<f64> {
        if !(target > 0.0 && target < 1.0) {
            return Err(EngineError::invalid(format!(
                "target reliability must be in (0, 1), got {}",
                target
            )));
        }
        let t = self.eta * (-target.ln()).powf(1.0 / self.beta);
        self.finite_time("reliable life", t)
    }

    /// Probability of surviving `mission` more time units given survival to `age`
    pub fn conditional_reliability(&self, age: f64, mission: f64) -> f64 {
        let survived = self.reliability(age);
        if survived <= 0.0 {
            return 0.0;
        }
        (self.reliability(age + mission) / survived).min(1.0)
    }

    /// Draw a life by inverse-CDF sampling from `u` uniform in [0, 1)
    pub(crate) fn sample_life(&self, u: f64) -> f64 {
        self.eta * (-(1.0 - u).ln()).powf(1.0 / self.beta)
    }

    pub fn reliability_curve(&self, time_horizon: f64, points: usize) -> EngineResult<Curve> {
        Curve::new(*self, CurveKind::Reliability, time_horizon, points)
    }

    pub fn failure_rate_curve(&self, time_horizon: f64, points: usize) -> EngineResult<Curve> {
        Curve::new(*self, CurveKind::FailureRate, time_horizon, points)
    }

    pub fn cdf_curve(&self, time_horizon: f64, points: usize) -> EngineResult<Curve> {
        Curve::new(*self, CurveKind::Cumulative, time_horizon, points)
    }
}

/// Which function a [`Curve`] samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CurveKind {
    Reliability,
    FailureRate,
    Cumulative,
}

/// A single (time, value) sample on a curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub time: f64,
    pub value: f64,
}

/// Lazy sequence of evenly spaced samples over [0, time_horizon].
///
/// Holds no state beyond its cursor, so a clone restarts the sequence and
/// two curves built from the same inputs yield identical points. Values are
/// always finite.
#[derive(Debug, Clone)]
pub struct Curve {
    model: WeibullModel,
    kind: CurveKind,
    time_horizon: f64,
    points: usize,
    next: usize,
}

impl Curve {
    fn new(
        model: WeibullModel,
        kind: CurveKind,
        time_horizon: f64,
        points: usize,
    ) -> EngineResult<Self> {
        ensure_positive("time horizon", time_horizon)?;
        if !(2..=MAX_CURVE_POINTS).contains(&points) {
            return Err(EngineError::invalid(format!(
                "a curve needs between 2 and {} points, got {}",
                MAX_CURVE_POINTS, points
            )));
        }
        Ok(Self {
            model,
            kind,
            time_horizon,
            points,
            next: 0,
        })
    }

    pub fn kind(&self) -> CurveKind {
        self.kind
    }

    fn time_at(&self, index: usize) -> f64 {
        if index + 1 == self.points {
            // Land exactly on the horizon
            return self.time_horizon;
        }
        self.time_horizon * index as f64 / (self.points - 1) as f64
    }

    fn value_at(&self, t: f64) -> f64 {
        let value = match self.kind {
            CurveKind::Reliability => self.model.reliability(t),
            CurveKind::FailureRate => self.model.failure_rate(t),
            CurveKind::Cumulative => self.model.cdf(t),
        };
        saturate(value)
    }
}

impl Iterator for Curve {
    type Item = CurvePoint;

    fn next(&mut self) -> Option<CurvePoint> {
        if self.next >= self.points {
            return None;
        }
        let time = self.time_at(self.next);
        self.next += 1;
        Some(CurvePoint {
            time,
            value: self.value_at(time),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.points - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Curve {}

/// Clamp a computed value into the finite range
fn saturate(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else if value == f64::INFINITY {
        RATE_CEILING
    } else if value == f64::NEG_INFINITY {
        -RATE_CEILING
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_mtbf_exponential_equals_eta() {
        for &eta in &[1.0, 42.0, 1000.0, 87_600.0] {
            let model = WeibullModel::new(1.0, eta).unwrap();
            let mtbf = model.mtbf().unwrap();
            assert!(
                (mtbf - eta).abs() <= 1e-9 * eta,
                "mtbf = {}, expected {}",
                mtbf,
                eta
            );
        }
    }

    #[test]
    fn test_mtbf_known_values() {
        let wear_out = WeibullModel::new(2.0, 100.0).unwrap();
        assert!((wear_out.mtbf().unwrap() - 88.6227).abs() < 1e-3);

        let early = WeibullModel::new(0.5, 100.0).unwrap();
        assert!((early.mtbf().unwrap() - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(WeibullModel::new(0.0, 100.0).is_err());
        assert!(WeibullModel::new(-2.0, 100.0).is_err());
        assert!(WeibullModel::new(2.0, 0.0).is_err());
        assert!(WeibullModel::new(f64::NAN, 100.0).is_err());
        assert!(WeibullModel::new(2.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_reliability_at_eta() {
        let model = WeibullModel::new(3.2, 500.0).unwrap();
        assert!((model.reliability(500.0) - (-1.0_f64).exp()).abs() < 1e-12);
        assert_eq!(model.reliability(0.0), 1.0);
        assert_eq!(model.cdf(0.0), 0.0);
    }

    #[test]
    fn test_failure_rate_at_zero() {
        assert_eq!(WeibullModel::new(2.0, 10.0).unwrap().failure_rate(0.0), 0.0);
        assert_eq!(WeibullModel::new(1.0, 10.0).unwrap().failure_rate(0.0), 0.1);
        assert_eq!(
            WeibullModel::new(0.5, 10.0).unwrap().failure_rate(0.0),
            f64::INFINITY
        );
    }

    #[test]
    fn test_failure_rate_trend() {
        let wear = WeibullModel::new(2.5, 100.0).unwrap();
        assert!(wear.failure_rate(20.0) < wear.failure_rate(80.0));

        let early = WeibullModel::new(0.6, 100.0).unwrap();
        assert!(early.failure_rate(20.0) > early.failure_rate(80.0));

        let random = WeibullModel::new(1.0, 100.0).unwrap();
        assert!((random.failure_rate(20.0) - random.failure_rate(80.0)).abs() < 1e-15);
    }

    #[test]
    fn test_b_life() {
        let model = WeibullModel::new(2.0, 1000.0).unwrap();
        let b10 = model.b_life(10.0).unwrap();
        assert!((model.cdf(b10) - 0.10).abs() < 1e-12);
        // B63.2 is the characteristic life
        let b632 = model.b_life(100.0 * (1.0 - (-1.0_f64).exp())).unwrap();
        assert!((b632 - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_b_life_rejects_out_of_range() {
        let model = WeibullModel::new(2.0, 1000.0).unwrap();
        for &p in &[0.0, 100.0, -5.0, 150.0, f64::NAN] {
            assert!(
                matches!(model.b_life(p), Err(EngineError::InvalidArgument { .. })),
                "b_life({}) should fail",
                p
            );
        }
    }

    #[test]
    fn test_reliable_life_inverts_reliability() {
        let model = WeibullModel::new(1.7, 250.0).unwrap();
        let t = model.reliable_life(0.9).unwrap();
        assert!((model.reliability(t) - 0.9).abs() < 1e-12);
        assert!(model.reliable_life(1.0).is_err());
    }

    #[test]
    fn test_conditional_reliability() {
        // Memoryless for beta = 1
        let model = WeibullModel::new(1.0, 100.0).unwrap();
        let c = model.conditional_reliability(500.0, 50.0);
        assert!((c - model.reliability(50.0)).abs() < 1e-12);

        // Wear-out: an old unit is less likely to survive the same mission
        let wear = WeibullModel::new(3.0, 100.0).unwrap();
        assert!(wear.conditional_reliability(80.0, 10.0) < wear.reliability(10.0));
    }

    #[test]
    fn test_pattern_boundaries() {
        assert_eq!(FailurePattern::classify(0.5), FailurePattern::EarlyLife);
        assert_eq!(FailurePattern::classify(0.949), FailurePattern::EarlyLife);
        assert_eq!(FailurePattern::classify(0.95), FailurePattern::Random);
        assert_eq!(FailurePattern::classify(1.0), FailurePattern::Random);
        assert_eq!(FailurePattern::classify(1.05), FailurePattern::Random);
        assert_eq!(FailurePattern::classify(1.051), FailurePattern::WearOut);
        assert_eq!(FailurePattern::WearOut.to_string(), "wear-out");
    }

    #[test]
    fn test_curve_is_restartable() {
        let model = WeibullModel::new(2.0, 100.0).unwrap();
        let curve = model.reliability_curve(300.0, 50).unwrap();
        assert_eq!(curve.len(), 50);

        let first: Vec<CurvePoint> = curve.clone().collect();
        let second: Vec<CurvePoint> = curve.collect();
        assert_eq!(first, second);
        assert_eq!(first[0].time, 0.0);
        assert_eq!(first[49].time, 300.0);
        assert_eq!(first[0].value, 1.0);
    }

    #[test]
    fn test_failure_rate_curve_saturates() {
        let model = WeibullModel::new(0.3, 100.0).unwrap();
        let points: Vec<CurvePoint> = model.failure_rate_curve(100.0, 10).unwrap().collect();
        assert_eq!(points[0].value, RATE_CEILING);
        assert!(points.iter().all(|p| p.value.is_finite()));
    }

    #[test]
    fn test_curve_rejects_bad_inputs() {
        let model = WeibullModel::new(2.0, 100.0).unwrap();
        assert!(model.reliability_curve(0.0, 50).is_err());
        assert!(model.reliability_curve(100.0, 1).is_err());
        assert!(matches!(
            model.reliability_curve(100.0, usize::MAX / 4),
            Err(EngineError::InvalidArgument { .. })
        ));
        assert_eq!(
            model.cdf_curve(100.0, MAX_CURVE_POINTS).unwrap().len(),
            MAX_CURVE_POINTS
        );
    }

    #[test]
    fn test_tiny_shape_overflow_is_rejected() {
        let model = WeibullModel::new(0.005, 100.0).unwrap();
        assert!(matches!(
            model.mtbf(),
            Err(EngineError::InvalidArgument { .. })
        ));

        let model = WeibullModel::new(0.001, 100.0).unwrap();
        assert!(model.b_life(99.0).is_err());
        assert!(model.reliable_life(0.01).is_err());
        // Moderate quantiles stay finite
        assert!(model.b_life(10.0).unwrap().is_finite());
    }

    #[test]
    fn test_time_unit_conversion() {
        assert_eq!(TimeUnit::Days.convert(2.0, TimeUnit::Hours), 48.0);
        assert_eq!(TimeUnit::Hours.convert(8766.0, TimeUnit::Years), 1.0);
        assert_eq!(TimeUnit::Years.convert(1.0, TimeUnit::Months), 12.0);
    }

    #[test]
    fn test_parameters_yaml_roundtrip() {
        let params = WeibullParameters::new(1.8, 4200.0, TimeUnit::Days);
        let yaml = serde_yml::to_string(&params).unwrap();
        assert!(yaml.contains("time_unit: days"));
        let parsed: WeibullParameters = serde_yml::from_str(&yaml).unwrap();
        assert_eq!(parsed, params);

        let defaulted: WeibullParameters = serde_yml::from_str("beta: 2.0\neta: 10.0\n").unwrap();
        assert_eq!(defaulted.time_unit, TimeUnit::Hours);
    }

    proptest! {
        #[test]
        fn prop_reliability_starts_at_one_and_never_increases(
            beta in 0.1f64..10.0,
            eta in 0.1f64..1.0e5,
            horizon in 1.0f64..1.0e6,
        ) {
            let model = WeibullModel::new(beta, eta).unwrap();
            prop_assert_eq!(model.reliability(0.0), 1.0);
            let values: Vec<f64> = model
                .reliability_curve(horizon, 64)
                .unwrap()
                .map(|p| p.value)
                .collect();
            for pair in values.windows(2) {
                prop_assert!(pair[1] <= pair[0]);
            }
        }

        #[test]
        fn prop_cdf_and_reliability_sum_to_one(
            beta in 0.1f64..10.0,
            eta in 0.1f64..1.0e5,
            t in 0.0f64..1.0e6,
        ) {
            let model = WeibullModel::new(beta, eta).unwrap();
            prop_assert!((model.cdf(t) + model.reliability(t) - 1.0).abs() < 1e-12);
        }

        #[test]
        fn prop_curves_are_nan_free(
            beta in 0.05f64..20.0,
            eta in 1.0e-3f64..1.0e6,
            horizon in 1.0e-3f64..1.0e7,
        ) {
            let model = WeibullModel::new(beta, eta).unwrap();
            let all = model.reliability_curve(horizon, 32).unwrap()
                .chain(model.failure_rate_curve(horizon, 32).unwrap())
                .chain(model.cdf_curve(horizon, 32).unwrap());
            for point in all {
                prop_assert!(point.value.is_finite());
                prop_assert!(point.time.is_finite());
            }
        }
    }
}
