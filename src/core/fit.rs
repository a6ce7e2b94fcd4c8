//! Weibull fitting by median rank regression (MRR)
//!
//! The Weibull CDF linearizes as
//!
//! ```text
//! ln(-ln(1 - F(t))) = beta * ln(t) - beta * ln(eta)
//! ```
//!
//! so an ordinary least-squares line through x = ln(t_i), y = ln(-ln(1 - F_i))
//! has slope beta and intercept -beta * ln(eta). F_i is estimated with
//! Bernard's median rank approximation (i - 0.3) / (n + 0.4).
//!
//! Note that the reported R² measures the straight-line fit in the
//! linearized (x, y) space, not agreement in the time domain. It can be
//! negative for very poor fits; that is a valid result, not an error.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::core::error::{EngineError, EngineResult};
use crate::core::weibull::{FailurePattern, TimeUnit, WeibullModel, WeibullParameters};
use crate::entities::failure::FailureSample;

/// Minimum number of failure times accepted by default
pub const DEFAULT_MIN_SAMPLES: usize = 3;

/// One point of the Weibull probability plot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankedPoint {
    /// Failure time
    pub time: f64,

    /// Bernard median rank estimate of F(time)
    pub median_rank: f64,

    /// Set when the time ties an earlier failure; the point still receives
    /// its own sequential rank
    pub adjusted: bool,
}

/// Result of a Weibull fit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeibullFitResult {
    /// Shape estimate
    pub beta: f64,

    /// Scale estimate
    pub eta: f64,

    /// Coefficient of determination of the linearized regression
    pub r2: f64,

    /// Number of failure times fitted
    pub sample_size: usize,

    /// Unit of eta (the basis of the sample)
    pub time_unit: TimeUnit,

    /// Probability plot points, sorted by time
    pub data_points: Vec<RankedPoint>,
}

impl WeibullFitResult {
    pub fn parameters(&self) -> WeibullParameters {
        WeibullParameters::new(self.beta, self.eta, self.time_unit)
    }

    /// The fitted distribution
    pub fn model(&self) -> EngineResult<WeibullModel> {
        WeibullModel::new(self.beta, self.eta)
    }

    pub fn pattern(&self) -> FailurePattern {
        FailurePattern::classify(self.beta)
    }
}

/// Bernard's approximation of the median rank of the i-th (1-based) of n
pub fn median_rank(i: usize, n: usize) -> f64 {
    (i as f64 - 0.3) / (n as f64 + 0.4)
}

/// Fit a Weibull distribution to a failure sample.
///
/// # Algorithm
/// 1. Reject samples smaller than `min_count`
/// 2. Sort ascending, rank with Bernard's approximation
/// 3. Transform to x = ln(t), y = ln(-ln(1 - F))
/// 4. Least squares y = a + b*x; beta = b, eta = exp(-a/b)
/// 5. R² = 1 - SS_res / SS_tot on (x, y)
///
/// The result depends only on the multiset of times, never on their order.
///
/// # Errors
/// - [`EngineError::InsufficientData`] when fewer than `min_count` times
/// - [`EngineError::DegenerateFit`] when all times are identical or the
///   slope is zero
///
/// # Examples
///
/// ```
/// use relia::core::fit::fit_weibull;
/// use relia::core::weibull::TimeUnit;
/// use relia::entities::failure::FailureSample;
///
/// let sample = FailureSample::new(
///     vec![10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0],
///     TimeUnit::Hours,
/// ).unwrap();
/// let fit = fit_weibull(&sample, 3).unwrap();
/// assert!(fit.beta > 0.0);
/// assert!(fit.r2 > 0.9);
/// ```
pub fn fit_weibull(sample: &FailureSample, min_count: usize) -> EngineResult<WeibullFitResult> {
    let n = sample.len();
    let required = min_count.max(2);
    if n < required {
        return Err(EngineError::InsufficientData {
            required,
            actual: n,
        });
    }

    let mut sorted = sample.times().to_vec();
    sorted.sort_by(f64::total_cmp);

    let mut data_points = Vec::with_capacity(n);
    let mut x_vals = Vec::with_capacity(n);
    let mut y_vals = Vec::with_capacity(n);

    for (i, &t) in sorted.iter().enumerate() {
        let f_i = median_rank(i + 1, n);
        let adjusted = i > 0 && sorted[i - 1] == t;

        x_vals.push(t.ln());
        y_vals.push((-(1.0 - f_i).ln()).ln());
        data_points.push(RankedPoint {
            time: t,
            median_rank: f_i,
            adjusted,
        });
    }

    let n_f = n as f64;
    let sum_x: f64 = x_vals.iter().sum();
    let sum_y: f64 = y_vals.iter().sum();
    let sum_xy: f64 = x_vals.iter().zip(&y_vals).map(|(x, y)| x * y).sum();
    let sum_x2: f64 = x_vals.iter().map(|x| x * x).sum();
    trace!(sum_x, sum_y, sum_xy, sum_x2, n, "median rank regression sums");

    let mean_x = sum_x / n_f;
    let mean_y = sum_y / n_f;
    let s_xx: f64 = x_vals.iter().map(|x| (x - mean_x).powi(2)).sum();
    let s_xy: f64 = x_vals
        .iter()
        .zip(&y_vals)
        .map(|(x, y)| (x - mean_x) * (y - mean_y))
        .sum();

    if s_xx <= f64::EPSILON * sum_x2.max(1.0) {
        return Err(EngineError::degenerate(
            "all failure times are identical (zero variance in ln(t))",
        ));
    }

    let beta = s_xy / s_xx;
    let intercept = mean_y - beta * mean_x;

    if beta == 0.0 || !beta.is_finite() {
        return Err(EngineError::degenerate(format!(
            "regression slope is {}",
            beta
        )));
    }
    if beta < 0.0 {
        return Err(EngineError::degenerate(format!(
            "negative regression slope {}",
            beta
        )));
    }

    let eta = (-intercept / beta).exp();
    if !eta.is_finite() || eta <= 0.0 {
        return Err(EngineError::degenerate(format!(
            "scale estimate is not a positive finite number ({})",
            eta
        )));
    }

    let ss_tot: f64 = y_vals.iter().map(|y| (y - mean_y).powi(2)).sum();
    let ss_res: f64 = x_vals
        .iter()
        .zip(&y_vals)
        .map(|(x, y)| (y - (intercept + beta * x)).powi(2))
        .sum();
    let r2 = if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { 1.0 };

    debug!(beta, eta, r2, n, "weibull fit complete");

    Ok(WeibullFitResult {
        beta,
        eta,
        r2,
        sample_size: n,
        time_unit: sample.time_unit(),
        data_points,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(times: &[f64]) -> FailureSample {
        FailureSample::new(times.to_vec(), TimeUnit::Hours).unwrap()
    }

    /// Times at evenly spaced quantiles of Weibull(beta, eta)
    fn quantile_sample(beta: f64, eta: f64, n: usize) -> FailureSample {
        let times = (1..=n)
            .map(|i| {
                let f = (i as f64 - 0.5) / n as f64;
                eta * (-(1.0 - f).ln()).powf(1.0 / beta)
            })
            .collect();
        FailureSample::new(times, TimeUnit::Hours).unwrap()
    }

    #[test]
    fn test_recovers_known_parameters() {
        let fit = fit_weibull(&quantile_sample(2.0, 1000.0, 50), DEFAULT_MIN_SAMPLES).unwrap();
        assert!(
            (fit.beta - 2.0).abs() / 2.0 < 0.15,
            "beta = {}, expected within 15% of 2.0",
            fit.beta
        );
        assert!(
            (fit.eta - 1000.0).abs() / 1000.0 < 0.10,
            "eta = {}, expected within 10% of 1000",
            fit.eta
        );
        assert!(fit.r2 > 0.9, "R^2 = {}", fit.r2);
        assert_eq!(fit.sample_size, 50);
        assert_eq!(fit.pattern(), FailurePattern::WearOut);
    }

    #[test]
    fn test_recovers_early_life_shape() {
        let fit = fit_weibull(&quantile_sample(0.7, 300.0, 40), DEFAULT_MIN_SAMPLES).unwrap();
        assert!(
            (fit.beta - 0.7).abs() < 0.1,
            "beta = {}, expected near 0.7",
            fit.beta
        );
        assert_eq!(fit.pattern(), FailurePattern::EarlyLife);
    }

    #[test]
    fn test_two_samples_is_insufficient() {
        let err = fit_weibull(&sample(&[100.0, 200.0]), DEFAULT_MIN_SAMPLES).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InsufficientData {
                required: 3,
                actual: 2
            }
        ));
    }

    #[test]
    fn test_custom_minimum() {
        let times = [10.0, 20.0, 30.0, 40.0];
        assert!(fit_weibull(&sample(&times), 5).is_err());
        assert!(fit_weibull(&sample(&times), 4).is_ok());
    }

    #[test]
    fn test_identical_times_are_degenerate() {
        let err = fit_weibull(&sample(&[50.0, 50.0, 50.0, 50.0]), DEFAULT_MIN_SAMPLES).unwrap_err();
        assert!(matches!(err, EngineError::DegenerateFit { .. }));
    }

    #[test]
    fn test_order_independent() {
        let a = fit_weibull(&sample(&[10.0, 20.0, 30.0, 40.0, 50.0]), 3).unwrap();
        let b = fit_weibull(&sample(&[50.0, 10.0, 40.0, 20.0, 30.0]), 3).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_median_ranks_and_ordering() {
        let fit = fit_weibull(&sample(&[30.0, 10.0, 20.0]), 3).unwrap();
        let times: Vec<f64> = fit.data_points.iter().map(|p| p.time).collect();
        assert_eq!(times, vec![10.0, 20.0, 30.0]);
        assert!((fit.data_points[0].median_rank - 0.7 / 3.4).abs() < 1e-12);
        assert!((fit.data_points[2].median_rank - 2.7 / 3.4).abs() < 1e-12);
        assert!(fit.data_points.iter().all(|p| !p.adjusted));
    }

    #[test]
    fn test_tied_times_are_flagged() {
        let fit = fit_weibull(&sample(&[15.0, 40.0, 15.0, 70.0]), 3).unwrap();
        let flags: Vec<bool> = fit.data_points.iter().map(|p| p.adjusted).collect();
        assert_eq!(flags, vec![false, true, false, false]);
        // Ties still get distinct ranks
        assert!(fit.data_points[1].median_rank > fit.data_points[0].median_rank);
    }

    #[test]
    fn test_r2_is_linearized() {
        // Exact Weibull quantiles at Bernard ranks fall on a straight line
        let n = 12;
        let times: Vec<f64> = (1..=n)
            .map(|i| 200.0 * (-(1.0 - median_rank(i, n)).ln()).powf(1.0 / 1.5))
            .collect();
        let fit = fit_weibull(&sample(&times), 3).unwrap();
        assert!((fit.beta - 1.5).abs() < 1e-9, "beta = {}", fit.beta);
        assert!((fit.eta - 200.0).abs() < 1e-6, "eta = {}", fit.eta);
        assert!((fit.r2 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_result_builds_model() {
        let fit = fit_weibull(&quantile_sample(1.8, 500.0, 20), 3).unwrap();
        let model = fit.model().unwrap();
        assert_eq!(model.beta(), fit.beta);
        assert_eq!(fit.parameters().time_unit, TimeUnit::Hours);
    }
}
