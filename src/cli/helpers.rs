//! Shared helper functions for CLI commands

use std::path::Path;

use miette::Result;

use crate::core::error::EngineError;
use crate::core::history::load_asset;
use crate::core::weibull::{TimeUnit, WeibullParameters};

/// Round a value to a precision appropriate for a reference magnitude.
///
/// Shows three significant digits beyond the reference, so a value of
/// 0.01234 next to a reference of 0.1 prints as `0.0123`.
pub fn smart_round(value: f64, ref_precision: f64) -> String {
    let magnitude = ref_precision.abs().max(f64::MIN_POSITIVE).log10().floor() as i32;
    let decimals = (3 - magnitude).clamp(0, 10) as usize;
    format!("{:.*}", decimals, value)
}

/// Compact rendering for reports and tables.
///
/// Large values keep three decimals; small ones switch to scientific
/// notation so they do not collapse to zero.
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    if value == f64::MAX {
        return "max".to_string();
    }
    let abs = value.abs();
    if abs != 0.0 && !(1e-3..1e9).contains(&abs) {
        format!("{:.4e}", value)
    } else {
        format!("{:.3}", value)
    }
}

/// Format a probability in [0, 1] as a percentage
pub fn format_percent(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}

/// Convert an engine error into a diagnostic
pub fn engine_err(e: EngineError) -> miette::Report {
    miette::miette!("{}", e)
}

/// Resolve Weibull parameters from explicit flags or an asset file.
///
/// Explicit `beta`/`eta` take precedence; otherwise the asset's stored
/// parameters are used.
pub fn resolve_parameters(
    beta: Option<f64>,
    eta: Option<f64>,
    unit: TimeUnit,
    asset: Option<&Path>,
) -> Result<WeibullParameters> {
    match (beta, eta, asset) {
        (Some(beta), Some(eta), _) => Ok(WeibullParameters::new(beta, eta, unit)),
        (None, None, Some(path)) => {
            let asset = load_asset(path).map_err(engine_err)?;
            asset.require_parameters().map_err(engine_err)
        }
        (Some(_), None, _) | (None, Some(_), _) => Err(miette::miette!(
            help = "pass both --beta and --eta, or --asset with stored parameters",
            "Incomplete Weibull parameters"
        )),
        (None, None, None) => Err(miette::miette!(
            help = "pass --beta and --eta, or --asset <FILE>",
            "No Weibull model given"
        )),
    }
}
