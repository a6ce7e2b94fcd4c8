//! CLI command implementations

pub mod analyze;
pub mod completions;
pub mod config;
pub mod fit;
pub mod optimize;
pub mod simulate;

use std::path::PathBuf;

use miette::Result;

use crate::cli::helpers::{engine_err, resolve_parameters};
use crate::core::weibull::{TimeUnit, WeibullModel, WeibullParameters};

/// Weibull model selection shared by analyze, optimize and simulate
#[derive(clap::Args, Debug, Clone)]
pub struct ModelArgs {
    /// Shape parameter (beta)
    #[arg(long, requires = "eta", conflicts_with = "asset")]
    pub beta: Option<f64>,

    /// Scale parameter (eta), in --unit
    #[arg(long, requires = "beta", conflicts_with = "asset")]
    pub eta: Option<f64>,

    /// Time unit of eta and of every time argument
    #[arg(long, value_enum, default_value_t = TimeUnit::Hours)]
    pub unit: TimeUnit,

    /// Asset YAML file with stored weibull_beta / weibull_eta
    #[arg(long, value_name = "FILE")]
    pub asset: Option<PathBuf>,
}

impl ModelArgs {
    pub fn parameters(&self) -> Result<WeibullParameters> {
        resolve_parameters(self.beta, self.eta, self.unit, self.asset.as_deref())
    }

    /// Validated model together with the unit its times are expressed in
    pub fn model(&self) -> Result<(WeibullModel, TimeUnit)> {
        let params = self.parameters()?;
        let model = params.model().map_err(engine_err)?;
        Ok((model, params.time_unit))
    }
}
