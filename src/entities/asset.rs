//! Asset records - the equipment a failure history belongs to
//!
//! An asset may carry stored Weibull parameters that serve as the default
//! model when a caller does not supply explicit ones.

use serde::{Deserialize, Serialize};

use crate::core::error::{EngineError, EngineResult};
use crate::core::weibull::{TimeUnit, WeibullParameters};
use crate::entities::failure::FailureRecord;

/// Equipment record as read from the data layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    /// Asset identifier (tag number, serial...)
    pub id: String,

    /// Human readable name
    #[serde(default)]
    pub name: String,

    /// Stored shape parameter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weibull_beta: Option<f64>,

    /// Stored scale parameter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weibull_eta: Option<f64>,

    /// Unit of the stored scale parameter
    #[serde(default)]
    pub time_unit: TimeUnit,

    /// Failure history, when kept in the same document
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<FailureRecord>,
}

impl Asset {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            weibull_beta: None,
            weibull_eta: None,
            time_unit: TimeUnit::Hours,
            failures: Vec::new(),
        }
    }

    /// Stored parameters, if both beta and eta are present
    pub fn weibull_parameters(&self) -> Option<WeibullParameters> {
        match (self.weibull_beta, self.weibull_eta) {
            (Some(beta), Some(eta)) => Some(WeibullParameters::new(beta, eta, self.time_unit)),
            _ => None,
        }
    }

    /// Stored parameters or an error naming the asset
    pub fn require_parameters(&self) -> EngineResult<WeibullParameters> {
        self.weibull_parameters().ok_or_else(|| {
            EngineError::invalid(format!(
                "asset '{}' has no stored Weibull parameters (weibull_beta and weibull_eta)",
                self.id
            ))
        })
    }
}
