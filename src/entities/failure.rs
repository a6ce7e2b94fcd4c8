//! Failure records and the failure-time samples extracted from them
//!
//! A record is whatever the maintenance history knows about one failure. A
//! [`FailureSample`] is the immutable list of positive times a fit runs on,
//! drawn from the records on exactly one time basis.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::error::{EngineError, EngineResult};
use crate::core::weibull::TimeUnit;

/// One failure event from the maintenance history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureRecord {
    /// Calendar date of the failure
    pub failure_date: NaiveDate,

    /// Cumulative operating hours on the asset when it failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operating_hours_at_failure: Option<f64>,

    /// Calendar days since the previous failure, when recorded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tbf_days: Option<f64>,

    /// Free-text failure description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl FailureRecord {
    pub fn new(failure_date: NaiveDate) -> Self {
        Self {
            failure_date,
            operating_hours_at_failure: None,
            tbf_days: None,
            description: None,
        }
    }

    pub fn with_operating_hours(mut self, hours: f64) -> Self {
        self.operating_hours_at_failure = Some(hours);
        self
    }

    pub fn with_tbf_days(mut self, days: f64) -> Self {
        self.tbf_days = Some(days);
        self
    }
}

/// Time basis a sample is drawn on. Never mixed within one fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SampleBasis {
    /// Operating hours at failure
    OperatingHours,
    /// Calendar days between failures
    CalendarDays,
}

impl SampleBasis {
    pub fn from_flag(use_operating_hours: bool) -> Self {
        if use_operating_hours {
            SampleBasis::OperatingHours
        } else {
            SampleBasis::CalendarDays
        }
    }

    pub fn time_unit(&self) -> TimeUnit {
        match self {
            SampleBasis::OperatingHours => TimeUnit::Hours,
            SampleBasis::CalendarDays => TimeUnit::Days,
        }
    }
}

impl std::fmt::Display for SampleBasis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SampleBasis::OperatingHours => write!(f, "operating-hours"),
            SampleBasis::CalendarDays => write!(f, "calendar-days"),
        }
    }
}

fn usable(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

/// Immutable sequence of positive failure times
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureSample {
    times: Vec<f64>,
    time_unit: TimeUnit,
}

impl FailureSample {
    /// Build a sample from raw times; every value must be finite and > 0
    pub fn new(times: Vec<f64>, time_unit: TimeUnit) -> EngineResult<Self> {
        if let Some(bad) = times.iter().find(|t| !(t.is_finite() && **t > 0.0)) {
            return Err(EngineError::invalid(format!(
                "failure times must be finite and positive, got {}",
                bad
            )));
        }
        Ok(Self { times, time_unit })
    }

    /// Extract a sample from failure records on a single basis.
    ///
    /// Operating-hours samples take `operating_hours_at_failure` as-is.
    /// Calendar samples prefer the recorded `tbf_days`; a record without one
    /// falls back to the day gap from the previous failure (by date), and
    /// the earliest such record is skipped for lack of a predecessor.
    /// Records with no usable value on the chosen basis are dropped.
    pub fn from_records(records: &[FailureRecord], basis: SampleBasis) -> Self {
        let times = match basis {
            SampleBasis::OperatingHours => records
                .iter()
                .filter_map(|r| usable(r.operating_hours_at_failure))
                .collect(),
            SampleBasis::CalendarDays => {
                let mut by_date: Vec<&FailureRecord> = records.iter().collect();
                by_date.sort_by_key(|r| r.failure_date);

                let mut times = Vec::with_capacity(by_date.len());
                let mut previous: Option<NaiveDate> = None;
                for record in by_date {
                    let gap = usable(record.tbf_days).or_else(|| {
                        previous.and_then(|prev| {
                            usable(Some((record.failure_date - prev).num_days() as f64))
                        })
                    });
                    if let Some(days) = gap {
                        times.push(days);
                    }
                    previous = Some(record.failure_date);
                }
                times
            }
        };

        Self {
            times,
            time_unit: basis.time_unit(),
        }
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn time_unit(&self) -> TimeUnit {
        self.time_unit
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}
