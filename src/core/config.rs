//! Configuration - engine defaults and limits
//!
//! Loaded in layers, later layers overriding earlier ones:
//! 1. Built-in defaults
//! 2. User config: `<config dir>/relia/config.yaml`
//! 3. Project config: `./.relia/config.yaml`
//! 4. Environment: `RELIA_MAX_RUNS`, `RELIA_COST_MODEL`, `RELIA_LOG`
//!
//! A file that fails to parse is skipped with a warning.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::fit::DEFAULT_MIN_SAMPLES;
use crate::core::maintenance::{CostModel, DEFAULT_GRID_RESOLUTION};
use crate::core::simulation::{DEFAULT_HISTOGRAM_BINS, DEFAULT_MAX_EVENTS_PER_RUN, DEFAULT_MAX_RUNS};

/// Project-local configuration directory
pub const PROJECT_CONFIG_DIR: &str = ".relia";

const CONFIG_FILE: &str = "config.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Samples per generated curve
    pub curve_points: usize,

    /// Candidate intervals for maintenance optimization
    pub grid_resolution: usize,

    /// Histogram bins for simulated failure times
    pub histogram_bins: usize,

    /// Simulation runs when none are requested
    pub default_runs: usize,

    /// Hard cap on simulation runs
    pub max_runs: usize,

    /// Hard cap on events within one simulated timeline
    pub max_events_per_run: usize,

    /// Smallest sample accepted for fitting
    pub min_fit_samples: usize,

    /// Cost-rate formula for maintenance optimization
    pub cost_model: CostModel,

    /// Log filter used when RELIA_LOG is unset
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            curve_points: 100,
            grid_resolution: DEFAULT_GRID_RESOLUTION,
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
            default_runs: 1000,
            max_runs: DEFAULT_MAX_RUNS,
            max_events_per_run: DEFAULT_MAX_EVENTS_PER_RUN,
            min_fit_samples: DEFAULT_MIN_SAMPLES,
            cost_model: CostModel::default(),
            log_level: "warn".to_string(),
        }
    }
}

/// Partial config as found in a file; absent keys leave the value alone
#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigLayer {
    curve_points: Option<usize>,
    grid_resolution: Option<usize>,
    histogram_bins: Option<usize>,
    default_runs: Option<usize>,
    max_runs: Option<usize>,
    max_events_per_run: Option<usize>,
    min_fit_samples: Option<usize>,
    cost_model: Option<CostModel>,
    log_level: Option<String>,
}

impl Config {
    /// Load the layered configuration for the current directory
    pub fn load() -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::load_from(Self::user_config_path().as_deref(), &cwd)
    }

    /// Load with an explicit user config file and project directory
    pub fn load_from(user_config: Option<&Path>, project_dir: &Path) -> Self {
        let mut config = Config::default();

        if let Some(path) = user_config {
            config.apply_file(path);
        }
        config.apply_file(&Self::project_config_path(project_dir));
        config.apply_env();
        config
    }

    /// `<config dir>/relia/config.yaml`, when a home directory is known
    pub fn user_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "relia").map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    pub fn project_config_path(project_dir: &Path) -> PathBuf {
        project_dir.join(PROJECT_CONFIG_DIR).join(CONFIG_FILE)
    }

    fn apply_file(&mut self, path: &Path) {
        if !path.exists() {
            return;
        }
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not read config file");
                return;
            }
        };
        match serde_yml::from_str::<ConfigLayer>(&content) {
            Ok(layer) => self.merge(layer),
            Err(e) => warn!(path = %path.display(), error = %e, "ignoring malformed config file"),
        }
    }

    fn merge(&mut self, layer: ConfigLayer) {
        if let Some(v) = layer.curve_points {
            self.curve_points = v;
        }
        if let Some(v) = layer.grid_resolution {
            self.grid_resolution = v;
        }
        if let Some(v) = layer.histogram_bins {
            self.histogram_bins = v;
        }
        if let Some(v) = layer.default_runs {
            self.default_runs = v;
        }
        if let Some(v) = layer.max_runs {
            self.max_runs = v;
        }
        if let Some(v) = layer.max_events_per_run {
            self.max_events_per_run = v;
        }
        if let Some(v) = layer.min_fit_samples {
            self.min_fit_samples = v;
        }
        if let Some(v) = layer.cost_model {
            self.cost_model = v;
        }
        if let Some(v) = layer.log_level {
            self.log_level = v;
        }
    }

    fn apply_env(&mut self) {
        if let Ok(value) = std::env::var("RELIA_MAX_RUNS") {
            match value.trim().parse() {
                Ok(n) => self.max_runs = n,
                Err(_) => warn!(value = %value, "ignoring invalid RELIA_MAX_RUNS"),
            }
        }
        if let Ok(value) = std::env::var("RELIA_COST_MODEL") {
            match value.parse() {
                Ok(model) => self.cost_model = model,
                Err(e) => warn!(error = %e, "ignoring invalid RELIA_COST_MODEL"),
            }
        }
        if let Ok(value) = std::env::var("RELIA_LOG") {
            if !value.trim().is_empty() {
                self.log_level = value;
            }
        }
    }
}
