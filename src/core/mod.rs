//! Core module - reliability engine and its numerical building blocks

pub mod config;
pub mod engine;
pub mod error;
pub mod fit;
pub mod gamma;
pub mod history;
pub mod logging;
pub mod maintenance;
pub mod simulation;
pub mod weibull;

pub use config::Config;
pub use engine::{AnalysisOptions, BLife, MaintenancePlan, ReliabilityEngine, WeibullAnalysis};
pub use error::{EngineError, EngineResult};
pub use fit::{fit_weibull, RankedPoint, WeibullFitResult};
pub use gamma::{gamma, ln_gamma};
pub use history::{FailureHistory, FileHistory, MemoryHistory};
pub use maintenance::{
    CostModel, CostParameters, CostPoint, MaintenanceOptimizationResult,
    MaintenanceRecommendation, MaintenanceStrategy,
};
pub use simulation::{Cancellation, HistogramBin, SimulationParameters, SimulationResult};
pub use weibull::{CurvePoint, FailurePattern, TimeUnit, WeibullModel, WeibullParameters};
