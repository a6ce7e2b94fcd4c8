//! Failure history access
//!
//! The engine never owns persistence. It reads assets and failure records
//! through [`FailureHistory`]. [`FileHistory`] is a read-only implementation
//! backed by a directory of YAML/CSV files:
//!
//! ```text
//! <root>/assets/<id>.yaml      Asset (may embed `failures:`)
//! <root>/failures/<id>.csv     failure records for <id>
//! <root>/failures/<id>.yaml    failure records for <id>
//! ```
//!
//! The CLI reads single files through [`load_asset`] and
//! [`load_failure_records`].

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::core::error::{EngineError, EngineResult};
use crate::entities::asset::Asset;
use crate::entities::failure::FailureRecord;

/// Read interface onto the external data store
pub trait FailureHistory {
    /// Asset record, including any stored Weibull parameters
    fn asset(&self, asset_id: &str) -> EngineResult<Asset>;

    /// All failure records for an asset
    fn failure_records(&self, asset_id: &str) -> EngineResult<Vec<FailureRecord>>;
}

/// In-memory history, mostly for embedding and tests
#[derive(Debug, Clone, Default)]
pub struct MemoryHistory {
    assets: Vec<Asset>,
}

impl MemoryHistory {
    pub fn new(assets: Vec<Asset>) -> Self {
        Self { assets }
    }

    fn find(&self, asset_id: &str) -> EngineResult<&Asset> {
        self.assets
            .iter()
            .find(|a| a.id == asset_id)
            .ok_or_else(|| EngineError::NotFound {
                what: format!("asset '{}'", asset_id),
            })
    }
}

impl FailureHistory for MemoryHistory {
    fn asset(&self, asset_id: &str) -> EngineResult<Asset> {
        self.find(asset_id).cloned()
    }

    fn failure_records(&self, asset_id: &str) -> EngineResult<Vec<FailureRecord>> {
        Ok(self.find(asset_id)?.failures.clone())
    }
}

/// Directory-backed history
#[derive(Debug, Clone)]
pub struct FileHistory {
    root: PathBuf,
}

impl FileHistory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn asset_path(&self, asset_id: &str) -> PathBuf {
        self.root.join("assets").join(format!("{}.yaml", asset_id))
    }
}

impl FailureHistory for FileHistory {
    fn asset(&self, asset_id: &str) -> EngineResult<Asset> {
        let path = self.asset_path(asset_id);
        if !path.exists() {
            return Err(EngineError::NotFound {
                what: format!("asset file {}", path.display()),
            });
        }
        load_asset(&path)
    }

    fn failure_records(&self, asset_id: &str) -> EngineResult<Vec<FailureRecord>> {
        let failures_dir = self.root.join("failures");
        for ext in ["csv", "yaml", "yml"] {
            let path = failures_dir.join(format!("{}.{}", asset_id, ext));
            if path.exists() {
                return load_failure_records(&path);
            }
        }

        // Fall back to records embedded in the asset document
        let asset = self.asset(asset_id)?;
        Ok(asset.failures)
    }
}

/// Load an asset document
pub fn load_asset(path: &Path) -> EngineResult<Asset> {
    let content = fs::read_to_string(path)?;
    serde_yml::from_str(&content).map_err(|e| EngineError::Parse {
        message: format!("{}: {}", path.display(), e),
    })
}

/// Load failure records from a CSV or YAML file.
///
/// CSV files need a header row with `failure_date` and any of
/// `operating_hours_at_failure`, `tbf_days`, `description`. YAML files hold
/// either a list of records or an asset document with a `failures:` list.
pub fn load_failure_records(path: &Path) -> EngineResult<Vec<FailureRecord>> {
    let is_csv = path
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));

    let records = if is_csv {
        read_csv_records(path)?
    } else {
        let content = fs::read_to_string(path)?;
        parse_yaml_records(&content).map_err(|message| EngineError::Parse {
            message: format!("{}: {}", path.display(), message),
        })?
    };

    debug!(path = %path.display(), records = records.len(), "loaded failure records");
    Ok(records)
}

fn read_csv_records(path: &Path) -> EngineResult<Vec<FailureRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| EngineError::Parse {
            message: format!("{}: {}", path.display(), e),
        })?;

    let mut records = Vec::new();
    for (line, row) in reader.deserialize::<FailureRecord>().enumerate() {
        let record = row.map_err(|e| EngineError::Parse {
            // +2: header row and 1-based numbering
            message: format!("{} row {}: {}", path.display(), line + 2, e),
        })?;
        records.push(record);
    }
    Ok(records)
}

fn parse_yaml_records(content: &str) -> Result<Vec<FailureRecord>, String> {
    match serde_yml::from_str::<Vec<FailureRecord>>(content) {
        Ok(records) => Ok(records),
        Err(list_err) => match serde_yml::from_str::<Asset>(content) {
            Ok(asset) => Ok(asset.failures),
            Err(_) => Err(list_err.to_string()),
        },
    }
}
