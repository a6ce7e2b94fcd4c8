//! Diagnostic logging
//!
//! Library code only emits `tracing` events; the binary installs the
//! subscriber once at startup. Output goes to stderr so that command
//! output on stdout stays machine readable.
//!
//! The `RELIA_LOG` environment variable takes precedence over the
//! configured level, e.g. `RELIA_LOG=relia::core::fit=trace`.

use std::sync::OnceLock;

use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a filter directive
pub const LOG_ENV_VAR: &str = "RELIA_LOG";

static LOGGING_INITIALIZED: OnceLock<bool> = OnceLock::new();

#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("logging already initialized")]
    AlreadyInitialized,

    #[error("invalid log filter '{filter}': {reason}")]
    InvalidFilter { filter: String, reason: String },

    #[error("failed to set global subscriber: {0}")]
    SetSubscriber(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Filter level implied by the global `--verbose` / `--trace` flags
pub fn level_for_flags(configured: &str, verbose: bool, trace: bool) -> String {
    if trace {
        "trace".to_string()
    } else if verbose {
        "debug".to_string()
    } else {
        configured.to_string()
    }
}

/// Install the global stderr subscriber.
///
/// `level` is used when `RELIA_LOG` is unset or empty. A second call
/// returns [`LogError::AlreadyInitialized`].
pub fn init_logging(level: &str) -> Result<(), LogError> {
    if LOGGING_INITIALIZED.get().is_some() {
        return Err(LogError::AlreadyInitialized);
    }

    let env_filter = match EnvFilter::try_from_env(LOG_ENV_VAR) {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level).map_err(|e| LogError::InvalidFilter {
            filter: level.to_string(),
            reason: e.to_string(),
        })?,
    };

    let subscriber = tracing_subscriber::registry().with(env_filter).with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false),
    );
    tracing::subscriber::set_global_default(subscriber)?;

    let _ = LOGGING_INITIALIZED.set(true);
    tracing::debug!(log_level = %level, "logging initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for_flags() {
        assert_eq!(level_for_flags("warn", false, false), "warn");
        assert_eq!(level_for_flags("warn", true, false), "debug");
        assert_eq!(level_for_flags("warn", true, true), "trace");
    }

    #[test]
    fn test_invalid_filter_is_reported() {
        if std::env::var(LOG_ENV_VAR).is_ok() {
            return;
        }
        let err = init_logging("relia=loud").unwrap_err();
        assert!(matches!(err, LogError::InvalidFilter { .. }));
    }
}
