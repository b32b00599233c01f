use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::engine::EngineError;

/// Application-level constants
pub const APP_NAME: &str = "CarePulse";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "carepulse_lib=info,carepulse_report=info,warn"
}

/// Get the application data directory.
/// Falls back to the working directory when no home directory is known.
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("CarePulse")
}

/// Default location of the clinic SQLite store.
pub fn default_database_path() -> PathBuf {
    app_data_dir().join("clinic.db")
}

/// Tunables for the status and trend engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Number of monthly points in every trend series.
    pub trend_months: u32,
    /// Upper bound on concurrent per-patient gateway fetches.
    pub max_concurrent_fetches: usize,
    /// Days added on each side of today's appointment query window.
    /// The exact date-string match is still applied locally.
    pub today_buffer_days: u32,
    /// Forward horizon for the upcoming appointments view.
    pub upcoming_window_days: u32,
    /// Delay before a wound-photo lookup for a freshly selected patient.
    pub selection_debounce_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            trend_months: 6,
            max_concurrent_fetches: 8,
            today_buffer_days: 1,
            upcoming_window_days: 90,
            selection_debounce_ms: 40,
        }
    }
}

impl EngineConfig {
    /// Parse overrides from JSON. Missing keys keep their defaults.
    pub fn from_json(raw: &str) -> Result<Self, EngineError> {
        let config: Self = serde_json::from_str(raw)
            .map_err(|e| EngineError::InvalidArgument(format!("engine config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.trend_months == 0 {
            return Err(EngineError::InvalidArgument(
                "trend_months must be at least 1".into(),
            ));
        }
        if self.max_concurrent_fetches == 0 {
            return Err(EngineError::InvalidArgument(
                "max_concurrent_fetches must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
