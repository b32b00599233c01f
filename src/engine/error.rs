//! Engine error kinds and per-unit failure reporting.
//!
//! A whole call fails only on bad arguments, a rejected state transition or
//! cancellation. Transport failures inside a fan-out degrade the affected unit
//! and are listed next to the result.

use serde::Serialize;
use thiserror::Error;

use crate::gateway::GatewayError;
use crate::models::AppointmentState;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Transport failure: {0}")]
    Transport(#[from] GatewayError),

    #[error("Invalid appointment transition: {from} -> {to}")]
    InvalidTransition {
        from: AppointmentState,
        to: AppointmentState,
    },

    #[error("Evaluation cancelled")]
    Cancelled,
}

/// Identifies the unit of work that degraded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum FailedUnit {
    Patient(String),
    Month(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitFailure {
    pub unit: FailedUnit,
    pub reason: String,
}

impl UnitFailure {
    pub fn patient(id: &str, error: &GatewayError) -> Self {
        Self {
            unit: FailedUnit::Patient(id.to_string()),
            reason: error.to_string(),
        }
    }

    pub fn month(label: &str, error: &GatewayError) -> Self {
        Self {
            unit: FailedUnit::Month(label.to_string()),
            reason: error.to_string(),
        }
    }
}

/// A complete, correctly shaped result plus the units that fell back to
/// conservative defaults.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome<T> {
    pub value: T,
    pub failures: Vec<UnitFailure>,
}

impl<T> Outcome<T> {
    pub fn complete(value: T) -> Self {
        Self {
            value,
            failures: Vec::new(),
        }
    }

    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Rejects blank identifiers before any gateway call is made.
pub(crate) fn require_id(id: &str, what: &str) -> Result<(), EngineError> {
    if id.trim().is_empty() {
        return Err(EngineError::InvalidArgument(format!("{what} id is missing")));
    }
    Ok(())
}
