use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(AppointmentState {
    Pending => "pending",
    InQueue => "in_queue",
    Cancelled => "cancelled",
    Finished => "finished",
});

str_enum!(LabStatus {
    Awaiting => "awaiting",
    Submitted => "submitted",
});

str_enum!(ProfileStatus {
    Pending => "pending",
    Finalized => "finalized",
});

str_enum!(ComplianceCategory {
    FullCompliance => "full_compliance",
    MissingLogs => "missing_logs",
    NonCompliant => "non_compliant",
});

str_enum!(RiskLevel {
    Low => "low",
    Moderate => "moderate",
    High => "high",
    Ppd => "ppd",
    Unknown => "unknown",
});

impl RiskLevel {
    /// Case-insensitive reading of a stored risk classification.
    /// Null, empty and unrecognised values read as `Unknown`.
    pub fn classify(raw: Option<&str>) -> Self {
        raw.map(|s| s.trim().to_ascii_lowercase())
            .and_then(|s| s.parse().ok())
            .unwrap_or(RiskLevel::Unknown)
    }
}

impl AppointmentState {
    /// Only pending and queued appointments appear in the clinic views.
    pub fn is_active(self) -> bool {
        matches!(self, AppointmentState::Pending | AppointmentState::InQueue)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, AppointmentState::Cancelled | AppointmentState::Finished)
    }

    /// Pending → InQueue → Finished, and Pending | InQueue → Cancelled.
    pub fn can_transition_to(self, next: AppointmentState) -> bool {
        use AppointmentState::*;
        matches!(
            (self, next),
            (Pending, InQueue) | (InQueue, Finished) | (Pending, Cancelled) | (InQueue, Cancelled)
        )
    }
}
