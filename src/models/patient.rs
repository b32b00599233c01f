use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Surgical phase of a patient. Values the clinic store does not know are
/// preserved verbatim so they can be shown unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Phase {
    PreOperative,
    PostOperative,
    Other(String),
}

impl Phase {
    /// Short label used on status badges.
    pub fn label(&self) -> &str {
        match self {
            Phase::PreOperative => "PreOp",
            Phase::PostOperative => "PostOp",
            Phase::Other(raw) => raw,
        }
    }

    pub fn as_stored(&self) -> &str {
        match self {
            Phase::PreOperative => "PreOperative",
            Phase::PostOperative => "PostOperative",
            Phase::Other(raw) => raw,
        }
    }
}

impl From<String> for Phase {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "PreOperative" => Phase::PreOperative,
            "PostOperative" => Phase::PostOperative,
            _ => Phase::Other(raw),
        }
    }
}

impl From<Phase> for String {
    fn from(phase: Phase) -> Self {
        phase.as_stored().to_string()
    }
}

/// Demographic fields that must all be filled for a finalized profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Demographics {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<String>,
    pub contact_number: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub gender: Option<String>,
    pub allergies: Option<String>,
    pub diabetes_type: Option<String>,
    pub smoking_status: Option<String>,
    pub emergency_contact: Option<String>,
}

impl Demographics {
    pub const FIELD_COUNT: usize = 11;

    pub fn fields(&self) -> [(&'static str, Option<&str>); Self::FIELD_COUNT] {
        [
            ("first_name", self.first_name.as_deref()),
            ("last_name", self.last_name.as_deref()),
            ("date_of_birth", self.date_of_birth.as_deref()),
            ("contact_number", self.contact_number.as_deref()),
            ("email", self.email.as_deref()),
            ("address", self.address.as_deref()),
            ("gender", self.gender.as_deref()),
            ("allergies", self.allergies.as_deref()),
            ("diabetes_type", self.diabetes_type.as_deref()),
            ("smoking_status", self.smoking_status.as_deref()),
            ("emergency_contact", self.emergency_contact.as_deref()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: String,
    #[serde(flatten)]
    pub demographics: Demographics,
    pub phase: Phase,
    pub doctor_id: Option<String>,
    pub registered_at: NaiveDateTime,
}
