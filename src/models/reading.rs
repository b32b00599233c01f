use serde::{Deserialize, Deserializer, Serialize};

/// A measured value as entered. Free-form entry can hold censored or coded
/// results (`<3.0`, `HI`) that still count as a submitted value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reading {
    Number(f64),
    Text(String),
}

impl Reading {
    /// Blank text is no reading at all; numeric text becomes a number and
    /// anything else is kept verbatim (trimmed).
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(match trimmed.parse::<f64>() {
            Ok(n) => Reading::Number(n),
            Err(_) => Reading::Text(trimmed.to_string()),
        })
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Reading::Number(n) => Some(*n),
            Reading::Text(_) => None,
        }
    }
}

impl From<f64> for Reading {
    fn from(n: f64) -> Self {
        Reading::Number(n)
    }
}

/// Accepts numbers, text, blank strings and null. Only null and blank text
/// read as absent.
pub fn lenient_reading<'de, D>(deserializer: D) -> Result<Option<Reading>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Reading>::deserialize(deserializer)? {
        Some(Reading::Text(s)) => Reading::parse(&s),
        other => other,
    })
}

/// Numeric view of a lenient field. Non-numeric text carries no number.
pub fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_reading(deserializer)?.and_then(|r| r.as_f64()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Field {
        #[serde(default, deserialize_with = "lenient_reading")]
        value: Option<Reading>,
    }

    fn read(json: &str) -> Option<Reading> {
        serde_json::from_str::<Field>(json).unwrap().value
    }

    #[test]
    fn blank_and_null_are_absent() {
        assert_eq!(read(r#"{"value": ""}"#), None);
        assert_eq!(read(r#"{"value": "   "}"#), None);
        assert_eq!(read(r#"{"value": null}"#), None);
        assert_eq!(read("{}"), None);
    }

    #[test]
    fn numeric_text_becomes_number() {
        assert_eq!(read(r#"{"value": " 5.5 "}"#), Some(Reading::Number(5.5)));
        assert_eq!(read(r#"{"value": 31}"#), Some(Reading::Number(31.0)));
    }

    #[test]
    fn censored_and_coded_text_is_kept() {
        assert_eq!(read(r#"{"value": "<3.0"}"#), Some(Reading::Text("<3.0".into())));
        assert_eq!(read(r#"{"value": "HI"}"#), Some(Reading::Text("HI".into())));
        assert_eq!(Reading::parse("N/A").and_then(|r| r.as_f64()), None);
    }
}
