//! Derived field rules
//!
//! Derived keys are recomputed from a source key whenever it changes and are
//! never written by user input.

use super::store::FieldValue;
use chrono::{DateTime, Datelike, Month, NaiveDate};
use thiserror::Error;

/// Raised when a source value cannot feed its derived fields
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DerivationError {
    #[error("cannot derive date parts from {0:?}")]
    UnparsableDate(String),
    #[error("cannot derive date parts from a non-text value")]
    NotText,
}

/// A rule computing dependent keys from one source key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerivationRule {
    /// ISO date → day of month, full month name, four-digit year
    DateParts {
        source: &'static str,
        targets: [&'static str; 3],
    },
}

impl DerivationRule {
    pub fn source(&self) -> &'static str {
        match self {
            Self::DateParts { source, .. } => source,
        }
    }

    pub fn targets(&self) -> &[&'static str] {
        match self {
            Self::DateParts { targets, .. } => targets,
        }
    }

    /// Compute the new values of every target from the source value
    pub fn derive(&self, value: &FieldValue) -> Result<Vec<(&'static str, FieldValue)>, DerivationError> {
        match self {
            Self::DateParts {
                targets: [day, month, year],
                ..
            } => {
                let FieldValue::Text(text) = value else {
                    return Err(DerivationError::NotText);
                };
                let parts = date_parts(text)?;
                Ok(vec![
                    (*day, FieldValue::Number(i64::from(parts.day))),
                    (*month, FieldValue::Text(parts.month.to_string())),
                    (*year, FieldValue::Number(i64::from(parts.year))),
                ])
            }
        }
    }
}

/// Decomposed calendar date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateParts {
    pub day: u32,
    pub month: &'static str,
    pub year: i32,
}

impl From<NaiveDate> for DateParts {
    fn from(date: NaiveDate) -> Self {
        let month = Month::try_from(date.month() as u8)
            .map(|m| m.name())
            .unwrap_or_default();
        Self {
            day: date.day(),
            month,
            year: date.year(),
        }
    }
}

/// Parse an ISO date (`2025-03-05`) or RFC 3339 timestamp into its parts
pub fn date_parts(value: &str) -> Result<DateParts, DerivationError> {
    let value = value.trim();
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.date_naive()))
        .ok_or_else(|| DerivationError::UnparsableDate(value.to_string()))?;

    // Four-digit years only
    if !(1000..=9999).contains(&date.year()) {
        return Err(DerivationError::UnparsableDate(value.to_string()));
    }

    Ok(date.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    const RULE: DerivationRule = DerivationRule::DateParts {
        source: "EFFECTIVE_DATE",
        targets: ["EFFECTIVE_DAY", "EFFECTIVE_MONTH", "EFFECTIVE_YEAR"],
    };

    #[test]
    fn test_date_parts_from_iso_date() {
        let parts = date_parts("2025-03-05").unwrap();
        assert_eq!(
            parts,
            DateParts {
                day: 5,
                month: "March",
                year: 2025
            }
        );
    }

    #[test]
    fn test_date_parts_from_timestamp() {
        let parts = date_parts("2024-12-31T23:00:00+00:00").unwrap();
        assert_eq!(parts.day, 31);
        assert_eq!(parts.month, "December");
        assert_eq!(parts.year, 2024);
    }

    #[test]
    fn test_date_parts_rejects_garbage() {
        for input in ["", "2025-13-01", "2025-02-30", "yesterday", "2025-0", "12/03/2025"] {
            assert!(date_parts(input).is_err(), "{input:?}");
        }
    }

    #[test]
    fn test_date_parts_rejects_short_years() {
        assert!(date_parts("0099-01-01").is_err());
    }

    #[test]
    fn test_rule_derive_values() {
        let derived = RULE.derive(&FieldValue::Text("2025-03-05".into())).unwrap();
        assert_eq!(
            derived,
            vec![
                ("EFFECTIVE_DAY", FieldValue::Number(5)),
                ("EFFECTIVE_MONTH", FieldValue::Text("March".into())),
                ("EFFECTIVE_YEAR", FieldValue::Number(2025)),
            ]
        );
    }

    #[test]
    fn test_rule_derive_rejects_non_text() {
        assert_eq!(RULE.derive(&FieldValue::Empty), Err(DerivationError::NotText));
    }

    #[test]
    fn test_rule_accessors() {
        assert_eq!(RULE.source(), "EFFECTIVE_DATE");
        assert_eq!(RULE.targets().len(), 3);
    }
}
