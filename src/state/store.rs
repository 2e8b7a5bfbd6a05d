//! Field value store
//!
//! One store per document session. Every write goes through [`FieldStore::set`]
//! so derived fields are recomputed before the next render.

use super::derive::DerivationRule;
use crate::template::resolver::KnownKeys;
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// Key fragment marking a binary payload (uploaded image) field
pub const BINARY_KEY_MARKER: &str = "SIGNATURE";

/// Whether `key` holds a data-URI payload rather than text
pub fn is_binary_key(key: &str) -> bool {
    key.contains(BINARY_KEY_MARKER)
}

/// A stored field value
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    #[default]
    Empty,
    Text(String),
    Number(i64),
    /// `data:<mime>;base64,<payload>`
    DataUri(String),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Absent, or text that is blank after trimming
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) | Self::DataUri(s) => s.trim().is_empty(),
            Self::Number(_) => false,
        }
    }

    /// Text form used for substitution and form display
    pub fn display(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(s) | Self::DataUri(s) => s.clone(),
            Self::Number(n) => n.to_string(),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Rejected store writes
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("field {0} is derived and cannot be set directly")]
    DerivedKey(String),
    #[error("field key must not be empty")]
    EmptyKey,
}

/// Canonical key → current value
#[derive(Debug, Clone, Default)]
pub struct FieldStore {
    values: BTreeMap<String, FieldValue>,
    rules: &'static [DerivationRule],
}

impl FieldStore {
    pub fn new(rules: &'static [DerivationRule]) -> Self {
        Self {
            values: BTreeMap::new(),
            rules,
        }
    }

    /// Store pre-populated with empty values for `keys`
    pub fn with_keys<'a>(rules: &'static [DerivationRule], keys: impl IntoIterator<Item = &'a str>) -> Self {
        let mut store = Self::new(rules);
        for key in keys {
            store.ensure(key);
        }
        store
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Whether `key` is a target of any derivation rule
    pub fn is_derived(&self, key: &str) -> bool {
        self.rules
            .iter()
            .any(|rule| rule.targets().iter().any(|target| *target == key))
    }

    /// Make sure `key` exists, inserting an empty value if needed
    pub fn ensure(&mut self, key: &str) {
        if !key.is_empty() && !self.values.contains_key(key) {
            self.values.insert(key.to_string(), FieldValue::Empty);
        }
    }

    /// Overwrite a value and recompute its dependants
    pub fn set(&mut self, key: &str, value: FieldValue) -> Result<(), FieldError> {
        if key.is_empty() {
            return Err(FieldError::EmptyKey);
        }
        if self.is_derived(key) {
            return Err(FieldError::DerivedKey(key.to_string()));
        }

        self.values.insert(key.to_string(), value);
        self.run_derivations(key);
        Ok(())
    }

    fn run_derivations(&mut self, key: &str) {
        let rules = self.rules;
        for rule in rules.iter().filter(|rule| rule.source() == key) {
            let Some(value) = self.values.get(key) else {
                continue;
            };
            match rule.derive(value) {
                Ok(updates) => {
                    for (target, derived) in updates {
                        self.values.insert(target.to_string(), derived);
                    }
                }
                Err(err) => {
                    // Dependants keep whatever they held before
                    tracing::debug!("Keeping derived values of {key}: {err}");
                }
            }
        }
    }

    /// Flattened copy of every key and value
    pub fn snapshot(&self) -> BTreeMap<String, FieldValue> {
        self.values.clone()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.values.len()
    }
}

impl KnownKeys for FieldStore {
    fn is_known_key(&self, key: &str) -> bool {
        self.contains(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RULES: &[DerivationRule] = &[DerivationRule::DateParts {
        source: "EFFECTIVE_DATE",
        targets: ["EFFECTIVE_DAY", "EFFECTIVE_MONTH", "EFFECTIVE_YEAR"],
    }];

    fn store() -> FieldStore {
        FieldStore::with_keys(RULES, ["EFFECTIVE_DATE", "COMPANY_NAME"])
    }

    mod values {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_is_empty() {
            assert!(FieldValue::Empty.is_empty());
            assert!(FieldValue::text("").is_empty());
            assert!(FieldValue::text("   ").is_empty());
            assert!(!FieldValue::text("x").is_empty());
            assert!(!FieldValue::Number(0).is_empty());
        }

        #[test]
        fn test_serializes_untagged() {
            let mut map = BTreeMap::new();
            map.insert("A", FieldValue::Empty);
            map.insert("B", FieldValue::text("b"));
            map.insert("C", FieldValue::Number(5));
            map.insert("D", FieldValue::DataUri("data:image/png;base64,AA==".into()));
            assert_eq!(
                serde_json::to_string(&map).unwrap(),
                r#"{"A":null,"B":"b","C":5,"D":"data:image/png;base64,AA=="}"#
            );
        }

        #[test]
        fn test_numeric_text_stays_a_string_on_the_wire() {
            let values = vec![FieldValue::text("5"), FieldValue::Number(5)];
            assert_eq!(serde_json::to_string(&values).unwrap(), r#"["5",5]"#);
        }

        #[test]
        fn test_binary_key_convention() {
            assert!(is_binary_key("PARTY_1_SIGNATURE"));
            assert!(is_binary_key("COMPANY_SIGNATURE"));
            assert!(!is_binary_key("PARTY_1_SIGNATORY_NAME"));
        }
    }

    mod store {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_with_keys_starts_empty() {
            let store = store();
            assert_eq!(store.get("COMPANY_NAME"), Some(&FieldValue::Empty));
            assert!(store.get("MISSING").is_none());
        }

        #[test]
        fn test_set_overwrites() {
            let mut store = store();
            store.set("COMPANY_NAME", "Acme".into()).unwrap();
            store.set("COMPANY_NAME", "Acme Ltd".into()).unwrap();
            assert_eq!(store.get("COMPANY_NAME"), Some(&FieldValue::text("Acme Ltd")));
        }

        #[test]
        fn test_set_effective_date_derives_parts() {
            let mut store = store();
            store.set("EFFECTIVE_DATE", "2025-03-05".into()).unwrap();
            assert_eq!(store.get("EFFECTIVE_DAY"), Some(&FieldValue::Number(5)));
            assert_eq!(store.get("EFFECTIVE_MONTH"), Some(&FieldValue::text("March")));
            assert_eq!(store.get("EFFECTIVE_YEAR"), Some(&FieldValue::Number(2025)));
        }

        #[test]
        fn test_unparsable_date_keeps_previous_parts() {
            let mut store = store();
            store.set("EFFECTIVE_DATE", "2025-03-05".into()).unwrap();
            store.set("EFFECTIVE_DATE", "not a date".into()).unwrap();

            assert_eq!(store.get("EFFECTIVE_DATE"), Some(&FieldValue::text("not a date")));
            assert_eq!(store.get("EFFECTIVE_DAY"), Some(&FieldValue::Number(5)));
            assert_eq!(store.get("EFFECTIVE_MONTH"), Some(&FieldValue::text("March")));
            assert_eq!(store.get("EFFECTIVE_YEAR"), Some(&FieldValue::Number(2025)));
        }

        #[test]
        fn test_unparsable_first_date_leaves_parts_unset() {
            let mut store = store();
            store.set("EFFECTIVE_DATE", "soon".into()).unwrap();
            assert!(store.get("EFFECTIVE_DAY").is_none());
        }

        #[test]
        fn test_derived_keys_reject_direct_writes() {
            let mut store = store();
            assert_eq!(
                store.set("EFFECTIVE_DAY", FieldValue::Number(9)),
                Err(FieldError::DerivedKey("EFFECTIVE_DAY".into()))
            );
        }

        #[test]
        fn test_empty_key_rejected() {
            let mut store = store();
            assert_eq!(store.set("", "x".into()), Err(FieldError::EmptyKey));
        }

        #[test]
        fn test_ensure_does_not_clobber() {
            let mut store = store();
            store.set("COMPANY_NAME", "Acme".into()).unwrap();
            store.ensure("COMPANY_NAME");
            store.ensure("");
            assert_eq!(store.get("COMPANY_NAME"), Some(&FieldValue::text("Acme")));
            assert!(!store.contains(""));
        }

        #[test]
        fn test_snapshot_is_sorted_and_complete() {
            let mut store = store();
            store.set("COMPANY_NAME", "Acme".into()).unwrap();
            let keys: Vec<_> = store.snapshot().into_keys().collect();
            assert_eq!(keys, vec!["COMPANY_NAME", "EFFECTIVE_DATE"]);
        }
    }
}
