//! Placeholder label to canonical field key resolution
//!
//! Resolution order, first match wins:
//! 1. the label as written is already a key present in the store
//! 2. the trimmed, lower-cased label is in the alias table
//! 3. runs of non-alphanumeric characters become `_`, then upper-case
//!
//! A label that yields no alphanumeric character resolves to the empty key,
//! which renders as an inert blank.

use std::collections::HashMap;

/// Case-insensitive mapping from dotted labels to canonical keys
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    entries: HashMap<String, &'static str>,
}

impl AliasTable {
    /// Build a table from `(label, canonical key)` pairs
    pub fn new(pairs: &[(&str, &'static str)]) -> Self {
        let entries = pairs
            .iter()
            .map(|(label, key)| (label.trim().to_lowercase(), *key))
            .collect();
        Self { entries }
    }

    /// Look up a label, ignoring case and surrounding whitespace
    pub fn lookup(&self, label: &str) -> Option<&'static str> {
        self.entries.get(&label.trim().to_lowercase()).copied()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterate over `(normalized label, canonical key)` pairs
    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = (&str, &'static str)> {
        self.entries.iter().map(|(label, key)| (label.as_str(), *key))
    }
}

/// Anything that can answer "is this already a canonical key?"
pub trait KnownKeys {
    fn is_known_key(&self, key: &str) -> bool;
}

impl KnownKeys for () {
    fn is_known_key(&self, _key: &str) -> bool {
        false
    }
}

/// Resolve a raw placeholder label to its canonical key
pub fn resolve_key(label: &str, known: &impl KnownKeys, aliases: &AliasTable) -> String {
    if !label.is_empty() && known.is_known_key(label) {
        return label.to_string();
    }

    if let Some(key) = aliases.lookup(label) {
        return key.to_string();
    }

    fallback_key(label)
}

/// Deterministic fallback transform used when no alias applies.
///
/// A label with no ASCII alphanumeric character is unusable and yields the
/// empty key, which renders as an inert blank that links to no control.
pub fn fallback_key(label: &str) -> String {
    let label = label.trim();
    if !label.chars().any(|c| c.is_ascii_alphanumeric()) {
        return String::new();
    }

    let mut key = String::with_capacity(label.len());
    let mut in_separator = false;
    for c in label.chars() {
        if c.is_ascii_alphanumeric() {
            key.push(c.to_ascii_uppercase());
            in_separator = false;
        } else if !in_separator {
            key.push('_');
            in_separator = true;
        }
    }
    key
}

/// Whether a key can be linked to a form control
pub fn is_resolvable(key: &str) -> bool {
    !key.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    struct Keys(HashSet<&'static str>);

    impl KnownKeys for Keys {
        fn is_known_key(&self, key: &str) -> bool {
            self.0.contains(key)
        }
    }

    fn aliases() -> AliasTable {
        AliasTable::new(&[
            ("company.name", "COMPANY_NAME"),
            ("party.1.signature", "PARTY_1_SIGNATURE"),
            ("effective.date", "EFFECTIVE_DATE"),
        ])
    }

    mod alias_table {
        use super::*;

        #[test]
        fn test_lookup_ignores_case_and_padding() {
            let table = aliases();
            assert_eq!(table.lookup("company.name"), Some("COMPANY_NAME"));
            assert_eq!(table.lookup("  Company.NAME "), Some("COMPANY_NAME"));
            assert_eq!(table.lookup("company name"), None);
        }

        #[test]
        fn test_entries_are_normalized_on_build() {
            let table = AliasTable::new(&[(" Founder.Name ", "FOUNDER_NAME")]);
            assert_eq!(table.lookup("founder.name"), Some("FOUNDER_NAME"));
            assert_eq!(table.len(), 1);
        }
    }

    mod fallback {
        use super::*;

        #[test]
        fn test_collapses_separator_runs() {
            assert_eq!(fallback_key("totally unknown  field"), "TOTALLY_UNKNOWN_FIELD");
            assert_eq!(fallback_key("a.-b"), "A_B");
        }

        #[test]
        fn test_keeps_edge_separators() {
            assert_eq!(fallback_key("(note)"), "_NOTE_");
        }

        #[test]
        fn test_non_ascii_counts_as_separator() {
            assert_eq!(fallback_key("café name"), "CAF_NAME");
        }

        #[test]
        fn test_unusable_labels_are_empty() {
            assert_eq!(fallback_key(""), "");
            assert_eq!(fallback_key("   "), "");
            assert_eq!(fallback_key("--!"), "");
        }
    }

    mod resolve {
        use super::*;

        #[test]
        fn test_exact_key_fast_path_wins() {
            // A literal key in the store is never remapped, even if an alias exists
            let known = Keys(HashSet::from(["company.name"]));
            assert_eq!(resolve_key("company.name", &known, &aliases()), "company.name");
        }

        #[test]
        fn test_exact_key_is_case_sensitive() {
            let known = Keys(HashSet::from(["COMPANY_NAME"]));
            assert_eq!(resolve_key("company_name", &known, &aliases()), "COMPANY_NAME");
        }

        #[test]
        fn test_alias_any_casing() {
            for label in ["party.1.signature", "PARTY.1.SIGNATURE", " Party.1.Signature  "] {
                assert_eq!(resolve_key(label, &(), &aliases()), "PARTY_1_SIGNATURE");
            }
        }

        #[test]
        fn test_unknown_label_falls_back() {
            assert_eq!(
                resolve_key("totally unknown field", &(), &aliases()),
                "TOTALLY_UNKNOWN_FIELD"
            );
        }

        #[test]
        fn test_empty_label_is_unresolvable() {
            let key = resolve_key("", &(), &aliases());
            assert!(!is_resolvable(&key));
        }

        #[test]
        fn test_idempotent_for_non_alias_labels() {
            let table = aliases();
            for label in ["foo bar", "x__y", "(wrapped)", "MiXeD.case-label", "!!", "A1 b2"] {
                let once = resolve_key(label, &(), &table);
                let twice = resolve_key(&once, &(), &table);
                assert_eq!(once, twice, "label {label:?}");
            }
        }

        #[test]
        fn test_canonical_keys_resolve_to_themselves() {
            let table = aliases();
            for (_, key) in table.iter() {
                assert_eq!(resolve_key(key, &(), &table), key);
            }
        }

        #[test]
        fn test_deterministic() {
            let table = aliases();
            let a = resolve_key("Founder's start date", &(), &table);
            let b = resolve_key("Founder's start date", &(), &table);
            assert_eq!(a, b);
        }
    }
}
