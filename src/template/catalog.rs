//! Document catalogue
//!
//! Per document type: the alias table, friendly blank labels, form sections,
//! initial values and derivation rules. Built once on first use and shared
//! read-only for the life of the process.

use super::resolver::AliasTable;
use crate::state::DerivationRule;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Supported document types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    Founders,
    Nda,
}

impl DocumentType {
    pub const ALL: [DocumentType; 2] = [DocumentType::Founders, DocumentType::Nda];

    /// Identifier used by the backend routes
    pub fn slug(self) -> &'static str {
        match self {
            Self::Founders => "founders",
            Self::Nda => "nda",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Founders => "Founders' Agreement",
            Self::Nda => "Non-Disclosure Agreement",
        }
    }

    /// One-line description for the document picker
    pub fn summary(self) -> &'static str {
        match self {
            Self::Founders => "Roles, salary and restrictive covenants between founders",
            Self::Nda => "Mutual confidentiality ahead of a proposed transaction",
        }
    }

    /// File name for the generated PDF
    pub fn download_name(self) -> &'static str {
        match self {
            Self::Founders => "Founders_Agreement.pdf",
            Self::Nda => "NDA_Agreement.pdf",
        }
    }

    pub fn schema(self) -> &'static DocumentSchema {
        match self {
            Self::Founders => &FOUNDERS,
            Self::Nda => &NDA,
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for DocumentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "founders" => Ok(Self::Founders),
            "nda" => Ok(Self::Nda),
            other => Err(format!("unknown document type: {other}")),
        }
    }
}

/// Kind of form control backing a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// Digits only
    Number,
    /// `YYYY-MM-DD`
    Date,
    /// One of a fixed option list; the first option is the empty choice
    Select(&'static [&'static str]),
    /// Uploaded file stored as a data URI
    File,
}

/// A single form control definition
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub hint: &'static str,
}

impl FieldSpec {
    const fn new(key: &'static str, label: &'static str, kind: FieldKind, hint: &'static str) -> Self {
        Self {
            key,
            label,
            kind,
            hint,
        }
    }
}

/// A collapsible group of controls
#[derive(Debug, Clone, Copy)]
pub struct SectionSpec {
    pub title: &'static str,
    pub expanded: bool,
    pub fields: &'static [FieldSpec],
}

/// Initial value of a field at session start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitialValue {
    Text(&'static str),
    /// Today's date as `YYYY-MM-DD`
    Today,
}

/// Everything the engine needs to know about one document type
#[derive(Debug)]
pub struct DocumentSchema {
    pub doc_type: DocumentType,
    pub aliases: AliasTable,
    friendly_names: HashMap<&'static str, &'static str>,
    pub sections: &'static [SectionSpec],
    pub derivations: &'static [DerivationRule],
    pub initial_values: &'static [(&'static str, InitialValue)],
}

impl DocumentSchema {
    /// Human-friendly blank label for a canonical key
    pub fn friendly_label(&self, key: &str) -> String {
        match self.friendly_names.get(key) {
            Some(name) => (*name).to_string(),
            None => key.replace('_', " ").to_lowercase(),
        }
    }

    /// Whether `key` is computed from another field
    pub fn is_derived(&self, key: &str) -> bool {
        self.derivations
            .iter()
            .any(|rule| rule.targets().iter().any(|target| *target == key))
    }

    /// All controls, in form order
    pub fn fields(&self) -> impl Iterator<Item = &'static FieldSpec> {
        self.sections.iter().flat_map(|section| section.fields.iter())
    }

    pub fn field(&self, key: &str) -> Option<&'static FieldSpec> {
        self.fields().find(|field| field.key == key)
    }

    /// Every key the session store starts with
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields()
            .map(|field| field.key)
            .chain(self.derivations.iter().flat_map(|rule| rule.targets().iter().copied()))
    }
}

const FOUNDERS_ALIASES: &[(&str, &str)] = &[
    ("company.name", "COMPANY_NAME"),
    ("company.address", "COMPANY_ADDRESS"),
    ("authorized.signatory.name", "COMPANY_SIGNATORY_NAME"),
    ("authorized.signatory.designation", "COMPANY_SIGNATORY_DESIGNATION"),
    ("founder.name", "FOUNDER_NAME"),
    ("founder.address", "FOUNDER_ADDRESS"),
    ("founder.designation", "FOUNDER_DESIGNATION"),
    ("founder.salary", "FOUNDER_SALARY"),
    ("founder.salary.words", "FOUNDER_SALARY_WORDS"),
    ("noncompete.period", "NONCOMPETE_PERIOD"),
    ("notice.period", "NOTICE_PERIOD"),
    ("severance.amount", "SEVERANCE_AMOUNT"),
    ("effective.date", "EFFECTIVE_DATE"),
    ("jurisdiction.city", "JURISDICTION_CITY"),
];

const FOUNDERS_FRIENDLY: &[(&str, &str)] = &[
    ("COMPANY_NAME", "Company Name"),
    ("COMPANY_ADDRESS", "Company Address"),
    ("COMPANY_SIGNATORY_NAME", "Signatory Name"),
    ("COMPANY_SIGNATORY_DESIGNATION", "Signatory Designation"),
    ("FOUNDER_NAME", "Founder Name"),
    ("FOUNDER_ADDRESS", "Founder Address"),
    ("FOUNDER_DESIGNATION", "Founder Designation"),
    ("FOUNDER_SALARY", "Salary Amount"),
    ("FOUNDER_SALARY_WORDS", "Salary in Words"),
    ("NONCOMPETE_PERIOD", "Non-compete Period"),
    ("NOTICE_PERIOD", "Notice Period"),
    ("SEVERANCE_AMOUNT", "Severance Amount"),
    ("EFFECTIVE_DATE", "Effective Date"),
    ("JURISDICTION_CITY", "Jurisdiction City"),
];

const FOUNDERS_SECTIONS: &[SectionSpec] = &[
    SectionSpec {
        title: "Company Details",
        expanded: true,
        fields: &[
            FieldSpec::new("COMPANY_NAME", "Company Name", FieldKind::Text, "e.g., TechInnovate Pvt. Ltd."),
            FieldSpec::new("COMPANY_ADDRESS", "Company Address", FieldKind::Text, "e.g., 123 Tech Park, Saravanampatti"),
            FieldSpec::new("COMPANY_SIGNATORY_NAME", "Authorized Signatory Name", FieldKind::Text, "e.g., Jane Doe"),
            FieldSpec::new("COMPANY_SIGNATORY_DESIGNATION", "Signatory Designation", FieldKind::Text, "e.g., CEO"),
        ],
    },
    SectionSpec {
        title: "Founder Details",
        expanded: false,
        fields: &[
            FieldSpec::new("FOUNDER_NAME", "Founder Name", FieldKind::Text, "e.g., Ravi Kumar"),
            FieldSpec::new("FOUNDER_ADDRESS", "Founder Address", FieldKind::Text, "e.g., 456 Main St, R.S. Puram"),
            FieldSpec::new("FOUNDER_DESIGNATION", "Founder Designation", FieldKind::Text, "e.g., CTO"),
            FieldSpec::new("FOUNDER_SALARY", "Salary (₹)", FieldKind::Number, "e.g., 150000"),
            FieldSpec::new("FOUNDER_SALARY_WORDS", "Salary in Words", FieldKind::Text, "e.g., One Lakh Fifty Thousand"),
        ],
    },
    SectionSpec {
        title: "Agreement Terms",
        expanded: false,
        fields: &[
            FieldSpec::new("EFFECTIVE_DATE", "Effective Date", FieldKind::Date, "YYYY-MM-DD"),
            FieldSpec::new("NONCOMPETE_PERIOD", "Non-Compete (months)", FieldKind::Number, "e.g., 12"),
            FieldSpec::new("NOTICE_PERIOD", "Notice Period (days)", FieldKind::Number, "e.g., 30"),
            FieldSpec::new("SEVERANCE_AMOUNT", "Severance (months)", FieldKind::Number, "e.g., 1"),
            FieldSpec::new("JURISDICTION_CITY", "Jurisdiction City", FieldKind::Text, "e.g., Coimbatore"),
        ],
    },
];

const FOUNDERS_INITIAL: &[(&str, InitialValue)] = &[
    ("EFFECTIVE_DATE", InitialValue::Today),
    ("NONCOMPETE_PERIOD", InitialValue::Text("12")),
    ("NOTICE_PERIOD", InitialValue::Text("30")),
    ("SEVERANCE_AMOUNT", InitialValue::Text("1")),
    ("JURISDICTION_CITY", InitialValue::Text("Coimbatore")),
];

const NDA_ALIASES: &[(&str, &str)] = &[
    ("effective.date", "EFFECTIVE_DATE"),
    ("effective.day", "EFFECTIVE_DAY"),
    ("effective.month", "EFFECTIVE_MONTH"),
    ("effective.year", "EFFECTIVE_YEAR"),
    ("party.1.name", "PARTY_1_NAME"),
    ("party.1.address", "PARTY_1_ADDRESS"),
    ("party.1.short.name", "PARTY_1_SHORT_NAME"),
    ("party.1.signatory.name", "PARTY_1_SIGNATORY_NAME"),
    ("party.1.signatory.designation", "PARTY_1_SIGNATORY_DESIGNATION"),
    ("party.1.sign.place", "PARTY_1_SIGN_PLACE"),
    ("party.1.signature", "PARTY_1_SIGNATURE"),
    ("party.2.name", "PARTY_2_NAME"),
    ("party.2.address", "PARTY_2_ADDRESS"),
    ("party.2.signatory.name", "PARTY_2_SIGNATORY_NAME"),
    ("party.2.signatory.designation", "PARTY_2_SIGNATORY_DESIGNATION"),
    ("party.2.sign.place", "PARTY_2_SIGN_PLACE"),
    ("party.2.signature", "PARTY_2_SIGNATURE"),
    ("proposed.transaction", "PROPOSED_TRANSACTION"),
];

const NDA_FRIENDLY: &[(&str, &str)] = &[
    ("EFFECTIVE_DATE", "Effective Date"),
    ("EFFECTIVE_DAY", "Day"),
    ("EFFECTIVE_MONTH", "Month"),
    ("EFFECTIVE_YEAR", "Year"),
    ("PARTY_1_NAME", "Party 1 Name"),
    ("PARTY_1_ADDRESS", "Party 1 Address"),
    ("PARTY_1_SHORT_NAME", "Party 1 Short Name"),
    ("PARTY_1_SIGNATORY_NAME", "Party 1 Signatory"),
    ("PARTY_1_SIGNATORY_DESIGNATION", "Party 1 Designation"),
    ("PARTY_1_SIGN_PLACE", "Party 1 Sign Place"),
    ("PARTY_2_NAME", "Party 2 Name"),
    ("PARTY_2_ADDRESS", "Party 2 Address"),
    ("PARTY_2_SIGNATORY_NAME", "Party 2 Signatory"),
    ("PARTY_2_SIGNATORY_DESIGNATION", "Party 2 Designation"),
    ("PARTY_2_SIGN_PLACE", "Party 2 Sign Place"),
    ("PROPOSED_TRANSACTION", "Proposed Transaction"),
];

const TRANSACTION_OPTIONS: &[&str] = &[
    "",
    "Merger or Acquisition",
    "Strategic Partnership",
    "Software Licensing",
    "Investment Review",
    "Vendor/Supplier Agreement",
    "Employment/Contractor",
    "Other",
];

const NDA_SECTIONS: &[SectionSpec] = &[
    SectionSpec {
        title: "Agreement & Terms",
        expanded: true,
        fields: &[
            FieldSpec::new("EFFECTIVE_DATE", "Effective Date", FieldKind::Date, "YYYY-MM-DD"),
            FieldSpec::new(
                "PROPOSED_TRANSACTION",
                "Proposed Transaction",
                FieldKind::Select(TRANSACTION_OPTIONS),
                "Select...",
            ),
        ],
    },
    SectionSpec {
        title: "Party 1 Details (Disclosing Party)",
        expanded: false,
        fields: &[
            FieldSpec::new("PARTY_1_NAME", "Party 1 Name", FieldKind::Text, "e.g., Your Company Inc."),
            FieldSpec::new("PARTY_1_ADDRESS", "Party 1 Address", FieldKind::Text, "e.g., 123 Main St, Coimbatore"),
            FieldSpec::new(
                "PARTY_1_SHORT_NAME",
                "Short Reference Name (e.g., Discloser)",
                FieldKind::Text,
                "e.g., Discloser",
            ),
            FieldSpec::new("PARTY_1_SIGNATORY_NAME", "Signatory Name", FieldKind::Text, "e.g., John Doe"),
            FieldSpec::new("PARTY_1_SIGNATORY_DESIGNATION", "Signatory Designation", FieldKind::Text, "e.g., CEO"),
            FieldSpec::new("PARTY_1_SIGN_PLACE", "Place of Signing", FieldKind::Text, "e.g., Coimbatore"),
            FieldSpec::new("PARTY_1_SIGNATURE", "Party 1 Signature Upload", FieldKind::File, "path to image"),
        ],
    },
    SectionSpec {
        title: "Party 2 Details (Receiving Party)",
        expanded: false,
        fields: &[
            FieldSpec::new("PARTY_2_NAME", "Party 2 Name", FieldKind::Text, "e.g., Other Company LLC"),
            FieldSpec::new("PARTY_2_ADDRESS", "Party 2 Address", FieldKind::Text, "e.g., 456 Business Ave, Bangalore"),
            FieldSpec::new("PARTY_2_SIGNATORY_NAME", "Signatory Name", FieldKind::Text, "e.g., Jane Smith"),
            FieldSpec::new("PARTY_2_SIGNATORY_DESIGNATION", "Signatory Designation", FieldKind::Text, "e.g., Founder"),
            FieldSpec::new("PARTY_2_SIGN_PLACE", "Place of Signing", FieldKind::Text, "e.g., Bangalore"),
            FieldSpec::new("PARTY_2_SIGNATURE", "Party 2 Signature Upload", FieldKind::File, "path to image"),
        ],
    },
];

const NDA_DERIVATIONS: &[DerivationRule] = &[DerivationRule::DateParts {
    source: "EFFECTIVE_DATE",
    targets: ["EFFECTIVE_DAY", "EFFECTIVE_MONTH", "EFFECTIVE_YEAR"],
}];

const NDA_INITIAL: &[(&str, InitialValue)] = &[("EFFECTIVE_DATE", InitialValue::Today)];

static FOUNDERS: LazyLock<DocumentSchema> = LazyLock::new(|| DocumentSchema {
    doc_type: DocumentType::Founders,
    aliases: AliasTable::new(FOUNDERS_ALIASES),
    friendly_names: FOUNDERS_FRIENDLY.iter().copied().collect(),
    sections: FOUNDERS_SECTIONS,
    derivations: &[],
    initial_values: FOUNDERS_INITIAL,
});

static NDA: LazyLock<DocumentSchema> = LazyLock::new(|| DocumentSchema {
    doc_type: DocumentType::Nda,
    aliases: AliasTable::new(NDA_ALIASES),
    friendly_names: NDA_FRIENDLY.iter().copied().collect(),
    sections: NDA_SECTIONS,
    derivations: NDA_DERIVATIONS,
    initial_values: NDA_INITIAL,
});

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::FieldStore;
    use crate::template::resolver::{resolve_key, KnownKeys};
    use crate::template::scanner::scan;
    use std::collections::HashSet;

    const FOUNDERS_TEMPLATE: &str = include_str!("../../templates/founders.html");
    const NDA_TEMPLATE: &str = include_str!("../../templates/nda.html");

    struct SchemaKeys(HashSet<&'static str>);

    impl KnownKeys for SchemaKeys {
        fn is_known_key(&self, key: &str) -> bool {
            self.0.contains(key)
        }
    }

    fn template_for(doc: DocumentType) -> &'static str {
        match doc {
            DocumentType::Founders => FOUNDERS_TEMPLATE,
            DocumentType::Nda => NDA_TEMPLATE,
        }
    }

    #[test]
    fn test_document_type_round_trips_through_slug() {
        for doc in DocumentType::ALL {
            assert_eq!(doc.slug().parse::<DocumentType>(), Ok(doc));
        }
        assert!("lease".parse::<DocumentType>().is_err());
        assert_eq!(" NDA ".parse::<DocumentType>(), Ok(DocumentType::Nda));
    }

    #[test]
    fn test_document_type_serializes_as_slug() {
        assert_eq!(serde_json::to_string(&DocumentType::Founders).unwrap(), "\"founders\"");
    }

    #[test]
    fn test_every_alias_targets_a_control_or_derived_key() {
        for doc in DocumentType::ALL {
            let schema = doc.schema();
            for (label, key) in schema.aliases.iter() {
                assert!(
                    schema.field(key).is_some() || schema.is_derived(key),
                    "{doc}: alias {label} -> {key} has no control"
                );
            }
        }
    }

    #[test]
    fn test_every_alias_resolves_in_any_casing() {
        for doc in DocumentType::ALL {
            let schema = doc.schema();
            let store = FieldStore::with_keys(schema.derivations, schema.keys());
            for (label, key) in schema.aliases.iter() {
                for variant in [label.to_string(), label.to_uppercase(), format!("  {}\t", label.to_uppercase())] {
                    assert_eq!(
                        resolve_key(&variant, &store, &schema.aliases),
                        key,
                        "{doc}: {variant:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_field_keys_are_unique() {
        for doc in DocumentType::ALL {
            let schema = doc.schema();
            let mut seen = HashSet::new();
            for field in schema.fields() {
                assert!(seen.insert(field.key), "{doc}: duplicate key {}", field.key);
            }
        }
    }

    #[test]
    fn test_derived_keys_have_no_control() {
        let schema = DocumentType::Nda.schema();
        for key in ["EFFECTIVE_DAY", "EFFECTIVE_MONTH", "EFFECTIVE_YEAR"] {
            assert!(schema.is_derived(key));
            assert!(schema.field(key).is_none());
        }
        assert!(!schema.is_derived("EFFECTIVE_DATE"));
    }

    #[test]
    fn test_friendly_label_override_and_fallback() {
        let schema = DocumentType::Nda.schema();
        assert_eq!(schema.friendly_label("PARTY_1_SIGNATORY_NAME"), "Party 1 Signatory");
        assert_eq!(schema.friendly_label("TOTALLY_UNKNOWN_FIELD"), "totally unknown field");
        assert_eq!(schema.friendly_label(""), "");
    }

    #[test]
    fn test_exactly_one_section_starts_expanded() {
        for doc in DocumentType::ALL {
            let expanded = doc.schema().sections.iter().filter(|s| s.expanded).count();
            assert_eq!(expanded, 1, "{doc}");
        }
    }

    #[test]
    fn test_bundled_templates_only_reference_known_keys() {
        for doc in DocumentType::ALL {
            let schema = doc.schema();
            let known = SchemaKeys(schema.keys().collect());
            for token in scan(template_for(doc)) {
                let key = resolve_key(token.label, &known, &schema.aliases);
                assert!(
                    schema.field(&key).is_some() || schema.is_derived(&key),
                    "{doc}: placeholder {:?} resolves to {key} with no control",
                    token.label
                );
            }
        }
    }

    #[test]
    fn test_initial_values_target_controls() {
        for doc in DocumentType::ALL {
            let schema = doc.schema();
            for (key, _) in schema.initial_values {
                assert!(schema.field(key).is_some(), "{doc}: {key}");
            }
        }
    }
}
