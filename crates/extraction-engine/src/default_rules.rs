//! Built-in rule set for the standard consultation form layout.
//!
//! Ordering within a field runs most-anchored first: an exact label match
//! outranks a keyword-proximity match, which outranks a bare value-shape
//! scan. Confidence tiers follow the same gradient.

use shared_types::{Confidence, FieldId};

use crate::normalize::Normalizer;
use crate::rules::{ExtractionRule, PageRegion, RulePattern};

fn anchored(name: &str, field: FieldId, confidence: Confidence, pattern: &str) -> ExtractionRule {
    ExtractionRule {
        name: name.to_string(),
        field,
        confidence,
        pattern: RulePattern::AnchoredPattern {
            pattern: pattern.to_string(),
        },
        normalizer: None,
    }
}

fn with_normalizer(mut rule: ExtractionRule, normalizer: Normalizer) -> ExtractionRule {
    rule.normalizer = Some(normalizer);
    rule
}

fn checked(name: &str, field: FieldId, confidence: Confidence, options: &[&str]) -> ExtractionRule {
    ExtractionRule {
        name: name.to_string(),
        field,
        confidence,
        pattern: RulePattern::CheckedOption {
            options: options.iter().map(|o| o.to_string()).collect(),
        },
        normalizer: None,
    }
}

pub fn default_rules() -> Vec<ExtractionRule> {
    vec![
        // Business identity
        anchored(
            "business_name_label",
            FieldId::BusinessName,
            Confidence::High,
            r"^business\s*name\s*:?\s*(.+)$",
        ),
        anchored(
            "dba_label",
            FieldId::BusinessName,
            Confidence::Medium,
            r"^d\.?b\.?a\.?\s*:?\s*(.+)$",
        ),
        anchored(
            "client_name_label",
            FieldId::ClientName,
            Confidence::High,
            r"^(?:contact\s+)?name\s*:?\s*(.+)$",
        ),
        // Contact details
        anchored(
            "email_label",
            FieldId::Email,
            Confidence::High,
            r"^e[-\s]?mail\s*:?\s*(\S+)",
        ),
        anchored(
            "email_shape",
            FieldId::Email,
            Confidence::Low,
            r"([A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,})",
        ),
        anchored(
            "phone_label",
            FieldId::Phone,
            Confidence::High,
            r"^phone\s*:?\s*(.+)$",
        ),
        anchored(
            "phone_shape",
            FieldId::Phone,
            Confidence::Low,
            r"(\(?\d{3}\)?[-. ]\d{3}[-. ]\d{4})",
        ),
        anchored(
            "address_label",
            FieldId::Address,
            Confidence::High,
            r"^(?:street\s+)?address\s*:?\s*(.+)$",
        ),
        anchored(
            "city_label",
            FieldId::City,
            Confidence::High,
            r"^city\s*:?\s*(.+)$",
        ),
        anchored(
            "zip_label",
            FieldId::Zip,
            Confidence::High,
            r"^zip(?:\s*code)?\s*:?\s*(\d{5})\b",
        ),
        ExtractionRule {
            name: "zip_near_keyword".to_string(),
            field: FieldId::Zip,
            confidence: Confidence::Medium,
            pattern: RulePattern::ProximityKeyword {
                keyword: "zip".to_string(),
                value_pattern: r"\b(\d{5})\b".to_string(),
                window: 1,
            },
            normalizer: None,
        },
        // Session details
        with_normalizer(
            anchored(
                "session_date_label",
                FieldId::ConsultationDate,
                Confidence::High,
                r"^(?:session|consultation)\s+date\s*:?\s*(.+)$",
            ),
            Normalizer::DateUs,
        ),
        with_normalizer(
            anchored(
                "date_label",
                FieldId::ConsultationDate,
                Confidence::High,
                r"^date\s*:?\s*(.+)$",
            ),
            Normalizer::DateUs,
        ),
        with_normalizer(
            anchored(
                "date_shape",
                FieldId::ConsultationDate,
                Confidence::Low,
                r"\b(\d{1,2}[/-]\d{1,2}[/-]\d{2,4})\b",
            ),
            Normalizer::DateUs,
        ),
        anchored(
            "advisor_label",
            FieldId::Advisor,
            Confidence::High,
            r"^advisor\s*:?\s*(.+)$",
        ),
        anchored(
            "program_label",
            FieldId::Program,
            Confidence::High,
            r"^program\s*:?\s*(.+)$",
        ),
        anchored(
            "consultation_type_label",
            FieldId::ConsultationType,
            Confidence::High,
            r"^type\s+of\s+consultation\s*:?.*?\b(operations|marketing|financing|legal|accounting)\b",
        ),
        anchored(
            "consultation_type_keyword",
            FieldId::ConsultationType,
            Confidence::Low,
            r"\b(operations|marketing|financing|legal|accounting)\b",
        ),
        with_normalizer(
            anchored(
                "contact_time_label",
                FieldId::DurationHours,
                Confidence::High,
                r"^contact\s+time\s*:?\s*(\d+(?:\.\d+)?)",
            ),
            Normalizer::Digits,
        ),
        with_normalizer(
            anchored(
                "duration_label",
                FieldId::DurationHours,
                Confidence::High,
                r"^(?:consultation\s+)?(?:length|duration)(?:\s*\(hours\))?\s*:?\s*(\d+(?:\.\d+)?)",
            ),
            Normalizer::Digits,
        ),
        // Categorical checkbox groups
        anchored(
            "language_label",
            FieldId::Language,
            Confidence::High,
            r"^language(?:\s+of\s+consultation)?\s*:?.*?\b(english|spanish)\b",
        ),
        checked(
            "language_checked",
            FieldId::Language,
            Confidence::Medium,
            &["English", "Spanish"],
        ),
        checked(
            "business_stage_checked",
            FieldId::BusinessStage,
            Confidence::Medium,
            &[
                "Seed/Idea Phase",
                "Start up Phase",
                "Growth Phase",
                "Expansion Phase",
                "Maturity/Exit Phase",
            ],
        ),
        ExtractionRule {
            name: "business_stage_near_keyword".to_string(),
            field: FieldId::BusinessStage,
            confidence: Confidence::Low,
            pattern: RulePattern::ProximityKeyword {
                keyword: "business stage".to_string(),
                value_pattern:
                    r"((?:seed/idea|start\s*up|growth|expansion|maturity/exit)\s*phase)".to_string(),
                window: 2,
            },
            normalizer: None,
        },
        // Free-text notes: usually the bottom of the page, and only worth
        // keeping when there is substantial text after the label.
        with_normalizer(
            ExtractionRule {
                name: "notes_section".to_string(),
                field: FieldId::Notes,
                confidence: Confidence::Medium,
                pattern: RulePattern::PositionalRegion {
                    region: PageRegion::Bottom,
                    pattern: r"(?s)(?:consultation\s+)?notes\s*:?\s*(.{20,})".to_string(),
                },
                normalizer: None,
            },
            Normalizer::CollapseWhitespace,
        ),
        with_normalizer(
            ExtractionRule {
                name: "notes_anywhere".to_string(),
                field: FieldId::Notes,
                confidence: Confidence::Low,
                pattern: RulePattern::PositionalRegion {
                    region: PageRegion::Any,
                    pattern: r"(?s)consultation\s+notes\s*:?\s*(.{20,})".to_string(),
                },
                normalizer: None,
            },
            Normalizer::CollapseWhitespace,
        ),
    ]
}
