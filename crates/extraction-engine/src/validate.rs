//! Record validation: presence, conformance, consistency.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use shared_types::{
    ConsultationRecord, DataType, FieldExtraction, FieldId, FieldValue, Severity,
    ValidationResult, ValidationStatus, ValidationWarning, WarningKind,
};

lazy_static! {
    static ref EMAIL_SHAPE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    static ref ZIP_SHAPE: Regex = Regex::new(r"^\d{5}$").unwrap();
}

/// Longest plausible single consultation, in hours.
const MAX_DURATION_HOURS: f64 = 12.0;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RequirementSpec {
    pub required: Vec<FieldId>,
}

impl Default for RequirementSpec {
    fn default() -> Self {
        Self {
            required: vec![
                FieldId::BusinessName,
                FieldId::ClientName,
                FieldId::ConsultationDate,
            ],
        }
    }
}

impl RequirementSpec {
    pub fn is_required(&self, field: FieldId) -> bool {
        self.required.contains(&field)
    }
}

pub struct Validator {
    requirements: RequirementSpec,
}

impl Validator {
    pub fn new(requirements: RequirementSpec) -> Self {
        Self { requirements }
    }

    /// Validate one parsed record.
    ///
    /// `today` is the record-processing date, passed in so validation is
    /// deterministic and testable. Checks run in a fixed order: required
    /// presence, per-field conformance, cross-field consistency, conflict
    /// surfacing, confidence surfacing. Status is `Valid` only with zero
    /// warnings; `Invalid` whenever a required field is missing or
    /// malformed, or a hard consistency rule fails.
    pub fn validate(
        &self,
        record: &ConsultationRecord,
        extractions: &[FieldExtraction],
        today: NaiveDate,
    ) -> ValidationResult {
        let mut warnings = Vec::new();
        let mut invalid = false;

        // 1. Required-field presence. Values are left absent, never
        //    defaulted; downstream must see the gap explicitly.
        for &field in &self.requirements.required {
            if record.get(field).is_none() {
                invalid = true;
                warnings.push(ValidationWarning {
                    field: Some(field),
                    kind: WarningKind::MissingRequiredField,
                    severity: Severity::Critical,
                    message: format!("required field '{field}' was not found in the document"),
                });
            }
        }

        // 2. Type/format conformance.
        for field in FieldId::ALL {
            let Some(value) = record.get(field) else {
                continue;
            };
            if let Some(message) = conformance_problem(field, value) {
                let required = self.requirements.is_required(field);
                if required {
                    invalid = true;
                }
                warnings.push(ValidationWarning {
                    field: Some(field),
                    kind: WarningKind::FormatError,
                    severity: if required {
                        Severity::Critical
                    } else {
                        Severity::Warning
                    },
                    message,
                });
            }
        }

        // 3. Cross-field consistency.
        if let Some(date) = record.get(FieldId::ConsultationDate).and_then(|v| v.as_date()) {
            if date > today {
                invalid = true;
                warnings.push(ValidationWarning {
                    field: Some(FieldId::ConsultationDate),
                    kind: WarningKind::FormatError,
                    severity: Severity::Critical,
                    message: format!(
                        "consultation date {date} is after the processing date {today}"
                    ),
                });
            }
        }
        if let Some(hours) = record.get(FieldId::DurationHours).and_then(|v| v.as_number()) {
            if hours <= 0.0 || hours > MAX_DURATION_HOURS {
                warnings.push(ValidationWarning {
                    field: Some(FieldId::DurationHours),
                    kind: WarningKind::FormatError,
                    severity: Severity::Warning,
                    message: format!("consultation length of {hours} hours is implausible"),
                });
            }
        }

        // 4. Cross-page conflicts, surfaced instead of auto-resolved.
        for extraction in extractions {
            if let Some(conflict) = &extraction.conflict {
                warnings.push(ValidationWarning {
                    field: Some(extraction.field),
                    kind: WarningKind::FieldConflict,
                    severity: Severity::Warning,
                    message: format!(
                        "field '{}' has a conflicting value '{}' on page {}",
                        extraction.field, conflict.value, conflict.page_index
                    ),
                });
            }
        }

        // 5. Low-confidence extractions with a real value.
        for extraction in extractions {
            let has_value = extraction
                .value
                .as_ref()
                .is_some_and(|v| !v.render().trim().is_empty());
            if extraction.confidence == shared_types::Confidence::Low && has_value {
                warnings.push(ValidationWarning {
                    field: Some(extraction.field),
                    kind: WarningKind::LowConfidence,
                    severity: Severity::Info,
                    message: format!(
                        "field '{}' was extracted by low-confidence rule '{}'",
                        extraction.field,
                        extraction.rule.as_deref().unwrap_or("unknown")
                    ),
                });
            }
        }

        let status = if invalid {
            ValidationStatus::Invalid
        } else if warnings.is_empty() {
            ValidationStatus::Valid
        } else {
            ValidationStatus::ValidWithWarnings
        };

        ValidationResult { status, warnings }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(RequirementSpec::default())
    }
}

/// Why a present value does not conform to its field, if it doesn't.
fn conformance_problem(field: FieldId, value: &FieldValue) -> Option<String> {
    match field.data_type() {
        DataType::Date => match value {
            FieldValue::Date(_) => None,
            other => Some(format!(
                "value '{}' could not be read as a calendar date",
                other.render()
            )),
        },
        DataType::Number => match value {
            FieldValue::Number(_) => None,
            other => Some(format!(
                "value '{}' could not be read as a number",
                other.render()
            )),
        },
        DataType::Choice => {
            let allowed = field.allowed_choices()?;
            let text = value.render();
            let conforms = allowed.iter().any(|a| a.eq_ignore_ascii_case(text.trim()));
            (!conforms).then(|| {
                format!(
                    "value '{}' is not one of the allowed options: {}",
                    text,
                    allowed.join(", ")
                )
            })
        }
        DataType::Text => {
            let text = value.render();
            match field {
                FieldId::Zip if !ZIP_SHAPE.is_match(text.trim()) => {
                    Some(format!("value '{text}' is not a 5-digit zip code"))
                }
                FieldId::Email if !EMAIL_SHAPE.is_match(text.trim()) => {
                    Some(format!("value '{text}' does not look like an email address"))
                }
                FieldId::Phone
                    if text.chars().filter(|c| c.is_ascii_digit()).count() < 7 =>
                {
                    Some(format!("value '{text}' does not look like a phone number"))
                }
                _ => None,
            }
        }
    }
}
