//! Flattening validated records into the automation bot's input schema.
//!
//! Pure data mapping: the browser bot and CRM client live outside this
//! core and consume the payload as-is. Field names are stable snake_case
//! keys; static constants (agency, vendor, program) come from run
//! configuration, not from process-wide state.

use serde_json::{json, Value};
use shared_types::{FieldId, FormResult, ValidationStatus};

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SubmissionDefaults {
    pub delegate_agency: String,
    pub vendor_id: String,
    pub program: String,
    pub submitted_by: String,
    pub city: String,
    pub state: String,
}

/// Build the bot payload for one form, or `None` for an `Invalid` record.
/// Invalid records are routed to manual review, never auto-submitted.
pub fn build_submission(result: &FormResult, defaults: &SubmissionDefaults) -> Option<Value> {
    if result.validation.status == ValidationStatus::Invalid {
        return None;
    }
    let record = &result.record;

    let text = |field: FieldId| -> String {
        record.get(field).map(|v| v.render()).unwrap_or_default()
    };

    let client_name = text(FieldId::ClientName);
    let mut name_parts = client_name.split_whitespace();
    let first_name = name_parts.next().unwrap_or_default().to_string();
    let last_name = name_parts.collect::<Vec<_>>().join(" ");

    let consultation_date = record
        .get(FieldId::ConsultationDate)
        .and_then(|v| v.as_date())
        .map(|d| d.format("%m/%d/%Y").to_string())
        .unwrap_or_default();

    let city = {
        let extracted = text(FieldId::City);
        if extracted.is_empty() {
            defaults.city.clone()
        } else {
            extracted
        }
    };

    let program = {
        let extracted = text(FieldId::Program);
        if extracted.is_empty() {
            defaults.program.clone()
        } else {
            extracted
        }
    };

    Some(json!({
        "delegate_agency": defaults.delegate_agency,
        "vendor_id": defaults.vendor_id,
        "program": program,
        "submitted_by": defaults.submitted_by,

        "business_name": text(FieldId::BusinessName),
        "business_owner_first_name": first_name,
        "business_owner_last_name": last_name,
        "business_owner_email": text(FieldId::Email),
        "business_phone": text(FieldId::Phone),
        "business_street_address": text(FieldId::Address),
        "city": city,
        "state": defaults.state,
        "zip_code": text(FieldId::Zip),

        "consultation_date": consultation_date,
        "consultation_length": text(FieldId::DurationHours),
        "consultation_language": text(FieldId::Language),
        "consultation_type": text(FieldId::ConsultationType),
        "business_stage": text(FieldId::BusinessStage),
        "advisor": text(FieldId::Advisor),
        "business_summary": text(FieldId::Notes),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use shared_types::{ConsultationRecord, FieldValue, ValidationResult};

    fn defaults() -> SubmissionDefaults {
        SubmissionDefaults {
            delegate_agency: "Example Agency".into(),
            vendor_id: "1055031".into(),
            program: "Business Specialist".into(),
            submitted_by: "ops@example.org".into(),
            city: "Chicago".into(),
            state: "IL".into(),
        }
    }

    fn form_result(status: ValidationStatus) -> FormResult {
        let mut record = ConsultationRecord::new("doc-1", 0);
        record.set(FieldId::BusinessName, FieldValue::Text("Plena".into()));
        record.set(
            FieldId::ClientName,
            FieldValue::Text("Daphne Rivera".into()),
        );
        record.set(
            FieldId::ConsultationDate,
            FieldValue::Date(NaiveDate::from_ymd_opt(2025, 7, 8).unwrap()),
        );
        record.set(FieldId::DurationHours, FieldValue::Number(2.0));
        FormResult {
            record,
            validation: ValidationResult {
                status,
                warnings: Vec::new(),
            },
            pages: vec![0],
        }
    }

    #[test]
    fn payload_splits_owner_name_and_renders_us_dates() {
        let payload = build_submission(&form_result(ValidationStatus::Valid), &defaults()).unwrap();
        assert_eq!(payload["business_owner_first_name"], "Daphne");
        assert_eq!(payload["business_owner_last_name"], "Rivera");
        assert_eq!(payload["consultation_date"], "07/08/2025");
        assert_eq!(payload["consultation_length"], "2");
        assert_eq!(payload["delegate_agency"], "Example Agency");
        assert_eq!(payload["vendor_id"], "1055031");
    }

    #[test]
    fn absent_city_falls_back_to_the_configured_default() {
        let payload = build_submission(&form_result(ValidationStatus::Valid), &defaults()).unwrap();
        assert_eq!(payload["city"], "Chicago");
        assert_eq!(payload["state"], "IL");
    }

    #[test]
    fn absent_optional_fields_serialize_as_empty() {
        let payload = build_submission(&form_result(ValidationStatus::Valid), &defaults()).unwrap();
        assert_eq!(payload["business_owner_email"], "");
        assert_eq!(payload["business_summary"], "");
    }

    #[test]
    fn invalid_records_are_never_submitted() {
        assert!(build_submission(&form_result(ValidationStatus::Invalid), &defaults()).is_none());
    }

    #[test]
    fn warned_records_still_submit() {
        assert!(
            build_submission(&form_result(ValidationStatus::ValidWithWarnings), &defaults())
                .is_some()
        );
    }
}
