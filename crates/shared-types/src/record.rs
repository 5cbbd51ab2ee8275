use std::collections::BTreeMap;

use crate::field::{FieldId, FieldValue};
use crate::validation::ValidationResult;

/// The structured target entity for one logical form. Fixed shape: every
/// `FieldId` is present, unmatched fields hold `None`. Never mutated after
/// emission; corrections produce a new record.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ConsultationRecord {
    pub document_id: String,
    /// Zero-based position of the logical form within the document.
    pub form_index: usize,
    pub fields: BTreeMap<FieldId, Option<FieldValue>>,
}

impl ConsultationRecord {
    pub fn new(document_id: impl Into<String>, form_index: usize) -> Self {
        let fields = FieldId::ALL.iter().map(|f| (*f, None)).collect();
        Self {
            document_id: document_id.into(),
            form_index,
            fields,
        }
    }

    pub fn get(&self, field: FieldId) -> Option<&FieldValue> {
        self.fields.get(&field).and_then(|v| v.as_ref())
    }

    pub fn set(&mut self, field: FieldId, value: FieldValue) {
        self.fields.insert(field, Some(value));
    }

    pub fn is_present(&self, field: FieldId) -> bool {
        self.get(field).is_some()
    }
}

/// One output tuple per detected logical form, in document order.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FormResult {
    pub record: ConsultationRecord,
    pub validation: ValidationResult,
    /// Document page indices the form spans.
    pub pages: Vec<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn new_record_carries_every_field_as_absent() {
        let record = ConsultationRecord::new("doc-1", 0);
        assert_eq!(record.fields.len(), FieldId::ALL.len());
        for field in FieldId::ALL {
            assert!(record.fields.contains_key(&field));
            assert!(record.get(field).is_none());
        }
    }

    #[test]
    fn serialized_record_keeps_absent_fields_explicit() {
        let mut record = ConsultationRecord::new("doc-1", 0);
        record.set(FieldId::City, FieldValue::Text("Chicago".into()));
        let json = serde_json::to_value(&record).unwrap();
        let fields = json.get("fields").unwrap().as_object().unwrap();
        assert_eq!(fields.len(), FieldId::ALL.len());
        assert!(fields.get("zip").unwrap().is_null());
        assert_eq!(
            fields.get("city").unwrap().get("value").unwrap(),
            "Chicago"
        );
    }

    #[test]
    fn set_then_get_round_trips() {
        let mut record = ConsultationRecord::new("doc-1", 2);
        record.set(FieldId::Zip, FieldValue::Text("60622".into()));
        assert_eq!(
            record.get(FieldId::Zip),
            Some(&FieldValue::Text("60622".into()))
        );
        assert_eq!(record.form_index, 2);
    }
}
