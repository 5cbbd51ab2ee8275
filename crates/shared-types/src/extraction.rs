use crate::field::{FieldId, FieldValue};

/// Coarse trust tier of an extracted value, derived from which rule matched.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    High,
    Medium,
    Low,
    /// No rule matched the field at all.
    None,
}

/// A differing value for the same field seen on a later page of the same
/// logical form. Never auto-resolved; surfaced as a warning instead.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FieldConflict {
    pub page_index: usize,
    pub value: String,
}

/// Per-field intermediate result: what was (or wasn't) extracted, where it
/// came from, and how much to trust it.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FieldExtraction {
    pub field: FieldId,
    pub value: Option<FieldValue>,
    /// The matched text before normalization.
    pub raw: Option<String>,
    pub confidence: Confidence,
    pub page_index: Option<usize>,
    pub line_index: Option<usize>,
    /// Name of the rule that produced the value.
    pub rule: Option<String>,
    pub conflict: Option<FieldConflict>,
}

impl FieldExtraction {
    /// The explicit "nothing matched" result for a field. Fields are never
    /// omitted from the output, only recorded as absent.
    pub fn unmatched(field: FieldId) -> Self {
        Self {
            field,
            value: None,
            raw: None,
            confidence: Confidence::None,
            page_index: None,
            line_index: None,
            rule: None,
            conflict: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_orders_high_to_none() {
        assert!(Confidence::High < Confidence::Medium);
        assert!(Confidence::Medium < Confidence::Low);
        assert!(Confidence::Low < Confidence::None);
    }

    #[test]
    fn unmatched_extraction_is_explicit() {
        let ex = FieldExtraction::unmatched(FieldId::Zip);
        assert_eq!(ex.confidence, Confidence::None);
        assert!(ex.value.is_none());
        assert!(ex.rule.is_none());
    }
}
