use chrono::NaiveDate;

/// The fixed record schema. Every consultation record carries an entry for
/// each of these, matched or not; absence is always explicit.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum FieldId {
    BusinessName,
    ClientName,
    Email,
    Phone,
    Address,
    City,
    Zip,
    ConsultationDate,
    Advisor,
    Program,
    ConsultationType,
    BusinessStage,
    Language,
    DurationHours,
    Notes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    Text,
    Date,
    Number,
    Choice,
}

impl FieldId {
    pub const ALL: [FieldId; 15] = [
        FieldId::BusinessName,
        FieldId::ClientName,
        FieldId::Email,
        FieldId::Phone,
        FieldId::Address,
        FieldId::City,
        FieldId::Zip,
        FieldId::ConsultationDate,
        FieldId::Advisor,
        FieldId::Program,
        FieldId::ConsultationType,
        FieldId::BusinessStage,
        FieldId::Language,
        FieldId::DurationHours,
        FieldId::Notes,
    ];

    pub fn data_type(self) -> DataType {
        match self {
            FieldId::ConsultationDate => DataType::Date,
            FieldId::DurationHours => DataType::Number,
            FieldId::ConsultationType | FieldId::BusinessStage | FieldId::Language => {
                DataType::Choice
            }
            _ => DataType::Text,
        }
    }

    /// Allowed values for categorical fields. Comparison is case-insensitive.
    pub fn allowed_choices(self) -> Option<&'static [&'static str]> {
        match self {
            FieldId::ConsultationType => Some(&[
                "Operations",
                "Marketing",
                "Financing",
                "Legal",
                "Accounting",
            ]),
            FieldId::BusinessStage => Some(&[
                "Seed/Idea Phase",
                "Start up Phase",
                "Growth Phase",
                "Expansion Phase",
                "Maturity/Exit Phase",
            ]),
            FieldId::Language => Some(&["English", "Spanish"]),
            _ => None,
        }
    }

    /// Stable snake_case name, matching the serialized form.
    pub fn as_str(self) -> &'static str {
        match self {
            FieldId::BusinessName => "business_name",
            FieldId::ClientName => "client_name",
            FieldId::Email => "email",
            FieldId::Phone => "phone",
            FieldId::Address => "address",
            FieldId::City => "city",
            FieldId::Zip => "zip",
            FieldId::ConsultationDate => "consultation_date",
            FieldId::Advisor => "advisor",
            FieldId::Program => "program",
            FieldId::ConsultationType => "consultation_type",
            FieldId::BusinessStage => "business_stage",
            FieldId::Language => "language",
            FieldId::DurationHours => "duration_hours",
            FieldId::Notes => "notes",
        }
    }
}

impl std::fmt::Display for FieldId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed, extracted field value.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Text(String),
    Date(NaiveDate),
    Number(f64),
    Choice(String),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) | FieldValue::Choice(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Canonical display rendering, also used when comparing candidate
    /// values for cross-page conflicts.
    pub fn render(&self) -> String {
        match self {
            FieldValue::Text(s) | FieldValue::Choice(s) => s.clone(),
            FieldValue::Date(d) => d.format("%Y-%m-%d").to_string(),
            FieldValue::Number(n) => {
                if n.fract() == 0.0 {
                    format!("{}", *n as i64)
                } else {
                    format!("{n}")
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_ids_serialize_snake_case() {
        let json = serde_json::to_string(&FieldId::ConsultationDate).unwrap();
        assert_eq!(json, "\"consultation_date\"");
        assert_eq!(FieldId::ConsultationDate.as_str(), "consultation_date");
    }

    #[test]
    fn every_field_has_a_stable_name() {
        for field in FieldId::ALL {
            let json = serde_json::to_string(&field).unwrap();
            assert_eq!(json, format!("\"{}\"", field.as_str()));
        }
    }

    #[test]
    fn number_rendering_drops_trailing_zero() {
        assert_eq!(FieldValue::Number(2.0).render(), "2");
        assert_eq!(FieldValue::Number(1.5).render(), "1.5");
    }

    #[test]
    fn choice_fields_expose_allowed_sets() {
        assert!(FieldId::Language.allowed_choices().is_some());
        assert!(FieldId::BusinessName.allowed_choices().is_none());
        for field in FieldId::ALL {
            if field.allowed_choices().is_some() {
                assert_eq!(field.data_type(), DataType::Choice);
            }
        }
    }
}
