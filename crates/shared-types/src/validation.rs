use crate::field::FieldId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Severity {
    Critical,
    Warning,
    Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    MissingRequiredField,
    FieldConflict,
    FormatError,
    LowConfidence,
    PageSkipped,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ValidationWarning {
    /// None for warnings not tied to a single field (e.g. a skipped page).
    pub field: Option<FieldId>,
    pub kind: WarningKind,
    pub severity: Severity,
    pub message: String,
}

/// The sole signal downstream uses to decide whether manual review is
/// mandatory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    Valid,
    ValidWithWarnings,
    Invalid,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ValidationResult {
    pub status: ValidationStatus,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self {
            status: ValidationStatus::Valid,
            warnings: Vec::new(),
        }
    }

    /// Append a warning, demoting `Valid` to `ValidWithWarnings`. An
    /// `Invalid` result stays `Invalid` no matter what is appended.
    pub fn push_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
        if self.status == ValidationStatus::Valid {
            self.status = ValidationStatus::ValidWithWarnings;
        }
    }

    pub fn is_invalid(&self) -> bool {
        self.status == ValidationStatus::Invalid
    }

    pub fn warnings_of_kind(&self, kind: WarningKind) -> impl Iterator<Item = &ValidationWarning> {
        self.warnings.iter().filter(move |w| w.kind == kind)
    }
}
