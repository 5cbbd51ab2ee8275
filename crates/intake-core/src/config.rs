use std::path::Path;

use extraction_engine::{ExtractionRule, RequirementSpec};
use ocr_engine::engine::TesseractConfig;
use ocr_engine::{PreprocessConfig, RetryPolicy};

use crate::error::PipelineError;
use crate::submission::SubmissionDefaults;

/// Marker pattern opening a new logical form; compiled case-insensitively.
/// Matching on the whole phrase keeps it tolerant of the letter confusions
/// scans introduce into the first word.
pub const DEFAULT_FORM_START_PATTERN: &str = r"consultation\s+form";

/// Mean word confidence below which a page is flagged for review.
pub const DEFAULT_LOW_CONFIDENCE_PAGE_THRESHOLD: f32 = 40.0;

/// Immutable run configuration, loaded once and threaded through the
/// pipeline. Never process-wide mutable state.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct IntakeConfig {
    /// DPI the input collaborator rasterizes PDF pages at.
    pub rasterize_dpi: u32,
    pub preprocess: PreprocessConfig,
    pub ocr: TesseractConfig,
    pub retry: RetryPolicy,
    pub form_start_pattern: String,
    pub requirements: RequirementSpec,
    /// Extraction rules; `None` selects the built-in consultation set.
    pub rules: Option<Vec<ExtractionRule>>,
    pub low_confidence_page_threshold: f32,
    pub submission: SubmissionDefaults,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            rasterize_dpi: 300,
            preprocess: PreprocessConfig::default(),
            ocr: TesseractConfig::default(),
            retry: RetryPolicy::default(),
            form_start_pattern: DEFAULT_FORM_START_PATTERN.to_string(),
            requirements: RequirementSpec::default(),
            rules: None,
            low_confidence_page_threshold: DEFAULT_LOW_CONFIDENCE_PAGE_THRESHOLD,
            submission: SubmissionDefaults::default(),
        }
    }
}

impl IntakeConfig {
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        let raw = std::fs::read_to_string(path).map_err(|e| PipelineError::Config {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&raw).map_err(|e| PipelineError::Config {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }
}
