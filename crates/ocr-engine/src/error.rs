use thiserror::Error;

/// OCR-stage errors. Page-fatal at most: the orchestrator converts these
/// into page-level skips with warnings, never a document abort.
#[derive(Debug, Error)]
pub enum OcrError {
    /// The page image buffer is unreadable or degenerate.
    #[error("failed to decode page image: {0}")]
    ImageDecode(String),

    /// The normalized image could not be written for the engine.
    #[error("failed to encode page image for the engine: {0}")]
    ImageEncode(String),

    /// The engine binary could not be started.
    #[error("failed to spawn OCR engine '{binary}': {source}")]
    EngineSpawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    /// The engine ran but did not produce usable output.
    #[error("OCR engine failed ({status}): {stderr}")]
    EngineFailure { status: String, stderr: String },

    /// Retries exhausted; the page is skipped and flagged.
    #[error("text extraction failed after {attempts} attempts: {last_error}")]
    Extraction { attempts: u32, last_error: String },
}

impl OcrError {
    /// Whether a retry could plausibly succeed. Decode/encode failures are
    /// deterministic and are not retried.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            OcrError::EngineSpawn { .. } | OcrError::EngineFailure { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_errors_are_not_transient() {
        assert!(!OcrError::ImageDecode("bad".into()).is_transient());
        assert!(!OcrError::ImageEncode("bad".into()).is_transient());
    }

    #[test]
    fn engine_failures_are_transient() {
        let err = OcrError::EngineFailure {
            status: "exit 1".into(),
            stderr: "boom".into(),
        };
        assert!(err.is_transient());
    }
}
