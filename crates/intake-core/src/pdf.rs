use std::path::Path;

use crate::error::PipelineError;

/// Confirm the input is a well-formed PDF and report its page count.
///
/// Document-level gate: a file that fails here produces no partial output,
/// unlike page-level failures which degrade into warnings.
pub fn inspect_pdf(path: &Path) -> Result<usize, PipelineError> {
    let document =
        lopdf::Document::load(path).map_err(|e| PipelineError::InvalidDocument(e.to_string()))?;
    let page_count = document.get_pages().len();
    if page_count == 0 {
        return Err(PipelineError::EmptyDocument);
    }
    Ok(page_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn garbage_bytes_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"this is not a pdf").unwrap();
        let err = inspect_pdf(file.path()).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidDocument(_)));
    }

    #[test]
    fn missing_file_is_rejected() {
        let err = inspect_pdf(Path::new("/nonexistent/input.pdf")).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidDocument(_)));
    }
}
