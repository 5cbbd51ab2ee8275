/// OCR output for one page. Immutable once produced; re-parsing derives a
/// new record rather than editing this in place.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PageText {
    pub page_index: usize,
    pub lines: Vec<String>,
    /// Mean word-level engine confidence (0-100), averaged over words the
    /// engine scored positively. None when the engine reported no word data
    /// or the page was skipped.
    pub mean_word_confidence: Option<f32>,
}

impl PageText {
    pub fn new(page_index: usize, lines: Vec<String>, mean_word_confidence: Option<f32>) -> Self {
        Self {
            page_index,
            lines,
            mean_word_confidence,
        }
    }

    /// Placeholder for a page whose extraction failed. The page still
    /// occupies its slot in the document so ordering is preserved.
    pub fn empty(page_index: usize) -> Self {
        Self {
            page_index,
            lines: Vec::new(),
            mean_word_confidence: None,
        }
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(|line| line.trim().is_empty())
    }
}
