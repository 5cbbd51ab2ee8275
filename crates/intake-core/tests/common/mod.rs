//! Deterministic extraction fakes for pipeline tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use image::DynamicImage;
use intake_core::RawPage;
use ocr_engine::engine::TextExtractor;
use ocr_engine::OcrError;
use shared_types::PageText;

/// Returns scripted text per page index; pages not in the script come back
/// empty. Optional per-page delays simulate out-of-order completion and
/// failing pages simulate a crashed engine.
pub struct ScriptedExtractor {
    pages: HashMap<usize, String>,
    failing: HashSet<usize>,
    /// Pages that fail transiently this many times before succeeding.
    flaky: Mutex<HashMap<usize, u32>>,
    delays_ms: HashMap<usize, u64>,
    confidence: f32,
}

impl ScriptedExtractor {
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
            failing: HashSet::new(),
            flaky: Mutex::new(HashMap::new()),
            delays_ms: HashMap::new(),
            confidence: 90.0,
        }
    }

    pub fn with_page(mut self, page_index: usize, text: &str) -> Self {
        self.pages.insert(page_index, text.to_string());
        self
    }

    pub fn with_failing_page(mut self, page_index: usize) -> Self {
        self.failing.insert(page_index);
        self
    }

    pub fn with_flaky_page(self, page_index: usize, failures: u32) -> Self {
        self.flaky.lock().unwrap().insert(page_index, failures);
        self
    }

    pub fn with_delay(mut self, page_index: usize, millis: u64) -> Self {
        self.delays_ms.insert(page_index, millis);
        self
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence;
        self
    }
}

#[async_trait]
impl TextExtractor for ScriptedExtractor {
    async fn extract(
        &self,
        _image: &DynamicImage,
        page_index: usize,
    ) -> Result<PageText, OcrError> {
        if let Some(&millis) = self.delays_ms.get(&page_index) {
            tokio::time::sleep(Duration::from_millis(millis)).await;
        }
        if self.failing.contains(&page_index) {
            return Err(OcrError::EngineFailure {
                status: "exit 1".into(),
                stderr: "scripted failure".into(),
            });
        }
        if let Some(remaining) = self.flaky.lock().unwrap().get_mut(&page_index) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(OcrError::EngineFailure {
                    status: "exit 1".into(),
                    stderr: "scripted transient failure".into(),
                });
            }
        }
        let lines = self
            .pages
            .get(&page_index)
            .map(|text| text.lines().map(str::to_string).collect())
            .unwrap_or_default();
        Ok(PageText::new(page_index, lines, Some(self.confidence)))
    }
}

/// A blank rasterized page; the scripted extractor keys on index, not
/// pixels.
pub fn blank_page(page_index: usize) -> RawPage {
    RawPage {
        page_index,
        image: DynamicImage::ImageLuma8(image::GrayImage::from_pixel(80, 100, image::Luma([255u8]))),
        source_dpi: 300,
    }
}
