//! Page-image preparation and text extraction.
//!
//! Two halves, mirroring the pipeline stages they serve:
//! 1. [`preprocess`] normalizes a rasterized page for recognition
//!    (grayscale, DPI rescale, denoise, deskew, adaptive threshold).
//! 2. [`TextExtractor`] wraps the external OCR engine behind a narrow
//!    capability trait so the pipeline can run against deterministic fakes.
//!    [`TesseractEngine`] is the production implementation;
//!    [`extract_with_retry`] adds bounded retry with exponential backoff.
//!
//! Engine output is untrusted, noisy input to everything downstream: no
//! assumption of correct spelling, casing, or clean line breaks.

pub mod engine;
pub mod error;
pub mod preprocess;
pub mod retry;

pub use engine::{TesseractEngine, TextExtractor};
pub use error::OcrError;
pub use preprocess::{preprocess, PreprocessConfig};
pub use retry::{extract_with_retry, RetryPolicy};
