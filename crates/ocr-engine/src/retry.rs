//! Bounded retry around the extraction call.
//!
//! Engine crashes and timeouts are transient; decode failures are not.
//! Exhausted retries surface as [`OcrError::Extraction`], which the
//! orchestrator converts into a page-level skip.

use std::time::Duration;

use image::DynamicImage;
use shared_types::PageText;
use tracing::warn;

use crate::engine::TextExtractor;
use crate::error::OcrError;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each subsequent one.
    pub initial_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_backoff_ms: 250,
        }
    }
}

impl RetryPolicy {
    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }
}

pub async fn extract_with_retry(
    extractor: &dyn TextExtractor,
    image: &DynamicImage,
    page_index: usize,
    policy: &RetryPolicy,
) -> Result<PageText, OcrError> {
    let attempts = policy.max_retries + 1;
    let mut backoff = policy.initial_backoff();
    let mut last_error = None;

    for attempt in 1..=attempts {
        if attempt > 1 {
            tokio::time::sleep(backoff).await;
            backoff *= 2;
        }

        match extractor.extract(image, page_index).await {
            Ok(page) => return Ok(page),
            Err(err) if err.is_transient() => {
                warn!(page_index, attempt, %err, "extraction attempt failed");
                last_error = Some(err);
            }
            Err(err) => return Err(err),
        }
    }

    Err(OcrError::Extraction {
        attempts,
        last_error: last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "unknown".to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails the first `failures` calls with a transient error, then
    /// succeeds.
    struct FlakyExtractor {
        failures: u32,
        calls: AtomicU32,
    }

    impl FlakyExtractor {
        fn new(failures: u32) -> Self {
            Self {
                failures,
                calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl TextExtractor for FlakyExtractor {
        async fn extract(
            &self,
            _image: &DynamicImage,
            page_index: usize,
        ) -> Result<PageText, OcrError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err(OcrError::EngineFailure {
                    status: "exit 1".into(),
                    stderr: "engine crashed".into(),
                })
            } else {
                Ok(PageText::new(page_index, vec!["ok".into()], Some(90.0)))
            }
        }
    }

    struct DecodeFailExtractor;

    #[async_trait]
    impl TextExtractor for DecodeFailExtractor {
        async fn extract(
            &self,
            _image: &DynamicImage,
            _page_index: usize,
        ) -> Result<PageText, OcrError> {
            Err(OcrError::ImageDecode("corrupt".into()))
        }
    }

    fn test_image() -> DynamicImage {
        DynamicImage::ImageLuma8(image::GrayImage::from_pixel(4, 4, image::Luma([255u8])))
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_within_retry_bound() {
        let extractor = FlakyExtractor::new(2);
        let page = extract_with_retry(&extractor, &test_image(), 0, &RetryPolicy::default())
            .await
            .unwrap();
        assert_eq!(page.lines, vec!["ok".to_string()]);
        assert_eq!(extractor.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_exhausting_retries() {
        let extractor = FlakyExtractor::new(10);
        let err = extract_with_retry(&extractor, &test_image(), 0, &RetryPolicy::default())
            .await
            .unwrap_err();
        match err {
            OcrError::Extraction { attempts, .. } => assert_eq!(attempts, 3),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(extractor.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn decode_errors_are_not_retried() {
        let extractor = DecodeFailExtractor;
        let err = extract_with_retry(&extractor, &test_image(), 0, &RetryPolicy::default())
            .await
            .unwrap_err();
        assert!(matches!(err, OcrError::ImageDecode(_)));
    }
}
