//! The document pipeline: pages in parallel, forms in order.

use std::collections::BTreeMap;
use std::sync::Arc;

use extraction_engine::{default_rules, CompiledRuleSet, FieldParser, Validator};
use image::DynamicImage;
use ocr_engine::{extract_with_retry, preprocess, OcrError, PreprocessConfig, RetryPolicy};
use ocr_engine::engine::TextExtractor;
use regex::{Regex, RegexBuilder};
use shared_types::{
    FormResult, PageText, Severity, ValidationWarning, WarningKind,
};
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::cancel::CancelFlag;
use crate::config::IntakeConfig;
use crate::debug_store::DebugStore;
use crate::error::PipelineError;
use crate::grouping::group_into_forms;

/// One rasterized PDF page, owned by the pipeline for the duration of the
/// document and dropped after extraction.
pub struct RawPage {
    pub page_index: usize,
    pub image: DynamicImage,
    pub source_dpi: u32,
}

pub struct IntakePipeline {
    preprocess: PreprocessConfig,
    retry: RetryPolicy,
    low_confidence_page_threshold: f32,
    extractor: Arc<dyn TextExtractor>,
    parser: FieldParser,
    validator: Validator,
    form_marker: Regex,
    debug_store: Option<DebugStore>,
}

impl IntakePipeline {
    pub fn new(
        config: &IntakeConfig,
        extractor: Arc<dyn TextExtractor>,
    ) -> Result<Self, PipelineError> {
        let rules = match &config.rules {
            Some(rules) => CompiledRuleSet::compile(rules.clone())?,
            None => CompiledRuleSet::compile(default_rules())?,
        };
        let form_marker = RegexBuilder::new(&config.form_start_pattern)
            .case_insensitive(true)
            .build()?;

        Ok(Self {
            preprocess: config.preprocess.clone(),
            retry: config.retry.clone(),
            low_confidence_page_threshold: config.low_confidence_page_threshold,
            extractor,
            parser: FieldParser::new(rules),
            validator: Validator::new(config.requirements.clone()),
            form_marker,
            debug_store: None,
        })
    }

    pub fn with_debug_store(mut self, store: DebugStore) -> Self {
        self.debug_store = Some(store);
        self
    }

    /// Process one document's rasterized pages into per-form results.
    ///
    /// Pages are preprocessed and extracted on parallel workers;
    /// reassembly keys strictly by page index, never completion order. A
    /// page failure contributes an empty page plus a warning on its form.
    /// After cancellation no further extractions are issued, in-flight
    /// work is discarded, and no partial results are returned.
    pub async fn process(
        &self,
        document_id: &str,
        pages: Vec<RawPage>,
        cancel: &CancelFlag,
    ) -> Result<Vec<FormResult>, PipelineError> {
        if pages.is_empty() {
            return Err(PipelineError::EmptyDocument);
        }
        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }
        let page_count = pages.len();
        info!(document_id, page_count, "processing document");

        let mut workers: JoinSet<(usize, Result<PageText, OcrError>)> = JoinSet::new();
        for page in pages {
            if cancel.is_cancelled() {
                break;
            }
            let extractor = Arc::clone(&self.extractor);
            let preprocess_config = self.preprocess.clone();
            let retry = self.retry.clone();
            let debug_store = self.debug_store.clone();
            let document_id = document_id.to_string();
            workers.spawn(async move {
                let page_index = page.page_index;
                let outcome = process_page(
                    page,
                    &preprocess_config,
                    &retry,
                    extractor,
                    debug_store,
                    &document_id,
                )
                .await;
                (page_index, outcome)
            });
        }

        let mut outcomes: BTreeMap<usize, Result<PageText, OcrError>> = BTreeMap::new();
        while let Some(joined) = workers.join_next().await {
            let (page_index, outcome) = joined?;
            outcomes.insert(page_index, outcome);
        }
        if cancel.is_cancelled() {
            info!(document_id, "document cancelled, discarding in-flight results");
            return Err(PipelineError::Cancelled);
        }

        // Degrade failed pages to empty text so every page keeps its slot.
        let mut page_texts = Vec::with_capacity(outcomes.len());
        let mut page_warnings: BTreeMap<usize, Vec<ValidationWarning>> = BTreeMap::new();
        for (page_index, outcome) in outcomes {
            match outcome {
                Ok(text) => {
                    if let Some(confidence) = text.mean_word_confidence {
                        if confidence < self.low_confidence_page_threshold {
                            page_warnings.entry(page_index).or_default().push(
                                ValidationWarning {
                                    field: None,
                                    kind: WarningKind::LowConfidence,
                                    severity: Severity::Info,
                                    message: format!(
                                        "page {page_index} recognized with low confidence ({confidence:.0})"
                                    ),
                                },
                            );
                        }
                    }
                    page_texts.push(text);
                }
                Err(err) => {
                    warn!(document_id, page_index, %err, "page skipped");
                    page_warnings
                        .entry(page_index)
                        .or_default()
                        .push(ValidationWarning {
                            field: None,
                            kind: WarningKind::PageSkipped,
                            severity: Severity::Warning,
                            message: format!("page {page_index} was skipped: {err}"),
                        });
                    page_texts.push(PageText::empty(page_index));
                }
            }
        }

        let today = chrono::Local::now().date_naive();
        let mut results = Vec::new();
        for (form_index, positions) in group_into_forms(&page_texts, &self.form_marker)
            .into_iter()
            .enumerate()
        {
            let form_pages: Vec<PageText> =
                positions.iter().map(|&p| page_texts[p].clone()).collect();
            let (record, extractions) = self.parser.parse(document_id, form_index, &form_pages);
            let mut validation = self.validator.validate(&record, &extractions, today);

            let page_indices: Vec<usize> = form_pages.iter().map(|p| p.page_index).collect();
            for page_index in &page_indices {
                if let Some(warnings) = page_warnings.get(page_index) {
                    for warning in warnings {
                        validation.push_warning(warning.clone());
                    }
                }
            }

            info!(
                document_id,
                form_index,
                status = ?validation.status,
                warning_count = validation.warnings.len(),
                "form processed"
            );
            results.push(FormResult {
                record,
                validation,
                pages: page_indices,
            });
        }

        Ok(results)
    }
}

async fn process_page(
    page: RawPage,
    preprocess_config: &PreprocessConfig,
    retry: &RetryPolicy,
    extractor: Arc<dyn TextExtractor>,
    debug_store: Option<DebugStore>,
    document_id: &str,
) -> Result<PageText, OcrError> {
    let RawPage {
        page_index,
        image,
        source_dpi,
    } = page;

    let config = preprocess_config.clone();
    let normalized = tokio::task::spawn_blocking(move || preprocess(&image, source_dpi, &config))
        .await
        .map_err(|e| OcrError::ImageDecode(format!("preprocessing worker failed: {e}")))??;

    if let Some(store) = &debug_store {
        let _ = store.persist_page(document_id, page_index, &normalized);
    }

    extract_with_retry(extractor.as_ref(), &normalized, page_index, retry).await
}
