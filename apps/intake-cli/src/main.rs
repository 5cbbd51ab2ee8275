//! Intake CLI - scanned consultation forms to validated records
//!
//! Reads a scanned multi-page PDF, rasterizes it, runs the OCR intake
//! pipeline, and emits per-form records with validation status plus
//! submission payloads for every form that does not require manual review.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use serde_json::json;
use tracing::{info, warn};

use intake_core::{
    build_submission, inspect_pdf, CancelFlag, DebugStore, IntakeConfig, IntakePipeline,
};
use ocr_engine::TesseractEngine;
use shared_types::ValidationStatus;

mod rasterize;

#[derive(Parser)]
#[command(name = "intake-cli", about = "Process scanned consultation forms into records")]
struct Cli {
    /// Scanned consultation-form PDF to process
    pdf: PathBuf,

    /// JSON run configuration; defaults apply when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the results JSON here instead of stdout
    #[arg(long)]
    out: Option<PathBuf>,

    /// Persist normalized page images under this directory for
    /// troubleshooting
    #[arg(long)]
    debug_images: Option<PathBuf>,

    /// Override the configured rasterization DPI
    #[arg(long)]
    dpi: Option<u32>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("intake_cli=info".parse()?)
                .add_directive("intake_core=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => IntakeConfig::load(path)?,
        None => IntakeConfig::default(),
    };
    if let Some(dpi) = cli.dpi {
        config.rasterize_dpi = dpi;
    }

    let page_count = inspect_pdf(&cli.pdf)?;
    info!(pdf = %cli.pdf.display(), page_count, "input PDF is well-formed");

    let pages = rasterize::rasterize_pdf(&cli.pdf, config.rasterize_dpi).await?;
    let document_id = uuid::Uuid::new_v4().to_string();

    let extractor = Arc::new(TesseractEngine::new(config.ocr.clone()));
    let mut pipeline = IntakePipeline::new(&config, extractor)?;
    if let Some(dir) = &cli.debug_images {
        pipeline = pipeline.with_debug_store(DebugStore::new(dir));
    }

    let results = pipeline
        .process(&document_id, pages, &CancelFlag::new())
        .await?;

    for result in &results {
        info!(
            form = result.record.form_index,
            status = ?result.validation.status,
            warnings = result.validation.warnings.len(),
            pages = ?result.pages,
            "form processed"
        );
    }
    let review_count = results
        .iter()
        .filter(|r| r.validation.status == ValidationStatus::Invalid)
        .count();
    if review_count > 0 {
        warn!(review_count, "forms require manual review and were not queued for submission");
    }

    let submissions: Vec<_> = results
        .iter()
        .filter_map(|result| build_submission(result, &config.submission))
        .collect();
    let output = json!({
        "document_id": document_id,
        "forms": results,
        "submissions": submissions,
    });
    let rendered = serde_json::to_string_pretty(&output)?;

    match &cli.out {
        Some(path) => {
            std::fs::write(path, rendered)?;
            info!(path = %path.display(), "results written");
        }
        None => println!("{rendered}"),
    }

    Ok(())
}
