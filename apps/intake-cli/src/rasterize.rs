//! The input collaborator: PDF pages to images via poppler's `pdftoppm`.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use intake_core::RawPage;
use tokio::process::Command;
use tracing::info;

/// Rasterize every page of `pdf` at `dpi` into memory.
pub async fn rasterize_pdf(pdf: &Path, dpi: u32) -> Result<Vec<RawPage>> {
    let scratch = tempfile::tempdir().context("creating rasterization scratch directory")?;
    let prefix = scratch.path().join("page");

    let output = Command::new("pdftoppm")
        .arg("-r")
        .arg(dpi.to_string())
        .arg("-png")
        .arg(pdf)
        .arg(&prefix)
        .output()
        .await
        .context("spawning pdftoppm (is poppler installed?)")?;
    if !output.status.success() {
        bail!(
            "pdftoppm failed ({}): {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    let mut rendered: Vec<PathBuf> = std::fs::read_dir(scratch.path())
        .context("listing rasterized pages")?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "png"))
        .collect();
    if rendered.is_empty() {
        bail!("pdftoppm produced no page images");
    }
    rendered.sort_by_key(|path| page_ordinal(path));
    info!(pages = rendered.len(), dpi, "rasterized document");

    rendered
        .iter()
        .enumerate()
        .map(|(page_index, path)| {
            let image = image::open(path)
                .with_context(|| format!("decoding rasterized page {}", path.display()))?;
            Ok(RawPage {
                page_index,
                image,
                source_dpi: dpi,
            })
        })
        .collect()
}

/// Page number from a `page-N.png` filename. Numeric so `page-10` never
/// sorts before `page-2`.
fn page_ordinal(path: &Path) -> u32 {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .and_then(|stem| stem.rsplit('-').next())
        .and_then(|suffix| suffix.parse().ok())
        .unwrap_or(u32::MAX)
}
