use std::path::PathBuf;

use image::DynamicImage;
use tokio::task::JoinHandle;
use tracing::warn;

/// Write-only store for normalized page images, kept solely for operator
/// troubleshooting. Keys are unique per (document id, page index), so
/// parallel page workers never collide. Nothing in the pipeline reads
/// these back.
#[derive(Debug, Clone)]
pub struct DebugStore {
    root: PathBuf,
}

impl DebugStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Persist one normalized page, fire-and-forget. Failures are logged
    /// and never affect the pipeline.
    pub fn persist_page(
        &self,
        document_id: &str,
        page_index: usize,
        image: &DynamicImage,
    ) -> JoinHandle<()> {
        let dir = self.root.join(document_id);
        let path = dir.join(format!("page_{page_index:03}.png"));
        let image = image.clone();
        tokio::task::spawn_blocking(move || {
            let write = std::fs::create_dir_all(&dir)
                .map_err(|e| e.to_string())
                .and_then(|_| image.save(&path).map_err(|e| e.to_string()));
            if let Err(err) = write {
                warn!(%err, path = %path.display(), "failed to persist debug image");
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn writes_one_png_per_page() {
        let dir = tempfile::tempdir().unwrap();
        let store = DebugStore::new(dir.path());
        let image =
            DynamicImage::ImageLuma8(image::GrayImage::from_pixel(8, 8, image::Luma([255u8])));

        store.persist_page("doc-1", 0, &image).await.unwrap();
        store.persist_page("doc-1", 1, &image).await.unwrap();

        assert!(dir.path().join("doc-1/page_000.png").exists());
        assert!(dir.path().join("doc-1/page_001.png").exists());
    }
}
