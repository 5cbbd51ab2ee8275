//! The external OCR engine behind a narrow capability trait.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use image::DynamicImage;
use shared_types::PageText;
use tokio::process::Command;
use tracing::debug;

use crate::error::OcrError;

/// Character set the engine is allowed to emit. Mirrors a form vocabulary:
/// letters, digits, and the punctuation that appears in labels, dates,
/// phone numbers, and email addresses.
const DEFAULT_CHAR_WHITELIST: &str =
    "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz.,:/()-@ ";

/// Text extraction capability. Kept narrow so the pipeline can run against
/// deterministic fakes in tests, independent of any concrete engine.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, image: &DynamicImage, page_index: usize)
        -> Result<PageText, OcrError>;
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TesseractConfig {
    pub binary: String,
    pub language: String,
    /// Page segmentation mode; 6 assumes a uniform block of text, which
    /// fits single-column consultation forms.
    pub page_seg_mode: u32,
    pub char_whitelist: Option<String>,
    pub timeout_secs: u64,
}

impl Default for TesseractConfig {
    fn default() -> Self {
        Self {
            binary: "tesseract".to_string(),
            language: "eng".to_string(),
            page_seg_mode: 6,
            char_whitelist: Some(DEFAULT_CHAR_WHITELIST.to_string()),
            timeout_secs: 60,
        }
    }
}

/// Production extractor: invokes the `tesseract` binary in TSV mode and
/// reconstructs ordered lines plus word-level confidence from its output.
pub struct TesseractEngine {
    binary: PathBuf,
    config: TesseractConfig,
}

impl TesseractEngine {
    pub fn new(config: TesseractConfig) -> Self {
        Self {
            binary: PathBuf::from(&config.binary),
            config,
        }
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.config.timeout_secs.max(1))
    }
}

impl Default for TesseractEngine {
    fn default() -> Self {
        Self::new(TesseractConfig::default())
    }
}

#[async_trait]
impl TextExtractor for TesseractEngine {
    async fn extract(
        &self,
        image: &DynamicImage,
        page_index: usize,
    ) -> Result<PageText, OcrError> {
        let scratch = tempfile::tempdir().map_err(|e| OcrError::ImageEncode(e.to_string()))?;
        let input = scratch.path().join(format!("page_{page_index}.png"));
        image
            .save(&input)
            .map_err(|e| OcrError::ImageEncode(e.to_string()))?;

        let mut command = Command::new(&self.binary);
        command
            .arg(&input)
            .arg("stdout")
            .arg("-l")
            .arg(&self.config.language)
            .arg("--psm")
            .arg(self.config.page_seg_mode.to_string());
        if let Some(whitelist) = &self.config.char_whitelist {
            command
                .arg("-c")
                .arg(format!("tessedit_char_whitelist={whitelist}"));
        }
        command.arg("tsv");
        command.kill_on_drop(true);

        debug!(page_index, "invoking OCR engine");
        let output = tokio::time::timeout(self.timeout(), command.output())
            .await
            .map_err(|_| OcrError::EngineFailure {
                status: "timeout".to_string(),
                stderr: format!("no output within {:?}", self.timeout()),
            })?
            .map_err(|source| OcrError::EngineSpawn {
                binary: self.binary.display().to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(OcrError::EngineFailure {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(parse_tsv(
            &String::from_utf8_lossy(&output.stdout),
            page_index,
        ))
    }
}

/// Rebuild ordered lines from engine TSV output.
///
/// Word rows (level 5) are grouped by their (block, paragraph, line) triple,
/// which the engine numbers in reading order. Confidence is averaged over
/// positively-scored words only; the engine reports -1 for non-word rows
/// and structural noise.
pub(crate) fn parse_tsv(tsv: &str, page_index: usize) -> PageText {
    let mut grouped: BTreeMap<(u32, u32, u32), Vec<String>> = BTreeMap::new();
    let mut confidences = Vec::new();

    for row in tsv.lines().skip(1) {
        let columns: Vec<&str> = row.split('\t').collect();
        if columns.len() < 12 {
            continue;
        }
        let level: u32 = columns[0].parse().unwrap_or(0);
        if level != 5 {
            continue;
        }
        let word = columns[11].trim();
        if word.is_empty() {
            continue;
        }

        let block: u32 = columns[2].parse().unwrap_or(0);
        let paragraph: u32 = columns[3].parse().unwrap_or(0);
        let line: u32 = columns[4].parse().unwrap_or(0);
        if let Ok(confidence) = columns[10].parse::<f32>() {
            if confidence > 0.0 {
                confidences.push(confidence);
            }
        }

        grouped
            .entry((block, paragraph, line))
            .or_default()
            .push(word.to_string());
    }

    let lines: Vec<String> = grouped.into_values().map(|words| words.join(" ")).collect();
    let mean = if confidences.is_empty() {
        None
    } else {
        Some(confidences.iter().sum::<f32>() / confidences.len() as f32)
    };

    PageText::new(page_index, lines, mean)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const HEADER: &str =
        "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext";

    fn word(block: u32, par: u32, line: u32, word_num: u32, conf: f32, text: &str) -> String {
        format!("5\t1\t{block}\t{par}\t{line}\t{word_num}\t0\t0\t10\t10\t{conf}\t{text}")
    }

    #[test]
    fn words_regroup_into_ordered_lines() {
        let tsv = [
            HEADER.to_string(),
            "4\t1\t1\t1\t1\t0\t0\t0\t0\t0\t-1\t".to_string(),
            word(1, 1, 1, 1, 96.0, "Business"),
            word(1, 1, 1, 2, 91.0, "Name:"),
            word(1, 1, 1, 3, 88.0, "Plena"),
            word(1, 1, 2, 1, 93.0, "City:"),
            word(1, 1, 2, 2, 90.0, "Chicago"),
        ]
        .join("\n");

        let page = parse_tsv(&tsv, 4);
        assert_eq!(page.page_index, 4);
        assert_eq!(
            page.lines,
            vec!["Business Name: Plena".to_string(), "City: Chicago".to_string()]
        );
    }

    #[test]
    fn confidence_averages_positive_words_only() {
        let tsv = [
            HEADER.to_string(),
            word(1, 1, 1, 1, 80.0, "one"),
            word(1, 1, 1, 2, -1.0, "ghost"),
            word(1, 1, 1, 3, 60.0, "two"),
        ]
        .join("\n");

        let page = parse_tsv(&tsv, 0);
        assert_eq!(page.mean_word_confidence, Some(70.0));
    }

    #[test]
    fn empty_output_yields_empty_page() {
        let page = parse_tsv(HEADER, 2);
        assert!(page.is_empty());
        assert_eq!(page.mean_word_confidence, None);
    }

    #[test]
    fn blank_words_are_dropped() {
        let tsv = [HEADER.to_string(), word(1, 1, 1, 1, 90.0, "   ")].join("\n");
        let page = parse_tsv(&tsv, 0);
        assert!(page.is_empty());
    }
}
