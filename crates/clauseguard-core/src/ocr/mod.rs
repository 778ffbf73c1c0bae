pub mod renderer;
pub mod tesseract;

use crate::error::ClauseError;
use crate::extraction::{join_pages, PageText};
use crate::model::{count_words, ImageFormat};
use crate::script::{ScriptCode, OCR_SUPERSET};
use crate::tool::Deadline;
use serde::{Deserialize, Serialize};

/// Progress report emitted before each page is recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcrProgress {
    /// 1-based page about to be processed.
    pub page: usize,
    pub total_pages: usize,
}

/// Recognized text of a single page.
#[derive(Debug, Clone, PartialEq)]
pub struct OcrPage {
    pub page_number: usize,
    pub text: String,
    /// Mean word confidence (0-100), `None` when no words were recognized.
    pub confidence: Option<f32>,
}

/// Tesseract language string for a script hypothesis.
///
/// Indic scripts also load English, since contracts in those scripts routinely
/// carry English terms. An unresolved hypothesis uses every supported script.
pub fn ocr_language(script: ScriptCode) -> String {
    match script.tesseract_lang() {
        Some("eng") => "eng".to_string(),
        Some(lang) => format!("{lang}+eng"),
        None => OCR_SUPERSET.to_string(),
    }
}

/// Trait for optical recognition backends.
pub trait OcrEngine: Send + Sync {
    /// Rasterize and recognize pages `1..=page_count` of a PDF.
    ///
    /// Must call `progress` before each page and check `deadline` between
    /// pages. A timeout or backend failure aborts the whole run; partial
    /// output is never returned.
    fn recognize_pdf(
        &self,
        pdf_bytes: &[u8],
        page_count: usize,
        language: &str,
        deadline: &Deadline,
        progress: &dyn Fn(OcrProgress),
    ) -> Result<Vec<OcrPage>, ClauseError>;

    /// Recognize a single raster image.
    fn recognize_image(
        &self,
        image_bytes: &[u8],
        format: ImageFormat,
        language: &str,
        deadline: &Deadline,
    ) -> Result<OcrPage, ClauseError>;

    /// Name of this OCR backend (for diagnostics).
    fn backend_name(&self) -> &'static str;
}

/// Combined output of an OCR run.
#[derive(Debug, Clone, PartialEq)]
pub struct OcrOutput {
    pub text: String,
    pub word_count: usize,
    pub page_count: usize,
    /// Word-weighted mean confidence across pages.
    pub confidence: Option<f32>,
}

impl OcrOutput {
    pub fn from_pages(pages: &[OcrPage]) -> Self {
        let page_texts: Vec<PageText> = pages
            .iter()
            .map(|p| PageText {
                page_number: p.page_number,
                text: p.text.clone(),
            })
            .collect();
        let text = join_pages(&page_texts);

        let mut weighted = 0.0f64;
        let mut weight = 0usize;
        for page in pages {
            if let Some(conf) = page.confidence {
                let words = count_words(&page.text).max(1);
                weighted += f64::from(conf) * words as f64;
                weight += words;
            }
        }
        let confidence = (weight > 0).then(|| (weighted / weight as f64) as f32);

        OcrOutput {
            word_count: count_words(&text),
            page_count: pages.len(),
            text,
            confidence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(n: usize, text: &str, confidence: Option<f32>) -> OcrPage {
        OcrPage {
            page_number: n,
            text: text.to_string(),
            confidence,
        }
    }

    #[test]
    fn test_language_for_scripts() {
        assert_eq!(ocr_language(ScriptCode::English), "eng");
        assert_eq!(ocr_language(ScriptCode::Tamil), "tam+eng");
        assert_eq!(ocr_language(ScriptCode::Auto), OCR_SUPERSET);
    }

    #[test]
    fn test_pages_joined_with_break_marker() {
        let out = OcrOutput::from_pages(&[
            page(1, "first page text", Some(90.0)),
            page(2, "second", Some(60.0)),
        ]);
        assert_eq!(out.text, "first page text\x0csecond");
        assert_eq!(out.word_count, 4);
        assert_eq!(out.page_count, 2);
        // (90 * 3 + 60 * 1) / 4
        assert_eq!(out.confidence, Some(82.5));
    }

    #[test]
    fn test_blank_pages_have_no_confidence() {
        let out = OcrOutput::from_pages(&[page(1, "", None), page(2, "", None)]);
        assert_eq!(out.confidence, None);
        assert_eq!(out.word_count, 0);
    }
}
