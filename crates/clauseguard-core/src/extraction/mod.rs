pub mod docx;
pub mod pdftotext;
pub mod plain;
pub mod validate;

use crate::error::ClauseError;
use crate::tool::Deadline;

/// Separator placed between pages of extracted text. pdftotext emits the same
/// form feed, and it counts as whitespace, so word counts are unaffected.
pub const PAGE_BREAK: char = '\x0c';

/// Text content extracted from a single page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageText {
    pub page_number: usize,
    pub text: String,
}

/// Text pulled directly from a container, before any OCR.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectExtraction {
    pub pages: Vec<PageText>,
    /// Pages in the container. Can exceed `pages.len()` for DOCX, where
    /// text is not split per page.
    pub page_count: usize,
    pub backend: &'static str,
}

impl DirectExtraction {
    pub fn text(&self) -> String {
        join_pages(&self.pages)
    }
}

/// Join page texts with [`PAGE_BREAK`].
pub fn join_pages(pages: &[PageText]) -> String {
    let mut out = String::new();
    for (i, page) in pages.iter().enumerate() {
        if i > 0 {
            out.push(PAGE_BREAK);
        }
        out.push_str(page.text.trim_end());
    }
    out
}

/// Trait for PDF text-layer extraction backends.
pub trait PdfExtractor: Send + Sync {
    /// Extract text from PDF bytes, returning one PageText per page.
    ///
    /// Corrupt, encrypted or otherwise unreadable containers must fail here;
    /// a readable PDF without a text layer returns empty pages.
    fn extract_pages(&self, pdf_bytes: &[u8], deadline: &Deadline)
        -> Result<Vec<PageText>, ClauseError>;

    /// Name of this extraction backend (for diagnostics).
    fn backend_name(&self) -> &'static str;
}
