use crate::error::ClauseError;
use crate::extraction::{PageText, PdfExtractor, PAGE_BREAK};
use crate::tool::{run_tool, Deadline};
use std::ffi::OsStr;
use std::io::Write;
use std::path::PathBuf;

/// PDF extraction backend using pdftotext (from poppler-utils).
///
/// Runs in reading-order mode; `-layout` would pad prose with alignment
/// spaces that leak into clause context.
pub struct PdftotextExtractor {
    binary: PathBuf,
}

impl PdftotextExtractor {
    pub fn new() -> Self {
        Self::with_binary(PathBuf::from("pdftotext"))
    }

    pub fn with_binary(binary: PathBuf) -> Self {
        PdftotextExtractor { binary }
    }
}

impl Default for PdftotextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfExtractor for PdftotextExtractor {
    fn extract_pages(
        &self,
        pdf_bytes: &[u8],
        deadline: &Deadline,
    ) -> Result<Vec<PageText>, ClauseError> {
        let mut tmpfile = tempfile::Builder::new().suffix(".pdf").tempfile()?;
        tmpfile.write_all(pdf_bytes)?;
        tmpfile.flush()?;

        let args: [&OsStr; 4] = [
            OsStr::new("-enc"),
            OsStr::new("UTF-8"),
            tmpfile.path().as_os_str(),
            OsStr::new("-"), // output to stdout
        ];
        let output = run_tool(&self.binary, args, deadline, "pdftotext")?;

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            return Err(classify_failure(code, &output.stderr_lossy(), &self.binary));
        }

        let text = String::from_utf8_lossy(&output.stdout);
        Ok(split_pages(&text))
    }

    fn backend_name(&self) -> &'static str {
        "pdftotext"
    }
}

/// Map pdftotext's exit code and stderr onto the error taxonomy.
///
/// Exit code 1 is "error opening a PDF file", 3 is "error related to PDF
/// permissions".
fn classify_failure(code: i32, stderr: &str, binary: &std::path::Path) -> ClauseError {
    let lower = stderr.to_lowercase();
    if code == 3 || lower.contains("incorrect password") || lower.contains("encrypted") {
        return ClauseError::PasswordProtected;
    }
    if code == 1 || lower.contains("syntax error") || lower.contains("may not be a pdf") {
        let reason = stderr
            .lines()
            .find(|l| !l.trim().is_empty())
            .unwrap_or("pdftotext could not open the file")
            .to_string();
        return ClauseError::CorruptDocument(reason);
    }
    ClauseError::ToolFailed {
        tool: binary.display().to_string(),
        code,
        stderr: stderr.to_string(),
    }
}

/// Split pdftotext output into pages. pdftotext terminates every page with a
/// form feed, so a scanned three-page PDF yields three empty pages.
fn split_pages(text: &str) -> Vec<PageText> {
    let mut parts: Vec<&str> = text.split(PAGE_BREAK).collect();
    if parts.len() > 1 && parts.last().is_some_and(|p| p.trim().is_empty()) {
        parts.pop();
    }
    parts
        .into_iter()
        .enumerate()
        .map(|(i, page_text)| PageText {
            page_number: i + 1,
            text: page_text.to_string(),
        })
        .collect()
}
