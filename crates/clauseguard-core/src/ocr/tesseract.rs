use crate::error::ClauseError;
use crate::model::ImageFormat;
use crate::ocr::renderer::PageRenderer;
use crate::ocr::{OcrEngine, OcrPage, OcrProgress};
use crate::tool::{run_tool, Deadline};
use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};

/// OCR backend driving the tesseract CLI, with pdftoppm for rasterization.
///
/// Uses tesseract's TSV output so text and per-word confidence come from a
/// single run.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    binary: PathBuf,
    renderer: PageRenderer,
}

impl TesseractEngine {
    pub fn new(binary: PathBuf, renderer: PageRenderer) -> Self {
        Self { binary, renderer }
    }

    fn recognize_file(
        &self,
        image_path: &Path,
        page_number: usize,
        language: &str,
        deadline: &Deadline,
    ) -> Result<OcrPage, ClauseError> {
        let args: Vec<OsString> = vec![
            image_path.into(),
            "stdout".into(),
            "-l".into(),
            language.into(),
            "--dpi".into(),
            self.renderer.dpi().to_string().into(),
            "--psm".into(),
            "3".into(),
            "tsv".into(),
        ];
        let output = run_tool(&self.binary, args, deadline, "tesseract")?;

        if !output.status.success() {
            return Err(ClauseError::ToolFailed {
                tool: self.binary.display().to_string(),
                code: output.status.code().unwrap_or(-1),
                stderr: output.stderr_lossy(),
            });
        }

        let tsv = String::from_utf8_lossy(&output.stdout);
        let (text, confidence) = parse_tsv(&tsv);
        Ok(OcrPage {
            page_number,
            text,
            confidence,
        })
    }
}

impl OcrEngine for TesseractEngine {
    fn recognize_pdf(
        &self,
        pdf_bytes: &[u8],
        page_count: usize,
        language: &str,
        deadline: &Deadline,
        progress: &dyn Fn(OcrProgress),
    ) -> Result<Vec<OcrPage>, ClauseError> {
        let work_dir = tempfile::tempdir()?;
        let pdf_path = work_dir.path().join("input.pdf");
        std::fs::write(&pdf_path, pdf_bytes)?;

        let mut pages = Vec::with_capacity(page_count);
        for page_number in 1..=page_count {
            deadline.check("OCR")?;
            progress(OcrProgress {
                page: page_number,
                total_pages: page_count,
            });

            let image = self
                .renderer
                .render_page(&pdf_path, page_number, work_dir.path(), deadline)?;
            let page = self.recognize_file(&image, page_number, language, deadline)?;
            tracing::debug!(
                page = page_number,
                confidence = page.confidence,
                chars = page.text.len(),
                "recognized page"
            );
            pages.push(page);

            // Rendered pages are large; drop each one once recognized.
            let _ = std::fs::remove_file(&image);
        }

        Ok(pages)
    }

    fn recognize_image(
        &self,
        image_bytes: &[u8],
        format: ImageFormat,
        language: &str,
        deadline: &Deadline,
    ) -> Result<OcrPage, ClauseError> {
        let mut tmpfile = tempfile::Builder::new()
            .suffix(&format!(".{}", format.extension()))
            .tempfile()?;
        tmpfile.write_all(image_bytes)?;
        tmpfile.flush()?;
        self.recognize_file(tmpfile.path(), 1, language, deadline)
    }

    fn backend_name(&self) -> &'static str {
        "tesseract"
    }
}

/// Rebuild text and mean word confidence from tesseract TSV output.
///
/// Columns: level, page_num, block_num, par_num, line_num, word_num, left,
/// top, width, height, conf, text. Words are level 5; a new line starts when
/// (block, par, line) changes and a blank line separates paragraphs.
fn parse_tsv(tsv: &str) -> (String, Option<f32>) {
    let mut text = String::new();
    let mut current_line: Option<(u32, u32, u32)> = None;
    let mut conf_sum = 0.0f64;
    let mut conf_count = 0usize;

    for row in tsv.lines().skip(1) {
        let cols: Vec<&str> = row.split('\t').collect();
        if cols.len() < 12 || cols[0] != "5" {
            continue;
        }
        let word = cols[11].trim();
        if word.is_empty() {
            continue;
        }
        let key = (
            cols[2].parse().unwrap_or(0),
            cols[3].parse().unwrap_or(0),
            cols[4].parse().unwrap_or(0),
        );

        match current_line {
            Some(prev) if prev == key => text.push(' '),
            Some(prev) if (prev.0, prev.1) == (key.0, key.1) => text.push('\n'),
            Some(_) => text.push_str("\n\n"),
            None => {}
        }
        current_line = Some(key);
        text.push_str(word);

        if let Ok(conf) = cols[10].parse::<f64>() {
            if conf >= 0.0 {
                conf_sum += conf;
                conf_count += 1;
            }
        }
    }

    let confidence = (conf_count > 0).then(|| (conf_sum / conf_count as f64) as f32);
    (text, confidence)
}
