//! Turns an uploaded document into a single [`NormalizedDocument`].
//!
//! The normalizer walks a small state machine:
//!
//! ```text
//! ExtractText -> Validate -> Accept ---------------------> Done
//!                         \-> Escalate -> Ocr -> Accept -> Done
//! ```
//!
//! Escalation is conservative (direct text is preferred while it is
//! plausible) but decisive: once OCR output is chosen it replaces the direct
//! extraction wholesale.

use crate::config::AnalyzerConfig;
use crate::error::ClauseError;
use crate::extraction::docx::extract_docx;
use crate::extraction::pdftotext::PdftotextExtractor;
use crate::extraction::plain::extract_plain;
use crate::extraction::validate::{validate_extraction, ValidationOutcome};
use crate::extraction::{DirectExtraction, PdfExtractor};
use crate::model::{
    count_words, DocumentFormat, ExtractionMethod, ImageFormat, NormalizedDocument, TraceStep,
    TraceStepType,
};
use crate::ocr::renderer::PageRenderer;
use crate::ocr::tesseract::TesseractEngine;
use crate::ocr::{ocr_language, OcrEngine, OcrOutput, OcrProgress};
use crate::script::{classify_script, detect_script, ScriptCode};
use crate::tool::{CancelFlag, Deadline};

/// What the caller wants done with one upload.
pub struct NormalizeRequest<'a> {
    pub format: DocumentFormat,
    /// Expected script, or `Auto` to detect it.
    pub script: ScriptCode,
    /// Skip the trust checks and always OCR (PDF only).
    pub force_ocr: bool,
    pub progress: Option<&'a dyn Fn(OcrProgress)>,
    pub cancel: Option<CancelFlag>,
}

impl<'a> NormalizeRequest<'a> {
    pub fn new(format: DocumentFormat) -> Self {
        Self {
            format,
            script: ScriptCode::Auto,
            force_ocr: false,
            progress: None,
            cancel: None,
        }
    }

    pub fn with_script(mut self, script: ScriptCode) -> Self {
        self.script = script;
        self
    }

    pub fn with_force_ocr(mut self, force_ocr: bool) -> Self {
        self.force_ocr = force_ocr;
        self
    }

    pub fn with_progress(mut self, progress: &'a dyn Fn(OcrProgress)) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = Some(cancel);
        self
    }
}

pub struct DocumentNormalizer {
    pdf: Box<dyn PdfExtractor>,
    ocr: Box<dyn OcrEngine>,
    config: AnalyzerConfig,
}

impl DocumentNormalizer {
    pub fn new(
        pdf: Box<dyn PdfExtractor>,
        ocr: Box<dyn OcrEngine>,
        config: AnalyzerConfig,
    ) -> Self {
        Self { pdf, ocr, config }
    }

    /// Normalizer backed by poppler-utils and tesseract, as configured.
    pub fn from_config(config: AnalyzerConfig) -> Self {
        let pdf = PdftotextExtractor::with_binary(config.pdftotext_path.clone());
        let renderer = PageRenderer::new(config.pdftoppm_path.clone(), config.ocr_dpi);
        let ocr = TesseractEngine::new(config.tesseract_path.clone(), renderer);
        Self::new(Box::new(pdf), Box::new(ocr), config)
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn normalize(
        &self,
        bytes: &[u8],
        request: &NormalizeRequest<'_>,
    ) -> Result<NormalizedDocument, ClauseError> {
        let mut deadline = Deadline::new(self.config.timeout());
        if let Some(cancel) = &request.cancel {
            deadline = deadline.with_cancel(cancel.clone());
        }

        tracing::info!(
            format = %request.format,
            script = %request.script,
            force_ocr = request.force_ocr,
            bytes = bytes.len(),
            "normalizing document"
        );

        let mut trace = Vec::new();
        let doc = match request.format {
            DocumentFormat::Pdf => self.normalize_pdf(bytes, request, &deadline, &mut trace)?,
            DocumentFormat::Image(format) => {
                self.normalize_image(bytes, format, request, &deadline, &mut trace)?
            }
            DocumentFormat::Docx => {
                let direct = extract_docx(bytes)?;
                self.normalize_direct_only(direct, DocumentFormat::Docx, request, &mut trace)?
            }
            DocumentFormat::PlainText => {
                let direct = extract_plain(bytes);
                self.normalize_direct_only(direct, DocumentFormat::PlainText, request, &mut trace)?
            }
        };

        tracing::info!(
            method = %doc.extraction_method,
            script = %doc.script_hint,
            words = doc.word_count,
            pages = doc.page_count,
            "document normalized"
        );
        Ok(doc)
    }

    fn normalize_pdf(
        &self,
        bytes: &[u8],
        request: &NormalizeRequest<'_>,
        deadline: &Deadline,
        trace: &mut Vec<TraceStep>,
    ) -> Result<NormalizedDocument, ClauseError> {
        // ExtractText: a corrupt or encrypted container fails here, terminally.
        let pages = self.pdf.extract_pages(bytes, deadline)?;
        let page_count = pages.len().max(1);
        let direct_text = clean_text(&DirectExtraction {
            pages,
            page_count,
            backend: self.pdf.backend_name(),
        }
        .text());
        let direct_words = count_words(&direct_text);
        step(
            trace,
            TraceStepType::Extract,
            format!(
                "{} extracted {direct_words} words from {page_count} page(s)",
                self.pdf.backend_name()
            ),
        );

        let hypothesis = resolve_hypothesis(request.script, &direct_text, trace);

        // Validate
        let validation = match hypothesis {
            Some(script) => validate_extraction(&direct_text, script),
            None => ValidationOutcome::Rejected("no recognizable script in text layer".into()),
        };
        let near_empty = direct_words < self.config.escalation_min_words;
        let untrusted = !validation.is_accepted();

        let mut reasons = Vec::new();
        if request.force_ocr {
            reasons.push("OCR requested by caller".to_string());
        }
        if near_empty {
            reasons.push(format!(
                "only {direct_words} words (< {})",
                self.config.escalation_min_words
            ));
        }
        if let ValidationOutcome::Rejected(reason) = &validation {
            reasons.push(reason.clone());
        }

        if reasons.is_empty() {
            step(trace, TraceStepType::Validate, "text layer accepted");
            let script = final_script(request.script, hypothesis, &direct_text);
            return self.finish(
                direct_text,
                page_count,
                ExtractionMethod::DirectText,
                script,
                None,
                DocumentFormat::Pdf,
                trace,
            );
        }

        // Escalate
        step(
            trace,
            TraceStepType::Escalate,
            format!("escalating to OCR: {}", reasons.join("; ")),
        );
        let language = ocr_language(hypothesis.unwrap_or(ScriptCode::Auto));
        let noop = |_: OcrProgress| {};
        let progress: &dyn Fn(OcrProgress) = request.progress.unwrap_or(&noop);

        let ocr_pages = self
            .ocr
            .recognize_pdf(bytes, page_count, &language, deadline, progress)?;
        let ocr = OcrOutput::from_pages(&ocr_pages);
        let ocr_text = clean_text(&ocr.text);
        let ocr_words = count_words(&ocr_text);
        step(
            trace,
            TraceStepType::Ocr,
            format!(
                "{} ({language}) recognized {ocr_words} words, confidence {}",
                self.ocr.backend_name(),
                fmt_confidence(ocr.confidence)
            ),
        );

        let forced = request.force_ocr || untrusted;
        let use_ocr = ocr_words > direct_words || (forced && ocr_words > 0);
        if !use_ocr {
            step(
                trace,
                TraceStepType::Decide,
                format!("kept direct text ({direct_words} words >= {ocr_words} OCR words)"),
            );
            let script = final_script(request.script, hypothesis, &direct_text);
            return self.finish(
                direct_text,
                page_count,
                ExtractionMethod::DirectText,
                script,
                None,
                DocumentFormat::Pdf,
                trace,
            );
        }

        step(trace, TraceStepType::Decide, "OCR output replaces direct text");
        if let Some(conf) = ocr.confidence {
            if conf < self.config.ocr_min_confidence {
                tracing::warn!(confidence = conf, "low OCR confidence on escalated PDF");
                step(
                    trace,
                    TraceStepType::Ocr,
                    format!(
                        "low OCR confidence {conf:.1} (< {:.1}); results may be unreliable",
                        self.config.ocr_min_confidence
                    ),
                );
            }
        }
        let script = final_script(request.script, None, &ocr_text);
        self.finish(
            ocr_text,
            page_count,
            ExtractionMethod::Ocr,
            script,
            ocr.confidence,
            DocumentFormat::Pdf,
            trace,
        )
    }

    fn normalize_image(
        &self,
        bytes: &[u8],
        format: ImageFormat,
        request: &NormalizeRequest<'_>,
        deadline: &Deadline,
        trace: &mut Vec<TraceStep>,
    ) -> Result<NormalizedDocument, ClauseError> {
        let language = ocr_language(request.script);
        if let Some(progress) = request.progress {
            progress(OcrProgress {
                page: 1,
                total_pages: 1,
            });
        }
        let page = self.ocr.recognize_image(bytes, format, &language, deadline)?;
        let ocr = OcrOutput::from_pages(&[page]);
        let text = clean_text(&ocr.text);
        let words = count_words(&text);
        step(
            trace,
            TraceStepType::Ocr,
            format!(
                "{} ({language}) recognized {words} words, confidence {}",
                self.ocr.backend_name(),
                fmt_confidence(ocr.confidence)
            ),
        );

        if words < self.config.min_viable_words {
            return Err(ClauseError::Unreadable {
                words,
                required: self.config.min_viable_words,
            });
        }
        let confidence = ocr.confidence.unwrap_or(0.0);
        if confidence < self.config.ocr_min_confidence {
            return Err(ClauseError::LowConfidenceOcr {
                confidence,
                threshold: self.config.ocr_min_confidence,
            });
        }

        let script = final_script(request.script, None, &text);
        self.finish(
            text,
            1,
            ExtractionMethod::Ocr,
            script,
            ocr.confidence,
            DocumentFormat::Image(format),
            trace,
        )
    }

    /// DOCX and plain text: there is nothing to rasterize, so validation
    /// failures are recorded but cannot escalate.
    fn normalize_direct_only(
        &self,
        direct: DirectExtraction,
        format: DocumentFormat,
        request: &NormalizeRequest<'_>,
        trace: &mut Vec<TraceStep>,
    ) -> Result<NormalizedDocument, ClauseError> {
        let text = clean_text(&direct.text());
        let words = count_words(&text);
        step(
            trace,
            TraceStepType::Extract,
            format!("{} extracted {words} words", direct.backend),
        );

        let hypothesis = resolve_hypothesis(request.script, &text, trace);
        if let Some(script) = hypothesis {
            if let ValidationOutcome::Rejected(reason) = validate_extraction(&text, script) {
                step(
                    trace,
                    TraceStepType::Validate,
                    format!("{reason}; {format} cannot be OCRed, keeping extracted text"),
                );
            }
        }
        if request.force_ocr {
            step(
                trace,
                TraceStepType::Validate,
                format!("OCR requested but not applicable to {format}"),
            );
        }

        let script = final_script(request.script, hypothesis, &text);
        self.finish(
            text,
            direct.page_count,
            ExtractionMethod::DirectText,
            script,
            None,
            format,
            trace,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn finish(
        &self,
        text: String,
        page_count: usize,
        extraction_method: ExtractionMethod,
        script_hint: ScriptCode,
        ocr_confidence: Option<f32>,
        format: DocumentFormat,
        trace: &mut Vec<TraceStep>,
    ) -> Result<NormalizedDocument, ClauseError> {
        let word_count = count_words(&text);
        if word_count < self.config.min_viable_words {
            tracing::warn!(words = word_count, "document unreadable");
            return Err(ClauseError::Unreadable {
                words: word_count,
                required: self.config.min_viable_words,
            });
        }

        Ok(NormalizedDocument {
            text,
            page_count,
            word_count,
            extraction_method,
            script_hint,
            ocr_confidence,
            format,
            trace: std::mem::take(trace),
        })
    }
}

/// Working script hypothesis: the caller's script, or the detected one for
/// `Auto`. `None` means `Auto` and nothing in the text matched any script.
fn resolve_hypothesis(
    requested: ScriptCode,
    text: &str,
    trace: &mut Vec<TraceStep>,
) -> Option<ScriptCode> {
    match requested {
        ScriptCode::Auto => {
            let detected = detect_script(text);
            let message = match detected {
                Some(script) => format!("detected script {script}"),
                None => "no script detected in extracted text".to_string(),
            };
            step(trace, TraceStepType::DetectScript, message);
            detected
        }
        other => Some(other),
    }
}

/// Script reported on the output document. Never `Auto`.
fn final_script(requested: ScriptCode, hypothesis: Option<ScriptCode>, text: &str) -> ScriptCode {
    match requested {
        ScriptCode::Auto => hypothesis.unwrap_or_else(|| classify_script(text)),
        other => other,
    }
}

fn step(trace: &mut Vec<TraceStep>, step_type: TraceStepType, message: impl Into<String>) {
    let step = TraceStep::new(step_type, message);
    tracing::debug!(step = ?step.step_type, "{}", step.message);
    trace.push(step);
}

fn fmt_confidence(confidence: Option<f32>) -> String {
    confidence
        .map(|c| format!("{c:.1}"))
        .unwrap_or_else(|| "n/a".to_string())
}

/// Strip control characters (keeping newlines, tabs and page breaks) and
/// trailing whitespace on each line.
pub fn clean_text(text: &str) -> String {
    let filtered: String = text
        .chars()
        .filter(|&c| !c.is_control() || matches!(c, '\n' | '\t' | '\x0c'))
        .collect();
    let lines: Vec<&str> = filtered.lines().map(str::trim_end).collect();
    lines.join("\n").trim().to_string()
}
