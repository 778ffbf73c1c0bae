//! Integration tests for the normalize-then-analyse pipeline.
//!
//! Uses a MockExtractor and MockOcr in place of poppler-utils and tesseract,
//! so these tests run without any external tools installed.

use std::cell::Cell;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use clauseguard_core::config::AnalyzerConfig;
use clauseguard_core::detect::Finding;
use clauseguard_core::deviation::templates::resolve_template;
use clauseguard_core::deviation::{DeviationSeverity, ObservedValue, Term};
use clauseguard_core::error::ClauseError;
use clauseguard_core::external::parse_external_findings;
use clauseguard_core::extraction::{PageText, PdfExtractor};
use clauseguard_core::model::{DocumentFormat, ExtractionMethod, ImageFormat, TraceStepType};
use clauseguard_core::normalize::{DocumentNormalizer, NormalizeRequest};
use clauseguard_core::ocr::{OcrEngine, OcrPage, OcrProgress};
use clauseguard_core::redact::redact;
use clauseguard_core::rules::{Category, ViolationType};
use clauseguard_core::score::{risk_score, RiskBand};
use clauseguard_core::script::ScriptCode;
use clauseguard_core::tool::Deadline;
use clauseguard_core::{analyze_document, analyze_text};

const CONTRACT: &str = "This Services Agreement is made between the Client and the Freelancer. \
The Freelancer shall provide design services as described in the statement of work. \
The Freelancer shall not compete with the Client for a period of two years after termination of this agreement. \
Payment shall be made within 60 days of receipt of invoice. \
The parties shall act in good faith and any dispute shall be resolved by arbitration in Mumbai.";

struct MockExtractor {
    pages: Vec<String>,
}

impl PdfExtractor for MockExtractor {
    fn extract_pages(
        &self,
        _pdf_bytes: &[u8],
        _deadline: &Deadline,
    ) -> Result<Vec<PageText>, ClauseError> {
        Ok(self
            .pages
            .iter()
            .enumerate()
            .map(|(i, text)| PageText {
                page_number: i + 1,
                text: text.clone(),
            })
            .collect())
    }

    fn backend_name(&self) -> &'static str {
        "mock"
    }
}

struct MockOcr {
    pages: Vec<(String, Option<f32>)>,
    calls: Arc<AtomicUsize>,
}

impl MockOcr {
    fn new(pages: &[(&str, Option<f32>)]) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let ocr = MockOcr {
            pages: pages
                .iter()
                .map(|(text, conf)| (text.to_string(), *conf))
                .collect(),
            calls: calls.clone(),
        };
        (ocr, calls)
    }

    fn page(&self, i: usize) -> OcrPage {
        let (text, confidence) = self.pages[i].clone();
        OcrPage {
            page_number: i + 1,
            text,
            confidence,
        }
    }
}

impl OcrEngine for MockOcr {
    fn recognize_pdf(
        &self,
        _pdf_bytes: &[u8],
        _page_count: usize,
        _language: &str,
        deadline: &Deadline,
        progress: &dyn Fn(OcrProgress),
    ) -> Result<Vec<OcrPage>, ClauseError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let total_pages = self.pages.len();
        let mut out = Vec::new();
        for i in 0..total_pages {
            deadline.check("ocr")?;
            progress(OcrProgress {
                page: i + 1,
                total_pages,
            });
            out.push(self.page(i));
        }
        Ok(out)
    }

    fn recognize_image(
        &self,
        _image_bytes: &[u8],
        _format: ImageFormat,
        _language: &str,
        deadline: &Deadline,
    ) -> Result<OcrPage, ClauseError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        deadline.check("ocr")?;
        Ok(self.page(0))
    }

    fn backend_name(&self) -> &'static str {
        "mock-ocr"
    }
}

fn normalizer(
    direct: &[&str],
    ocr: &[(&str, Option<f32>)],
) -> (DocumentNormalizer, Arc<AtomicUsize>) {
    normalizer_with_config(direct, ocr, AnalyzerConfig::default())
}

fn normalizer_with_config(
    direct: &[&str],
    ocr: &[(&str, Option<f32>)],
    config: AnalyzerConfig,
) -> (DocumentNormalizer, Arc<AtomicUsize>) {
    let extractor = MockExtractor {
        pages: direct.iter().map(|s| s.to_string()).collect(),
    };
    let (ocr, calls) = MockOcr::new(ocr);
    (
        DocumentNormalizer::new(Box::new(extractor), Box::new(ocr), config),
        calls,
    )
}

fn pdf<'a>() -> NormalizeRequest<'a> {
    NormalizeRequest::new(DocumentFormat::Pdf)
}

fn of_kind(findings: &[Finding], kind: ViolationType) -> Vec<&Finding> {
    findings.iter().filter(|f| f.kind == kind).collect()
}

// ---------------------------------------------------------------------------
// Test 1: Healthy text layer is used as-is, OCR never runs
// ---------------------------------------------------------------------------
#[test]
fn good_text_layer_skips_ocr() {
    let (normalizer, calls) = normalizer(&[CONTRACT], &[("unused", Some(90.0))]);

    let doc = normalizer.normalize(b"%PDF", &pdf()).unwrap();

    assert_eq!(doc.extraction_method, ExtractionMethod::DirectText);
    assert_eq!(doc.script_hint, ScriptCode::English);
    assert_eq!(doc.ocr_confidence, None);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(doc.word_count >= 50);
}

// ---------------------------------------------------------------------------
// Test 2: Near-empty text layer escalates and OCR output replaces it
// ---------------------------------------------------------------------------
#[test]
fn sparse_text_layer_escalates_to_ocr() {
    let (normalizer, calls) = normalizer(&["Scanned by CamScanner"], &[(CONTRACT, Some(85.0))]);

    let doc = normalizer.normalize(b"%PDF", &pdf()).unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(doc.extraction_method, ExtractionMethod::Ocr);
    assert_eq!(doc.ocr_confidence, Some(85.0));
    assert!(doc.text.contains("shall not compete"));
    assert!(doc
        .trace
        .iter()
        .any(|s| s.step_type == TraceStepType::Escalate));
}

// ---------------------------------------------------------------------------
// Test 3: Mojibake text layer is replaced even when OCR finds fewer words
// ---------------------------------------------------------------------------
#[test]
fn garbled_text_layer_is_replaced_by_ocr() {
    let garbled = "ÃƒÂ¢ Ã¢â‚¬Å ".repeat(60);
    let (normalizer, _) = normalizer(&[&garbled], &[(CONTRACT, Some(80.0))]);
    let request = pdf().with_script(ScriptCode::English);

    let doc = normalizer.normalize(b"%PDF", &request).unwrap();

    assert_eq!(doc.extraction_method, ExtractionMethod::Ocr);
    assert!(doc.word_count < 120);
    assert!(doc.text.starts_with("This Services Agreement"));
}

// ---------------------------------------------------------------------------
// Test 4: Hindi requested but the text layer has no Devanagari
// ---------------------------------------------------------------------------
#[test]
fn missing_indic_script_escalates() {
    let hindi = "यह अनुबंध ग्राहक और फ्रीलांसर के बीच है। फ्रीलांसर दो वर्ष तक प्रतिस्पर्धा नहीं करेगा। \
भुगतान साठ दिनों के भीतर किया जाएगा और विवाद मध्यस्थता से सुलझाए जाएंगे।";
    let (normalizer, calls) = normalizer(&[CONTRACT], &[(hindi, Some(70.0))]);
    let request = pdf().with_script(ScriptCode::Devanagari);

    let doc = normalizer.normalize(b"%PDF", &request).unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(doc.extraction_method, ExtractionMethod::Ocr);
    assert_eq!(doc.script_hint, ScriptCode::Devanagari);
}

// ---------------------------------------------------------------------------
// Test 5: Forced OCR with an empty OCR result keeps the direct text
// ---------------------------------------------------------------------------
#[test]
fn forced_ocr_with_blank_result_keeps_direct_text() {
    let (normalizer, calls) = normalizer(&[CONTRACT], &[("", None)]);
    let request = pdf().with_force_ocr(true);

    let doc = normalizer.normalize(b"%PDF", &request).unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(doc.extraction_method, ExtractionMethod::DirectText);
}

// ---------------------------------------------------------------------------
// Test 6: Normalizing the same bytes twice gives the same document
// ---------------------------------------------------------------------------
#[test]
fn normalization_is_idempotent() {
    let (normalizer, _) = normalizer(&["tiny"], &[(CONTRACT, Some(88.0))]);

    let first = normalizer.normalize(b"%PDF", &pdf()).unwrap();
    let second = normalizer.normalize(b"%PDF", &pdf()).unwrap();

    assert_eq!(first.text, second.text);
    assert_eq!(first.extraction_method, second.extraction_method);
    assert_eq!(first.script_hint, second.script_hint);
    assert_eq!(first.word_count, second.word_count);
    assert_eq!(first.trace, second.trace);
}

// ---------------------------------------------------------------------------
// Test 7: Too few words even after OCR is unreadable
// ---------------------------------------------------------------------------
#[test]
fn too_few_words_after_ocr_is_unreadable() {
    let (normalizer, _) = normalizer(&[""], &[("blurry scan", Some(30.0))]);

    let err = normalizer.normalize(b"%PDF", &pdf()).unwrap_err();

    assert!(matches!(err, ClauseError::Unreadable { words: 2, .. }));
    assert_eq!(err.reason(), "unreadable");
}

// ---------------------------------------------------------------------------
// Test 8: Low-confidence photo is rejected, a clear one is accepted
// ---------------------------------------------------------------------------
#[test]
fn image_confidence_gate() {
    let request = NormalizeRequest::new(DocumentFormat::Image(ImageFormat::Png));

    let (blurry, _) = normalizer(&[], &[(CONTRACT, Some(25.0))]);
    let err = blurry.normalize(b"\x89PNG", &request).unwrap_err();
    assert_eq!(err.reason(), "low_confidence_ocr");

    let (clear, calls) = normalizer(&[], &[(CONTRACT, Some(91.0))]);
    let doc = clear.normalize(b"\x89PNG", &request).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(doc.extraction_method, ExtractionMethod::Ocr);
    assert_eq!(doc.page_count, 1);
    assert_eq!(doc.format, DocumentFormat::Image(ImageFormat::Png));
}

// ---------------------------------------------------------------------------
// Test 9: Plain text never escalates, even when OCR is forced
// ---------------------------------------------------------------------------
#[test]
fn plain_text_never_escalates() {
    let (normalizer, calls) = normalizer(&[], &[(CONTRACT, Some(99.0))]);
    let request = NormalizeRequest::new(DocumentFormat::PlainText).with_force_ocr(true);

    let doc = normalizer.normalize(CONTRACT.as_bytes(), &request).unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(doc.extraction_method, ExtractionMethod::DirectText);
    assert_eq!(doc.format, DocumentFormat::PlainText);
    assert_eq!(doc.text, CONTRACT);
}

// ---------------------------------------------------------------------------
// Test 10: Unsupported upload is rejected before any extraction
// ---------------------------------------------------------------------------
#[test]
fn unsupported_format_is_rejected() {
    let err = DocumentFormat::resolve(Some("fees.xlsx"), None, b"PK\x03\x04").unwrap_err();
    assert_eq!(err.reason(), "unsupported_format");

    let err = DocumentFormat::resolve(None, Some("application/msword"), b"").unwrap_err();
    assert!(matches!(err, ClauseError::UnsupportedFormat(_)));
}

// ---------------------------------------------------------------------------
// Test 11: Progress is reported once per OCR page
// ---------------------------------------------------------------------------
#[test]
fn progress_reported_per_page() {
    let (normalizer, _) = normalizer(
        &["", "", ""],
        &[(CONTRACT, Some(80.0)), (CONTRACT, Some(80.0)), ("", None)],
    );
    let seen = Cell::new(0usize);
    let last = Cell::new((0usize, 0usize));
    let progress = |p: OcrProgress| {
        seen.set(seen.get() + 1);
        last.set((p.page, p.total_pages));
    };
    let request = pdf().with_progress(&progress);

    let doc = normalizer.normalize(b"%PDF", &request).unwrap();

    assert_eq!(seen.get(), 3);
    assert_eq!(last.get(), (3, 3));
    assert_eq!(doc.page_count, 3);
}

// ---------------------------------------------------------------------------
// Test 12: Cancellation and timeout abort OCR without partial output
// ---------------------------------------------------------------------------
#[test]
fn cancellation_aborts_ocr() {
    let (normalizer, _) = normalizer(&[""], &[(CONTRACT, Some(80.0))]);
    let cancel = Arc::new(AtomicBool::new(true));
    let request = pdf().with_cancel(cancel);

    let err = normalizer.normalize(b"%PDF", &request).unwrap_err();
    assert_eq!(err.reason(), "cancelled");
}

#[test]
fn exhausted_budget_times_out() {
    let config = AnalyzerConfig {
        timeout_secs: 0,
        ..AnalyzerConfig::default()
    };
    let (normalizer, _) = normalizer_with_config(&[""], &[(CONTRACT, Some(80.0))], config);

    let err = normalizer.normalize(b"%PDF", &pdf()).unwrap_err();
    assert!(matches!(err, ClauseError::Timeout { .. }));
}

// ---------------------------------------------------------------------------
// Test 13: Non-compete clause yields one severe legal finding
// ---------------------------------------------------------------------------
#[test]
fn non_compete_end_to_end() {
    let (normalizer, _) = normalizer(&[CONTRACT], &[]);
    let template = resolve_template("freelance_general");

    let report = analyze_document(&normalizer, b"%PDF", &pdf(), template).unwrap();

    let legal: Vec<&Finding> = report
        .result
        .findings
        .iter()
        .filter(|f| f.category == Category::Legal)
        .collect();
    assert_eq!(legal.len(), 1);
    assert_eq!(legal[0].kind, ViolationType::NonCompete);
    assert!(legal[0].severity >= 90);
    assert_eq!(legal[0].section.as_deref(), Some("Section 27"));
    assert_eq!(report.result.findings[0].id, "F-001");
    assert_eq!(report.provenance.extraction_method, ExtractionMethod::DirectText);
    assert!(report.result.risk_score >= 50);
}

// ---------------------------------------------------------------------------
// Test 14: 60-day payment is a critical deviation from the fair 30 days
// ---------------------------------------------------------------------------
#[test]
fn sixty_day_payment_is_critical_deviation() {
    let template = resolve_template("freelance_general");
    let result = analyze_text(CONTRACT, ScriptCode::Auto, template);

    let payment: Vec<_> = result
        .deviations
        .iter()
        .filter(|d| d.term == Term::PaymentDays)
        .collect();
    assert_eq!(payment.len(), 1);
    assert_eq!(payment[0].observed_value, ObservedValue::Days(60));
    assert_eq!(payment[0].fair_value, 30);
    assert_eq!(payment[0].severity, DeviationSeverity::Critical);
    assert_eq!(result.template, "freelance_general");
}

// ---------------------------------------------------------------------------
// Test 15: Empty text scores zero
// ---------------------------------------------------------------------------
#[test]
fn empty_text_scores_zero() {
    let result = analyze_text("", ScriptCode::Auto, resolve_template("freelance_general"));

    assert!(result.findings.is_empty());
    assert!(result.deviations.is_empty());
    assert_eq!(result.risk_score, 0);
    assert_eq!(result.risk_band, RiskBand::Low);
}

// ---------------------------------------------------------------------------
// Test 16: Repeated boilerplate collapses to one finding
// ---------------------------------------------------------------------------
#[test]
fn repeated_clause_is_reported_once() {
    let text = "The Freelancer shall not compete with the Client for a period of two years. \
The Freelancer shall not compete with the Client for a period of two years.";
    let result = analyze_text(text, ScriptCode::English, resolve_template("freelance_general"));

    assert_eq!(of_kind(&result.findings, ViolationType::NonCompete).len(), 1);
}

// ---------------------------------------------------------------------------
// Test 17: Merging external findings drops duplicates and rescores
// ---------------------------------------------------------------------------
#[test]
fn external_findings_merge_and_rescore() {
    let mut result = analyze_text(
        CONTRACT,
        ScriptCode::English,
        resolve_template("freelance_general"),
    );
    let before = result.findings.len();

    let external = parse_external_findings(
        r#"[
            {"type": "non_compete", "severity": 95,
             "matched_text": "shall not compete with the Client for a period of"},
            {"type": "scope creep", "severity": 50,
             "clause": "design services as described in the statement of work"},
            {"type": "gdpr_breach", "severity": 40,
             "clause": "this sentence is nowhere in the contract"}
        ]"#,
    )
    .unwrap();
    result.merge_external(CONTRACT, &external);

    assert_eq!(result.findings.len(), before + 2);
    assert_eq!(of_kind(&result.findings, ViolationType::NonCompete).len(), 1);

    let revisions = of_kind(&result.findings, ViolationType::UnlimitedRevisions);
    assert_eq!(revisions.len(), 1);
    assert!(revisions[0].is_located());
    assert_eq!(revisions[0].category, Category::Unfair);

    let other = of_kind(&result.findings, ViolationType::Other);
    assert_eq!(other.len(), 1);
    assert!(!other[0].is_located());
    assert_eq!(other[0].rule_id, "external");

    let ids: Vec<&str> = result.findings.iter().map(|f| f.id.as_str()).collect();
    let expected: Vec<String> = (1..=ids.len()).map(|i| format!("F-{i:03}")).collect();
    assert_eq!(ids, expected);
    assert_eq!(result.risk_score, risk_score(&result.findings));
    assert_eq!(result.risk_band, RiskBand::from_score(result.risk_score));
}

// ---------------------------------------------------------------------------
// Test 18: Redacted text keeps clauses detectable
// ---------------------------------------------------------------------------
#[test]
fn redaction_preserves_detection() {
    let text = format!(
        "{CONTRACT} Contact priya.sharma@example.com or +91 98765 43210 for invoices."
    );
    let redacted = redact(&text);

    assert!(!redacted.text.contains("priya.sharma"));
    assert!(!redacted.text.contains("98765"));
    assert!(redacted.total() >= 2);

    let result = analyze_text(
        &redacted.text,
        ScriptCode::English,
        resolve_template("freelance_general"),
    );
    assert_eq!(of_kind(&result.findings, ViolationType::NonCompete).len(), 1);
}

// ---------------------------------------------------------------------------
// Test 19: Low OCR confidence on an escalated PDF is recorded, not fatal
// ---------------------------------------------------------------------------
#[test]
fn escalated_pdf_with_low_confidence_still_succeeds() {
    let (normalizer, calls) = normalizer(&["Scanned"], &[(CONTRACT, Some(25.0))]);
    let template = resolve_template("freelance_general");

    let report = analyze_document(&normalizer, b"%PDF", &pdf(), template).unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let provenance = &report.provenance;
    assert_eq!(provenance.extraction_method, ExtractionMethod::Ocr);
    assert_eq!(provenance.ocr_confidence, Some(25.0));
    assert_eq!(provenance.format, DocumentFormat::Pdf);
    assert!(provenance
        .trace
        .iter()
        .any(|s| s.step_type == TraceStepType::Ocr && s.message.contains("low OCR confidence")));
    assert_eq!(
        of_kind(&report.result.findings, ViolationType::NonCompete).len(),
        1
    );
}

// ---------------------------------------------------------------------------
// Test 20: Short but valid text layer is kept when OCR reads fewer words
// ---------------------------------------------------------------------------
#[test]
fn short_text_layer_kept_when_ocr_reads_less() {
    let direct = "The Freelancer shall deliver the logo designs to the Client within ten days of signing this agreement.";
    let (normalizer, calls) = normalizer(&[direct], &[("The Freelancer shall deliver", Some(60.0))]);

    let doc = normalizer.normalize(b"%PDF", &pdf()).unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(doc.extraction_method, ExtractionMethod::DirectText);
    assert_eq!(doc.text, direct);
    assert_eq!(doc.word_count, 17);
    assert_eq!(doc.ocr_confidence, None);
    assert_eq!(doc.script_hint, ScriptCode::English);
    assert!(doc
        .trace
        .iter()
        .any(|s| s.step_type == TraceStepType::Escalate));
    assert!(doc
        .trace
        .iter()
        .any(|s| s.step_type == TraceStepType::Decide && s.message.contains("kept direct text")));
}
