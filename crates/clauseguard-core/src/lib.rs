pub mod config;
pub mod detect;
pub mod deviation;
pub mod error;
pub mod external;
pub mod extraction;
pub mod model;
pub mod normalize;
pub mod ocr;
pub mod redact;
pub mod rules;
pub mod score;
pub mod script;
pub mod tool;

use detect::{AnalysisResult, ViolationDetector};
use deviation::check_deviations;
use deviation::templates::FairTemplate;
use error::ClauseError;
use model::{DocumentProvenance, NormalizedDocument};
use normalize::{DocumentNormalizer, NormalizeRequest};
use script::{classify_script, ScriptCode};
use serde::{Deserialize, Serialize};

/// Analysis of one document together with how its text was obtained.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub provenance: DocumentProvenance,
    pub result: AnalysisResult,
}

/// Main API entry point: normalize an uploaded document and analyse it.
///
/// Normalization failures (unsupported format, corrupt container, timeout,
/// unreadable text) are the only errors; detection and scoring always
/// succeed.
pub fn analyze_document(
    normalizer: &DocumentNormalizer,
    bytes: &[u8],
    request: &NormalizeRequest<'_>,
    template: &FairTemplate,
) -> Result<AnalysisReport, ClauseError> {
    let doc = normalizer.normalize(bytes, request)?;
    Ok(analyze_normalized(&doc, template))
}

/// Analyse an already normalized document.
pub fn analyze_normalized(doc: &NormalizedDocument, template: &FairTemplate) -> AnalysisReport {
    AnalysisReport {
        provenance: doc.provenance(),
        result: analyze_text(&doc.text, doc.script_hint, template),
    }
}

/// Run detection, deviation checks and scoring over plain text.
///
/// `Auto` classifies the text first.
pub fn analyze_text(text: &str, script: ScriptCode, template: &FairTemplate) -> AnalysisResult {
    let script = match script {
        ScriptCode::Auto => classify_script(text),
        other => other,
    };
    let findings = ViolationDetector::builtin().detect(text, script);
    let deviations = check_deviations(text, template);
    let result = AnalysisResult::new(findings, deviations, template.name.clone());
    tracing::info!(
        findings = result.findings.len(),
        deviations = result.deviations.len(),
        score = result.risk_score,
        band = %result.risk_band,
        template = %result.template,
        "analysis complete"
    );
    result
}
