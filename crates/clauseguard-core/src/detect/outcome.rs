use crate::deviation::Deviation;
use crate::external::ExternalFinding;
use crate::rules::{Category, ViolationType};
use crate::score::{risk_score, RiskBand};
use serde::{Deserialize, Serialize};

/// Where a finding came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingSource {
    /// The built-in pattern catalog.
    Pattern,
    /// An external analysis merged in after detection.
    External,
}

/// A flagged clause in one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    /// Position in the ranked list ("F-001", ...). Reassigned when findings
    /// are merged.
    pub id: String,
    /// Catalog rule that fired, or "external" for unmatched external kinds.
    pub rule_id: String,
    pub kind: ViolationType,
    pub category: Category,
    /// 0-100
    pub severity: u8,
    /// The matched text, verbatim.
    pub matched_span: String,
    /// Up to 100 characters either side of the match.
    pub surrounding_context: String,
    /// Byte offset of the match in the normalized text.
    pub start: usize,
    /// Byte offset one past the match. Equal to `start` for external
    /// findings that could not be located.
    pub end: usize,
    pub source_layer: FindingSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fair_alternative: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub law_name: Option<String>,
}

impl Finding {
    pub fn is_located(&self) -> bool {
        self.end > self.start
    }

    pub fn overlaps(&self, other: &Finding) -> bool {
        self.is_located() && other.is_located() && self.start < other.end && other.start < self.end
    }
}

/// The complete result of analysing one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Ranked by severity, highest first.
    pub findings: Vec<Finding>,
    /// Terms that are legal but worse than the fair template.
    pub deviations: Vec<Deviation>,
    /// 0-100, derived from `findings` only.
    pub risk_score: u8,
    pub risk_band: RiskBand,
    /// Name of the fair template the deviations were checked against.
    pub template: String,
}

impl AnalysisResult {
    pub fn new(findings: Vec<Finding>, deviations: Vec<Deviation>, template: String) -> Self {
        let score = risk_score(&findings);
        AnalysisResult {
            findings,
            deviations,
            risk_score: score,
            risk_band: RiskBand::from_score(score),
            template,
        }
    }

    /// Merge externally produced findings and rescore.
    ///
    /// `text` is the normalized document the findings refer to; it is used to
    /// re-locate each external span. An external finding is dropped when a
    /// finding of the same kind already covers an overlapping span.
    pub fn merge_external(&mut self, text: &str, external: &[ExternalFinding]) {
        let mut added = 0usize;
        for ext in external {
            let finding = ext.to_finding(text);
            let duplicate = self.findings.iter().any(|f| {
                f.kind == finding.kind
                    && (f.overlaps(&finding)
                        || (!finding.is_located()
                            && f.matched_span.contains(finding.matched_span.as_str())))
            });
            if duplicate {
                tracing::debug!(kind = %finding.kind, "external finding duplicates an existing one");
                continue;
            }
            self.findings.push(finding);
            added += 1;
        }

        rank_findings(&mut self.findings);
        self.risk_score = risk_score(&self.findings);
        self.risk_band = RiskBand::from_score(self.risk_score);
        tracing::info!(
            added,
            offered = external.len(),
            score = self.risk_score,
            "merged external findings"
        );
    }

    pub fn legal_count(&self) -> usize {
        self.findings
            .iter()
            .filter(|f| f.category == Category::Legal)
            .count()
    }

    pub fn unfair_count(&self) -> usize {
        self.findings.len() - self.legal_count()
    }
}

/// Sort by severity descending (stable) and number the findings in order.
pub fn rank_findings(findings: &mut [Finding]) {
    findings.sort_by(|a, b| b.severity.cmp(&a.severity));
    for (i, finding) in findings.iter_mut().enumerate() {
        finding.id = format!("F-{:03}", i + 1);
    }
}
