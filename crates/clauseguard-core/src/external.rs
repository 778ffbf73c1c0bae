//! Findings produced outside the pattern engine, such as by a hosted
//! language-model review of the redacted text.

use crate::detect::engine::{context_window, CONTEXT_CHARS};
use crate::detect::locate::locate;
use crate::detect::{Finding, FindingSource};
use crate::error::ClauseError;
use crate::rules::{rule_for_kind, Category, ViolationType};
use serde::{Deserialize, Serialize};

/// Finding-compatible shape accepted from external analyses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalFinding {
    /// Free-form type string, mapped with [`ViolationType::from_external`].
    #[serde(alias = "type", alias = "kind")]
    pub violation_type: String,
    #[serde(default)]
    pub category: Option<Category>,
    /// Clamped to 0-100.
    pub severity: u32,
    /// Quoted clause text, located again in the normalized document.
    #[serde(alias = "matched_text", alias = "clause")]
    pub matched_span: String,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default, alias = "suggestion")]
    pub fair_alternative: Option<String>,
}

impl ExternalFinding {
    /// Convert to a [`Finding`] positioned in `text`.
    ///
    /// Category, section and remediation default to the catalog rule of the
    /// same kind. A span that cannot be located keeps its quoted text as
    /// context and gets an empty range.
    pub fn to_finding(&self, text: &str) -> Finding {
        let kind = ViolationType::from_external(&self.violation_type);
        let rule = rule_for_kind(kind);

        let (start, end, matched_span, surrounding_context) = match locate(text, &self.matched_span)
        {
            Some(found) => (
                found.start,
                found.end,
                text[found.start..found.end].to_string(),
                context_window(text, found.start, found.end, CONTEXT_CHARS).to_string(),
            ),
            None => {
                tracing::debug!(kind = %kind, "external span not found in document");
                (0, 0, self.matched_span.clone(), self.matched_span.clone())
            }
        };

        Finding {
            id: String::new(),
            rule_id: rule.map_or_else(|| "external".to_string(), |r| r.id.to_string()),
            kind,
            category: self
                .category
                .or(rule.map(|r| r.category))
                .unwrap_or_else(|| kind.default_category()),
            severity: self.severity.min(100) as u8,
            matched_span,
            surrounding_context,
            start,
            end,
            source_layer: FindingSource::External,
            explanation: self
                .explanation
                .clone()
                .or_else(|| rule.map(|r| r.explanation.to_string())),
            fair_alternative: self
                .fair_alternative
                .clone()
                .or_else(|| rule.map(|r| r.fair_alternative.to_string())),
            section: rule.and_then(|r| r.section).map(str::to_string),
            law_name: rule.and_then(|r| r.law_name).map(str::to_string),
        }
    }
}

/// Parse a JSON array of external findings.
pub fn parse_external_findings(json: &str) -> Result<Vec<ExternalFinding>, ClauseError> {
    Ok(serde_json::from_str(json)?)
}
