use crate::detect::outcome::{rank_findings, Finding, FindingSource};
use crate::rules::{catalog, ViolationRule};
use crate::script::ScriptCode;

/// Characters of context kept on each side of a match.
pub const CONTEXT_CHARS: usize = 100;
/// Matches of the same rule whose lengths differ by less than this, and whose
/// text already appears in an earlier finding's context, are duplicates.
pub const DEDUP_LENGTH_DELTA: usize = 20;

/// Runs a rule set over normalized text.
///
/// Holds only shared, immutable rules; every call creates its own match
/// iterators, so one detector can serve concurrent documents.
#[derive(Debug, Clone, Copy)]
pub struct ViolationDetector<'r> {
    rules: &'r [ViolationRule],
}

impl ViolationDetector<'static> {
    /// Detector over the built-in catalog.
    pub fn builtin() -> Self {
        ViolationDetector { rules: catalog() }
    }
}

impl Default for ViolationDetector<'static> {
    fn default() -> Self {
        Self::builtin()
    }
}

impl<'r> ViolationDetector<'r> {
    pub fn with_rules(rules: &'r [ViolationRule]) -> Self {
        ViolationDetector { rules }
    }

    /// Detect violations in `text`, ranked by severity.
    ///
    /// Total: any input, including empty text, yields a (possibly empty) list.
    pub fn detect(&self, text: &str, script: ScriptCode) -> Vec<Finding> {
        let mut findings: Vec<Finding> = Vec::new();
        if text.trim().is_empty() {
            return findings;
        }

        for rule in self.rules {
            let first_of_rule = findings.len();
            for pattern in rule.patterns_for(script) {
                for m in pattern.regex.find_iter(text) {
                    let candidate = build_finding(rule, text, m.start(), m.end());
                    if absorb_overlap(&mut findings, first_of_rule, &candidate)
                        || is_duplicate(&findings[first_of_rule..], &candidate)
                    {
                        continue;
                    }
                    findings.push(candidate);
                }
            }
        }

        rank_findings(&mut findings);
        tracing::debug!(
            findings = findings.len(),
            script = %script,
            "detection finished"
        );
        findings
    }
}

fn build_finding(rule: &ViolationRule, text: &str, start: usize, end: usize) -> Finding {
    Finding {
        id: String::new(),
        rule_id: rule.id.to_string(),
        kind: rule.kind,
        category: rule.category,
        severity: rule.severity,
        matched_span: text[start..end].to_string(),
        surrounding_context: context_window(text, start, end, CONTEXT_CHARS).to_string(),
        start,
        end,
        source_layer: FindingSource::Pattern,
        explanation: Some(rule.explanation.to_string()),
        fair_alternative: Some(rule.fair_alternative.to_string()),
        section: rule.section.map(str::to_string),
        law_name: rule.law_name.map(str::to_string),
    }
}

/// Resolve a candidate that overlaps findings of its own rule (from
/// `first_of_rule` on). The longest span wins and takes the place of the
/// first overlapped finding. Returns false when nothing overlaps.
fn absorb_overlap(findings: &mut Vec<Finding>, first_of_rule: usize, candidate: &Finding) -> bool {
    let overlapping: Vec<usize> = (first_of_rule..findings.len())
        .filter(|&i| findings[i].overlaps(candidate))
        .collect();
    let Some(&first) = overlapping.first() else {
        return false;
    };

    let span = |f: &Finding| f.end - f.start;
    let longest = overlapping
        .iter()
        .map(|&i| span(&findings[i]))
        .max()
        .unwrap_or(0);
    if span(candidate) > longest {
        findings[first] = candidate.clone();
        for &i in overlapping[1..].iter().rev() {
            findings.remove(i);
        }
    }
    true
}

/// `same_rule` holds only findings of the candidate's rule.
fn is_duplicate(same_rule: &[Finding], candidate: &Finding) -> bool {
    let len = candidate.matched_span.chars().count();
    same_rule.iter().any(|existing| {
        existing
            .surrounding_context
            .contains(candidate.matched_span.as_str())
            && existing.matched_span.chars().count().abs_diff(len) < DEDUP_LENGTH_DELTA
    })
}

/// Slice of `text` extending `radius` characters either side of
/// `start..end`. Both offsets must lie on char boundaries.
pub fn context_window(text: &str, start: usize, end: usize, radius: usize) -> &str {
    let from = if radius == 0 {
        start
    } else {
        text[..start]
            .char_indices()
            .rev()
            .nth(radius - 1)
            .map_or(0, |(i, _)| i)
    };
    let to = text[end..]
        .char_indices()
        .nth(radius)
        .map_or(text.len(), |(i, _)| end + i);
    &text[from..to]
}
