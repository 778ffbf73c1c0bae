//! Deviations: contract terms that are legal but worse than a fair template.

pub mod extract;
pub mod templates;

use serde::{Deserialize, Serialize};
use std::fmt;
use templates::{FairTemplate, Threshold};

/// A numeric term compared against templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Term {
    PaymentDays,
    RevisionRounds,
    ClientNoticeDays,
    FreelancerNoticeDays,
}

/// Which way a threshold points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    HigherIsWorse,
    LowerIsWorse,
}

impl Term {
    pub const ALL: &'static [Term] = &[
        Term::PaymentDays,
        Term::RevisionRounds,
        Term::ClientNoticeDays,
        Term::FreelancerNoticeDays,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Term::PaymentDays => "payment_days",
            Term::RevisionRounds => "revision_rounds",
            Term::ClientNoticeDays => "client_notice_days",
            Term::FreelancerNoticeDays => "freelancer_notice_days",
        }
    }

    /// Client notice protects the freelancer, so shorter is worse. Every
    /// other term burdens the freelancer as it grows.
    pub fn direction(self) -> Direction {
        match self {
            Term::ClientNoticeDays => Direction::LowerIsWorse,
            _ => Direction::HigherIsWorse,
        }
    }

    /// Wrap a parsed number in the unit this term is measured in.
    pub fn observed(self, n: u32) -> ObservedValue {
        match self {
            Term::RevisionRounds => ObservedValue::Count(n),
            _ => ObservedValue::Days(n),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ObservedValue {
    Days(u32),
    Count(u32),
    Unlimited,
}

impl ObservedValue {
    pub fn number(self) -> Option<u32> {
        match self {
            ObservedValue::Days(n) | ObservedValue::Count(n) => Some(n),
            ObservedValue::Unlimited => None,
        }
    }
}

impl fmt::Display for ObservedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObservedValue::Days(n) => write!(f, "{n} days"),
            ObservedValue::Count(n) => write!(f, "{n}"),
            ObservedValue::Unlimited => write!(f, "unlimited"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviationSeverity {
    Fair,
    Warning,
    Critical,
}

impl fmt::Display for DeviationSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DeviationSeverity::Fair => "fair",
            DeviationSeverity::Warning => "warning",
            DeviationSeverity::Critical => "critical",
        };
        f.pad(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deviation {
    pub term: Term,
    pub observed_value: ObservedValue,
    pub fair_value: u32,
    pub severity: DeviationSeverity,
    pub recommendation: String,
    pub matched_text: String,
}

/// Grade an observed value against a threshold.
pub fn assess(value: ObservedValue, threshold: &Threshold, direction: Direction) -> DeviationSeverity {
    let n = match value.number() {
        Some(n) => n,
        None => return DeviationSeverity::Critical,
    };
    let (warning, critical) = match direction {
        Direction::HigherIsWorse => (n >= threshold.warning, n >= threshold.critical),
        Direction::LowerIsWorse => (n <= threshold.warning, n <= threshold.critical),
    };
    if critical {
        DeviationSeverity::Critical
    } else if warning {
        DeviationSeverity::Warning
    } else {
        DeviationSeverity::Fair
    }
}

/// Compare the terms found in `text` against `template`.
///
/// Only Warning and Critical terms are reported; fair or better-than-fair
/// terms produce nothing.
pub fn check_deviations(text: &str, template: &FairTemplate) -> Vec<Deviation> {
    extract::extract_terms(text)
        .into_iter()
        .filter_map(|found| {
            let threshold = template.threshold(found.term);
            let severity = assess(found.value, threshold, found.term.direction());
            if severity == DeviationSeverity::Fair {
                return None;
            }
            Some(Deviation {
                term: found.term,
                observed_value: found.value,
                fair_value: threshold.fair,
                severity,
                recommendation: recommendation(found.term, found.value, threshold.fair),
                matched_text: found.matched_text,
            })
        })
        .collect()
}

fn recommendation(term: Term, observed: ObservedValue, fair: u32) -> String {
    match term {
        Term::PaymentDays => format!(
            "Negotiate payment within {fair} days of invoice (contract says {observed})."
        ),
        Term::RevisionRounds => format!(
            "Limit included revisions to {fair} rounds and bill further rounds separately (contract says {observed})."
        ),
        Term::ClientNoticeDays => format!(
            "Ask for at least {fair} days' notice before the client can terminate (contract says {observed})."
        ),
        Term::FreelancerNoticeDays => format!(
            "Your own notice period should not exceed {fair} days (contract says {observed})."
        ),
    }
}
