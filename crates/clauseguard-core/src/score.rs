//! Risk score over a finding set.
//!
//! ```text
//! base      = 0.6 * mean(legal severities) + 0.4 * mean(unfair severities)
//! amplifier = min(1.5, 1 + 0.05 * finding count)
//! score     = round(clamp(base * amplifier, 0, 100))
//! ```
//!
//! Severities are summed as integers, so the score does not depend on the
//! order of the findings.

use crate::detect::Finding;
use crate::rules::Category;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const LEGAL_WEIGHT: f64 = 0.6;
pub const UNFAIR_WEIGHT: f64 = 0.4;
pub const AMPLIFIER_STEP: f64 = 0.05;
pub const AMPLIFIER_CAP: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskBand {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskBand {
    pub fn from_score(score: u8) -> RiskBand {
        match score {
            0..=29 => RiskBand::Low,
            30..=49 => RiskBand::Medium,
            50..=69 => RiskBand::High,
            _ => RiskBand::Critical,
        }
    }
}

impl fmt::Display for RiskBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskBand::Low => "low",
            RiskBand::Medium => "medium",
            RiskBand::High => "high",
            RiskBand::Critical => "critical",
        };
        f.pad(s)
    }
}

/// Intermediate values of a score computation, for explanations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub legal_count: usize,
    pub unfair_count: usize,
    pub legal_mean: f64,
    pub unfair_mean: f64,
    pub base: f64,
    pub amplifier: f64,
    pub score: u8,
}

pub fn score_breakdown(findings: &[Finding]) -> ScoreBreakdown {
    let (mut legal_sum, mut legal_count) = (0u64, 0usize);
    let (mut unfair_sum, mut unfair_count) = (0u64, 0usize);
    for finding in findings {
        let severity = u64::from(finding.severity.min(100));
        match finding.category {
            Category::Legal => {
                legal_sum += severity;
                legal_count += 1;
            }
            Category::Unfair => {
                unfair_sum += severity;
                unfair_count += 1;
            }
        }
    }

    let legal_mean = mean(legal_sum, legal_count);
    let unfair_mean = mean(unfair_sum, unfair_count);
    let base = LEGAL_WEIGHT * legal_mean + UNFAIR_WEIGHT * unfair_mean;
    let amplifier = (1.0 + AMPLIFIER_STEP * findings.len() as f64).min(AMPLIFIER_CAP);
    let score = if findings.is_empty() {
        0
    } else {
        (base * amplifier).clamp(0.0, 100.0).round() as u8
    };

    ScoreBreakdown {
        legal_count,
        unfair_count,
        legal_mean,
        unfair_mean,
        base,
        amplifier,
        score,
    }
}

/// 0-100 risk score. An empty set scores 0.
pub fn risk_score(findings: &[Finding]) -> u8 {
    score_breakdown(findings).score
}

fn mean(sum: u64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        sum as f64 / count as f64
    }
}
