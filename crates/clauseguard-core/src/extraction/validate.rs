//! Trust checks for directly extracted text.
//!
//! A failed check is a signal to escalate to OCR, not an error.

use crate::script::{count_script_chars, ScriptCode};
use std::collections::HashSet;

/// Characters inspected by the script presence check.
pub const SCRIPT_SAMPLE_CHARS: usize = 2_000;
/// Validation requires strictly more in-range characters than this.
pub const MIN_SCRIPT_CHARS: usize = 5;
/// Shorter text is never considered plausible English.
pub const MIN_PLAUSIBLE_CHARS: usize = 50;
/// Distinct stop-words required for plausible English.
pub const MIN_STOP_WORDS: usize = 2;

const STOP_WORDS: &[&str] = &[
    "the", "and", "of", "to", "in", "is", "for", "that", "with", "shall", "be", "this", "by",
    "on", "or", "as", "are", "any", "will", "an", "a", "from", "such", "may", "not",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Accepted,
    Rejected(String),
}

impl ValidationOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, ValidationOutcome::Accepted)
    }
}

/// Catch PDFs whose text layer decoded to the wrong encoding: an expected
/// Indic script must actually appear in the extracted text.
pub fn check_script_presence(text: &str, expected: ScriptCode) -> ValidationOutcome {
    let found = count_script_chars(text, expected, SCRIPT_SAMPLE_CHARS);
    if found > MIN_SCRIPT_CHARS {
        ValidationOutcome::Accepted
    } else {
        ValidationOutcome::Rejected(format!(
            "expected {expected} text but found only {found} {expected} characters"
        ))
    }
}

/// Catch mojibake: text that was extracted but is not readable English.
pub fn check_english_plausibility(text: &str) -> ValidationOutcome {
    let trimmed = text.trim();
    let length = trimmed.chars().count();
    if length < MIN_PLAUSIBLE_CHARS {
        return ValidationOutcome::Rejected(format!(
            "only {length} characters of text, need at least {MIN_PLAUSIBLE_CHARS}"
        ));
    }

    let lower = trimmed.to_lowercase();
    let found: HashSet<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| STOP_WORDS.contains(w))
        .collect();

    if found.len() >= MIN_STOP_WORDS {
        ValidationOutcome::Accepted
    } else {
        ValidationOutcome::Rejected(format!(
            "text does not read as English ({} common words found)",
            found.len()
        ))
    }
}

/// Run the check appropriate for `script`.
///
/// `Auto` and `Unknown` have nothing to check against and are accepted.
pub fn validate_extraction(text: &str, script: ScriptCode) -> ValidationOutcome {
    match script {
        ScriptCode::English => check_english_plausibility(text),
        s if s.is_indic() => check_script_presence(text, s),
        _ => ValidationOutcome::Accepted,
    }
}
