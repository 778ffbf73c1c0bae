//! Redaction of personal and financial identifiers before text leaves the
//! process for an external analysis service.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedactionKind {
    Email,
    Url,
    Gstin,
    Pan,
    Ifsc,
    BankAccount,
    Aadhaar,
    Phone,
}

impl RedactionKind {
    pub fn placeholder(self) -> &'static str {
        match self {
            RedactionKind::Email => "[EMAIL]",
            RedactionKind::Url => "[URL]",
            RedactionKind::Gstin => "[GSTIN]",
            RedactionKind::Pan => "[PAN]",
            RedactionKind::Ifsc => "[IFSC]",
            RedactionKind::BankAccount => "[BANK_ACCOUNT]",
            RedactionKind::Aadhaar => "[AADHAAR]",
            RedactionKind::Phone => "[PHONE]",
        }
    }
}

impl fmt::Display for RedactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = self.placeholder();
        write!(f, "{}", p[1..p.len() - 1].to_ascii_lowercase())
    }
}

/// Redacted text plus how many identifiers of each kind were replaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Redacted {
    pub text: String,
    pub counts: BTreeMap<RedactionKind, usize>,
}

impl Redacted {
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }
}

/// Applied in order: composite identifiers (GSTIN embeds a PAN, emails embed
/// domains) go before their parts, labelled account numbers before bare
/// digit runs.
const REDACTORS: &[(RedactionKind, &str)] = &[
    (
        RedactionKind::Email,
        r"(?i)\b[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}\b",
    ),
    (
        RedactionKind::Url,
        r"(?i)\b(?:https?://|www\.)[^\s<>()]+[^\s<>().,;:]",
    ),
    (
        RedactionKind::Gstin,
        r"\b\d{2}[A-Z]{5}\d{4}[A-Z][1-9A-Z]Z[0-9A-Z]\b",
    ),
    (RedactionKind::Pan, r"\b[A-Z]{5}\d{4}[A-Z]\b"),
    (RedactionKind::Ifsc, r"\b[A-Z]{4}0[A-Z0-9]{6}\b"),
    (
        RedactionKind::BankAccount,
        r"(?i)(\b(?:a/c|acct\.?|account)\s*(?:no\.?|number|#)?\s*[:.\-]?\s*)(\d{9,18})\b",
    ),
    (RedactionKind::Aadhaar, r"\b[2-9]\d{3}[\s-]?\d{4}[\s-]?\d{4}\b"),
    (
        RedactionKind::Phone,
        r"(?:\+91[\s-]?|\b0)?\b[6-9]\d{4}[\s-]?\d{5}\b|\+\d{1,3}[\s-]?\d{2,5}[\s-]?\d{3,5}[\s-]?\d{3,5}\b",
    ),
];

static COMPILED: LazyLock<Vec<(RedactionKind, Regex)>> = LazyLock::new(|| {
    REDACTORS
        .iter()
        .filter_map(|&(kind, source)| match Regex::new(source) {
            Ok(regex) => Some((kind, regex)),
            Err(e) => {
                tracing::error!(kind = %kind, error = %e, "skipping invalid redaction pattern");
                None
            }
        })
        .collect()
});

/// Replace identifiers in `text` with typed placeholders.
pub fn redact(text: &str) -> Redacted {
    let mut current = text.to_string();
    let mut counts = BTreeMap::new();

    for (kind, regex) in COMPILED.iter() {
        let mut n = 0usize;
        let replaced = regex.replace_all(&current, |caps: &Captures| {
            n += 1;
            // Keep a label prefix, when the pattern captures one.
            match caps.get(2) {
                Some(_) => format!("{}{}", &caps[1], kind.placeholder()),
                None => kind.placeholder().to_string(),
            }
        });
        let replaced = replaced.into_owned();
        if n > 0 {
            counts.insert(*kind, n);
            current = replaced;
        }
    }

    if !counts.is_empty() {
        tracing::debug!(?counts, "redacted identifiers");
    }
    Redacted {
        text: current,
        counts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_patterns_compile() {
        assert_eq!(COMPILED.len(), REDACTORS.len());
    }

    #[test]
    fn test_email_and_url() {
        let r = redact("Contact priya.s@example.co.in or see https://example.com/terms.");
        assert_eq!(r.text, "Contact [EMAIL] or see [URL].");
        assert_eq!(r.counts[&RedactionKind::Email], 1);
        assert_eq!(r.counts[&RedactionKind::Url], 1);
    }

    #[test]
    fn test_gstin_is_not_double_counted_as_pan() {
        let r = redact("GSTIN 27AAPFU0939F1ZV, PAN ABCDE1234F");
        assert_eq!(r.text, "GSTIN [GSTIN], PAN [PAN]");
        assert_eq!(r.counts[&RedactionKind::Gstin], 1);
        assert_eq!(r.counts[&RedactionKind::Pan], 1);
    }

    #[test]
    fn test_bank_details_keep_label() {
        let r = redact("Account No: 123456789012, IFSC HDFC0001234");
        assert_eq!(r.text, "Account No: [BANK_ACCOUNT], IFSC [IFSC]");
        assert_eq!(r.total(), 2);
    }

    #[test]
    fn test_aadhaar_and_phone() {
        let r = redact("Aadhaar 2345 6789 0123, mobile +91 98765 43210");
        assert_eq!(r.text, "Aadhaar [AADHAAR], mobile [PHONE]");
    }

    #[test]
    fn test_contract_terms_survive() {
        let text = "Payment within 30 days of invoice. Fee of Rs. 50,000 per month.";
        let r = redact(text);
        assert_eq!(r.text, text);
        assert!(r.counts.is_empty());
    }
}
