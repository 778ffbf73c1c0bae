//! Term extraction: payment window, revision rounds and notice periods.

use crate::deviation::{ObservedValue, Term};
use regex::Regex;
use std::sync::LazyLock;

/// A number as written in contracts: digits or a small English number word.
const NUM: &str = r"(\d{1,3}|one\s+hundred(?:\s+and)?\s+twenty|forty[\s-]five|seventy[\s-]five|one|two|three|four|five|six|seven|eight|nine|ten|fifteen|twenty|thirty|forty|sixty|seventy|ninety)";
/// Optional parenthesised repeat, as in "thirty (30) days".
const ECHO: &str = r"\s*(?:\(\s*\d{1,3}\s*\)\s*)?";

#[derive(Debug, Clone, Copy)]
enum Reading {
    /// Capture group 1 holds the number.
    Number,
    /// The match itself means "unlimited".
    Unlimited,
    /// The match itself means zero days.
    Zero,
}

struct TermPattern {
    regex: Regex,
    reading: Reading,
}

/// A term value found in the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedTerm {
    pub term: Term,
    pub value: ObservedValue,
    pub matched_text: String,
}

fn term_patterns(term: Term) -> Vec<(String, Reading)> {
    let notice =
        format!(r"{NUM}{ECHO}(?:calendar\s+|business\s+|working\s+)?days?['’]?\s*(?:prior\s+|advance\s+)?(?:written\s+)?notice");
    // Mutual termination clauses bind both parties to the same notice.
    let mutual = (
        format!(r"(?i)\b(?:either\s+party|each\s+party|both\s+parties|any\s+party)\b[^.]{{0,60}}?\bterminat\w*[^.]{{0,60}}?\b{notice}"),
        Reading::Number,
    );
    match term {
        Term::PaymentDays => vec![
            (
                format!(r"(?i)\bpayments?\b[^.]{{0,60}}?\bwithin\s+{NUM}{ECHO}(?:calendar\s+|business\s+|working\s+)?days"),
                Reading::Number,
            ),
            (
                format!(r"(?i)\b(?:invoices?|fees?|amounts?)\b[^.]{{0,60}}?\b(?:payable|paid|due|settled|cleared)\s+within\s+{NUM}{ECHO}(?:calendar\s+|business\s+|working\s+)?days"),
                Reading::Number,
            ),
            (
                format!(r"(?i)\b(?:pay|pays|paid)\b[^.]{{0,60}}?\bwithin\s+{NUM}{ECHO}(?:calendar\s+|business\s+|working\s+)?days"),
                Reading::Number,
            ),
            (r"(?i)\bnet[\s-]?(\d{1,3})\b".to_string(), Reading::Number),
            (
                format!(r"(?i)\b(?:pay|paid|payable)\b[^.]{{0,40}}?\b{NUM}{ECHO}days\s+(?:after|from|of)\s+(?:the\s+)?(?:receipt\s+of\s+)?(?:invoice|delivery|acceptance)"),
                Reading::Number,
            ),
        ],
        Term::RevisionRounds => vec![
            (
                r"(?i)\b(?:unlimited|unrestricted|infinite|any\s+number\s+of)\s+(?:revisions?|rounds?\s+of\s+revisions?|changes|iterations)".to_string(),
                Reading::Unlimited,
            ),
            (
                r"(?i)\brevisions?\s+until\s+(?:the\s+)?client\s+is\s+(?:fully\s+|completely\s+)?satisfied".to_string(),
                Reading::Unlimited,
            ),
            (
                format!(r"(?i)\b{NUM}{ECHO}(?:rounds?\s+of\s+)?(?:revisions?|iterations)\b"),
                Reading::Number,
            ),
            (
                format!(r"(?i)\brevisions?\b[^.]{{0,40}}?\b(?:limited\s+to|up\s+to|maximum\s+of|max\.?)\s+{NUM}\b"),
                Reading::Number,
            ),
        ],
        Term::ClientNoticeDays => vec![
            (
                r"(?i)\b(?:client|company)\s+may\s+terminate\b[^.]{0,60}?\bwithout\s+(?:any\s+)?(?:prior\s+)?notice".to_string(),
                Reading::Zero,
            ),
            (
                format!(r"(?i)\b(?:client|company)\b[^.]{{0,60}}?\bterminat\w*[^.]{{0,60}}?\b{notice}"),
                Reading::Number,
            ),
            mutual,
        ],
        Term::FreelancerNoticeDays => vec![
            (
                format!(r"(?i)\b(?:freelancer|contractor|consultant|service\s+provider)\b[^.]{{0,60}}?\bterminat\w*[^.]{{0,60}}?\b{notice}"),
                Reading::Number,
            ),
            mutual,
        ],
    }
}

static EXTRACTORS: LazyLock<Vec<(Term, Vec<TermPattern>)>> = LazyLock::new(|| {
    Term::ALL
        .iter()
        .map(|&term| {
            let patterns = term_patterns(term)
                .into_iter()
                .filter_map(|(source, reading)| match Regex::new(&source) {
                    Ok(regex) => Some(TermPattern { regex, reading }),
                    Err(e) => {
                        tracing::error!(term = %term, error = %e, "skipping invalid term pattern");
                        None
                    }
                })
                .collect();
            (term, patterns)
        })
        .collect()
});

/// Replace digits of every Indic script with ASCII digits.
///
/// Each Indic block from Devanagari (U+0900) to Malayalam (U+0D00) is 128
/// code points wide with its digits at offsets 0x66..=0x6F.
pub fn fold_indic_digits(text: &str) -> String {
    text.chars()
        .map(|c| {
            let cp = c as u32;
            let offset = cp & 0x7F;
            if (0x0900..=0x0D7F).contains(&cp) && (0x66..=0x6F).contains(&offset) {
                char::from_digit(offset - 0x66, 10).unwrap_or(c)
            } else {
                c
            }
        })
        .collect()
}

/// Words that turn the number after them into a cross-reference
/// ("Section 12"), not a quantity.
const REFERENCE_MARKERS: &[&str] = &[
    "section", "sec", "clause", "article", "art", "schedule", "annexure", "para", "paragraph",
    "§",
];

fn is_reference(before: &str) -> bool {
    let last = before
        .trim_end()
        .rsplit(|c: char| c.is_whitespace())
        .next()
        .unwrap_or("")
        .trim_end_matches('.')
        .to_lowercase();
    REFERENCE_MARKERS.contains(&last.as_str()) || last.ends_with('§')
}

/// Parse digits or a number word.
pub fn parse_number(raw: &str) -> Option<u32> {
    if let Ok(n) = raw.parse::<u32>() {
        return Some(n);
    }
    let words: Vec<String> = raw
        .split(|c: char| c.is_whitespace() || c == '-')
        .filter(|w| !w.is_empty() && !w.eq_ignore_ascii_case("and"))
        .map(str::to_ascii_lowercase)
        .collect();
    let n = match words.join(" ").as_str() {
        "one" => 1,
        "two" => 2,
        "three" => 3,
        "four" => 4,
        "five" => 5,
        "six" => 6,
        "seven" => 7,
        "eight" => 8,
        "nine" => 9,
        "ten" => 10,
        "fifteen" => 15,
        "twenty" => 20,
        "thirty" => 30,
        "forty" => 40,
        "forty five" => 45,
        "sixty" => 60,
        "seventy" => 70,
        "seventy five" => 75,
        "ninety" => 90,
        "one hundred twenty" => 120,
        _ => return None,
    };
    Some(n)
}

/// Extract every term that appears in `text`. For each term the first
/// pattern that yields a value wins.
pub fn extract_terms(text: &str) -> Vec<ExtractedTerm> {
    let folded = fold_indic_digits(text);
    let mut found = Vec::new();

    for (term, patterns) in EXTRACTORS.iter() {
        let hit = patterns.iter().find_map(|p| {
            p.regex.captures_iter(&folded).find_map(|caps| {
                let whole = caps.get(0)?;
                let value = match p.reading {
                    Reading::Unlimited => ObservedValue::Unlimited,
                    Reading::Zero => ObservedValue::Days(0),
                    Reading::Number => {
                        let number = caps.get(1)?;
                        if is_reference(&folded[..number.start()]) {
                            return None;
                        }
                        let n = parse_number(number.as_str())?;
                        term.observed(n)
                    }
                };
                Some(ExtractedTerm {
                    term: *term,
                    value,
                    matched_text: whole.as_str().to_string(),
                })
            })
        });
        if let Some(extracted) = hit {
            tracing::debug!(term = %extracted.term, value = ?extracted.value, "extracted term");
            found.push(extracted);
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value_of(text: &str, term: Term) -> Option<ObservedValue> {
        extract_terms(text)
            .into_iter()
            .find(|t| t.term == term)
            .map(|t| t.value)
    }

    #[test]
    fn test_all_patterns_compile() {
        for (term, patterns) in EXTRACTORS.iter() {
            assert_eq!(patterns.len(), term_patterns(*term).len(), "{term}");
        }
    }

    #[test]
    fn test_fold_indic_digits() {
        assert_eq!(fold_indic_digits("६० दिन"), "60 दिन");
        assert_eq!(fold_indic_digits("௪௫ நாட்கள்"), "45 நாட்கள்");
        assert_eq!(fold_indic_digits("৩০ and ൯"), "30 and 9");
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("45"), Some(45));
        assert_eq!(parse_number("Thirty"), Some(30));
        assert_eq!(parse_number("forty-five"), Some(45));
        assert_eq!(parse_number("one hundred and twenty"), Some(120));
        assert_eq!(parse_number("several"), None);
    }

    #[test]
    fn test_payment_days() {
        assert_eq!(
            value_of("Payment within 60 days of invoice.", Term::PaymentDays),
            Some(ObservedValue::Days(60))
        );
        assert_eq!(
            value_of(
                "All invoices shall be payable within thirty (30) days.",
                Term::PaymentDays
            ),
            Some(ObservedValue::Days(30))
        );
        assert_eq!(
            value_of("Terms: Net 90.", Term::PaymentDays),
            Some(ObservedValue::Days(90))
        );
    }

    #[test]
    fn test_payment_days_with_devanagari_digits() {
        assert_eq!(
            value_of("Payment within ६० days of invoice.", Term::PaymentDays),
            Some(ObservedValue::Days(60))
        );
    }

    #[test]
    fn test_revisions() {
        assert_eq!(
            value_of("The Client is entitled to unlimited revisions.", Term::RevisionRounds),
            Some(ObservedValue::Unlimited)
        );
        assert_eq!(
            value_of("The fee includes three (3) rounds of revisions.", Term::RevisionRounds),
            Some(ObservedValue::Count(3))
        );
        assert_eq!(
            value_of("Revisions are limited to 2 per deliverable.", Term::RevisionRounds),
            Some(ObservedValue::Count(2))
        );
    }

    #[test]
    fn test_notice_periods_by_party() {
        let text = "The Client may terminate this Agreement with 7 days' written notice. \
                    The Freelancer may terminate this Agreement by giving 60 days prior notice.";
        assert_eq!(
            value_of(text, Term::ClientNoticeDays),
            Some(ObservedValue::Days(7))
        );
        assert_eq!(
            value_of(text, Term::FreelancerNoticeDays),
            Some(ObservedValue::Days(60))
        );
    }

    #[test]
    fn test_termination_without_notice_is_zero_days() {
        assert_eq!(
            value_of(
                "The Client may terminate the engagement without notice.",
                Term::ClientNoticeDays
            ),
            Some(ObservedValue::Days(0))
        );
    }

    #[test]
    fn test_plain_pay_verb() {
        assert_eq!(
            value_of(
                "The Client shall pay all invoices within 90 days.",
                Term::PaymentDays
            ),
            Some(ObservedValue::Days(90))
        );
        assert_eq!(
            value_of("The Client pays within forty-five days.", Term::PaymentDays),
            Some(ObservedValue::Days(45))
        );
    }

    #[test]
    fn test_mutual_notice_feeds_both_parties() {
        let text = "Either party may terminate with 3 days notice.";
        assert_eq!(
            value_of(text, Term::ClientNoticeDays),
            Some(ObservedValue::Days(3))
        );
        assert_eq!(
            value_of(text, Term::FreelancerNoticeDays),
            Some(ObservedValue::Days(3))
        );
    }

    #[test]
    fn test_party_specific_notice_beats_mutual() {
        let text = "Either party may terminate with 30 days notice. \
                    The Client may terminate this Agreement with 7 days' written notice.";
        assert_eq!(
            value_of(text, Term::ClientNoticeDays),
            Some(ObservedValue::Days(7))
        );
        assert_eq!(
            value_of(text, Term::FreelancerNoticeDays),
            Some(ObservedValue::Days(30))
        );
    }

    #[test]
    fn test_section_numbers_are_not_revision_counts() {
        assert_eq!(value_of("Section 12 revisions apply.", Term::RevisionRounds), None);
        assert_eq!(value_of("See Clause 4 revisions.", Term::RevisionRounds), None);
        assert_eq!(value_of("Per §7 revisions are billed.", Term::RevisionRounds), None);
        assert_eq!(
            value_of(
                "Section 5 applies. The fee covers 2 revisions.",
                Term::RevisionRounds
            ),
            Some(ObservedValue::Count(2))
        );
    }

    #[test]
    fn test_no_terms() {
        assert!(extract_terms("").is_empty());
        assert!(extract_terms("This agreement is governed by the laws of India.").is_empty());
    }
}
