//! Writing-system detection by code-point range statistics.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of characters sampled when classifying a document.
pub const CLASSIFY_SAMPLE_CHARS: usize = 5_000;

/// A writing system the pipeline can extract, OCR and match patterns for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptCode {
    /// Detect from the text. Only valid on input.
    Auto,
    English,
    Devanagari,
    Bengali,
    Gurmukhi,
    Gujarati,
    Odia,
    Tamil,
    Telugu,
    Kannada,
    Malayalam,
    Unknown,
}

/// Scripts that are real classification buckets, in tie-break order.
pub const DETECTABLE_SCRIPTS: &[ScriptCode] = &[
    ScriptCode::English,
    ScriptCode::Devanagari,
    ScriptCode::Bengali,
    ScriptCode::Gurmukhi,
    ScriptCode::Gujarati,
    ScriptCode::Odia,
    ScriptCode::Tamil,
    ScriptCode::Telugu,
    ScriptCode::Kannada,
    ScriptCode::Malayalam,
];

impl ScriptCode {
    /// Check whether a character falls in this script's code-point range.
    ///
    /// English covers ASCII letters only; `Auto` and `Unknown` match nothing.
    pub fn contains(self, c: char) -> bool {
        match self {
            ScriptCode::English => c.is_ascii_alphabetic(),
            ScriptCode::Devanagari => matches!(c, '\u{0900}'..='\u{097F}'),
            ScriptCode::Bengali => matches!(c, '\u{0980}'..='\u{09FF}'),
            ScriptCode::Gurmukhi => matches!(c, '\u{0A00}'..='\u{0A7F}'),
            ScriptCode::Gujarati => matches!(c, '\u{0A80}'..='\u{0AFF}'),
            ScriptCode::Odia => matches!(c, '\u{0B00}'..='\u{0B7F}'),
            ScriptCode::Tamil => matches!(c, '\u{0B80}'..='\u{0BFF}'),
            ScriptCode::Telugu => matches!(c, '\u{0C00}'..='\u{0C7F}'),
            ScriptCode::Kannada => matches!(c, '\u{0C80}'..='\u{0CFF}'),
            ScriptCode::Malayalam => matches!(c, '\u{0D00}'..='\u{0D7F}'),
            ScriptCode::Auto | ScriptCode::Unknown => false,
        }
    }

    /// Tesseract traineddata code for this script.
    ///
    /// Returns `None` for the sentinels; callers use [`OCR_SUPERSET`] instead.
    pub fn tesseract_lang(self) -> Option<&'static str> {
        match self {
            ScriptCode::English => Some("eng"),
            ScriptCode::Devanagari => Some("hin"),
            ScriptCode::Bengali => Some("ben"),
            ScriptCode::Gurmukhi => Some("pan"),
            ScriptCode::Gujarati => Some("guj"),
            ScriptCode::Odia => Some("ori"),
            ScriptCode::Tamil => Some("tam"),
            ScriptCode::Telugu => Some("tel"),
            ScriptCode::Kannada => Some("kan"),
            ScriptCode::Malayalam => Some("mal"),
            ScriptCode::Auto | ScriptCode::Unknown => None,
        }
    }

    pub fn is_indic(self) -> bool {
        !matches!(
            self,
            ScriptCode::English | ScriptCode::Auto | ScriptCode::Unknown
        )
    }

    /// Parse a user-supplied script name or ISO-ish language code.
    pub fn from_str_loose(s: &str) -> Option<ScriptCode> {
        let lower = s.trim().to_lowercase();
        let code = match lower.as_str() {
            "auto" => ScriptCode::Auto,
            "en" | "eng" | "english" | "latin" => ScriptCode::English,
            "hi" | "hin" | "hindi" | "mr" | "marathi" | "devanagari" => ScriptCode::Devanagari,
            "bn" | "ben" | "bengali" | "bangla" => ScriptCode::Bengali,
            "pa" | "pan" | "punjabi" | "gurmukhi" => ScriptCode::Gurmukhi,
            "gu" | "guj" | "gujarati" => ScriptCode::Gujarati,
            "or" | "ori" | "odia" | "oriya" => ScriptCode::Odia,
            "ta" | "tam" | "tamil" => ScriptCode::Tamil,
            "te" | "tel" | "telugu" => ScriptCode::Telugu,
            "kn" | "kan" | "kannada" => ScriptCode::Kannada,
            "ml" | "mal" | "malayalam" => ScriptCode::Malayalam,
            _ => return None,
        };
        Some(code)
    }
}

impl fmt::Display for ScriptCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScriptCode::Auto => "Auto",
            ScriptCode::English => "English",
            ScriptCode::Devanagari => "Devanagari",
            ScriptCode::Bengali => "Bengali",
            ScriptCode::Gurmukhi => "Gurmukhi",
            ScriptCode::Gujarati => "Gujarati",
            ScriptCode::Odia => "Odia",
            ScriptCode::Tamil => "Tamil",
            ScriptCode::Telugu => "Telugu",
            ScriptCode::Kannada => "Kannada",
            ScriptCode::Malayalam => "Malayalam",
            ScriptCode::Unknown => "Unknown",
        };
        write!(f, "{name}")
    }
}

/// Tesseract language string used when the script hypothesis is unresolved.
pub const OCR_SUPERSET: &str = "eng+hin+ben+pan+guj+ori+tam+tel+kan+mal";

/// Count characters per detectable script over the first `sample_chars`
/// characters. Indexed like [`DETECTABLE_SCRIPTS`].
fn bucket_counts(text: &str, sample_chars: usize) -> [usize; 10] {
    let mut counts = [0usize; 10];
    for c in text.chars().take(sample_chars) {
        if let Some(idx) = DETECTABLE_SCRIPTS.iter().position(|s| s.contains(c)) {
            counts[idx] += 1;
        }
    }
    counts
}

/// Detect the dominant script, or `None` when no character matched any range.
pub fn detect_script(text: &str) -> Option<ScriptCode> {
    let counts = bucket_counts(text, CLASSIFY_SAMPLE_CHARS);
    let mut best: Option<(usize, usize)> = None;
    for (idx, &count) in counts.iter().enumerate() {
        if count == 0 {
            continue;
        }
        // Strict comparison keeps the earlier bucket on ties.
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((idx, count));
        }
    }
    best.map(|(idx, _)| DETECTABLE_SCRIPTS[idx])
}

/// Classify the dominant script, defaulting to English.
pub fn classify_script(text: &str) -> ScriptCode {
    detect_script(text).unwrap_or(ScriptCode::English)
}

/// Count characters of `script` within the first `sample_chars` characters.
pub fn count_script_chars(text: &str, script: ScriptCode, sample_chars: usize) -> usize {
    text.chars()
        .take(sample_chars)
        .filter(|&c| script.contains(c))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_text_is_english() {
        assert_eq!(
            classify_script("The Client shall pay the Freelancer within 30 days."),
            ScriptCode::English
        );
    }

    #[test]
    fn hindi_text_is_devanagari() {
        assert_eq!(
            classify_script("भुगतान 30 दिनों के भीतर किया जाएगा"),
            ScriptCode::Devanagari
        );
    }

    #[test]
    fn dominant_script_wins_in_mixed_text() {
        // A few English legal terms inside a Tamil paragraph.
        let text = "ஒப்பந்தம் NDA இந்த ஒப்பந்தத்தின் விதிமுறைகள் பொருந்தும்";
        assert_eq!(classify_script(text), ScriptCode::Tamil);
    }

    #[test]
    fn no_matching_characters_defaults_to_english() {
        assert_eq!(detect_script("12345 !!! ---"), None);
        assert_eq!(classify_script("12345 !!! ---"), ScriptCode::English);
        assert_eq!(classify_script(""), ScriptCode::English);
    }

    #[test]
    fn latin_counting_is_case_insensitive() {
        assert_eq!(count_script_chars("ABCdef", ScriptCode::English, 100), 6);
    }

    #[test]
    fn ties_resolve_to_declaration_order() {
        // Three Latin letters, three Bengali characters.
        assert_eq!(classify_script("abc অআই"), ScriptCode::English);
    }

    #[test]
    fn only_the_sample_is_considered() {
        let mut text = "a".repeat(CLASSIFY_SAMPLE_CHARS);
        text.push_str(&"क".repeat(CLASSIFY_SAMPLE_CHARS * 2));
        assert_eq!(classify_script(&text), ScriptCode::English);
    }

    #[test]
    fn sentinels_have_no_tesseract_lang() {
        assert_eq!(ScriptCode::Auto.tesseract_lang(), None);
        assert_eq!(ScriptCode::Devanagari.tesseract_lang(), Some("hin"));
    }

    #[test]
    fn parse_loose_names() {
        assert_eq!(ScriptCode::from_str_loose("Hindi"), Some(ScriptCode::Devanagari));
        assert_eq!(ScriptCode::from_str_loose(" auto "), Some(ScriptCode::Auto));
        assert_eq!(ScriptCode::from_str_loose("klingon"), None);
    }
}
