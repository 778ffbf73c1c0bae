//! OCR-tolerant relocation of a quoted span inside normalized text.
//!
//! External analyses quote clauses back to us, often from a cleaner or
//! differently recognized copy of the document. Characters are first folded
//! through a table of common OCR confusions, then a bounded edit-distance
//! search finds the closest substring.

/// Longest needle considered, in characters. Longer quotes are truncated.
pub const MAX_NEEDLE_CHARS: usize = 400;

/// Needles shorter than this, in characters, are matched exactly only. A
/// one-edit budget would let them match almost anywhere.
pub const MIN_APPROXIMATE_CHARS: usize = 4;

/// A span found in the haystack, in byte offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Located {
    pub start: usize,
    pub end: usize,
    /// Edit distance after folding; 0 for an exact or fold-equal match.
    pub distance: usize,
}

/// Canonical form of a character for comparison.
///
/// Pairs OCR engines commonly confuse map to the same key.
pub fn fold_char(c: char) -> char {
    match c {
        '0' | 'O' | 'o' => 'o',
        '1' | 'l' | 'I' | 'i' | '|' | '!' => 'l',
        '5' | 'S' | 's' => 's',
        '8' | 'B' | 'b' => 'b',
        '\u{2018}' | '\u{2019}' | '`' | '\u{00B4}' => '\'',
        '\u{201C}' | '\u{201D}' => '"',
        '\u{2013}' | '\u{2014}' | '\u{2212}' => '-',
        c if c.is_whitespace() => ' ',
        c => c.to_lowercase().next().unwrap_or(c),
    }
}

/// Edit budget for a needle of `len` characters: about one error per eight
/// characters, at least one.
pub fn max_distance(len: usize) -> usize {
    (len / 8).clamp(1, 24)
}

/// Locate `needle` in `haystack`.
///
/// Exact matches win. Otherwise the best approximate match within the edit
/// budget is returned, the earliest on ties. Needles under
/// [`MIN_APPROXIMATE_CHARS`] are never matched approximately.
pub fn locate(haystack: &str, needle: &str) -> Option<Located> {
    let needle = needle.trim();
    if needle.is_empty() || haystack.is_empty() {
        return None;
    }
    if let Some(start) = haystack.find(needle) {
        return Some(Located {
            start,
            end: start + needle.len(),
            distance: 0,
        });
    }

    if needle.chars().count() < MIN_APPROXIMATE_CHARS {
        return None;
    }

    let pattern: Vec<char> = needle.chars().take(MAX_NEEDLE_CHARS).map(fold_char).collect();
    let (offsets, text): (Vec<usize>, Vec<char>) = haystack
        .char_indices()
        .map(|(i, c)| (i, fold_char(c)))
        .unzip();

    let (distance, first, last) = approximate_search(&text, &pattern, max_distance(pattern.len()))?;
    let start = offsets[first];
    let end = offsets.get(last).copied().unwrap_or(haystack.len());
    Some(Located {
        start,
        end,
        distance,
    })
}

/// Sellers' algorithm: edit distance of `pattern` against any substring of
/// `text`. Returns (distance, start char, end char exclusive) of the best
/// match within `budget`.
fn approximate_search(text: &[char], pattern: &[char], budget: usize) -> Option<(usize, usize, usize)> {
    let m = pattern.len();
    // (cost, start) for each pattern prefix, against text[..j].
    let mut prev: Vec<(usize, usize)> = (0..=m).map(|i| (i, 0)).collect();
    let mut cur = prev.clone();
    let mut best: Option<(usize, usize, usize)> = None;

    for j in 1..=text.len() {
        cur[0] = (0, j);
        for i in 1..=m {
            let substitution = usize::from(pattern[i - 1] != text[j - 1]);
            let diag = (prev[i - 1].0 + substitution, prev[i - 1].1);
            let skip_pattern = (cur[i - 1].0 + 1, cur[i - 1].1);
            let skip_text = (prev[i].0 + 1, prev[i].1);
            cur[i] = [skip_pattern, skip_text]
                .into_iter()
                .fold(diag, |acc, c| if c.0 < acc.0 { c } else { acc });
        }

        let (cost, start) = cur[m];
        if cost <= budget && best.map_or(true, |(b, _, _)| cost < b) {
            best = Some((cost, start, j));
            if cost == 0 {
                break;
            }
        }
        std::mem::swap(&mut prev, &mut cur);
    }

    best
}
