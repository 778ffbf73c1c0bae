use crate::extraction::{DirectExtraction, PageText, PAGE_BREAK};

/// Decode a plain-text upload.
///
/// Honors UTF-8 and UTF-16 byte-order marks; anything else is read as UTF-8
/// with invalid sequences replaced. Form feeds are kept as page breaks.
pub fn extract_plain(bytes: &[u8]) -> DirectExtraction {
    let text = decode(bytes).replace("\r\n", "\n").replace('\r', "\n");

    let pages: Vec<PageText> = text
        .split(PAGE_BREAK)
        .enumerate()
        .map(|(i, t)| PageText {
            page_number: i + 1,
            text: t.to_string(),
        })
        .collect();
    let page_count = pages.len();

    DirectExtraction {
        pages,
        page_count,
        backend: "plain",
    }
}

fn decode(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        return String::from_utf8_lossy(rest).into_owned();
    }
    if let Some(rest) = bytes.strip_prefix(&[0xFF, 0xFE]) {
        return decode_utf16(rest, u16::from_le_bytes);
    }
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        return decode_utf16(rest, u16::from_be_bytes);
    }
    String::from_utf8_lossy(bytes).into_owned()
}

fn decode_utf16(bytes: &[u8], to_unit: fn([u8; 2]) -> u16) -> String {
    let units = bytes.chunks_exact(2).map(|c| to_unit([c[0], c[1]]));
    char::decode_utf16(units)
        .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_passthrough() {
        let ex = extract_plain("The Client shall pay.\r\nसमझौता".as_bytes());
        assert_eq!(ex.text(), "The Client shall pay.\nसमझौता");
        assert_eq!(ex.page_count, 1);
    }

    #[test]
    fn test_bom_is_stripped() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"Agreement");
        assert_eq!(extract_plain(&bytes).text(), "Agreement");
    }

    #[test]
    fn test_utf16_le() {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "Fee".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        assert_eq!(extract_plain(&bytes).text(), "Fee");
    }

    #[test]
    fn test_form_feed_splits_pages() {
        let ex = extract_plain(b"page one\x0cpage two");
        assert_eq!(ex.page_count, 2);
        assert_eq!(ex.pages[1].text, "page two");
    }
}
