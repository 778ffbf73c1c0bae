use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::ClauseError;
use crate::extraction::{DirectExtraction, PageText};

const DOCUMENT_PART: &str = "word/document.xml";
const APP_PROPERTIES_PART: &str = "docProps/app.xml";

/// Extract the body text of a DOCX file.
///
/// Paragraphs become lines, `<w:tab/>` a tab and `<w:br/>` a line break.
/// The page count comes from `docProps/app.xml` when Word recorded one.
pub fn extract_docx(bytes: &[u8]) -> Result<DirectExtraction, ClauseError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ClauseError::CorruptDocument(format!("not a valid DOCX container: {e}")))?;

    let document_xml = read_part(&mut archive, DOCUMENT_PART)?.ok_or_else(|| {
        ClauseError::CorruptDocument(format!("DOCX container has no {DOCUMENT_PART}"))
    })?;
    let text = document_xml_to_text(&document_xml)?;

    let page_count = read_part(&mut archive, APP_PROPERTIES_PART)?
        .and_then(|xml| parse_page_count(&xml))
        .unwrap_or(1);

    Ok(DirectExtraction {
        pages: vec![PageText {
            page_number: 1,
            text,
        }],
        page_count,
        backend: "docx",
    })
}

fn read_part(
    archive: &mut zip::ZipArchive<Cursor<&[u8]>>,
    name: &str,
) -> Result<Option<String>, ClauseError> {
    let mut file = match archive.by_name(name) {
        Ok(f) => f,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(ClauseError::CorruptDocument(format!("{name}: {e}"))),
    };
    let mut content = String::new();
    file.read_to_string(&mut content)
        .map_err(|e| ClauseError::CorruptDocument(format!("{name}: {e}")))?;
    Ok(Some(content))
}

/// Convert WordprocessingML to plain text.
pub fn document_xml_to_text(xml: &str) -> Result<String, ClauseError> {
    let mut reader = Reader::from_str(xml);
    let mut out = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if e.local_name().as_ref() == b"t" {
                    in_text = true;
                }
            }
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"tab" => out.push('\t'),
                b"br" | b"cr" => out.push('\n'),
                _ => {}
            },
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Text(e)) if in_text => {
                let text = e
                    .unescape()
                    .map_err(|err| ClauseError::CorruptDocument(format!("{DOCUMENT_PART}: {err}")))?;
                out.push_str(&text);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(ClauseError::CorruptDocument(format!(
                    "{DOCUMENT_PART} at byte {}: {e}",
                    reader.error_position()
                )))
            }
        }
    }

    Ok(out.trim_end().to_string())
}

/// `<Pages>` of the extended properties part. Malformed or missing values
/// yield `None`; the count is informational only.
fn parse_page_count(app_xml: &str) -> Option<usize> {
    let mut reader = Reader::from_str(app_xml);
    let mut in_pages = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"Pages" => in_pages = true,
            Ok(Event::End(e)) if e.local_name().as_ref() == b"Pages" => in_pages = false,
            Ok(Event::Text(e)) if in_pages => {
                let raw = e.unescape().ok()?;
                return raw.trim().parse().ok().filter(|&n| n > 0);
            }
            Ok(Event::Eof) => return None,
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(error = %e, "unreadable {APP_PROPERTIES_PART}");
                return None;
            }
        }
    }
}
