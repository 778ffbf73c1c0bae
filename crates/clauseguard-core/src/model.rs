use crate::error::ClauseError;
use crate::script::ScriptCode;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Jpeg,
    Tiff,
    Bmp,
    Webp,
}

impl ImageFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Tiff => "tiff",
            ImageFormat::Bmp => "bmp",
            ImageFormat::Webp => "webp",
        }
    }
}

/// Container format of an uploaded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFormat {
    Pdf,
    Docx,
    PlainText,
    Image(ImageFormat),
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentFormat::Pdf => write!(f, "pdf"),
            DocumentFormat::Docx => write!(f, "docx"),
            DocumentFormat::PlainText => write!(f, "txt"),
            DocumentFormat::Image(img) => write!(f, "image/{}", img.extension()),
        }
    }
}

impl DocumentFormat {
    /// Map a file extension (without the dot) to a format.
    pub fn from_extension(ext: &str) -> Option<DocumentFormat> {
        let format = match ext.trim().trim_start_matches('.').to_lowercase().as_str() {
            "pdf" => DocumentFormat::Pdf,
            "docx" => DocumentFormat::Docx,
            "txt" | "text" => DocumentFormat::PlainText,
            "png" => DocumentFormat::Image(ImageFormat::Png),
            "jpg" | "jpeg" => DocumentFormat::Image(ImageFormat::Jpeg),
            "tif" | "tiff" => DocumentFormat::Image(ImageFormat::Tiff),
            "bmp" => DocumentFormat::Image(ImageFormat::Bmp),
            "webp" => DocumentFormat::Image(ImageFormat::Webp),
            _ => return None,
        };
        Some(format)
    }

    /// Map a MIME type to a format. Parameters such as `; charset=utf-8` are ignored.
    pub fn from_mime(mime: &str) -> Option<DocumentFormat> {
        let essence = mime.split(';').next().unwrap_or("").trim().to_lowercase();
        let format = match essence.as_str() {
            "application/pdf" => DocumentFormat::Pdf,
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => {
                DocumentFormat::Docx
            }
            "text/plain" => DocumentFormat::PlainText,
            "image/png" => DocumentFormat::Image(ImageFormat::Png),
            "image/jpeg" | "image/jpg" => DocumentFormat::Image(ImageFormat::Jpeg),
            "image/tiff" => DocumentFormat::Image(ImageFormat::Tiff),
            "image/bmp" => DocumentFormat::Image(ImageFormat::Bmp),
            "image/webp" => DocumentFormat::Image(ImageFormat::Webp),
            _ => return None,
        };
        Some(format)
    }

    /// Guess the format from leading magic bytes.
    pub fn sniff(bytes: &[u8]) -> Option<DocumentFormat> {
        if bytes.starts_with(b"%PDF") {
            Some(DocumentFormat::Pdf)
        } else if bytes.starts_with(b"PK\x03\x04") {
            Some(DocumentFormat::Docx)
        } else if bytes.starts_with(b"\x89PNG") {
            Some(DocumentFormat::Image(ImageFormat::Png))
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(DocumentFormat::Image(ImageFormat::Jpeg))
        } else if bytes.starts_with(b"II*\0") || bytes.starts_with(b"MM\0*") {
            Some(DocumentFormat::Image(ImageFormat::Tiff))
        } else if bytes.starts_with(b"BM") {
            Some(DocumentFormat::Image(ImageFormat::Bmp))
        } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            Some(DocumentFormat::Image(ImageFormat::Webp))
        } else if std::str::from_utf8(bytes).is_ok() {
            Some(DocumentFormat::PlainText)
        } else {
            None
        }
    }

    /// Resolve the format of an upload: declared MIME type first, then the
    /// file extension, then magic bytes. A declared but unsupported MIME type
    /// or extension is rejected rather than second-guessed.
    pub fn resolve(
        file_name: Option<&str>,
        mime: Option<&str>,
        bytes: &[u8],
    ) -> Result<DocumentFormat, ClauseError> {
        if let Some(mime) = mime.filter(|m| !m.trim().is_empty()) {
            return DocumentFormat::from_mime(mime)
                .ok_or_else(|| ClauseError::UnsupportedFormat(mime.to_string()));
        }

        if let Some(ext) = file_name
            .and_then(|n| std::path::Path::new(n).extension())
            .and_then(|e| e.to_str())
        {
            return DocumentFormat::from_extension(ext)
                .ok_or_else(|| ClauseError::UnsupportedFormat(format!(".{ext}")));
        }

        DocumentFormat::sniff(bytes)
            .ok_or_else(|| ClauseError::UnsupportedFormat("unrecognized binary content".into()))
    }

    pub fn is_image(&self) -> bool {
        matches!(self, DocumentFormat::Image(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    DirectText,
    Ocr,
}

impl fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionMethod::DirectText => write!(f, "direct text"),
            ExtractionMethod::Ocr => write!(f, "OCR"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceStepType {
    Extract,
    DetectScript,
    Validate,
    Escalate,
    Ocr,
    Decide,
}

/// One transition of the normalization state machine, kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceStep {
    pub step_type: TraceStepType,
    pub message: String,
}

impl TraceStep {
    pub fn new(step_type: TraceStepType, message: impl Into<String>) -> Self {
        Self {
            step_type,
            message: message.into(),
        }
    }
}

/// Plain text of an uploaded document plus how it was obtained.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedDocument {
    pub text: String,
    pub page_count: usize,
    pub word_count: usize,
    pub extraction_method: ExtractionMethod,
    /// Working script of the document. Never `Auto`.
    pub script_hint: ScriptCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ocr_confidence: Option<f32>,
    pub format: DocumentFormat,
    #[serde(default)]
    pub trace: Vec<TraceStep>,
}

impl NormalizedDocument {
    pub fn provenance(&self) -> DocumentProvenance {
        DocumentProvenance {
            format: self.format,
            extraction_method: self.extraction_method,
            script_hint: self.script_hint,
            ocr_confidence: self.ocr_confidence,
            page_count: self.page_count,
            word_count: self.word_count,
            trace: self.trace.clone(),
        }
    }
}

/// "How we read your document" view of a [`NormalizedDocument`], without the text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentProvenance {
    pub format: DocumentFormat,
    pub extraction_method: ExtractionMethod,
    pub script_hint: ScriptCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ocr_confidence: Option<f32>,
    pub page_count: usize,
    pub word_count: usize,
    #[serde(default)]
    pub trace: Vec<TraceStep>,
}

/// Whitespace-delimited word count used by every threshold in the pipeline.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}
