use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ClauseError {
    #[error("unsupported document format: {0}. Supported: pdf, docx, txt, png, jpg, tiff, bmp, webp")]
    UnsupportedFormat(String),

    #[error("document is corrupt or unreadable: {0}")]
    CorruptDocument(String),

    #[error("PDF is password protected")]
    PasswordProtected,

    #[error("{stage} exceeded the time budget of {}s", .budget.as_secs())]
    Timeout { stage: String, budget: Duration },

    #[error("extraction was cancelled")]
    Cancelled,

    #[error("could not extract readable text ({words} words found, at least {required} required)")]
    Unreadable { words: usize, required: usize },

    #[error("OCR confidence {confidence:.1} is below the acceptance threshold {threshold:.1}")]
    LowConfidenceOcr { confidence: f32, threshold: f32 },

    #[error("{tool} not found. Install poppler-utils and tesseract-ocr: brew install poppler tesseract (macOS) or apt install poppler-utils tesseract-ocr (Linux)")]
    ToolNotFound { tool: String },

    #[error("{tool} failed with exit code {code}: {stderr}")]
    ToolFailed {
        tool: String,
        code: i32,
        stderr: String,
    },

    #[error("failed to load fair template from {path}: {reason}")]
    TemplateLoad { path: PathBuf, reason: String },

    #[error("invalid fair template: {0}")]
    TemplateInvalid(String),

    #[error("unknown rule '{0}'")]
    UnknownRule(String),

    #[error("failed to load config from {path}: {reason}")]
    ConfigLoad { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClauseError {
    /// Stable machine-readable reason code for API callers.
    pub fn reason(&self) -> &'static str {
        match self {
            ClauseError::UnsupportedFormat(_) => "unsupported_format",
            ClauseError::CorruptDocument(_) => "corrupt",
            ClauseError::PasswordProtected => "password_protected",
            ClauseError::Timeout { .. } => "timeout",
            ClauseError::Cancelled => "cancelled",
            ClauseError::Unreadable { .. } => "unreadable",
            ClauseError::LowConfidenceOcr { .. } => "low_confidence_ocr",
            ClauseError::ToolNotFound { .. } | ClauseError::ToolFailed { .. } => "tool_failure",
            ClauseError::TemplateLoad { .. } | ClauseError::TemplateInvalid(_) => "template",
            ClauseError::UnknownRule(_) => "unknown_rule",
            ClauseError::ConfigLoad { .. } => "config",
            ClauseError::Io(_) => "io",
            ClauseError::Json(_) => "json",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_and_corruption_have_distinct_reasons() {
        let timeout = ClauseError::Timeout {
            stage: "pdftotext".into(),
            budget: Duration::from_secs(30),
        };
        let corrupt = ClauseError::CorruptDocument("bad xref".into());
        assert_eq!(timeout.reason(), "timeout");
        assert_eq!(corrupt.reason(), "corrupt");
        assert_eq!(ClauseError::PasswordProtected.reason(), "password_protected");
    }

    #[test]
    fn timeout_message_mentions_budget() {
        let err = ClauseError::Timeout {
            stage: "OCR".into(),
            budget: Duration::from_secs(120),
        };
        assert_eq!(err.to_string(), "OCR exceeded the time budget of 120s");
    }
}
