//! Runtime configuration for the normalization pipeline.
//!
//! Every field has a default, so a config file only needs to name what it
//! overrides:
//!
//! ```json
//! { "tesseract_path": "/opt/homebrew/bin/tesseract", "ocr_dpi": 200 }
//! ```

use crate::error::ClauseError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub pdftotext_path: PathBuf,
    pub pdftoppm_path: PathBuf,
    pub tesseract_path: PathBuf,
    /// Raster resolution handed to pdftoppm before OCR.
    pub ocr_dpi: u32,
    /// Overall budget for container parsing plus OCR, in seconds.
    pub timeout_secs: u64,
    /// Direct extractions with fewer words are always escalated to OCR.
    pub escalation_min_words: usize,
    /// Documents with fewer words after OCR are rejected as unreadable.
    pub min_viable_words: usize,
    /// Mean OCR confidence (0-100) below which image input is rejected.
    pub ocr_min_confidence: f32,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            pdftotext_path: PathBuf::from("pdftotext"),
            pdftoppm_path: PathBuf::from("pdftoppm"),
            tesseract_path: PathBuf::from("tesseract"),
            ocr_dpi: 300,
            timeout_secs: 120,
            escalation_min_words: 50,
            min_viable_words: 10,
            ocr_min_confidence: 40.0,
        }
    }
}

impl AnalyzerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Load a config from a JSON file.
pub fn load_config(path: &Path) -> Result<AnalyzerConfig, ClauseError> {
    let content = std::fs::read_to_string(path).map_err(|e| ClauseError::ConfigLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let config: AnalyzerConfig =
        serde_json::from_str(&content).map_err(|e| ClauseError::ConfigLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    validate_config(&config).map_err(|reason| ClauseError::ConfigLoad {
        path: path.to_path_buf(),
        reason,
    })?;
    Ok(config)
}

fn validate_config(config: &AnalyzerConfig) -> Result<(), String> {
    if config.ocr_dpi < 72 || config.ocr_dpi > 1200 {
        return Err(format!("ocr_dpi {} outside 72..=1200", config.ocr_dpi));
    }
    if config.timeout_secs == 0 {
        return Err("timeout_secs must be positive".into());
    }
    if !(0.0..=100.0).contains(&config.ocr_min_confidence) {
        return Err(format!(
            "ocr_min_confidence {} outside 0..=100",
            config.ocr_min_confidence
        ));
    }
    Ok(())
}
