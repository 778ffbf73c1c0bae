pub mod analyze;
pub mod extract;
pub mod rules;
pub mod templates;

use crate::DocumentArgs;
use clauseguard_core::config::{load_config, AnalyzerConfig};
use clauseguard_core::error::ClauseError;
use clauseguard_core::model::{DocumentFormat, NormalizedDocument};
use clauseguard_core::normalize::{DocumentNormalizer, NormalizeRequest};
use clauseguard_core::ocr::OcrProgress;
use std::path::Path;

pub fn load_analyzer_config(path: Option<&Path>) -> Result<AnalyzerConfig, ClauseError> {
    match path {
        Some(path) => load_config(path),
        None => Ok(AnalyzerConfig::default()),
    }
}

/// Read and normalize the input document, reporting OCR progress on stderr.
pub fn normalize_input(
    document: &DocumentArgs,
    config: Option<&Path>,
) -> Result<NormalizedDocument, ClauseError> {
    let config = load_analyzer_config(config)?;
    let bytes = std::fs::read(&document.input_file)?;
    let file_name = document.input_file.to_str();
    let format = DocumentFormat::resolve(file_name, document.mime.as_deref(), &bytes)?;
    tracing::debug!(
        path = %document.input_file.display(),
        %format,
        bytes = bytes.len(),
        "read input"
    );

    let progress = |p: OcrProgress| eprintln!("OCR page {}/{}", p.page, p.total_pages);
    let request = NormalizeRequest::new(format)
        .with_script(document.script)
        .with_force_ocr(document.force_ocr)
        .with_progress(&progress);

    DocumentNormalizer::from_config(config).normalize(&bytes, &request)
}
