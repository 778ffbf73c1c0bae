use clauseguard_core::error::ClauseError;
use clauseguard_core::redact;
use serde_json::json;
use std::path::{Path, PathBuf};

use crate::output;
use crate::DocumentArgs;

pub fn run(
    document: &DocumentArgs,
    config: Option<&Path>,
    output_format: &str,
    output_file: Option<PathBuf>,
) -> Result<(), ClauseError> {
    let doc = super::normalize_input(document, config)?;

    if let Some(path) = output_file {
        std::fs::write(&path, &doc.text)?;
        eprintln!(
            "Extracted {} words from {} page(s) via {}, written to {}",
            doc.word_count,
            doc.page_count,
            doc.extraction_method,
            path.display()
        );
        return Ok(());
    }

    match output_format {
        "json" => output::json::print(&doc)?,
        _ => println!("{}", doc.text),
    }
    Ok(())
}

pub fn redact(
    document: &DocumentArgs,
    config: Option<&Path>,
    output_format: &str,
) -> Result<(), ClauseError> {
    let doc = super::normalize_input(document, config)?;
    let redacted = redact::redact(&doc.text);

    match output_format {
        "json" => output::json::print(&json!({
            "text": redacted.text,
            "counts": redacted.counts,
            "total": redacted.total(),
        }))?,
        _ => {
            println!("{}", redacted.text);
            if redacted.total() > 0 {
                let summary: Vec<String> = redacted
                    .counts
                    .iter()
                    .map(|(kind, n)| format!("{n} {kind}"))
                    .collect();
                eprintln!("Redacted: {}", summary.join(", "));
            }
        }
    }
    Ok(())
}
