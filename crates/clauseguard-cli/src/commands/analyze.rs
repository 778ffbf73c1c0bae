use clauseguard_core::analyze_normalized;
use clauseguard_core::deviation::templates::{load_template, resolve_template};
use clauseguard_core::error::ClauseError;
use clauseguard_core::external::parse_external_findings;
use std::path::Path;

use crate::output;
use crate::DocumentArgs;

pub fn run(
    document: &DocumentArgs,
    config: Option<&Path>,
    template_name: &str,
    template_file: Option<&Path>,
    external: Option<&Path>,
    output_format: &str,
    show_trace: bool,
) -> Result<(), ClauseError> {
    // Load the template before the (possibly slow) normalization so a bad
    // template file fails fast.
    let template = match template_file {
        Some(path) => load_template(path)?,
        None => resolve_template(template_name).clone(),
    };
    let external = match external {
        Some(path) => parse_external_findings(&std::fs::read_to_string(path)?)?,
        None => Vec::new(),
    };

    let doc = super::normalize_input(document, config)?;
    let mut report = analyze_normalized(&doc, &template);
    if !external.is_empty() {
        report.result.merge_external(&doc.text, &external);
    }

    match output_format {
        "json" => output::json::print(&report)?,
        _ => output::table::print_report(&report, show_trace),
    }

    Ok(())
}
