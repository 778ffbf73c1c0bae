use clauseguard_core::model::DocumentProvenance;
use clauseguard_core::AnalysisReport;

/// Longest span shown inline before it is elided.
const SPAN_PREVIEW_CHARS: usize = 120;

pub fn print_report(report: &AnalysisReport, show_trace: bool) {
    print_provenance(&report.provenance, show_trace);

    let result = &report.result;
    println!(
        "=== Risk: {}/100 ({}) ===\n",
        result.risk_score, result.risk_band
    );

    if result.findings.is_empty() {
        println!("  No violations found.\n");
    } else {
        println!(
            "  {} finding(s): {} legal, {} unfair\n",
            result.findings.len(),
            result.legal_count(),
            result.unfair_count()
        );
        for finding in &result.findings {
            println!(
                "  {}  [{:>3}] {:<7} {}",
                finding.id,
                finding.severity,
                finding.category,
                finding.kind.label()
            );
            if !finding.matched_span.is_empty() {
                println!("         \"{}\"", preview(&finding.matched_span));
            }
            if let (Some(section), Some(law)) = (&finding.section, &finding.law_name) {
                println!("         Law: {section}, {law}");
            }
            if let Some(ref alternative) = finding.fair_alternative {
                println!("         Fair alternative: {alternative}");
            }
            if !finding.is_located() {
                println!("         (could not be located in the document text)");
            }
            println!();
        }
    }

    if result.deviations.is_empty() {
        println!("  No deviations from the '{}' template.\n", result.template);
    } else {
        println!("  Deviations from the '{}' template:\n", result.template);
        for d in &result.deviations {
            println!(
                "    {:<24} {:<9} observed {}, fair {}",
                d.term, d.severity, d.observed_value, d.fair_value
            );
            println!("      {}", d.recommendation);
        }
        println!();
    }
}

fn print_provenance(provenance: &DocumentProvenance, show_trace: bool) {
    let confidence = provenance
        .ocr_confidence
        .map(|c| format!(", OCR confidence {c:.0}%"))
        .unwrap_or_default();
    println!(
        "Read {} via {}: {} page(s), {} words, script {}{}\n",
        provenance.format,
        provenance.extraction_method,
        provenance.page_count,
        provenance.word_count,
        provenance.script_hint,
        confidence
    );

    if show_trace && !provenance.trace.is_empty() {
        println!("  Trace:");
        for step in &provenance.trace {
            println!("    {:?}: {}", step.step_type, step.message);
        }
        println!();
    }
}

fn preview(span: &str) -> String {
    let flat: String = span.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= SPAN_PREVIEW_CHARS {
        flat
    } else {
        let cut: String = flat.chars().take(SPAN_PREVIEW_CHARS).collect();
        format!("{cut}...")
    }
}
