use clauseguard_core::deviation::templates::{
    builtin_template, builtin_templates, load_template, template_names, FairTemplate,
    DEFAULT_TEMPLATE,
};
use clauseguard_core::deviation::Term;
use clauseguard_core::error::ClauseError;
use std::path::Path;

use crate::output;

pub fn list() -> Result<(), ClauseError> {
    println!("Available fair templates:\n");
    for template in builtin_templates() {
        let marker = if template.name == DEFAULT_TEMPLATE {
            " (default)"
        } else {
            ""
        };
        println!("  {:<22} {}{}", template.name, template.description, marker);
    }
    println!();
    Ok(())
}

pub fn show(name: &str) -> Result<(), ClauseError> {
    let template = builtin_template(name).ok_or_else(|| {
        ClauseError::TemplateInvalid(format!(
            "unknown template '{name}'. Available: {}",
            template_names().join(", ")
        ))
    })?;
    output::json::print(template)
}

pub fn validate(file: &Path) -> Result<(), ClauseError> {
    let template = load_template(file)?;

    println!("Template '{}' is valid.", template.name);
    if !template.description.is_empty() {
        println!("  {}", template.description);
    }
    print_thresholds(&template);

    if builtin_template(&template.name).is_some() {
        println!(
            "\nWarning: '{}' shadows a built-in template name.",
            template.name
        );
    }
    Ok(())
}

fn print_thresholds(template: &FairTemplate) {
    println!();
    println!("  {:<24}{:>6}{:>9}{:>10}", "Term", "Fair", "Warning", "Critical");
    for &term in Term::ALL {
        let t = template.threshold(term);
        println!(
            "  {:<24}{:>6}{:>9}{:>10}",
            term.as_str(),
            t.fair,
            t.warning,
            t.critical
        );
    }
}
