use clauseguard_core::error::ClauseError;
use clauseguard_core::rules::{catalog, find_rule, rule_for_kind, ViolationType};

pub fn list() -> Result<(), ClauseError> {
    println!("Built-in rules:\n");
    for rule in catalog() {
        println!(
            "  {:<7} {:<7} {:>3}  {}",
            rule.id,
            rule.category,
            rule.severity,
            rule.kind.label()
        );
    }
    println!("\nRun `clauseguard rules explain <id>` for details.");
    Ok(())
}

pub fn explain(query: &str) -> Result<(), ClauseError> {
    let rule = find_rule(query)
        .or_else(|| rule_for_kind(ViolationType::from_external(query)))
        .ok_or_else(|| ClauseError::UnknownRule(query.to_string()))?;

    println!("{} {} ({})\n", rule.id, rule.kind.label(), rule.kind);
    println!("  Category: {}", rule.category);
    println!("  Severity: {}/100", rule.severity);
    if let (Some(section), Some(law)) = (rule.section, rule.law_name) {
        println!("  Law:      {section}, {law}");
    }

    let scripts: Vec<String> = rule.scripts().iter().map(|s| s.to_string()).collect();
    if !scripts.is_empty() {
        println!("  Scripts:  {}", scripts.join(", "));
    }

    println!("\nWhy it matters:\n  {}", rule.explanation);
    println!("\nFair alternative:\n  {}", rule.fair_alternative);

    println!("\nPatterns:");
    for pattern in &rule.patterns {
        let script = pattern
            .script
            .map(|s| s.to_string())
            .unwrap_or_else(|| "any".into());
        println!("  [{script}] {}", pattern.regex.as_str());
    }
    println!();
    Ok(())
}
