use crate::deviation::{Direction, Term};
use crate::error::ClauseError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

/// Template used when none is named or the name is unknown.
pub const DEFAULT_TEMPLATE: &str = "freelance_general";

/// Fair, warning and critical levels for one term. For `LowerIsWorse` terms
/// the levels descend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Threshold {
    pub fair: u32,
    pub warning: u32,
    pub critical: u32,
}

/// A named set of thresholds for one kind of engagement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FairTemplate {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub payment_days: Threshold,
    pub revision_rounds: Threshold,
    pub client_notice_days: Threshold,
    pub freelancer_notice_days: Threshold,
}

impl FairTemplate {
    pub fn threshold(&self, term: Term) -> &Threshold {
        match term {
            Term::PaymentDays => &self.payment_days,
            Term::RevisionRounds => &self.revision_rounds,
            Term::ClientNoticeDays => &self.client_notice_days,
            Term::FreelancerNoticeDays => &self.freelancer_notice_days,
        }
    }
}

const fn th(fair: u32, warning: u32, critical: u32) -> Threshold {
    Threshold {
        fair,
        warning,
        critical,
    }
}

// name, description, payment, revisions, client notice, freelancer notice
type TemplateRow = (&'static str, &'static str, Threshold, Threshold, Threshold, Threshold);

const BUILTIN_ROWS: &[TemplateRow] = &[
    (
        "freelance_general",
        "General freelance services",
        th(30, 45, 60),
        th(2, 4, 6),
        th(30, 14, 7),
        th(15, 30, 60),
    ),
    (
        "it_consulting",
        "IT consulting and staff augmentation",
        th(30, 45, 60),
        th(2, 3, 5),
        th(30, 15, 7),
        th(30, 45, 90),
    ),
    (
        "design_creative",
        "Design, illustration and other creative work",
        th(15, 30, 45),
        th(3, 5, 8),
        th(15, 7, 3),
        th(15, 30, 45),
    ),
    (
        "content_writing",
        "Copywriting, blogging and editorial work",
        th(15, 30, 45),
        th(2, 3, 5),
        th(14, 7, 3),
        th(7, 15, 30),
    ),
    (
        "software_development",
        "Fixed-scope software development",
        th(30, 45, 60),
        th(3, 5, 8),
        th(30, 15, 7),
        th(30, 60, 90),
    ),
];

static BUILTIN: LazyLock<Vec<FairTemplate>> = LazyLock::new(|| {
    BUILTIN_ROWS
        .iter()
        .map(
            |&(name, description, payment, revisions, client, freelancer)| FairTemplate {
                name: name.to_string(),
                description: description.to_string(),
                payment_days: payment,
                revision_rounds: revisions,
                client_notice_days: client,
                freelancer_notice_days: freelancer,
            },
        )
        .collect()
});

/// Names of the built-in templates, default first.
pub fn template_names() -> Vec<&'static str> {
    BUILTIN_ROWS.iter().map(|row| row.0).collect()
}

pub fn builtin_templates() -> &'static [FairTemplate] {
    &BUILTIN
}

pub fn builtin_template(name: &str) -> Option<&'static FairTemplate> {
    BUILTIN.iter().find(|t| t.name.eq_ignore_ascii_case(name.trim()))
}

/// Look up a built-in template, falling back to `freelance_general` for an
/// unknown name.
pub fn resolve_template(name: &str) -> &'static FairTemplate {
    if let Some(template) = builtin_template(name) {
        return template;
    }
    tracing::warn!(
        requested = name,
        fallback = DEFAULT_TEMPLATE,
        "unknown fair template, using default"
    );
    // The default is the first row.
    &BUILTIN[0]
}

/// Load a custom template from a JSON file.
pub fn load_template(path: &Path) -> Result<FairTemplate, ClauseError> {
    let content = std::fs::read_to_string(path).map_err(|e| ClauseError::TemplateLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let template: FairTemplate =
        serde_json::from_str(&content).map_err(|e| ClauseError::TemplateLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    validate_template(&template)?;
    Ok(template)
}

/// Parse a custom template from a JSON string.
pub fn parse_template_str(json: &str) -> Result<FairTemplate, ClauseError> {
    let template: FairTemplate = serde_json::from_str(json)?;
    validate_template(&template)?;
    Ok(template)
}

/// Validate that a template is well-formed.
pub fn validate_template(template: &FairTemplate) -> Result<(), ClauseError> {
    if template.name.trim().is_empty() {
        return Err(ClauseError::TemplateInvalid(
            "name must not be empty".into(),
        ));
    }
    if !template
        .name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    {
        return Err(ClauseError::TemplateInvalid(format!(
            "name '{}' may only contain lowercase letters, digits and '_'",
            template.name
        )));
    }

    for &term in Term::ALL {
        let t = template.threshold(term);
        let ordered = match term.direction() {
            Direction::HigherIsWorse => t.fair < t.warning && t.warning <= t.critical,
            Direction::LowerIsWorse => t.fair > t.warning && t.warning >= t.critical,
        };
        if !ordered {
            let expected = match term.direction() {
                Direction::HigherIsWorse => "fair < warning <= critical",
                Direction::LowerIsWorse => "fair > warning >= critical",
            };
            return Err(ClauseError::TemplateInvalid(format!(
                "{term}: thresholds {}/{}/{} must satisfy {expected}",
                t.fair, t.warning, t.critical
            )));
        }
    }

    Ok(())
}
