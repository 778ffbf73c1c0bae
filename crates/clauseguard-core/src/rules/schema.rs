use crate::script::ScriptCode;
use regex::Regex;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Whether a rule flags an unenforceable clause or merely an unfair one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Legal,
    Unfair,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Category::Legal => "legal",
            Category::Unfair => "unfair",
        })
    }
}

/// Closed set of violation kinds. `Other` only ever comes from external
/// findings whose type string did not map onto a known kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationType {
    NonCompete,
    RestraintOfLegalProceedings,
    PenaltyClause,
    UnlawfulConsideration,
    WaiverOfStatutoryRights,
    ForfeitureOfEarnedFees,
    UnlimitedRevisions,
    DelayedPayment,
    IpTransferBeforePayment,
    UnlimitedLiability,
    OneSidedIndemnity,
    TerminationWithoutNotice,
    PaymentContingentOnApproval,
    MoralRightsWaiver,
    UnilateralAmendment,
    Other,
}

impl ViolationType {
    pub const ALL: &'static [ViolationType] = &[
        ViolationType::NonCompete,
        ViolationType::RestraintOfLegalProceedings,
        ViolationType::PenaltyClause,
        ViolationType::UnlawfulConsideration,
        ViolationType::WaiverOfStatutoryRights,
        ViolationType::ForfeitureOfEarnedFees,
        ViolationType::UnlimitedRevisions,
        ViolationType::DelayedPayment,
        ViolationType::IpTransferBeforePayment,
        ViolationType::UnlimitedLiability,
        ViolationType::OneSidedIndemnity,
        ViolationType::TerminationWithoutNotice,
        ViolationType::PaymentContingentOnApproval,
        ViolationType::MoralRightsWaiver,
        ViolationType::UnilateralAmendment,
        ViolationType::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ViolationType::NonCompete => "non_compete",
            ViolationType::RestraintOfLegalProceedings => "restraint_of_legal_proceedings",
            ViolationType::PenaltyClause => "penalty_clause",
            ViolationType::UnlawfulConsideration => "unlawful_consideration",
            ViolationType::WaiverOfStatutoryRights => "waiver_of_statutory_rights",
            ViolationType::ForfeitureOfEarnedFees => "forfeiture_of_earned_fees",
            ViolationType::UnlimitedRevisions => "unlimited_revisions",
            ViolationType::DelayedPayment => "delayed_payment",
            ViolationType::IpTransferBeforePayment => "ip_transfer_before_payment",
            ViolationType::UnlimitedLiability => "unlimited_liability",
            ViolationType::OneSidedIndemnity => "one_sided_indemnity",
            ViolationType::TerminationWithoutNotice => "termination_without_notice",
            ViolationType::PaymentContingentOnApproval => "payment_contingent_on_approval",
            ViolationType::MoralRightsWaiver => "moral_rights_waiver",
            ViolationType::UnilateralAmendment => "unilateral_amendment",
            ViolationType::Other => "other",
        }
    }

    /// Human-readable title.
    pub fn label(self) -> &'static str {
        match self {
            ViolationType::NonCompete => "Non-compete restriction",
            ViolationType::RestraintOfLegalProceedings => "Restraint of legal proceedings",
            ViolationType::PenaltyClause => "Penalty clause",
            ViolationType::UnlawfulConsideration => "Unlawful consideration",
            ViolationType::WaiverOfStatutoryRights => "Waiver of statutory rights",
            ViolationType::ForfeitureOfEarnedFees => "Forfeiture of earned fees",
            ViolationType::UnlimitedRevisions => "Unlimited revisions",
            ViolationType::DelayedPayment => "Delayed payment",
            ViolationType::IpTransferBeforePayment => "IP transfer before payment",
            ViolationType::UnlimitedLiability => "Unlimited liability",
            ViolationType::OneSidedIndemnity => "One-sided indemnity",
            ViolationType::TerminationWithoutNotice => "Termination without notice",
            ViolationType::PaymentContingentOnApproval => "Payment contingent on approval",
            ViolationType::MoralRightsWaiver => "Moral rights waiver",
            ViolationType::UnilateralAmendment => "Unilateral amendment",
            ViolationType::Other => "Other issue",
        }
    }

    /// Category assumed for an external finding that does not state one.
    pub fn default_category(self) -> Category {
        match self {
            ViolationType::NonCompete
            | ViolationType::RestraintOfLegalProceedings
            | ViolationType::PenaltyClause
            | ViolationType::UnlawfulConsideration
            | ViolationType::WaiverOfStatutoryRights => Category::Legal,
            _ => Category::Unfair,
        }
    }

    /// Map a foreign type string onto the closed enum.
    ///
    /// Case, spaces and hyphens are ignored and a few common synonyms are
    /// accepted. Anything unrecognized becomes `Other`.
    pub fn from_external(raw: &str) -> ViolationType {
        let key: String = raw
            .trim()
            .chars()
            .map(|c| match c {
                ' ' | '-' | '/' => '_',
                c => c.to_ascii_lowercase(),
            })
            .collect();

        if let Some(kind) = ViolationType::ALL.iter().find(|k| k.as_str() == key) {
            return *kind;
        }

        match key.as_str() {
            "noncompete" | "non_competition" | "restraint_of_trade" | "restrictive_covenant" => {
                ViolationType::NonCompete
            }
            "restraint_of_legal_proceeding" | "no_legal_recourse" | "waiver_of_right_to_sue"
            | "jurisdiction_ouster" => ViolationType::RestraintOfLegalProceedings,
            "penalty" | "excessive_penalty" | "liquidated_damages" => ViolationType::PenaltyClause,
            "unlawful_object" | "illegal_consideration" | "tax_evasion" => {
                ViolationType::UnlawfulConsideration
            }
            "statutory_rights_waiver" | "waiver_of_rights" => {
                ViolationType::WaiverOfStatutoryRights
            }
            "forfeiture" | "fee_forfeiture" | "non_payment" => ViolationType::ForfeitureOfEarnedFees,
            "unlimited_revision" | "endless_revisions" | "scope_creep" => {
                ViolationType::UnlimitedRevisions
            }
            "late_payment" | "payment_delay" | "long_payment_terms" => ViolationType::DelayedPayment,
            "ip_transfer" | "ip_before_payment" | "premature_ip_transfer" => {
                ViolationType::IpTransferBeforePayment
            }
            "uncapped_liability" | "unlimited_liabilities" => ViolationType::UnlimitedLiability,
            "indemnity" | "one_sided_indemnification" | "broad_indemnity" => {
                ViolationType::OneSidedIndemnity
            }
            "termination" | "termination_without_cause" | "unfair_termination" => {
                ViolationType::TerminationWithoutNotice
            }
            "payment_on_approval" | "subjective_acceptance" => {
                ViolationType::PaymentContingentOnApproval
            }
            "moral_rights" => ViolationType::MoralRightsWaiver,
            "unilateral_change" | "unilateral_modification" => ViolationType::UnilateralAmendment,
            _ => ViolationType::Other,
        }
    }
}

impl fmt::Display for ViolationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One compiled expression of a rule. `script: None` runs on every document.
#[derive(Debug, Clone, Serialize)]
pub struct RulePattern {
    #[serde(serialize_with = "serialize_regex")]
    pub regex: Regex,
    pub script: Option<ScriptCode>,
}

fn serialize_regex<S: Serializer>(regex: &Regex, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(regex.as_str())
}

/// A typed violation rule from the built-in catalog.
#[derive(Debug, Clone, Serialize)]
pub struct ViolationRule {
    pub id: &'static str,
    pub kind: ViolationType,
    pub category: Category,
    /// 0-100
    pub severity: u8,
    pub patterns: Vec<RulePattern>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub law_name: Option<&'static str>,
    pub explanation: &'static str,
    pub fair_alternative: &'static str,
}

impl ViolationRule {
    /// Patterns that apply to a document in `script`.
    ///
    /// English patterns also run on Indic documents, which routinely mix in
    /// English clauses. `Unknown` runs everything.
    pub fn patterns_for(&self, script: ScriptCode) -> impl Iterator<Item = &RulePattern> {
        self.patterns.iter().filter(move |p| match p.script {
            None => true,
            Some(_) if script == ScriptCode::Unknown => true,
            Some(s) if s == script => true,
            Some(ScriptCode::English) => script.is_indic(),
            Some(_) => false,
        })
    }

    pub fn scripts(&self) -> Vec<ScriptCode> {
        let mut scripts: Vec<ScriptCode> = Vec::new();
        for p in &self.patterns {
            if let Some(s) = p.script {
                if !scripts.contains(&s) {
                    scripts.push(s);
                }
            }
        }
        scripts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_external_exact_and_loose() {
        assert_eq!(
            ViolationType::from_external("non_compete"),
            ViolationType::NonCompete
        );
        assert_eq!(
            ViolationType::from_external("Non-Compete"),
            ViolationType::NonCompete
        );
        assert_eq!(
            ViolationType::from_external("Restraint of Trade"),
            ViolationType::NonCompete
        );
        assert_eq!(
            ViolationType::from_external("late payment"),
            ViolationType::DelayedPayment
        );
    }

    #[test]
    fn test_from_external_unknown_is_other() {
        assert_eq!(
            ViolationType::from_external("gdpr_breach"),
            ViolationType::Other
        );
        assert_eq!(ViolationType::from_external(""), ViolationType::Other);
    }

    #[test]
    fn test_as_str_round_trips_through_from_external() {
        for kind in ViolationType::ALL {
            assert_eq!(ViolationType::from_external(kind.as_str()), *kind);
        }
    }

    #[test]
    fn test_patterns_for_script() {
        let rule = ViolationRule {
            id: "T-1",
            kind: ViolationType::Other,
            category: Category::Unfair,
            severity: 10,
            patterns: vec![
                RulePattern {
                    regex: Regex::new("a").unwrap(),
                    script: Some(ScriptCode::English),
                },
                RulePattern {
                    regex: Regex::new("b").unwrap(),
                    script: Some(ScriptCode::Devanagari),
                },
                RulePattern {
                    regex: Regex::new("c").unwrap(),
                    script: None,
                },
            ],
            section: None,
            law_name: None,
            explanation: "",
            fair_alternative: "",
        };
        let count = |s| rule.patterns_for(s).count();
        assert_eq!(count(ScriptCode::English), 2);
        assert_eq!(count(ScriptCode::Devanagari), 3);
        assert_eq!(count(ScriptCode::Tamil), 2);
        assert_eq!(count(ScriptCode::Unknown), 3);
        assert_eq!(
            rule.scripts(),
            vec![ScriptCode::English, ScriptCode::Devanagari]
        );
    }
}
