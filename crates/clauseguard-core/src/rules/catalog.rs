//! Built-in violation rules for Indian freelance and services contracts.

use crate::rules::schema::{Category, RulePattern, ViolationRule, ViolationType};
use crate::script::ScriptCode;
use regex::Regex;
use std::sync::LazyLock;

const ICA: &str = "Indian Contract Act, 1872";

struct RuleDef {
    id: &'static str,
    kind: ViolationType,
    category: Category,
    severity: u8,
    patterns: &'static [(&'static str, Option<ScriptCode>)],
    section: Option<&'static str>,
    law_name: Option<&'static str>,
    explanation: &'static str,
    fair_alternative: &'static str,
}

const EN: Option<ScriptCode> = Some(ScriptCode::English);
const HI: Option<ScriptCode> = Some(ScriptCode::Devanagari);
const TA: Option<ScriptCode> = Some(ScriptCode::Tamil);

const RULE_DEFS: &[RuleDef] = &[
    // ---- Legal: unenforceable under the Contract Act ----
    RuleDef {
        id: "LG-001",
        kind: ViolationType::NonCompete,
        category: Category::Legal,
        severity: 95,
        patterns: &[
            (
                r"(?i)\b(?:shall|will|must|agrees?\s+to|undertakes?\s+to)\s+not\s+(?:directly\s+or\s+indirectly\s+)?(?:compete|engage|work\s+for|be\s+employed\s+by|provide\s+(?:similar\s+)?services\s+to)\b[^.]{0,200}?(?:for\s+a\s+period\s+of|during|after|following|\d+\s*(?:years?|months?))",
                EN,
            ),
            (
                r"(?i)\bnon[\s-]?compet(?:e|ition)\s+(?:clause|covenant|obligation|period|restriction)",
                EN,
            ),
            (
                r"(?:प्रतिस्पर्धा|प्रतियोगिता)\s*(?:नहीं|न)\s*कर(?:ेगा|ेगी|ेंगे|ने)",
                HI,
            ),
            (r"போட்டியிட(?:க்\s*கூடாது|\s*மாட்டார்)", TA),
        ],
        section: Some("Section 27"),
        law_name: Some(ICA),
        explanation: "Every agreement restraining anyone from exercising a lawful profession, trade or business is void under Section 27. Post-termination non-compete clauses are unenforceable against freelancers in India.",
        fair_alternative: "Limit the restriction to non-solicitation of the client's existing customers and to non-disclosure of confidential information during the engagement.",
    },
    RuleDef {
        id: "LG-002",
        kind: ViolationType::RestraintOfLegalProceedings,
        category: Category::Legal,
        severity: 85,
        patterns: &[
            (
                r"(?i)\b(?:waives?|relinquish(?:es)?|gives?\s+up|shall\s+not\s+(?:have\s+the\s+right\s+to\s+)?(?:file|initiate|bring|pursue))\b[^.]{0,80}?\b(?:legal\s+(?:action|proceedings?|remed(?:y|ies))|right\s+to\s+(?:sue|approach\s+(?:any\s+)?courts?)|(?:suit|claim)s?\s+(?:in|before)\s+(?:any\s+)?court)",
                EN,
            ),
            (
                r"(?i)\bno\s+(?:legal\s+)?(?:claim|suit|proceedings?)\s+(?:shall|may|can)\s+be\s+(?:brought|filed|initiated)\s+(?:after|beyond)\s+\d+\s+days",
                EN,
            ),
            (r"न्यायालय\s*(?:में|का)\s*[^।]{0,40}?(?:नहीं|वर्जित)", HI),
        ],
        section: Some("Section 28"),
        law_name: Some(ICA),
        explanation: "Agreements that absolutely restrict a party from enforcing their rights through ordinary legal proceedings, or that shorten the statutory limitation period, are void under Section 28.",
        fair_alternative: "Provide for good-faith negotiation followed by arbitration or the courts of an agreed city, without removing either party's right to legal remedies.",
    },
    RuleDef {
        id: "LG-003",
        kind: ViolationType::PenaltyClause,
        category: Category::Legal,
        severity: 75,
        patterns: &[
            (
                r"(?i)\b(?:penalty|penalties|liquidated\s+damages)\b[^.]{0,120}?(?:\b\d+\s*%|\bper\s+(?:day|week)\b|(?:\brs\.?|\binr|₹)\s*[\d,]+)",
                EN,
            ),
            (
                r"(?i)\bshall\s+(?:pay|forfeit)\s+(?:a\s+)?(?:penalty|fine)\s+of\b",
                EN,
            ),
            (r"(?:जुर्माना|दंड)\s*[^।]{0,60}?(?:प्रतिदिन|\d+\s*%|₹)", HI),
        ],
        section: Some("Section 74"),
        law_name: Some(ICA),
        explanation: "Under Section 74 a party can recover only reasonable compensation for actual loss, not a stipulated penalty. Fixed punitive amounts for delay are routinely struck down.",
        fair_alternative: "Replace the penalty with a reasonable, capped delay adjustment tied to actual loss, mirrored by interest on late payments by the client.",
    },
    RuleDef {
        id: "LG-004",
        kind: ViolationType::UnlawfulConsideration,
        category: Category::Legal,
        severity: 90,
        patterns: &[(
            r"(?i)\b(?:cash\s+payments?\s+without\s+(?:any\s+)?(?:invoice|receipt)|(?:to|in\s+order\s+to)\s+(?:evade|avoid)\s+(?:income\s+|goods\s+and\s+services\s+|gst\s+)?tax(?:es|ation)?|off[\s-]the[\s-]books|unaccounted\s+(?:cash|payments?))",
            EN,
        )],
        section: Some("Section 23"),
        law_name: Some(ICA),
        explanation: "Consideration or an object that is forbidden by law or defeats the provisions of any law is unlawful, and the agreement is void under Section 23.",
        fair_alternative: "Pay all fees through invoiced, traceable channels with applicable taxes (GST, TDS) deducted and reported.",
    },
    RuleDef {
        id: "LG-005",
        kind: ViolationType::WaiverOfStatutoryRights,
        category: Category::Legal,
        severity: 80,
        patterns: &[(
            r"(?i)\bwaives?\s+(?:any\s+and\s+)?all\s+(?:of\s+(?:its|his|her|their)\s+)?(?:statutory\s+)?rights\s+(?:under|conferred\s+by|available\s+under)\s+(?:any|applicable|the)\s+(?:law|statute|act)",
            EN,
        )],
        section: Some("Section 23"),
        law_name: Some(ICA),
        explanation: "A blanket waiver of rights granted by statute is opposed to public policy and cannot be enforced.",
        fair_alternative: "Remove the blanket waiver; list any specific, lawful concessions explicitly.",
    },
    // ---- Unfair: enforceable but one-sided ----
    RuleDef {
        id: "UF-001",
        kind: ViolationType::ForfeitureOfEarnedFees,
        category: Category::Unfair,
        severity: 85,
        patterns: &[
            (
                r"(?i)\b(?:forfeits?|forfeiture\s+of|shall\s+not\s+be\s+(?:entitled|eligible)\s+to|waives?\s+(?:any\s+)?(?:claim|right)\s+to)\b[^.]{0,80}?\b(?:payment|fees?|compensation|remuneration|amounts?\s+(?:due|owed))",
                EN,
            ),
            (
                r"(?i)\bno\s+payment\s+(?:shall|will)\s+be\s+(?:made|due)\s+for\s+(?:any\s+)?(?:work|services)\s+(?:already\s+)?(?:performed|completed|delivered)",
                EN,
            ),
        ],
        section: None,
        law_name: None,
        explanation: "Forfeiting fees for work already delivered lets the client keep the benefit of the work without paying for it.",
        fair_alternative: "On termination the client pays for all work completed up to the termination date, pro rata for milestones in progress.",
    },
    RuleDef {
        id: "UF-002",
        kind: ViolationType::UnlimitedRevisions,
        category: Category::Unfair,
        severity: 70,
        patterns: &[
            (
                r"(?i)\b(?:unlimited|unrestricted|infinite|any\s+number\s+of)\s+(?:revisions?|rounds?\s+of\s+revisions?|changes|modifications|iterations|edits)",
                EN,
            ),
            (
                r"(?i)\brevisions?\s+until\s+(?:the\s+)?client\s+is\s+(?:fully\s+|completely\s+)?satisfied",
                EN,
            ),
            (r"असीमित\s*(?:संशोधन|बदलाव)", HI),
            (r"வரம்பற்ற\s*(?:திருத்த|மாற்ற)", TA),
        ],
        section: None,
        law_name: None,
        explanation: "Open-ended revisions turn a fixed fee into unbounded work.",
        fair_alternative: "Include two rounds of revisions in the fee; further rounds are billed at an agreed hourly or per-round rate.",
    },
    RuleDef {
        id: "UF-003",
        kind: ViolationType::DelayedPayment,
        category: Category::Unfair,
        severity: 60,
        patterns: &[
            (
                r"(?i)\b(?:payments?|invoices?|fees?)\b[^.]{0,60}?\bwithin\s+(?:(?:[6-9]\d|[1-3]\d\d)|sixty|seventy|seventy[\s-]five|ninety|one\s+hundred(?:\s+and)?\s+twenty)\s*(?:\(\s*\d+\s*\)\s*)?(?:calendar\s+|business\s+|working\s+)?days",
                EN,
            ),
            (r"(?i)\bnet[\s-]?(?:[6-9]\d|1[0-8]\d)\b", EN),
        ],
        section: None,
        law_name: None,
        explanation: "Payment windows beyond 45 days strain a freelancer's cash flow; the MSMED Act caps payment to registered micro and small enterprises at 45 days.",
        fair_alternative: "Payment within 30 days of invoice, with interest on late payments.",
    },
    RuleDef {
        id: "UF-004",
        kind: ViolationType::IpTransferBeforePayment,
        category: Category::Unfair,
        severity: 75,
        patterns: &[(
            r"(?i)\b(?:intellectual\s+property|ip|copyrights?|ownership)(?:\s+rights)?\b[^.]{0,80}?\b(?:vests?|transfers?|pass(?:es)?|shall\s+belong|(?:is|are|shall\s+be)\s+assigned)\b[^.]{0,60}?\b(?:upon|on|from\s+the\s+moment\s+of)\s+(?:its\s+)?(?:creation|delivery|submission|signing|execution)",
            EN,
        )],
        section: None,
        law_name: None,
        explanation: "Transferring ownership before payment leaves the freelancer with no leverage if the client does not pay.",
        fair_alternative: "Intellectual property transfers to the client upon receipt of full payment.",
    },
    RuleDef {
        id: "UF-005",
        kind: ViolationType::UnlimitedLiability,
        category: Category::Unfair,
        severity: 85,
        patterns: &[
            (
                r"(?i)\b(?:unlimited|uncapped|without\s+(?:any\s+)?limit(?:ation)?)\b[^.]{0,30}?\bliabilit(?:y|ies)\b",
                EN,
            ),
            (
                r"(?i)\bliabilit(?:y|ies)\b[^.]{0,40}?\b(?:shall\s+(?:not\s+be\s+(?:limited|capped)|be\s+unlimited)|without\s+(?:any\s+)?(?:limit|cap))",
                EN,
            ),
        ],
        section: None,
        law_name: None,
        explanation: "Uncapped liability can expose a freelancer to damages far exceeding the contract value.",
        fair_alternative: "Cap total liability at the fees paid under this agreement, excluding indirect and consequential losses.",
    },
    RuleDef {
        id: "UF-006",
        kind: ViolationType::OneSidedIndemnity,
        category: Category::Unfair,
        severity: 70,
        patterns: &[(
            r"(?i)\b(?:freelancer|contractor|consultant|service\s+provider|vendor)\s+shall\s+(?:fully\s+)?(?:indemnify|hold\s+harmless|defend)\b[^.]{0,150}?\b(?:any\s+and\s+all|all)\s+(?:claims|losses|damages|liabilities)",
            EN,
        )],
        section: None,
        law_name: None,
        explanation: "A one-way indemnity for all claims shifts every risk, including the client's own conduct, onto the freelancer.",
        fair_alternative: "Mutual indemnities limited to each party's own negligence or breach, subject to the liability cap.",
    },
    RuleDef {
        id: "UF-007",
        kind: ViolationType::TerminationWithoutNotice,
        category: Category::Unfair,
        severity: 65,
        patterns: &[
            (
                r"(?i)\b(?:client|company)\s+may\s+terminate\b[^.]{0,80}?\b(?:at\s+any\s+time|without\s+(?:any\s+)?(?:prior\s+)?(?:notice|cause|reason))",
                EN,
            ),
            (
                r"(?i)\bterminat(?:e|ed|ion)\s+(?:immediately\s+)?without\s+(?:any\s+)?(?:prior\s+)?notice",
                EN,
            ),
            (r"बिना\s*(?:किसी\s*)?(?:पूर्व\s*)?सूचना\s*के\s*[^।]{0,40}?समाप्त", HI),
        ],
        section: None,
        law_name: None,
        explanation: "Termination at will by one party leaves the freelancer without notice to plan for lost income.",
        fair_alternative: "Either party may terminate with 30 days' written notice, with payment for work completed to date.",
    },
    RuleDef {
        id: "UF-008",
        kind: ViolationType::PaymentContingentOnApproval,
        category: Category::Unfair,
        severity: 60,
        patterns: &[
            (
                r"(?i)\bpayments?\b[^.]{0,80}?\b(?:subject\s+to|contingent\s+(?:up)?on|conditional\s+(?:up)?on|only\s+(?:up)?on)\s+(?:the\s+)?(?:client'?s?\s+)?(?:sole\s+|complete\s+|full\s+)?(?:satisfaction|approval|acceptance|discretion)",
                EN,
            ),
            (
                r"(?i)\bat\s+(?:the\s+)?(?:client'?s?\s+)?sole\s+discretion\b[^.]{0,60}?\b(?:pay|payment|fees?)\b",
                EN,
            ),
        ],
        section: None,
        law_name: None,
        explanation: "Payment that depends on subjective approval can be withheld indefinitely.",
        fair_alternative: "Deliverables are deemed accepted unless the client raises specific written objections within 7 days of delivery.",
    },
    RuleDef {
        id: "UF-009",
        kind: ViolationType::MoralRightsWaiver,
        category: Category::Unfair,
        severity: 50,
        patterns: &[
            (r"(?i)\bwaives?\b[^.]{0,60}?\bmoral\s+rights\b", EN),
            (r"(?i)\bmoral\s+rights\b[^.]{0,60}?\bwaived\b", EN),
        ],
        section: Some("Section 57"),
        law_name: Some("Copyright Act, 1957"),
        explanation: "Section 57 protects an author's right to attribution and integrity independently of ownership; blanket waivers erase credit for the work.",
        fair_alternative: "Retain the right to be credited and to show the work in a portfolio after public release.",
    },
    RuleDef {
        id: "UF-010",
        kind: ViolationType::UnilateralAmendment,
        category: Category::Unfair,
        severity: 55,
        patterns: &[(
            r"(?i)\b(?:client|company)\s+(?:may|reserves\s+the\s+right\s+to)\s+(?:amend|modify|change|alter|revise)\s+(?:these|this|the)\s+(?:terms|agreement|contract|scope)\b[^.]{0,80}?\b(?:at\s+any\s+time|sole\s+discretion|without\s+(?:notice|consent))",
            EN,
        )],
        section: None,
        law_name: None,
        explanation: "One party changing the terms alone means the freelancer never knows what was agreed.",
        fair_alternative: "Amendments are valid only in writing and signed by both parties.",
    },
];

static CATALOG: LazyLock<Vec<ViolationRule>> = LazyLock::new(|| {
    RULE_DEFS
        .iter()
        .map(|def| ViolationRule {
            id: def.id,
            kind: def.kind,
            category: def.category,
            severity: def.severity,
            patterns: def
                .patterns
                .iter()
                .filter_map(|(source, script)| match Regex::new(source) {
                    Ok(regex) => Some(RulePattern {
                        regex,
                        script: *script,
                    }),
                    Err(e) => {
                        tracing::error!(rule = def.id, error = %e, "skipping invalid pattern");
                        None
                    }
                })
                .collect(),
            section: def.section,
            law_name: def.law_name,
            explanation: def.explanation,
            fair_alternative: def.fair_alternative,
        })
        .collect()
});

/// All built-in rules, compiled on first use.
pub fn catalog() -> &'static [ViolationRule] {
    &CATALOG
}

pub fn find_rule(id: &str) -> Option<&'static ViolationRule> {
    catalog().iter().find(|r| r.id.eq_ignore_ascii_case(id))
}

pub fn rule_for_kind(kind: ViolationType) -> Option<&'static ViolationRule> {
    catalog().iter().find(|r| r.kind == kind)
}
