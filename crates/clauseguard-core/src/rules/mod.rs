pub mod catalog;
pub mod schema;

pub use catalog::{catalog, find_rule, rule_for_kind};
pub use schema::{Category, RulePattern, ViolationRule, ViolationType};
