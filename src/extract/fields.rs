//! Reference and lead extraction, and whole-record refinement.

use std::sync::OnceLock;

use regex::Regex;

use crate::extract::budget::BudgetInference;
use crate::models::{TaskRecord, UNKNOWN_LEAD};

fn re_reference() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b[0-9]{4,}\b").unwrap())
}

fn re_lead() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)(managed by|handled by|led by) (\w+ \w+)").unwrap())
}

/// All standalone tokens of four or more digits, in order, duplicates kept
pub fn extract_references(text: &str) -> Vec<String> {
    re_reference()
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Two-word name following "managed by", "handled by" or "led by"
pub fn extract_lead(text: &str) -> Option<String> {
    re_lead().captures(text).map(|caps| caps[2].to_string())
}

/// Re-derive budget, references and lead from the record's narrative.
///
/// The budget always comes from `budget_rules`; whatever the upstream service
/// put there is discarded. References replace the upstream value only when
/// at least one token is found.
pub fn refine_record(record: &mut TaskRecord, budget_rules: &dyn BudgetInference) {
    let text = record.narrative();

    record.budget = budget_rules.infer(&text).to_string();

    let references = extract_references(&text);
    if !references.is_empty() {
        record.dwg_ref = references.join(", ");
    }

    record.lead = extract_lead(&text).unwrap_or_else(|| UNKNOWN_LEAD.to_string());
}
