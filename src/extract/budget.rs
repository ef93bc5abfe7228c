//! Budget inference
//!
//! Budgets are inferred from the narrative text of a task with a fixed set of
//! numeric-context rules. Every match of every rule contributes to the total,
//! so a number picked up by two rules is counted twice.

use std::sync::OnceLock;

use regex::Regex;

/// Turns free text into a budget amount.
pub trait BudgetInference {
    fn infer(&self, text: &str) -> u64;
}

/// How a rule's captures turn into an amount
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RuleKind {
    /// One capture, taken literally
    Amount,
    /// Two captures, averaged
    Range,
}

struct BudgetRule {
    regex: Regex,
    kind: RuleKind,
}

fn rules() -> &'static [BudgetRule] {
    static RULES: OnceLock<Vec<BudgetRule>> = OnceLock::new();
    RULES.get_or_init(|| {
        [
            (
                r"([0-9]{3,})(?:\s+covers|, covers| all of that| includes| is about| is around)",
                RuleKind::Amount,
            ),
            (r"costs?\s*([0-9]{3,})", RuleKind::Amount),
            (r"around\s+([0-9]{3,})\s*-\s*([0-9]{3,})", RuleKind::Range),
            (r"([0-9]{3,})\s+is the estimate", RuleKind::Amount),
            (r"budget\s+is\s+([0-9]{3,})", RuleKind::Amount),
            (r"([0-9]{3,})\s+for the work", RuleKind::Amount),
        ]
        .into_iter()
        .map(|(pattern, kind)| BudgetRule {
            regex: Regex::new(pattern).unwrap(),
            kind,
        })
        .collect()
    })
}

/// The fixed pattern rule set.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternBudget;

impl BudgetInference for PatternBudget {
    fn infer(&self, text: &str) -> u64 {
        // Summed in halves so range midpoints stay exact until the final truncation
        let mut halves: u128 = 0;

        for rule in rules() {
            for caps in rule.regex.captures_iter(text) {
                let amount = |idx: usize| caps.get(idx).and_then(|m| m.as_str().parse::<u64>().ok());
                match rule.kind {
                    RuleKind::Amount => {
                        if let Some(value) = amount(1) {
                            halves += u128::from(value) * 2;
                        }
                    }
                    RuleKind::Range => {
                        if let (Some(start), Some(end)) = (amount(1), amount(2)) {
                            halves += u128::from(start) + u128::from(end);
                        }
                    }
                }
            }
        }

        u64::try_from(halves / 2).unwrap_or(u64::MAX)
    }
}

/// Collapse an `X-Y` range to its floor midpoint.
///
/// Values without a hyphen, or whose halves are not integers, come back
/// unchanged.
pub fn collapse_range(value: &str) -> String {
    if !value.contains('-') {
        return value.to_string();
    }
    let mut parts = value.split('-');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(start), Some(end), None) => {
            match (start.trim().parse::<i64>(), end.trim().parse::<i64>()) {
                (Ok(start), Ok(end)) => {
                    (i128::from(start) + i128::from(end)).div_euclid(2).to_string()
                }
                _ => value.to_string(),
            }
        }
        _ => value.to_string(),
    }
}
