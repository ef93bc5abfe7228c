// Field-level conflict resolution for matched rows

use crate::extract::collapse_range;
use crate::models::{BUDGET, LEAD, UNKNOWN_LEAD};

/// What to do with one cell of a matched row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellDecision {
    /// Overwrite the cell with this value
    Write(String),
    /// Leave the cell alone, but the candidate still counts as placed
    Keep,
    /// Leave the cell alone; this column alone does not place the candidate
    Skip,
}

impl CellDecision {
    /// Whether this decision marks the candidate as placed in the sheet
    pub fn consumes(&self) -> bool {
        !matches!(self, CellDecision::Skip)
    }
}

/// Decide how `incoming` lands on a cell currently holding `existing`.
///
/// - `BUDGET` is always refreshed, with `X-Y` ranges collapsed to their midpoint.
/// - `LEAD` is only overwritten by a real name.
/// - Anything else is rewritten unless the cell already holds that exact,
///   meaningful value.
pub fn resolve_cell(column: &str, existing: &str, incoming: &str) -> CellDecision {
    match column {
        BUDGET => CellDecision::Write(collapse_range(incoming)),
        LEAD => {
            if incoming.is_empty() || incoming == UNKNOWN_LEAD {
                CellDecision::Keep
            } else {
                CellDecision::Write(incoming.to_string())
            }
        }
        _ => {
            let meaningful = !existing.is_empty() && existing != "0";
            if meaningful && existing == incoming {
                CellDecision::Skip
            } else {
                CellDecision::Write(incoming.to_string())
            }
        }
    }
}
