use crate::models::category::{self, Category};

pub const UNKNOWN_LEAD: &str = "Unknown";

/// Candidate task record awaiting reconciliation
///
/// All values are kept as the strings that end up in spreadsheet cells.
/// `proposal` is only populated for plumbing records, where the
/// upstream `PROPOSED` value is moved across by [`TaskRecord::normalize`].
#[derive(Debug, Clone, PartialEq)]
pub struct TaskRecord {
    pub description: String,
    pub category: String,
    pub budget: String,
    pub proposed: Option<String>,
    pub proposal: Option<String>,
    pub comment: String,
    pub dwg_ref: String,
    pub lead: String,
}

impl TaskRecord {
    /// Create a record with default field values
    pub fn new(description: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            category: category.into(),
            budget: "0".to_string(),
            proposed: None,
            proposal: None,
            comment: String::new(),
            dwg_ref: String::new(),
            lead: UNKNOWN_LEAD.to_string(),
        }
    }

    pub fn canonical_category(&self) -> Option<Category> {
        Category::parse(&self.category)
    }

    /// Lower-cased, trimmed description used as the matching key
    pub fn match_key(&self) -> String {
        self.description.trim().to_lowercase()
    }

    /// Apply category-specific field renames.
    ///
    /// Plumbing sheets track a `PROPOSAL` column instead of `PROPOSED`:
    /// the value moves and the `PROPOSED` key disappears.
    pub fn normalize(&mut self) {
        if self.canonical_category() == Some(Category::Plumbing) {
            if let Some(value) = self.proposed.take() {
                self.proposal = Some(value);
            }
        }
    }

    /// Text the field extractors read: comment followed by proposed
    pub fn narrative(&self) -> String {
        format!(
            "{} {}",
            self.comment,
            self.proposed.as_deref().unwrap_or_default()
        )
    }

    /// Value for a schema column name, empty when the record has none
    pub fn field(&self, column: &str) -> String {
        match column {
            category::BUDGET => self.budget.clone(),
            category::PROPOSED => self.proposed.clone().unwrap_or_default(),
            category::PROPOSAL => self.proposal.clone().unwrap_or_default(),
            category::COMMENT => self.comment.clone(),
            category::DWG_REF => self.dwg_ref.clone(),
            category::LEAD => self.lead.clone(),
            _ => String::new(),
        }
    }
}
