/// Canonical sheet categories
///
/// Every candidate record is routed to at most one of these. The label doubles
/// as the expected worksheet name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Gc,
    Plumbing,
    Electrical,
    Millwork,
    ScopeOfWork,
    Permits,
}

pub const BUDGET: &str = "BUDGET";
pub const PROPOSED: &str = "PROPOSED";
pub const PROPOSAL: &str = "PROPOSAL";
pub const COMMENT: &str = "COMMENT";
pub const DWG_REF: &str = "DWG REF";
pub const LEAD: &str = "LEAD";

const GC_COLUMNS: &[&str] = &[BUDGET, PROPOSED, LEAD];
const PLUMBING_COLUMNS: &[&str] = &[PROPOSAL];
const FULL_COLUMNS: &[&str] = &[BUDGET, PROPOSED, COMMENT, DWG_REF, LEAD];

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Gc,
        Category::Plumbing,
        Category::Electrical,
        Category::Millwork,
        Category::ScopeOfWork,
        Category::Permits,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Gc => "GC",
            Category::Plumbing => "PLUMBING",
            Category::Electrical => "ELECTRICAL",
            Category::Millwork => "MILLWORK",
            Category::ScopeOfWork => "SCOPE OF WORK",
            Category::Permits => "PERMITS",
        }
    }

    /// Parse a free-text category label or sheet name.
    ///
    /// Case and surrounding/internal whitespace are ignored, so
    /// `" scope  of work "` resolves to `ScopeOfWork`. Anything else is `None`.
    pub fn parse(label: &str) -> Option<Self> {
        let normalized = label
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_uppercase();
        Self::ALL.into_iter().find(|c| c.as_str() == normalized)
    }

    /// Required columns for this category's sheet, in schema order
    pub fn schema(&self) -> SheetSchema {
        let columns = match self {
            Category::Gc => GC_COLUMNS,
            Category::Plumbing => PLUMBING_COLUMNS,
            _ => FULL_COLUMNS,
        };
        SheetSchema { category: *self, columns }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static column layout a category's sheet is expected to carry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetSchema {
    pub category: Category,
    pub columns: &'static [&'static str],
}
