use serde::Serialize;

/// Why a sheet was or was not reconciled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SheetStatus {
    Processed,
    UnrecognizedSheet,
    NoCandidates,
    NoHeader,
}

impl SheetStatus {
    pub fn describe(&self) -> &'static str {
        match self {
            SheetStatus::Processed => "processed",
            SheetStatus::UnrecognizedSheet => "skipped: not a category sheet",
            SheetStatus::NoCandidates => "skipped: no tasks for this sheet",
            SheetStatus::NoHeader => "skipped: no header row",
        }
    }
}

/// One cell overwritten on a matched row. Rows are 1-based as shown in a spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CellUpdate {
    pub row: usize,
    pub column: String,
    pub old: String,
    pub new: String,
    pub task: String,
    pub score: u8,
}

/// A candidate that matched no row and was appended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppendedRow {
    pub row: usize,
    pub task: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetReport {
    pub sheet: String,
    pub status: SheetStatus,
    pub updates: Vec<CellUpdate>,
    pub appended: Vec<AppendedRow>,
}

impl SheetReport {
    pub fn new(sheet: &str, status: SheetStatus) -> Self {
        Self {
            sheet: sheet.to_string(),
            status,
            updates: Vec::new(),
            appended: Vec::new(),
        }
    }
}

/// Outcome of reconciling one workbook
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub sheets: Vec<SheetReport>,
    /// Tasks whose category maps to no sheet
    pub dropped: Vec<String>,
    /// Whether the workbook was written back
    pub saved: bool,
}

impl ReconcileReport {
    pub fn update_count(&self) -> usize {
        self.sheets.iter().map(|s| s.updates.len()).sum()
    }

    pub fn appended_count(&self) -> usize {
        self.sheets.iter().map(|s| s.appended.len()).sum()
    }

    pub fn sheet(&self, name: &str) -> Option<&SheetReport> {
        self.sheets.iter().find(|s| s.sheet == name)
    }
}
