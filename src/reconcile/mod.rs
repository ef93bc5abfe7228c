//! Reconciliation engine
//!
//! Matches candidate tasks to existing spreadsheet rows, resolves field
//! conflicts cell by cell and appends unmatched candidates.

pub mod engine;
pub mod policy;
pub mod report;

pub use engine::*;
pub use policy::*;
pub use report::*;

use std::path::Path;

use crate::models::TaskRecord;
use crate::workbook::{WorkbookError, XlsxStore};

/// Settings for reconciling a workbook file
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub reconcile: ReconcileOptions,
    /// Reconcile in memory only
    pub dry_run: bool,
    /// Copy the file aside before overwriting it
    pub backup: bool,
}

/// Open a workbook file, reconcile prepared records into it and persist it once.
///
/// Only opening, backing up or saving the file can fail.
pub fn reconcile_file(
    path: &Path,
    records: &[TaskRecord],
    options: &RunOptions,
) -> Result<ReconcileReport, WorkbookError> {
    let (mut store, mut workbook) = XlsxStore::open(path)?;

    let mut report = reconcile(&mut workbook, records, &options.reconcile);

    if options.dry_run {
        log::info!("Dry run, {} left untouched", path.display());
        return Ok(report);
    }

    if options.backup {
        store.backup()?;
    }
    store.save(&workbook)?;
    report.saved = true;

    Ok(report)
}
