//! Per-sheet reconciliation
//!
//! For every category sheet: find the header, pair each existing row with its
//! most similar unplaced candidate, apply the cell policy to accepted pairs and
//! append whatever was never placed.

use std::collections::BTreeMap;

use crate::extract::{refine_record, BudgetInference};
use crate::models::{Category, TaskRecord};
use crate::reconcile::policy::{resolve_cell, CellDecision};
use crate::reconcile::report::{AppendedRow, CellUpdate, ReconcileReport, SheetReport, SheetStatus};
use crate::utils::fuzzy::{best_match, is_accepted, MATCH_THRESHOLD};
use crate::workbook::{locate_header, HeaderLayout, Sheet, Workbook};

/// Where appended rows put their values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppendLayout {
    /// Under the header column each value belongs to
    #[default]
    Aligned,
    /// Description then values in schema order, regardless of the header
    Schema,
}

impl AppendLayout {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppendLayout::Aligned => "aligned",
            AppendLayout::Schema => "schema",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "aligned" => Some(AppendLayout::Aligned),
            "schema" => Some(AppendLayout::Schema),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileOptions {
    pub threshold: u8,
    pub layout: AppendLayout,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            threshold: MATCH_THRESHOLD,
            layout: AppendLayout::default(),
        }
    }
}

/// Refine (optionally) and normalize raw candidates before reconciliation
pub fn prepare_records(
    mut records: Vec<TaskRecord>,
    budget_rules: Option<&dyn BudgetInference>,
) -> Vec<TaskRecord> {
    for record in &mut records {
        if let Some(rules) = budget_rules {
            refine_record(record, rules);
        }
        record.normalize();
    }
    records
}

/// Candidates per category, in input order
///
/// A later record whose match key repeats an earlier one replaces it in place.
/// Records with no canonical category are returned separately.
pub fn group_by_category(
    records: &[TaskRecord],
) -> (BTreeMap<Category, Vec<&TaskRecord>>, Vec<&TaskRecord>) {
    let mut groups: BTreeMap<Category, Vec<&TaskRecord>> = BTreeMap::new();
    let mut dropped = Vec::new();

    for record in records {
        let Some(category) = record.canonical_category() else {
            log::debug!(
                "Dropping '{}': category '{}' has no sheet",
                record.description,
                record.category
            );
            dropped.push(record);
            continue;
        };

        let group = groups.entry(category).or_default();
        let key = record.match_key();
        match group.iter_mut().find(|existing| existing.match_key() == key) {
            Some(slot) => *slot = record,
            None => group.push(record),
        }
    }

    (groups, dropped)
}

/// Reconcile every category sheet of `workbook` against `records`.
///
/// Records must already be prepared. The workbook is only mutated in memory.
pub fn reconcile(
    workbook: &mut Workbook,
    records: &[TaskRecord],
    options: &ReconcileOptions,
) -> ReconcileReport {
    let (groups, dropped) = group_by_category(records);
    let mut report = ReconcileReport {
        dropped: dropped.iter().map(|r| r.description.clone()).collect(),
        ..ReconcileReport::default()
    };

    for sheet in workbook.sheets_mut() {
        let name = sheet.name().to_string();

        let Some(category) = Category::parse(&name) else {
            log::warn!("Sheet '{}' not recognized, skipping", name);
            report.sheets.push(SheetReport::new(&name, SheetStatus::UnrecognizedSheet));
            continue;
        };

        let candidates = groups.get(&category).map(Vec::as_slice).unwrap_or_default();
        if candidates.is_empty() {
            log::warn!("No tasks for sheet '{}', skipping", name);
            report.sheets.push(SheetReport::new(&name, SheetStatus::NoCandidates));
            continue;
        }

        report
            .sheets
            .push(reconcile_sheet(sheet, category, candidates, options));
    }

    report
}

/// Reconcile one sheet against the candidates of its category
pub fn reconcile_sheet(
    sheet: &mut Sheet,
    category: Category,
    candidates: &[&TaskRecord],
    options: &ReconcileOptions,
) -> SheetReport {
    let schema = category.schema();
    let mut report = SheetReport::new(sheet.name(), SheetStatus::Processed);

    let Some(header) = locate_header(sheet, &schema) else {
        log::warn!("No header row found in '{}', skipping", sheet.name());
        report.status = SheetStatus::NoHeader;
        return report;
    };
    log::debug!("'{}' header at row {}: {:?}", sheet.name(), header.row + 1, header.columns);

    let keys: Vec<String> = candidates.iter().map(|c| c.match_key()).collect();
    let mut placed = vec![false; candidates.len()];

    for row in header.first_data_row()..sheet.row_count() {
        let description = sheet.cell(row, 0).trim().to_lowercase();
        if description.is_empty() {
            continue;
        }

        let open: Vec<usize> = (0..candidates.len()).filter(|&i| !placed[i]).collect();
        let open_keys: Vec<&str> = open.iter().map(|&i| keys[i].as_str()).collect();

        let Some(found) = best_match(&description, &open_keys) else {
            continue;
        };
        let idx = open[found.index];
        log::debug!("Row {} '{}' best match '{}' ({})", row + 1, description, keys[idx], found.score);
        if !is_accepted(found.score, options.threshold) {
            continue;
        }

        let candidate = candidates[idx];
        for &(column, pos) in &header.columns {
            let existing = sheet.cell(row, pos).to_string();
            let decision = resolve_cell(column, &existing, &candidate.field(column));
            if decision.consumes() {
                placed[idx] = true;
            }
            if let CellDecision::Write(value) = decision {
                log::info!("Updated: {} -> {}: {}", candidate.description, column, value);
                sheet.set_cell(row, pos, value.clone());
                report.updates.push(CellUpdate {
                    row: row + 1,
                    column: column.to_string(),
                    old: existing,
                    new: value,
                    task: candidate.description.clone(),
                    score: found.score,
                });
            }
        }
    }

    for (idx, candidate) in candidates.iter().enumerate() {
        if placed[idx] {
            continue;
        }
        let values = append_values(candidate, &header, category, options.layout);
        let row = sheet.append_row(values);
        log::info!("Added new row: {} to {}", candidate.description, sheet.name());
        report.appended.push(AppendedRow {
            row: row + 1,
            task: candidate.description.clone(),
        });
    }

    report
}

fn append_values(
    candidate: &TaskRecord,
    header: &HeaderLayout,
    category: Category,
    layout: AppendLayout,
) -> Vec<String> {
    match layout {
        AppendLayout::Schema => std::iter::once(candidate.description.clone())
            .chain(category.schema().columns.iter().map(|c| candidate.field(c)))
            .collect(),
        AppendLayout::Aligned => {
            let width = header.columns.iter().map(|&(_, pos)| pos + 1).max().unwrap_or(1);
            let mut values = vec![String::new(); width];
            values[0] = candidate.description.clone();
            for &(column, pos) in &header.columns {
                if pos == 0 {
                    log::debug!("'{}' shares the description column, not appended", column);
                    continue;
                }
                values[pos] = candidate.field(column);
            }
            values
        }
    }
}
