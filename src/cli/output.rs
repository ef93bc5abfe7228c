// Output formatting utilities

use std::io::IsTerminal;
use std::path::Path;

use crate::models::Category;
use crate::reconcile::{ReconcileReport, SheetStatus};
use crate::workbook::{locate_header, Workbook};

// ANSI escape codes for terminal formatting
const ANSI_BOLD: &str = "\x1b[1m";
const ANSI_RESET: &str = "\x1b[0m";

/// Check if stdout is a terminal (TTY)
pub fn is_tty() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width dynamically
///
/// Uses the `terminal_size` crate, with fallback to the COLUMNS environment
/// variable and a sensible default.
pub fn get_terminal_width() -> usize {
    if let Some((terminal_size::Width(w), _)) = terminal_size::terminal_size() {
        if w > 0 {
            return w as usize;
        }
    }

    if let Ok(cols) = std::env::var("COLUMNS") {
        if let Ok(width) = cols.parse::<usize>() {
            if width > 0 && width < 10000 {
                return width;
            }
        }
    }

    120
}

/// Apply bold formatting if in TTY mode
fn bold_if_tty(text: &str, is_tty: bool) -> String {
    if is_tty {
        format!("{}{}{}", ANSI_BOLD, text, ANSI_RESET)
    } else {
        text.to_string()
    }
}

/// Shorten text to at most `max` characters, marking the cut with "..."
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    if max <= 3 {
        return text.chars().take(max).collect();
    }
    let kept: String = text.chars().take(max - 3).collect();
    format!("{}...", kept)
}

/// Options for rendering a reconciliation report
#[derive(Debug, Clone, Copy)]
pub struct ReportOptions {
    pub width: usize,
    pub is_tty: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            width: get_terminal_width(),
            is_tty: is_tty(),
        }
    }
}

/// Human-readable summary of a reconciliation run
pub fn format_report(report: &ReconcileReport, path: &Path, options: &ReportOptions) -> String {
    let mut lines = Vec::new();
    // room for "  row NNN  COLUMN  " prefixes
    let value_width = options.width.saturating_sub(30).max(12) / 2;

    for sheet in &report.sheets {
        let name = bold_if_tty(&sheet.sheet, options.is_tty);
        if sheet.status != SheetStatus::Processed {
            lines.push(format!("{}: {}", name, sheet.status.describe()));
            continue;
        }

        lines.push(format!(
            "{}: {} cell(s) updated, {} row(s) added",
            name,
            sheet.updates.len(),
            sheet.appended.len()
        ));
        for update in &sheet.updates {
            lines.push(format!(
                "  row {:<4} {:<9} {} -> {}  ({}, score {})",
                update.row,
                update.column,
                truncate(&format!("'{}'", update.old), value_width),
                truncate(&format!("'{}'", update.new), value_width),
                truncate(&update.task, value_width),
                update.score
            ));
        }
        for appended in &sheet.appended {
            lines.push(format!(
                "  + row {:<4} {}",
                appended.row,
                truncate(&appended.task, options.width.saturating_sub(14).max(12))
            ));
        }
    }

    if !report.dropped.is_empty() {
        lines.push(format!(
            "Dropped {} task(s) with no matching sheet: {}",
            report.dropped.len(),
            report.dropped.join(", ")
        ));
    }

    lines.push(if report.saved {
        format!(
            "Spreadsheet '{}' updated: {} cell(s), {} new row(s).",
            path.display(),
            report.update_count(),
            report.appended_count()
        )
    } else {
        format!("Dry run: '{}' was not modified.", path.display())
    });

    lines.join("\n")
}

/// Describe how each sheet of a workbook would be read
pub fn format_inspection(workbook: &Workbook, is_tty: bool) -> String {
    if workbook.sheets().is_empty() {
        return "Workbook has no sheets.".to_string();
    }

    let mut lines = Vec::new();
    for sheet in workbook.sheets() {
        let name = bold_if_tty(sheet.name(), is_tty);
        let Some(category) = Category::parse(sheet.name()) else {
            lines.push(format!("{}: not a category sheet", name));
            continue;
        };
        let schema = category.schema();
        match locate_header(sheet, &schema) {
            Some(header) => {
                let found: Vec<String> = header
                    .columns
                    .iter()
                    .map(|(column, pos)| format!("{}@{}", column, pos + 1))
                    .collect();
                let missing: Vec<&str> = schema
                    .columns
                    .iter()
                    .copied()
                    .filter(|c| header.position(c).is_none())
                    .collect();
                let mut line = format!(
                    "{} ({}): header row {}, columns {}, {} data row(s)",
                    name,
                    category,
                    header.row + 1,
                    found.join(" "),
                    sheet.row_count().saturating_sub(header.first_data_row())
                );
                if !missing.is_empty() {
                    line.push_str(&format!(", missing {}", missing.join(", ")));
                }
                lines.push(line);
            }
            None => lines.push(format!("{} ({}): no header row", name, category)),
        }
    }
    lines.join("\n")
}
