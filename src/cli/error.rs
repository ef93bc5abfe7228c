// Error handling utilities for consistent error messages and exit codes
//
// Internal errors (exit code 2) are classified and printed by main.

use std::path::Path;
use std::process;

use crate::reconcile::AppendLayout;

/// Exit with a user error (exit code 1)
/// User errors are for invalid input, missing files, missing settings, etc.
pub fn user_error(message: &str) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

/// Validate that a path names an existing regular file
pub fn validate_input_file(path: &Path, what: &str) -> Result<(), String> {
    if !path.exists() {
        Err(format!("{} not found: {}", what, path.display()))
    } else if !path.is_file() {
        Err(format!("{} is not a file: {}", what, path.display()))
    } else {
        Ok(())
    }
}

/// Validate that a spreadsheet path looks like an .xlsx workbook
pub fn validate_spreadsheet(path: &Path) -> Result<(), String> {
    validate_input_file(path, "Spreadsheet")?;
    let is_xlsx = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("xlsx") || e.eq_ignore_ascii_case("xlsm"));
    if is_xlsx {
        Ok(())
    } else {
        Err(format!(
            "Unsupported spreadsheet: '{}'. Only .xlsx workbooks can be updated.",
            path.display()
        ))
    }
}

/// Validate a match threshold given on the command line
pub fn validate_threshold(value: &str) -> Result<u8, String> {
    value
        .parse::<u8>()
        .map_err(|_| format!("Invalid threshold: '{}'. Threshold must be a number.", value))
        .and_then(|t| {
            if t <= 100 {
                Ok(t)
            } else {
                Err(format!("Invalid threshold: {}. Threshold must be between 0 and 100.", t))
            }
        })
}

/// Validate an append layout name given on the command line
pub fn validate_layout(value: &str) -> Result<AppendLayout, String> {
    AppendLayout::parse(value).ok_or_else(|| {
        format!("Invalid layout: '{}'. Use 'aligned' or 'schema'.", value)
    })
}
