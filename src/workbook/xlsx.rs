//! `.xlsx` persistence through umya-spreadsheet
//!
//! The file is read once into a [`Workbook`] of plain strings. On save only the
//! cells the engine wrote are pushed back into the original document, so styles
//! and untouched cells survive the round trip.

use std::path::{Path, PathBuf};

use umya_spreadsheet::helper::coordinate::coordinate_from_index;

use crate::workbook::{Sheet, Workbook};

/// Errors opening, saving or backing up a workbook file
#[derive(Debug, thiserror::Error)]
pub enum WorkbookError {
    #[error("Failed to open workbook {}: {message}", path.display())]
    Open { path: PathBuf, message: String },
    #[error("Failed to save workbook {}: {message}", path.display())]
    Save { path: PathBuf, message: String },
    #[error("Sheet '{0}' disappeared from the workbook")]
    MissingSheet(String),
    #[error("Failed to back up workbook to {}: {source}", path.display())]
    Backup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Open workbook file and the document it was read from
pub struct XlsxStore {
    path: PathBuf,
    book: umya_spreadsheet::Spreadsheet,
}

fn address(row: usize, col: usize) -> String {
    coordinate_from_index(&(col as u32 + 1), &(row as u32 + 1))
}

fn read_sheet(sheet: &umya_spreadsheet::Worksheet) -> Sheet {
    let max_row = sheet.get_highest_row() as usize;
    let max_col = sheet.get_highest_column() as usize;

    let rows = (0..max_row).map(|row| {
        let mut cells: Vec<String> = (0..max_col)
            .map(|col| sheet.get_value(address(row, col).as_str()))
            .collect();
        while cells.last().is_some_and(|c| c.is_empty()) {
            cells.pop();
        }
        cells
    });

    Sheet::from_rows(sheet.get_name(), rows)
}

impl XlsxStore {
    /// Read a workbook file into memory
    pub fn open(path: &Path) -> Result<(Self, Workbook), WorkbookError> {
        let book = umya_spreadsheet::reader::xlsx::read(path).map_err(|e| WorkbookError::Open {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let sheets = book.get_sheet_collection().iter().map(read_sheet).collect();
        log::debug!("Loaded workbook {}", path.display());

        Ok((
            Self {
                path: path.to_path_buf(),
                book,
            },
            Workbook::new(sheets),
        ))
    }

    /// Write every dirty cell back and save the file in place.
    ///
    /// Returns the number of cells written.
    pub fn save(&mut self, workbook: &Workbook) -> Result<usize, WorkbookError> {
        let mut written = 0;

        for sheet in workbook.sheets().iter().filter(|s| s.is_dirty()) {
            let target = self
                .book
                .get_sheet_by_name_mut(sheet.name())
                .ok_or_else(|| WorkbookError::MissingSheet(sheet.name().to_string()))?;

            for (row, col) in sheet.dirty_cells() {
                target
                    .get_cell_mut(address(row, col).as_str())
                    .set_value(sheet.cell(row, col).to_string());
                written += 1;
            }
        }

        umya_spreadsheet::writer::xlsx::write(&self.book, &self.path).map_err(|e| {
            WorkbookError::Save {
                path: self.path.clone(),
                message: e.to_string(),
            }
        })?;

        log::info!("Saved {} cell(s) to {}", written, self.path.display());
        Ok(written)
    }

    /// Copy the file as it is on disk to a timestamped sibling.
    pub fn backup(&self) -> Result<PathBuf, WorkbookError> {
        let backup_path = backup_path(&self.path, chrono::Local::now());
        std::fs::copy(&self.path, &backup_path).map_err(|source| WorkbookError::Backup {
            path: backup_path.clone(),
            source,
        })?;
        log::info!("Workbook backed up to {}", backup_path.display());
        Ok(backup_path)
    }
}

/// `tracker.xlsx` -> `tracker.20260116-093000.bak.xlsx`
pub fn backup_path<Tz>(path: &Path, at: chrono::DateTime<Tz>) -> PathBuf
where
    Tz: chrono::TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "workbook".to_string());
    let name = format!("{}.{}.bak.xlsx", stem, at.format("%Y%m%d-%H%M%S"));
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn write_fixture(path: &Path) {
        let mut book = umya_spreadsheet::new_file();
        let sheet = book.new_sheet("GC").unwrap();
        sheet.get_cell_mut("A1").set_value("TASK");
        sheet.get_cell_mut("B1").set_value("BUDGET");
        sheet.get_cell_mut("A2").set_value("paint hallway");
        sheet.get_cell_mut("B2").set_value("0");
        umya_spreadsheet::writer::xlsx::write(&book, path).unwrap();
    }

    #[test]
    fn test_address() {
        assert_eq!(address(0, 0), "A1");
        assert_eq!(address(4, 27), "AB5");
    }

    #[test]
    fn test_backup_path() {
        let at = chrono::Utc.with_ymd_and_hms(2026, 1, 16, 9, 30, 0).unwrap();
        assert_eq!(
            backup_path(Path::new("/data/tracker.xlsx"), at),
            PathBuf::from("/data/tracker.20260116-093000.bak.xlsx")
        );
    }

    #[test]
    fn test_open_reads_values() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("book.xlsx");
        write_fixture(&path);

        let (_store, workbook) = XlsxStore::open(&path).unwrap();
        let sheet = workbook.sheet("GC").unwrap();
        assert_eq!(sheet.cell(0, 0), "TASK");
        assert_eq!(sheet.cell(1, 0), "paint hallway");
        assert_eq!(sheet.cell(1, 1), "0");
        assert!(!workbook.is_dirty());
    }

    #[test]
    fn test_save_writes_dirty_cells() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("book.xlsx");
        write_fixture(&path);

        let (mut store, mut workbook) = XlsxStore::open(&path).unwrap();
        let sheet = workbook
            .sheets_mut()
            .iter_mut()
            .find(|s| s.name() == "GC")
            .unwrap();
        sheet.set_cell(1, 1, "500");
        sheet.append_row(vec!["tile floor", "1200"]);

        assert_eq!(store.save(&workbook).unwrap(), 3);

        let (_store, reloaded) = XlsxStore::open(&path).unwrap();
        let sheet = reloaded.sheet("GC").unwrap();
        assert_eq!(sheet.cell(1, 1), "500");
        assert_eq!(sheet.cell(2, 0), "tile floor");
        assert_eq!(sheet.cell(2, 1), "1200");
    }

    #[test]
    fn test_open_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = XlsxStore::open(&temp_dir.path().join("nope.xlsx")).err().unwrap();
        assert!(err.to_string().contains("Failed to open workbook"));
    }

    #[test]
    fn test_backup_copies_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("book.xlsx");
        write_fixture(&path);

        let (store, _workbook) = XlsxStore::open(&path).unwrap();
        let backup = store.backup().unwrap();
        assert!(backup.exists());
        assert_eq!(backup.parent(), path.parent());
    }
}
