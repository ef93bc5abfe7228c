use serde::Serialize;

use crate::models::SheetSchema;
use crate::workbook::Sheet;

/// Header row of a category sheet and where its schema columns sit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderLayout {
    /// 0-based index of the header row
    pub row: usize,
    /// Schema columns found in the header, in schema order, with their position
    pub columns: Vec<(&'static str, usize)>,
}

impl HeaderLayout {
    pub fn position(&self, column: &str) -> Option<usize> {
        self.columns
            .iter()
            .find(|(name, _)| *name == column)
            .map(|(_, pos)| *pos)
    }

    /// Index of the first data row
    pub fn first_data_row(&self) -> usize {
        self.row + 1
    }
}

fn header_matches(cell: &str, column: &str) -> bool {
    cell.trim().eq_ignore_ascii_case(column)
}

/// Find the first row naming at least one of the schema's columns.
///
/// Only columns actually present are mapped; a repeated header name maps to
/// its leftmost occurrence.
pub fn locate_header(sheet: &Sheet, schema: &SheetSchema) -> Option<HeaderLayout> {
    sheet.rows().enumerate().find_map(|(row_idx, row)| {
        let columns: Vec<(&'static str, usize)> = schema
            .columns
            .iter()
            .filter_map(|column| {
                row.iter()
                    .position(|cell| header_matches(cell, column))
                    .map(|pos| (*column, pos))
            })
            .collect();

        if columns.is_empty() {
            None
        } else {
            Some(HeaderLayout { row: row_idx, columns })
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;

    #[test]
    fn test_locate_header_skips_title_rows() {
        let sheet = Sheet::from_rows(
            "GC",
            vec![
                vec!["Renovation tracker", ""],
                vec![],
                vec!["TASK", "LEAD", "BUDGET", "NOTES"],
                vec!["paint hallway", "Ann", "300", ""],
            ],
        );
        let layout = locate_header(&sheet, &Category::Gc.schema()).unwrap();
        assert_eq!(layout.row, 2);
        assert_eq!(layout.first_data_row(), 3);
        assert_eq!(layout.columns, vec![("BUDGET", 2), ("LEAD", 1)]);
        assert_eq!(layout.position("PROPOSED"), None);
    }

    #[test]
    fn test_locate_header_tolerates_case_and_padding() {
        let sheet = Sheet::from_rows("PLUMBING", vec![vec!["Task", " proposal "]]);
        let layout = locate_header(&sheet, &Category::Plumbing.schema()).unwrap();
        assert_eq!(layout.position("PROPOSAL"), Some(1));
    }

    #[test]
    fn test_locate_header_missing() {
        let sheet = Sheet::from_rows("PLUMBING", vec![vec!["TASK", "PROPOSED"]]);
        assert!(locate_header(&sheet, &Category::Plumbing.schema()).is_none());
        assert!(locate_header(&Sheet::new("GC"), &Category::Gc.schema()).is_none());
    }
}
