//! Spreadsheet adapter
//!
//! A value-like view of the target workbook, header discovery on top of it,
//! and the `.xlsx` store that loads it and persists it once at the end.

pub mod header;
pub mod model;
pub mod xlsx;

pub use header::*;
pub use model::*;
pub use xlsx::*;
