//! Renosheet - reconcile renovation tasks into a tracking spreadsheet
//!
//! This library provides the core functionality for Renosheet, including:
//! - Transcript reading and candidate task extraction through Gemini
//! - Budget, drawing reference and lead extraction from task narratives
//! - Fuzzy matching of candidates against existing spreadsheet rows
//! - Cell-level reconciliation and `.xlsx` persistence
//! - CLI command parsing and execution
//!
//! # Example
//!
//! ```no_run
//! use renosheet::cli::run;
//!
//! fn main() {
//!     if let Err(e) = run() {
//!         eprintln!("Error: {}", e);
//!         std::process::exit(1);
//!     }
//! }
//! ```

pub mod cli;
pub mod config;
pub mod extract;
pub mod intake;
pub mod models;
pub mod reconcile;
pub mod utils;
pub mod workbook;
