//! Field extractors
//!
//! Stateless pattern rules that refine a candidate's budget, drawing
//! references and lead from its narrative text.

pub mod budget;
pub mod fields;

pub use budget::*;
pub use fields::*;
