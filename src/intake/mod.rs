//! Candidate intake
//!
//! Everything upstream of reconciliation: reading transcripts, asking the
//! extraction service for tasks and parsing its keyed JSON answer.

pub mod candidates;
pub mod gemini;
pub mod transcript;

pub use candidates::*;
pub use gemini::*;
pub use transcript::*;
