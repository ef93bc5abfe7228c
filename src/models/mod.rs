// Core data models for renosheet
// Candidate task records and the static sheet schema they are routed by

pub mod category;
pub mod task;

pub use category::*;
pub use task::*;
