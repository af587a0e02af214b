//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod manage_experiment;
pub mod run_check;
pub mod visibility_summary;
