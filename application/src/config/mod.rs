//! Application-level configuration.
//!
//! This module provides configuration types that control how use cases behave:
//!
//! - [`CheckParams`]: provider and storage deadlines for a check batch
//! - [`ExperimentPolicy`]: report thresholds for the experiment manager

pub mod check_params;
pub mod experiment_policy;

pub use check_params::CheckParams;
pub use experiment_policy::ExperimentPolicy;
