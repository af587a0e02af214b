//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod clock;
pub mod experiment_repository;
pub mod history_store;
pub mod progress;
pub mod provider;
pub mod storage;
