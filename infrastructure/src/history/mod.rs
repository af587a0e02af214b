//! HistoryStore adapters

pub mod jsonl;
pub mod memory;

pub use jsonl::JsonlHistoryStore;
pub use memory::InMemoryHistoryStore;
