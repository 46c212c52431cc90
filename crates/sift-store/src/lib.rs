//! Pluggable record stores and query execution for `sift-query` predicates.
//!
//! This crate provides:
//! - The `Store` trait: full enumeration plus an optional equality index hint
//! - `MemoryStore`, a lock-guarded in-memory backend with hash indexes
//! - `JsonlStore`, a newline-delimited JSON file backend
//! - `execute`, which streams the records matching a predicate
//!
//! Backends own persistence, concurrency and retry policy. The executor
//! only filters what a backend yields and passes backend errors through
//! unchanged.

#![deny(missing_docs)]

/// Error types for store operations.
pub mod error;
/// Query executor.
pub mod executor;
/// JSON-lines file backend.
pub mod jsonl;
/// In-memory backend.
pub mod memory;
/// Storage backend traits.
pub mod traits;

pub use error::StoreError;
pub use executor::{execute, execute_with, ExecOptions, Matches};
pub use jsonl::{JsonlRecords, JsonlStore, ReadMode, WriteOptions};
pub use memory::MemoryStore;
pub use traits::{Records, Store};
