//! Typed, composable predicates over application records.
//!
//! This crate provides:
//! - `Schema` for declaring the queryable fields of a record type once
//! - `Accessor` for fields resolved by name and value type
//! - `Predicate` leaves for null-safe equality and inclusive ranges
//! - `not`, `and`, `or`, `xor` composition with left-to-right short-circuiting
//!
//! Predicates are pure functions of a single record. They know nothing about
//! where records are stored; `sift-store` applies them to store backends.
//!
//! Construction invariants:
//! - Field lookups happen when a predicate is built, never during evaluation
//! - Range predicates require a field declared as ordered
//! - Absent values never fall inside a range
//!
#![deny(missing_docs)]

/// Resolved field accessors.
pub mod accessor;
/// Error types for schema and predicate construction.
pub mod error;
/// Predicate nodes and composition operators.
pub mod predicate;
/// Property descriptors and type tags.
pub mod property;
/// Inclusive range tester.
pub mod range;
/// Schema declaration and field resolution.
pub mod schema;

pub use accessor::Accessor;
pub use error::QueryError;
pub use predicate::{Comparison, EqualityProbe, Predicate};
pub use property::{Property, TypeTag};
pub use range::RangeTester;
pub use schema::{Schema, SchemaBuilder};
