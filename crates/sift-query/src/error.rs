//! Error types for schema and predicate construction.

use thiserror::Error;

/// Errors raised while declaring a schema or building a predicate.
///
/// Every variant is produced at construction time; evaluating a predicate
/// never fails.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// The record type declares no property with this name.
    #[error("{record} has no property `{name}`")]
    UnknownProperty {
        /// Record type name.
        record: &'static str,
        /// Requested property name.
        name: String,
    },
    /// The property exists but is declared with a different value type.
    #[error("property `{name}` of {record} is declared as {declared}, not {requested}")]
    TypeMismatch {
        /// Record type name.
        record: &'static str,
        /// Property name.
        name: String,
        /// Type the schema declares.
        declared: &'static str,
        /// Type the caller asked for.
        requested: &'static str,
    },
    /// A range was requested over a property that is not declared ordered.
    #[error("property `{name}` of {record} ({declared}) does not support range comparison")]
    NotOrderable {
        /// Record type name.
        record: &'static str,
        /// Property name.
        name: String,
        /// Declared value type.
        declared: &'static str,
    },
    /// The schema declaration itself is malformed.
    #[error("invalid schema for {record}: {reason}")]
    InvalidSchema {
        /// Record type name.
        record: &'static str,
        /// What is wrong with the declaration.
        reason: String,
    },
}

impl QueryError {
    /// Returns true if the error means a property could not be bound to the record type.
    pub fn is_resolution(&self) -> bool {
        matches!(
            self,
            QueryError::UnknownProperty { .. } | QueryError::TypeMismatch { .. }
        )
    }
}
