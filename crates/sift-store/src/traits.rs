//! Storage backend traits.

use crate::error::StoreError;
use sift_query::EqualityProbe;

/// Lazily produced records; an `Err` item reports a backend failure.
pub type Records<'a, T> = Box<dyn Iterator<Item = Result<T, StoreError>> + 'a>;

/// A backend holding records of type `T`.
///
/// Backends know nothing about record shape. The query executor asks for a
/// full enumeration, or first offers the equality leaves of a predicate as
/// index hints.
pub trait Store<T> {
    /// Enumerates every record.
    ///
    /// Each call starts a fresh enumeration. Failing to start one is reported
    /// here; failures part-way through are reported as `Err` items.
    fn for_each(&self) -> Result<Records<'_, T>, StoreError>;

    /// Returns the records whose property equals the probe's expected value.
    ///
    /// `None` means the backend has no index able to answer the probe and the
    /// caller should scan instead. A backend may return a superset of the
    /// matching records, never a subset.
    fn lookup_by_property(
        &self,
        _probe: &EqualityProbe<'_>,
    ) -> Option<Result<Records<'_, T>, StoreError>> {
        None
    }
}
