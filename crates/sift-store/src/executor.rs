//! Query execution: applies a predicate to the records of a store.

use crate::error::StoreError;
use crate::traits::{Records, Store};
use sift_query::Predicate;
use std::fmt;
use std::iter::FusedIterator;
use tracing::debug;

/// Options for a single query execution.
#[derive(Debug, Clone)]
pub struct ExecOptions {
    /// Whether to ask the store for an index lookup before scanning (default: true).
    pub use_index: bool,
    /// Stop after this many matches (default: unlimited).
    pub limit: Option<usize>,
}

impl Default for ExecOptions {
    fn default() -> Self {
        Self {
            use_index: true,
            limit: None,
        }
    }
}

/// Runs `predicate` against `store` with default options.
///
/// See [`execute_with`].
pub fn execute<'a, T, S>(
    store: &'a S,
    predicate: &'a Predicate<T>,
) -> Result<Matches<'a, T>, StoreError>
where
    S: Store<T> + ?Sized,
{
    execute_with(store, predicate, ExecOptions::default())
}

/// Runs `predicate` against `store`.
///
/// The returned iterator is lazy: records are pulled from the store only as
/// matches are requested. Each call starts a new enumeration. When the
/// predicate pins an equality leaf and the store can answer it from an index,
/// the index supplies the candidates; the full predicate is applied either
/// way. Match order is whatever order the store enumerates in.
///
/// # Errors
///
/// Returns the store's [`StoreError`] unchanged if the enumeration cannot be
/// started. Failures during enumeration are yielded as `Err` items, after
/// which the iterator ends. Nothing is retried.
pub fn execute_with<'a, T, S>(
    store: &'a S,
    predicate: &'a Predicate<T>,
    options: ExecOptions,
) -> Result<Matches<'a, T>, StoreError>
where
    S: Store<T> + ?Sized,
{
    let mut candidates = None;
    if options.use_index {
        for probe in predicate.equality_probes() {
            if let Some(records) = store.lookup_by_property(&probe) {
                debug!(property = probe.property().name(), "query using index lookup");
                candidates = Some(records?);
                break;
            }
        }
    }

    let records = match candidates {
        Some(records) => records,
        None => {
            debug!(predicate = ?predicate, "query using full scan");
            store.for_each()?
        }
    };

    Ok(Matches {
        records,
        predicate,
        remaining: options.limit,
        scanned: 0,
        matched: 0,
        done: false,
    })
}

/// Lazy sequence of records matching a predicate.
pub struct Matches<'a, T> {
    records: Records<'a, T>,
    predicate: &'a Predicate<T>,
    remaining: Option<usize>,
    scanned: u64,
    matched: u64,
    done: bool,
}

impl<T> Matches<'_, T> {
    /// Records pulled from the store so far.
    pub fn scanned(&self) -> u64 {
        self.scanned
    }

    /// Matches yielded so far.
    pub fn matched(&self) -> u64 {
        self.matched
    }

    fn finish(&mut self) {
        self.done = true;
        debug!(
            scanned = self.scanned,
            matched = self.matched,
            "query finished"
        );
    }
}

impl<T> Iterator for Matches<'_, T> {
    type Item = Result<T, StoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if self.remaining == Some(0) {
            self.finish();
            return None;
        }

        loop {
            match self.records.next() {
                None => {
                    self.finish();
                    return None;
                }
                Some(Err(e)) => {
                    self.done = true;
                    debug!(error = %e, scanned = self.scanned, "query aborted by store");
                    return Some(Err(e));
                }
                Some(Ok(record)) => {
                    self.scanned += 1;
                    if !self.predicate.test(&record) {
                        continue; // skip non-matching
                    }
                    self.matched += 1;
                    if let Some(remaining) = self.remaining.as_mut() {
                        *remaining -= 1;
                    }
                    return Some(Ok(record));
                }
            }
        }
    }
}

impl<T> FusedIterator for Matches<'_, T> {}

impl<T> fmt::Debug for Matches<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Matches")
            .field("predicate", self.predicate)
            .field("scanned", &self.scanned)
            .field("matched", &self.matched)
            .field("done", &self.done)
            .finish()
    }
}
