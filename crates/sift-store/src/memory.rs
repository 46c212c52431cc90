//! In-memory store with optional equality indexes.

use crate::error::StoreError;
use crate::traits::{Records, Store};
use sift_query::{Accessor, EqualityProbe, Property, QueryError, Schema};
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::{PoisonError, RwLock};

trait EqualityIndex<T>: Send + Sync {
    fn property(&self) -> &Property;
    fn insert(&mut self, record: &T, position: usize);
    /// `None` when the probe's value type does not match the index.
    fn positions(&self, probe: &EqualityProbe<'_>) -> Option<&[usize]>;
}

struct HashIndex<T, V> {
    accessor: Accessor<T, V>,
    positions: HashMap<Option<V>, Vec<usize>>,
}

impl<T, V> EqualityIndex<T> for HashIndex<T, V>
where
    V: Hash + Eq + Clone + Send + Sync + 'static,
{
    fn property(&self) -> &Property {
        self.accessor.property()
    }

    fn insert(&mut self, record: &T, position: usize) {
        let key = self.accessor.get(record).cloned();
        self.positions.entry(key).or_default().push(position);
    }

    fn positions(&self, probe: &EqualityProbe<'_>) -> Option<&[usize]> {
        let expected = probe.expected::<V>()?;
        let key = expected.cloned();
        Some(self.positions.get(&key).map_or(&[][..], Vec::as_slice))
    }
}

struct Inner<T> {
    records: Vec<T>,
    indexes: Vec<Box<dyn EqualityIndex<T>>>,
}

/// Records kept in a vector behind a read-write lock.
///
/// Enumeration clones a snapshot of the records under the read lock, so a
/// running query never observes concurrent inserts. Records come back in
/// insertion order.
///
/// # Example
///
/// ```rust
/// use sift_query::{Predicate, Schema};
/// use sift_store::{execute, MemoryStore};
///
/// #[derive(Clone)]
/// struct Account {
///     balance: i64,
///     tier: String,
/// }
///
/// let schema = Schema::<Account>::builder()
///     .ordered_field("balance", |a| &a.balance)
///     .field("tier", |a| &a.tier)
///     .build()?;
///
/// let store = MemoryStore::new().with_index::<String>(&schema, "tier")?;
/// store.insert(Account { balance: 50, tier: "free".into() })?;
/// store.insert(Account { balance: 80, tier: "pro".into() })?;
///
/// let free = Predicate::equals(&schema, "tier", "free".to_string())?;
/// let matches: Vec<Account> = execute(&store, &free)?.collect::<Result<_, _>>()?;
/// assert_eq!(matches.len(), 1);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct MemoryStore<T> {
    inner: RwLock<Inner<T>>,
}

impl<T> MemoryStore<T> {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                records: Vec::new(),
                indexes: Vec::new(),
            }),
        }
    }

    /// Adds a hash index on property `name` with value type `V`.
    ///
    /// Existing records are indexed immediately and later inserts keep the
    /// index current. Equality predicates on the property, including ones
    /// expecting an absent value, can then be answered without a scan.
    ///
    /// # Errors
    ///
    /// Returns the resolution error if `name` cannot be bound to `T` with `V`.
    pub fn with_index<V>(mut self, schema: &Schema<T>, name: &str) -> Result<Self, QueryError>
    where
        T: 'static,
        V: Hash + Eq + Clone + Send + Sync + 'static,
    {
        let mut index = HashIndex {
            accessor: schema.resolve::<V>(name)?,
            positions: HashMap::new(),
        };

        let inner = self
            .inner
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        for (position, record) in inner.records.iter().enumerate() {
            index.insert(record, position);
        }
        inner.indexes.push(Box::new(index));
        Ok(self)
    }

    /// Appends a record.
    pub fn insert(&self, record: T) -> Result<(), StoreError> {
        let mut inner = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        let position = inner.records.len();
        for index in inner.indexes.iter_mut() {
            index.insert(&record, position);
        }
        inner.records.push(record);
        Ok(())
    }

    /// Appends every record from `records`.
    pub fn extend<I>(&self, records: I) -> Result<(), StoreError>
    where
        I: IntoIterator<Item = T>,
    {
        records.into_iter().try_for_each(|record| self.insert(record))
    }

    /// Number of stored records.
    pub fn len(&self) -> Result<usize, StoreError> {
        let inner = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        Ok(inner.records.len())
    }

    /// Returns true if the store holds no records.
    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

impl<T> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for MemoryStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct("MemoryStore");
        match self.inner.read() {
            Ok(inner) => out
                .field("records", &inner.records.len())
                .field(
                    "indexes",
                    &inner
                        .indexes
                        .iter()
                        .map(|i| i.property().name())
                        .collect::<Vec<_>>(),
                ),
            Err(_) => out.field("poisoned", &true),
        };
        out.finish()
    }
}

impl<T> Store<T> for MemoryStore<T>
where
    T: Clone + 'static,
{
    fn for_each(&self) -> Result<Records<'_, T>, StoreError> {
        let inner = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        let snapshot = inner.records.clone();
        Ok(Box::new(snapshot.into_iter().map(Ok)))
    }

    fn lookup_by_property(
        &self,
        probe: &EqualityProbe<'_>,
    ) -> Option<Result<Records<'_, T>, StoreError>> {
        let inner = match self.inner.read() {
            Ok(inner) => inner,
            Err(_) => return Some(Err(StoreError::Poisoned)),
        };

        let wanted = probe.property();
        let positions = inner
            .indexes
            .iter()
            .filter(|index| index.property() == wanted)
            .find_map(|index| index.positions(probe))?;

        let matches: Vec<T> = positions
            .iter()
            .filter_map(|&position| inner.records.get(position).cloned())
            .collect();
        Some(Ok(Box::new(matches.into_iter().map(Ok))))
    }
}
