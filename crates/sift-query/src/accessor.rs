//! Resolved field accessors.

use crate::property::Property;
use std::fmt;
use std::sync::Arc;

/// Type-erased storage shape of a field getter inside a schema.
pub(crate) type Getter<T, V> = Arc<dyn for<'a> Fn(&'a T) -> Option<&'a V> + Send + Sync>;

/// Pins the higher-ranked signature of a getter closure.
pub(crate) fn getter<T, V, F>(get: F) -> Getter<T, V>
where
    F: for<'a> Fn(&'a T) -> Option<&'a V> + Send + Sync + 'static,
{
    Arc::new(get)
}

/// Extractor bound to one property of record type `T` with value type `V`.
///
/// Obtained from [`Schema::resolve`](crate::Schema::resolve). Resolution
/// checks the property name and declared type once; afterwards the accessor
/// can be applied to any `&T` without further lookups.
pub struct Accessor<T, V> {
    property: Property,
    getter: Getter<T, V>,
}

impl<T, V> Accessor<T, V> {
    pub(crate) fn new(property: Property, getter: Getter<T, V>) -> Self {
        Self { property, getter }
    }

    /// The property this accessor reads.
    pub fn property(&self) -> &Property {
        &self.property
    }

    /// Extracts the value, or `None` if the record holds no value for it.
    pub fn get<'a>(&self, record: &'a T) -> Option<&'a V> {
        (self.getter)(record)
    }
}

impl<T, V> Clone for Accessor<T, V> {
    fn clone(&self) -> Self {
        Self {
            property: self.property.clone(),
            getter: Arc::clone(&self.getter),
        }
    }
}

impl<T, V> fmt::Debug for Accessor<T, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Accessor")
            .field("property", &self.property)
            .finish_non_exhaustive()
    }
}
