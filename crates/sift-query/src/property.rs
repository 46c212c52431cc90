//! Property descriptors: named, typed handles on record fields.

use std::any::{type_name, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Declared physical type of a property value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeTag {
    id: TypeId,
    name: &'static str,
}

impl TypeTag {
    /// Returns the tag for `V`.
    pub fn of<V: 'static>() -> Self {
        Self {
            id: TypeId::of::<V>(),
            name: type_name::<V>(),
        }
    }

    /// Returns true if this tag describes `V`.
    pub fn is<V: 'static>(&self) -> bool {
        self.id == TypeId::of::<V>()
    }

    /// Rust type name of the tagged type.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Identifies one field of a record type.
///
/// Descriptors are created by [`SchemaBuilder`](crate::SchemaBuilder) and never
/// change afterwards. Two descriptors are equal when they share name and
/// declared type; the ordered flag does not take part.
#[derive(Debug, Clone)]
pub struct Property {
    name: String,
    declared_type: TypeTag,
    ordered: bool,
}

impl Property {
    pub(crate) fn new(name: String, declared_type: TypeTag, ordered: bool) -> Self {
        Self {
            name,
            declared_type,
            ordered,
        }
    }

    /// Field name, unique within its schema.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared value type.
    pub fn declared_type(&self) -> TypeTag {
        self.declared_type
    }

    /// Whether the schema declared this property usable in range predicates.
    pub fn is_ordered(&self) -> bool {
        self.ordered
    }
}

impl PartialEq for Property {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.declared_type == other.declared_type
    }
}

impl Eq for Property {}

impl Hash for Property {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.declared_type.hash(state);
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.declared_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    // Helper
    fn hash_of(property: &Property) -> u64 {
        let mut hasher = DefaultHasher::new();
        property.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_type_tag_identity() {
        assert!(TypeTag::of::<i64>().is::<i64>());
        assert!(!TypeTag::of::<i64>().is::<i32>());
        assert!(TypeTag::of::<String>().name().contains("String"));
    }

    #[test]
    fn test_property_equality_uses_name_and_type() {
        let a = Property::new("balance".to_string(), TypeTag::of::<i64>(), true);
        let b = Property::new("balance".to_string(), TypeTag::of::<i64>(), true);
        let c = Property::new("balance".to_string(), TypeTag::of::<u64>(), true);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.to_string(), "balance: i64");

        // Same field declared without ordering is still the same property
        let unordered = Property::new("balance".to_string(), TypeTag::of::<i64>(), false);
        assert_eq!(a, unordered);
        assert_eq!(hash_of(&a), hash_of(&unordered));
    }
}
