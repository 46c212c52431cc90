//! Explicit per-record-type registry of property descriptors and accessors.

use crate::accessor::{getter, Accessor, Getter};
use crate::error::QueryError;
use crate::property::{Property, TypeTag};
use regex::Regex;
use std::any::{type_name, Any};
use std::fmt;
use std::marker::PhantomData;
use std::sync::OnceLock;

fn identifier_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("invalid regex"))
}

struct Field {
    property: Property,
    // Holds a `Getter<T, V>` for the declared `V`.
    getter: Box<dyn Any + Send + Sync>,
}

/// Field declarations for record type `T`.
///
/// A schema is built once, typically at startup, and passed by reference
/// to predicate constructors. It replaces runtime reflection: every field
/// that can be queried is registered together with a closure that reads it.
///
/// # Example
///
/// ```rust
/// use sift_query::Schema;
///
/// struct Account {
///     balance: i64,
///     tier: String,
///     nickname: Option<String>,
/// }
///
/// let schema = Schema::<Account>::builder()
///     .ordered_field("balance", |a| &a.balance)
///     .field("tier", |a| &a.tier)
///     .optional_field("nickname", |a| a.nickname.as_ref())
///     .build()?;
///
/// assert_eq!(schema.properties().count(), 3);
/// # Ok::<(), sift_query::QueryError>(())
/// ```
pub struct Schema<T> {
    fields: Vec<Field>,
    _record: PhantomData<fn(&T)>,
}

impl<T: 'static> Schema<T> {
    /// Starts declaring a schema.
    pub fn builder() -> SchemaBuilder<T> {
        SchemaBuilder {
            fields: Vec::new(),
            error: None,
            _record: PhantomData,
        }
    }

    /// Name of the record type this schema describes.
    pub fn record_name(&self) -> &'static str {
        type_name::<T>()
    }

    /// Descriptors in declaration order.
    pub fn properties(&self) -> impl Iterator<Item = &Property> {
        self.fields.iter().map(|f| &f.property)
    }

    /// Looks up a descriptor by name.
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.find(name).map(|f| &f.property)
    }

    /// Binds property `name` with value type `V` to an accessor.
    ///
    /// # Errors
    ///
    /// - [`QueryError::UnknownProperty`] if no field has this name
    /// - [`QueryError::TypeMismatch`] if the field is declared with another type
    pub fn resolve<V: 'static>(&self, name: &str) -> Result<Accessor<T, V>, QueryError> {
        let field = self.find(name).ok_or_else(|| QueryError::UnknownProperty {
            record: self.record_name(),
            name: name.to_string(),
        })?;

        let getter = field
            .getter
            .downcast_ref::<Getter<T, V>>()
            .ok_or_else(|| QueryError::TypeMismatch {
                record: self.record_name(),
                name: name.to_string(),
                declared: field.property.declared_type().name(),
                requested: type_name::<V>(),
            })?;

        Ok(Accessor::new(field.property.clone(), getter.clone()))
    }

    fn find(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.property.name() == name)
    }
}

impl<T: 'static> fmt::Debug for Schema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("record", &self.record_name())
            .field("properties", &self.properties().collect::<Vec<_>>())
            .finish()
    }
}

/// Builder for [`Schema`].
///
/// Declaration problems (malformed or duplicate names) are collected and
/// reported by [`build`](SchemaBuilder::build).
pub struct SchemaBuilder<T> {
    fields: Vec<Field>,
    error: Option<String>,
    _record: PhantomData<fn(&T)>,
}

impl<T: 'static> SchemaBuilder<T> {
    /// Declares an always-present field supporting equality.
    pub fn field<V, F>(self, name: &str, get: F) -> Self
    where
        V: PartialEq + Send + Sync + 'static,
        F: for<'a> Fn(&'a T) -> &'a V + Send + Sync + 'static,
    {
        self.push(name, false, getter::<T, V, _>(move |record: &T| Some(get(record))))
    }

    /// Declares an always-present field supporting equality and ranges.
    pub fn ordered_field<V, F>(self, name: &str, get: F) -> Self
    where
        V: PartialOrd + Send + Sync + 'static,
        F: for<'a> Fn(&'a T) -> &'a V + Send + Sync + 'static,
    {
        self.push(name, true, getter::<T, V, _>(move |record: &T| Some(get(record))))
    }

    /// Declares a nullable field supporting equality.
    pub fn optional_field<V, F>(self, name: &str, get: F) -> Self
    where
        V: PartialEq + Send + Sync + 'static,
        F: for<'a> Fn(&'a T) -> Option<&'a V> + Send + Sync + 'static,
    {
        self.push(name, false, getter(get))
    }

    /// Declares a nullable field supporting equality and ranges.
    pub fn optional_ordered_field<V, F>(self, name: &str, get: F) -> Self
    where
        V: PartialOrd + Send + Sync + 'static,
        F: for<'a> Fn(&'a T) -> Option<&'a V> + Send + Sync + 'static,
    {
        self.push(name, true, getter(get))
    }

    /// Finishes the declaration.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::InvalidSchema`] if a name is not an identifier or
    /// is declared twice.
    pub fn build(self) -> Result<Schema<T>, QueryError> {
        if let Some(reason) = self.error {
            return Err(QueryError::InvalidSchema {
                record: type_name::<T>(),
                reason,
            });
        }
        Ok(Schema {
            fields: self.fields,
            _record: PhantomData,
        })
    }

    fn push<V: Send + Sync + 'static>(
        mut self,
        name: &str,
        ordered: bool,
        getter: Getter<T, V>,
    ) -> Self {
        if self.error.is_some() {
            return self;
        }
        if !identifier_pattern().is_match(name) {
            self.error = Some(format!("`{}` is not a valid property name", name));
            return self;
        }
        if self.fields.iter().any(|f| f.property.name() == name) {
            self.error = Some(format!("property `{}` declared twice", name));
            return self;
        }

        self.fields.push(Field {
            property: Property::new(name.to_string(), TypeTag::of::<V>(), ordered),
            getter: Box::new(getter),
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Account {
        balance: i64,
        tier: String,
        nickname: Option<String>,
    }

    fn account_schema() -> Schema<Account> {
        Schema::<Account>::builder()
            .ordered_field("balance", |a| &a.balance)
            .field("tier", |a| &a.tier)
            .optional_field("nickname", |a| a.nickname.as_ref())
            .build()
            .unwrap()
    }

    #[test]
    fn test_properties_keep_declaration_order() {
        let schema = account_schema();
        let names: Vec<&str> = schema.properties().map(|p| p.name()).collect();
        assert_eq!(names, vec!["balance", "tier", "nickname"]);
        assert!(schema.property("balance").unwrap().is_ordered());
        assert!(!schema.property("tier").unwrap().is_ordered());
    }

    #[test]
    fn test_resolve_reads_field() {
        let schema = account_schema();
        let account = Account {
            balance: 42,
            tier: "free".to_string(),
            nickname: None,
        };

        let balance = schema.resolve::<i64>("balance").unwrap();
        assert_eq!(balance.get(&account), Some(&42));

        let nickname = schema.resolve::<String>("nickname").unwrap();
        assert_eq!(nickname.get(&account), None);
    }

    #[test]
    fn test_resolve_unknown_name() {
        let err = account_schema().resolve::<i64>("credit").unwrap_err();
        assert!(matches!(err, QueryError::UnknownProperty { ref name, .. } if name == "credit"));
    }

    #[test]
    fn test_resolve_wrong_type() {
        let err = account_schema().resolve::<u32>("balance").unwrap_err();
        match err {
            QueryError::TypeMismatch {
                declared,
                requested,
                ..
            } => {
                assert_eq!(declared, "i64");
                assert_eq!(requested, "u32");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let result = Schema::<Account>::builder()
            .field("tier", |a| &a.tier)
            .field("tier", |a| &a.tier)
            .build();
        assert!(matches!(result, Err(QueryError::InvalidSchema { .. })));
    }

    #[test]
    fn test_malformed_name_rejected() {
        let empty = Schema::<Account>::builder().field("", |a| &a.tier).build();
        assert!(matches!(empty, Err(QueryError::InvalidSchema { .. })));

        let dashed = Schema::<Account>::builder()
            .field("account-tier", |a| &a.tier)
            .build();
        assert!(matches!(dashed, Err(QueryError::InvalidSchema { .. })));
    }
}
