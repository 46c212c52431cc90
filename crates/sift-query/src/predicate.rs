//! Predicate nodes and their boolean composition.

use crate::error::QueryError;
use crate::property::Property;
use crate::range::RangeTester;
use crate::schema::Schema;
use std::any::Any;
use std::fmt;
use std::ops::{BitAnd, BitOr, BitXor, Not};
use std::sync::Arc;
use tracing::debug;

type Test<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

/// Kind of comparison a leaf predicate was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// Null-safe equality against an expected value.
    Equality,
    /// Inclusive range membership.
    Range,
}

enum Node<T> {
    Equality {
        property: Property,
        // `Option<V>` for the property's value type.
        expected: Arc<dyn Any + Send + Sync>,
        test: Test<T>,
    },
    Range {
        property: Property,
        test: Test<T>,
    },
    Custom(Test<T>),
    Not(Predicate<T>),
    And(Vec<Predicate<T>>),
    Or(Vec<Predicate<T>>),
    Xor(Vec<Predicate<T>>),
}

/// Reusable boolean test over a single record of type `T`.
///
/// Predicates are immutable and cheap to clone. Composition never modifies
/// its operands, so a base predicate can be shared by any number of derived
/// queries and evaluated concurrently from several threads.
///
/// # Example
///
/// ```rust
/// use sift_query::{Predicate, Schema};
///
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
/// let solvent = Predicate::within(&schema, "balance", 0i64, 100i64)?;
/// let free = Predicate::equals(&schema, "tier", "free".to_string())?;
/// let query = solvent.and([free]);
///
/// assert!(query.test(&Account { balance: 50, tier: "free".into() }));
/// assert!(!query.test(&Account { balance: 150, tier: "free".into() }));
/// # Ok::<(), sift_query::QueryError>(())
/// ```
pub struct Predicate<T>(Arc<Node<T>>);

impl<T: 'static> Predicate<T> {
    /// Builds a null-safe equality leaf.
    ///
    /// The test is true when the extracted value equals `expected`, or when
    /// both are absent. It is false when exactly one side is absent.
    ///
    /// # Errors
    ///
    /// Returns a resolution error ([`QueryError::UnknownProperty`] or
    /// [`QueryError::TypeMismatch`]) if `name` cannot be bound to `T` with
    /// value type `V`.
    pub fn equals<V>(
        schema: &Schema<T>,
        name: &str,
        expected: impl Into<Option<V>>,
    ) -> Result<Self, QueryError>
    where
        V: PartialEq + Send + Sync + 'static,
    {
        let accessor = schema.resolve::<V>(name)?;
        let property = accessor.property().clone();
        let expected: Arc<Option<V>> = Arc::new(expected.into());

        debug!(
            record = schema.record_name(),
            property = property.name(),
            "resolved equality predicate"
        );

        let wanted = Arc::clone(&expected);
        let test: Test<T> =
            Box::new(move |record: &T| accessor.get(record) == (*wanted).as_ref());

        Ok(Self::from_node(Node::Equality {
            property,
            expected,
            test,
        }))
    }

    /// Builds an inclusive range leaf: `lower <= value <= upper`.
    ///
    /// Records without a value for the property never match.
    ///
    /// # Errors
    ///
    /// - A resolution error if `name` cannot be bound to `T` with value type `V`
    /// - [`QueryError::NotOrderable`] if the schema did not declare the property ordered
    pub fn within<V>(schema: &Schema<T>, name: &str, lower: V, upper: V) -> Result<Self, QueryError>
    where
        V: PartialOrd + Send + Sync + 'static,
    {
        let accessor = schema.resolve::<V>(name)?;
        let property = accessor.property().clone();
        if !property.is_ordered() {
            return Err(QueryError::NotOrderable {
                record: schema.record_name(),
                name: name.to_string(),
                declared: property.declared_type().name(),
            });
        }

        debug!(
            record = schema.record_name(),
            property = property.name(),
            "resolved range predicate"
        );

        let range = RangeTester::new(lower, upper);
        let test: Test<T> = Box::new(move |record: &T| {
            accessor
                .get(record)
                .is_some_and(|value| range.test(value))
        });

        Ok(Self::from_node(Node::Range { property, test }))
    }
}

impl<T> Predicate<T> {
    fn from_node(node: Node<T>) -> Self {
        Self(Arc::new(node))
    }

    /// Wraps an arbitrary test function.
    pub fn from_fn<F>(test: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self::from_node(Node::Custom(Box::new(test)))
    }

    /// Evaluates the predicate against one record.
    pub fn test(&self, record: &T) -> bool {
        match &*self.0 {
            Node::Equality { test, .. } | Node::Range { test, .. } | Node::Custom(test) => {
                test(record)
            }
            Node::Not(inner) => !inner.test(record),
            Node::And(operands) => operands.iter().all(|p| p.test(record)),
            Node::Or(operands) => operands.iter().any(|p| p.test(record)),
            // Parity needs every operand, so no short-circuit here.
            Node::Xor(operands) => operands
                .iter()
                .fold(false, |odd, p| odd ^ p.test(record)),
        }
    }

    /// Logical negation.
    pub fn not(&self) -> Self {
        Self::from_node(Node::Not(self.clone()))
    }

    /// True iff `self` and every predicate in `others` are true.
    ///
    /// Operands are evaluated left to right, starting with `self`, and
    /// evaluation stops at the first false operand.
    pub fn and<I>(&self, others: I) -> Self
    where
        I: IntoIterator<Item = Predicate<T>>,
    {
        Self::from_node(Node::And(self.with_operands(others)))
    }

    /// True iff `self` or any predicate in `others` is true.
    ///
    /// Operands are evaluated left to right, starting with `self`, and
    /// evaluation stops at the first true operand.
    pub fn or<I>(&self, others: I) -> Self
    where
        I: IntoIterator<Item = Predicate<T>>,
    {
        Self::from_node(Node::Or(self.with_operands(others)))
    }

    /// True iff an odd number of `self` and `others` are true.
    ///
    /// Every operand is evaluated.
    pub fn xor<I>(&self, others: I) -> Self
    where
        I: IntoIterator<Item = Predicate<T>>,
    {
        Self::from_node(Node::Xor(self.with_operands(others)))
    }

    fn with_operands<I>(&self, others: I) -> Vec<Predicate<T>>
    where
        I: IntoIterator<Item = Predicate<T>>,
    {
        let mut operands = vec![self.clone()];
        operands.extend(others);
        operands
    }

    /// Comparison kind for leaf predicates; `None` for composed or custom ones.
    pub fn comparison(&self) -> Option<Comparison> {
        match &*self.0 {
            Node::Equality { .. } => Some(Comparison::Equality),
            Node::Range { .. } => Some(Comparison::Range),
            _ => None,
        }
    }

    /// Property a leaf predicate was built from.
    pub fn property(&self) -> Option<&Property> {
        match &*self.0 {
            Node::Equality { property, .. } | Node::Range { property, .. } => Some(property),
            _ => None,
        }
    }

    /// Equality leaves that every match must satisfy.
    ///
    /// These are the predicate itself when it is an equality leaf, plus the
    /// equality leaves reachable through nested `and` operands. A store may
    /// use any of them as an index hint.
    pub fn equality_probes(&self) -> Vec<EqualityProbe<'_>> {
        let mut probes = Vec::new();
        self.collect_probes(&mut probes);
        probes
    }

    fn collect_probes<'a>(&'a self, probes: &mut Vec<EqualityProbe<'a>>) {
        match &*self.0 {
            Node::Equality {
                property, expected, ..
            } => probes.push(EqualityProbe {
                property,
                expected: &**expected,
            }),
            Node::And(operands) => {
                for operand in operands {
                    operand.collect_probes(probes);
                }
            }
            _ => {}
        }
    }
}

impl<T> Clone for Predicate<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T> fmt::Debug for Predicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.0 {
            Node::Equality { property, .. } => {
                f.debug_tuple("Equals").field(&property.name()).finish()
            }
            Node::Range { property, .. } => {
                f.debug_tuple("Within").field(&property.name()).finish()
            }
            Node::Custom(_) => f.write_str("Custom"),
            Node::Not(inner) => f.debug_tuple("Not").field(inner).finish(),
            Node::And(operands) => f.debug_tuple("And").field(operands).finish(),
            Node::Or(operands) => f.debug_tuple("Or").field(operands).finish(),
            Node::Xor(operands) => f.debug_tuple("Xor").field(operands).finish(),
        }
    }
}

impl<T> Not for &Predicate<T> {
    type Output = Predicate<T>;

    fn not(self) -> Self::Output {
        Predicate::not(self)
    }
}

impl<T> BitAnd for Predicate<T> {
    type Output = Predicate<T>;

    fn bitand(self, rhs: Self) -> Self::Output {
        self.and([rhs])
    }
}

impl<T> BitOr for Predicate<T> {
    type Output = Predicate<T>;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.or([rhs])
    }
}

impl<T> BitXor for Predicate<T> {
    type Output = Predicate<T>;

    fn bitxor(self, rhs: Self) -> Self::Output {
        self.xor([rhs])
    }
}

/// An equality leaf offered to a store as an index hint.
#[derive(Clone, Copy)]
pub struct EqualityProbe<'a> {
    property: &'a Property,
    expected: &'a (dyn Any + Send + Sync),
}

impl<'a> EqualityProbe<'a> {
    /// Property the leaf compares.
    pub fn property(&self) -> &'a Property {
        self.property
    }

    /// Expected value, if it has type `V`.
    ///
    /// Returns `None` on a type mismatch and `Some(None)` when the leaf
    /// matches records holding no value.
    pub fn expected<V: 'static>(&self) -> Option<Option<&'a V>> {
        self.expected
            .downcast_ref::<Option<V>>()
            .map(Option::as_ref)
    }
}

impl fmt::Debug for EqualityProbe<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EqualityProbe")
            .field("property", self.property)
            .finish_non_exhaustive()
    }
}
