//! Inclusive range test over partially ordered values.

use std::ops::RangeInclusive;

/// Tests whether a value lies within `[lower, upper]`.
///
/// Both bounds are inclusive. Values that do not compare with a bound
/// (such as `f64::NAN`) are outside the range, and a range whose lower bound
/// exceeds its upper bound contains nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeTester<V> {
    lower: V,
    upper: V,
}

impl<V: PartialOrd> RangeTester<V> {
    /// Creates a tester for `[lower, upper]`.
    pub fn new(lower: V, upper: V) -> Self {
        Self { lower, upper }
    }

    /// Lower bound (inclusive).
    pub fn lower(&self) -> &V {
        &self.lower
    }

    /// Upper bound (inclusive).
    pub fn upper(&self) -> &V {
        &self.upper
    }

    /// Returns true if `lower <= value <= upper`.
    pub fn test(&self, value: &V) -> bool {
        self.lower <= *value && *value <= self.upper
    }
}

impl<V: PartialOrd> From<RangeInclusive<V>> for RangeTester<V> {
    fn from(range: RangeInclusive<V>) -> Self {
        let (lower, upper) = range.into_inner();
        Self::new(lower, upper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_are_inclusive() {
        let range = RangeTester::new(0, 100);
        assert!(range.test(&0));
        assert!(range.test(&100));
        assert!(range.test(&50));
        assert!(!range.test(&-1));
        assert!(!range.test(&101));
    }

    #[test]
    fn test_inverted_bounds_match_nothing() {
        let range = RangeTester::new(10, 1);
        assert!(!range.test(&5));
        assert!(!range.test(&10));
        assert!(!range.test(&1));
    }

    #[test]
    fn test_nan_is_outside() {
        let range = RangeTester::new(0.0, 1.0);
        assert!(range.test(&0.5));
        assert!(!range.test(&f64::NAN));
        assert!(!RangeTester::new(f64::NAN, 1.0).test(&0.5));
    }

    #[test]
    fn test_from_range_inclusive() {
        let range = RangeTester::from("b".to_string()..="d".to_string());
        assert_eq!(range.lower(), "b");
        assert!(range.test(&"c".to_string()));
        assert!(!range.test(&"e".to_string()));
    }
}
