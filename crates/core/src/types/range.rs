//! Closed price intervals.
//!
//! The filter engine keeps two of these: a catalog-derived bounding range
//! and a user-adjustable sub-range that must stay inside it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A closed price interval `[lo, hi]`, bounds inclusive.
///
/// Callers are responsible for `lo <= hi`. A crossed range (possible when
/// clamping into disjoint bounds) is representable and matches nothing,
/// which is the behavior the filter engine wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    /// Lower bound, inclusive.
    pub lo: Decimal,
    /// Upper bound, inclusive.
    pub hi: Decimal,
}

impl PriceRange {
    /// Create a new range.
    #[must_use]
    pub const fn new(lo: Decimal, hi: Decimal) -> Self {
        Self { lo, hi }
    }

    /// Whether `amount` lies within the range, bounds inclusive.
    #[must_use]
    pub fn contains(&self, amount: Decimal) -> bool {
        self.lo <= amount && amount <= self.hi
    }

    /// Clamp each bound independently into `bounds`.
    ///
    /// `lo` can only move up, `hi` can only move down:
    /// `lo' = max(lo, bounds.lo)`, `hi' = min(hi, bounds.hi)`.
    #[must_use]
    pub fn clamped_into(&self, bounds: &Self) -> Self {
        Self {
            lo: self.lo.max(bounds.lo),
            hi: self.hi.min(bounds.hi),
        }
    }

    /// Whether the range has collapsed to a single point.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.lo == self.hi
    }
}

impl From<(Decimal, Decimal)> for PriceRange {
    fn from((lo, hi): (Decimal, Decimal)) -> Self {
        Self { lo, hi }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(lo: i64, hi: i64) -> PriceRange {
        PriceRange::new(Decimal::from(lo), Decimal::from(hi))
    }

    #[test]
    fn test_contains_is_inclusive() {
        let r = range(10, 100);
        assert!(r.contains(Decimal::from(10)));
        assert!(r.contains(Decimal::from(100)));
        assert!(r.contains(Decimal::from(55)));
        assert!(!r.contains(Decimal::from(9)));
        assert!(!r.contains(Decimal::from(101)));
    }

    #[test]
    fn test_clamp_moves_each_bound_independently() {
        // lo clamped up, hi unaffected since 80 <= 90
        let filter = range(20, 80);
        let clamped = filter.clamped_into(&range(30, 90));
        assert_eq!(clamped, range(30, 80));
    }

    #[test]
    fn test_clamp_is_idempotent() {
        let filter = range(20, 80);
        let bounds = range(30, 90);
        let once = filter.clamped_into(&bounds);
        let twice = once.clamped_into(&bounds);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_clamp_into_disjoint_bounds_crosses() {
        // A crossed result is representable and matches nothing.
        let filter = range(20, 30);
        let clamped = filter.clamped_into(&range(50, 100));
        assert_eq!(clamped, range(50, 30));
        assert!(!clamped.contains(Decimal::from(40)));
        assert!(!clamped.contains(Decimal::from(50)));
    }

    #[test]
    fn test_degenerate_range_matches_single_point() {
        let r = range(25, 25);
        assert!(r.is_degenerate());
        assert!(r.contains(Decimal::from(25)));
        assert!(!r.contains(Decimal::from(24)));
    }
}
