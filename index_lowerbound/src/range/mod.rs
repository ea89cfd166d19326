//! Closed integer intervals.
//!
//! A [`Range`] is an immutable inclusive pair `[from, to]` of 64-bit signed
//! integers. The empty range is the sentinel [`Range::NOTHING`], which is the
//! identity of [`Range::union`] and absorbing for [`Range::intersect`] and for
//! arithmetic.
//!
//! Arithmetic that depends on the overflow policy lives on
//! [`RangeDomain`](domain::RangeDomain); everything here is policy-free.

pub mod domain;
pub mod width;

pub use domain::RangeDomain;
pub use width::{IntWidth, OverflowPolicy};

use serde::{Deserialize, Serialize};
use std::fmt;

/// An inclusive interval of `i64` values, or the empty interval.
///
/// # Example
/// ```
/// use index_lowerbound::range::Range;
///
/// let r = Range::create(-1, 10);
/// assert_eq!(r.from(), -1);
/// assert_eq!(r.to(), 10);
/// assert!(r.contains(0));
/// assert_eq!(r.to_string(), "[-1..10]");
/// ```
///
/// Deserialized pairs with `from > to` all read back as [`Range::NOTHING`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RangeBounds")]
pub struct Range {
    from: i64,
    to: i64,
}

#[derive(Deserialize)]
struct RangeBounds {
    from: i64,
    to: i64,
}

impl From<RangeBounds> for Range {
    fn from(bounds: RangeBounds) -> Self {
        Range::create_or_nothing(bounds.from, bounds.to)
    }
}

impl Range {
    /// The empty range.
    pub const NOTHING: Range = Range {
        from: i64::MAX,
        to: i64::MIN,
    };

    pub const LONG_EVERYTHING: Range = Range {
        from: i64::MIN,
        to: i64::MAX,
    };

    pub const INT_EVERYTHING: Range = Range {
        from: i32::MIN as i64,
        to: i32::MAX as i64,
    };

    pub const SHORT_EVERYTHING: Range = Range {
        from: i16::MIN as i64,
        to: i16::MAX as i64,
    };

    pub const CHAR_EVERYTHING: Range = Range {
        from: 0,
        to: u16::MAX as i64,
    };

    pub const BYTE_EVERYTHING: Range = Range {
        from: i8::MIN as i64,
        to: i8::MAX as i64,
    };

    /// Every 64-bit value.
    pub const EVERYTHING: Range = Range::LONG_EVERYTHING;

    /// Number of values in [`Range::INT_EVERYTHING`].
    pub const INT_WIDTH: i64 = 1 << 32;
    /// Number of values in [`Range::SHORT_EVERYTHING`].
    pub const SHORT_WIDTH: i64 = 1 << 16;
    /// Number of values in [`Range::CHAR_EVERYTHING`].
    pub const CHAR_WIDTH: i64 = 1 << 16;
    /// Number of values in [`Range::BYTE_EVERYTHING`].
    pub const BYTE_WIDTH: i64 = 1 << 8;

    /// Creates `[from, to]`.
    ///
    /// # Panics
    /// Panics if `from > to`. Use [`Range::try_create`] for a checked variant.
    pub fn create(from: i64, to: i64) -> Range {
        assert!(
            from <= to,
            "malformed range: from ({from}) must not exceed to ({to})"
        );
        Range { from, to }
    }

    /// Creates `[from, to]`, or `None` if `from > to`.
    pub fn try_create(from: i64, to: i64) -> Option<Range> {
        (from <= to).then_some(Range { from, to })
    }

    /// Creates `[from, to]`, or returns `fallback` if `from > to`.
    pub(crate) fn create_or_else(from: i64, to: i64, fallback: Range) -> Range {
        Range::try_create(from, to).unwrap_or(fallback)
    }

    pub(crate) fn create_or_nothing(from: i64, to: i64) -> Range {
        Range::create_or_else(from, to, Range::NOTHING)
    }

    /// The single-value range `[value, value]`.
    pub fn constant(value: i64) -> Range {
        Range {
            from: value,
            to: value,
        }
    }

    /// The smallest range containing every value, or `NOTHING` for no values.
    pub fn from_values<I: IntoIterator<Item = i64>>(values: I) -> Range {
        values
            .into_iter()
            .fold(Range::NOTHING, |acc, v| acc.union(&Range::constant(v)))
    }

    pub fn from(&self) -> i64 {
        self.from
    }

    pub fn to(&self) -> i64 {
        self.to
    }

    pub fn is_nothing(&self) -> bool {
        self.from > self.to
    }

    /// Whether this range covers every value of `width`.
    pub fn is_everything(&self, width: IntWidth) -> bool {
        self.contains_range(&width.everything())
    }

    pub fn is_constant(&self) -> bool {
        !self.is_nothing() && self.from == self.to
    }

    pub fn contains(&self, value: i64) -> bool {
        self.from <= value && value <= self.to
    }

    /// Whether every value of `other` is in `self`. `NOTHING` is contained in
    /// every range.
    pub fn contains_range(&self, other: &Range) -> bool {
        other.is_nothing() || (self.from <= other.from && other.to <= self.to)
    }

    /// Whether every value lies in `[lb, ub]`.
    pub fn is_within(&self, lb: i64, ub: i64) -> bool {
        debug_assert!(lb <= ub, "is_within called with lb ({lb}) > ub ({ub})");
        lb <= self.from && self.to <= ub
    }

    /// Whether every value lies in the middle half of the 64-bit range, so
    /// that a sum or difference of two such ranges cannot overflow.
    pub(crate) fn is_within_half_long(&self) -> bool {
        self.is_within(i64::MIN >> 1, i64::MAX >> 1)
    }

    pub(crate) fn is_within_int(&self) -> bool {
        self.is_within(i64::from(i32::MIN), i64::from(i32::MAX))
    }

    /// Whether the range holds more than `count` values.
    ///
    /// The check never overflows: ranges wider than `2^63` are compared by
    /// their bounds instead of their width.
    pub fn is_wider_than(&self, count: i64) -> bool {
        if self.is_nothing() {
            return false;
        }
        match self.to.checked_sub(self.from) {
            // width = span + 1 > count  <=>  span >= count
            Some(span) => span >= count,
            None => true,
        }
    }

    /// Smallest range containing both.
    pub fn union(&self, other: &Range) -> Range {
        if self.is_nothing() {
            return *other;
        }
        if other.is_nothing() {
            return *self;
        }
        Range {
            from: self.from.min(other.from),
            to: self.to.max(other.to),
        }
    }

    /// Values in both ranges, or `NOTHING` if they are disjoint.
    pub fn intersect(&self, other: &Range) -> Range {
        if self.is_nothing() || other.is_nothing() {
            return Range::NOTHING;
        }
        Range::create_or_nothing(self.from.max(other.from), self.to.min(other.to))
    }

    /// Range of `min(a, b)` for `a` in `self` and `b` in `other`.
    pub fn min_with(&self, other: &Range) -> Range {
        if self.is_nothing() || other.is_nothing() {
            return Range::NOTHING;
        }
        Range {
            from: self.from.min(other.from),
            to: self.to.min(other.to),
        }
    }

    /// Range of `max(a, b)` for `a` in `self` and `b` in `other`.
    pub fn max_with(&self, other: &Range) -> Range {
        if self.is_nothing() || other.is_nothing() {
            return Range::NOTHING;
        }
        Range {
            from: self.from.max(other.from),
            to: self.to.max(other.to),
        }
    }

    /// Values of `self` that can be strictly less than some value of `right`.
    ///
    /// ```text
    /// [-5..5].refine_less_than([-10..0])  = [-5..-1]
    /// [-5..5].refine_less_than([-10..10]) = [-5..5]
    /// ```
    pub fn refine_less_than(&self, right: &Range) -> Range {
        if self.is_nothing() || right.is_nothing() {
            return Range::NOTHING;
        }
        if right.to == i64::MIN {
            return Range::NOTHING;
        }
        if right.to <= self.to {
            return Range::create_or_nothing(self.from, right.to - 1);
        }
        *self
    }

    /// Values of `self` that can be at most some value of `right`.
    pub fn refine_less_than_or_equal_to(&self, right: &Range) -> Range {
        if self.is_nothing() || right.is_nothing() {
            return Range::NOTHING;
        }
        if right.to < self.to {
            return Range::create_or_nothing(self.from, right.to);
        }
        *self
    }

    /// Values of `self` that can be strictly greater than some value of `right`.
    ///
    /// ```text
    /// [-5..5].refine_greater_than([0..10])   = [1..5]
    /// [-5..5].refine_greater_than([-10..10]) = [-5..5]
    /// ```
    pub fn refine_greater_than(&self, right: &Range) -> Range {
        if self.is_nothing() || right.is_nothing() {
            return Range::NOTHING;
        }
        if right.from == i64::MAX {
            return Range::NOTHING;
        }
        if right.from >= self.from {
            return Range::create_or_nothing(right.from + 1, self.to);
        }
        *self
    }

    /// Values of `self` that can be at least some value of `right`.
    pub fn refine_greater_than_or_equal(&self, right: &Range) -> Range {
        if self.is_nothing() || right.is_nothing() {
            return Range::NOTHING;
        }
        if right.from > self.from {
            return Range::create_or_nothing(right.from, self.to);
        }
        *self
    }

    /// Values of `self` that can equal some value of `right`.
    pub fn refine_equal_to(&self, right: &Range) -> Range {
        self.intersect(right)
    }

    /// Values of `self` that can differ from some value of `right`.
    ///
    /// Only a point `right` removes anything, and only when it sits on one of
    /// this range's bounds.
    pub fn refine_not_equal_to(&self, right: &Range) -> Range {
        if self.is_nothing() || right.is_nothing() {
            return Range::NOTHING;
        }
        if right.is_constant() {
            if self.to == right.to {
                return Range::create_or_nothing(self.from, self.to.saturating_sub(1));
            }
            if self.from == right.from {
                return Range::create_or_nothing(self.from.saturating_add(1), self.to);
            }
        }
        *self
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_nothing() {
            write!(f, "[]")
        } else {
            write!(f, "[{}..{}]", self.from, self.to)
        }
    }
}
