//! Range arithmetic under an explicit overflow policy.
//!
//! Every operation returns a range containing all results of applying the
//! operator to a value of each operand range. Operations that involve
//! `NOTHING` return `NOTHING`. Results that cannot be computed precisely give
//! up to [`Range::EVERYTHING`].
//!
//! Sums, differences and products are evaluated on `i64` when both operands
//! are small enough that no bound can overflow, and on
//! [`num_bigint::BigInt`] otherwise. The big result is then brought back to
//! 64 bits according to the [`OverflowPolicy`].

use super::{IntWidth, OverflowPolicy, Range};
use crate::diagnostics::emit_range_gave_up;
use num_bigint::{BigInt, Sign};
use num_traits::{One, ToPrimitive};

/// Interval arithmetic for one analysis run.
///
/// # Example
/// ```
/// use index_lowerbound::range::{IntWidth, OverflowPolicy, Range, RangeDomain};
///
/// let wrap = RangeDomain::new(OverflowPolicy::Wrap);
/// let sum = wrap.plus(&Range::create(0, i64::from(i32::MAX)), &Range::constant(1));
/// assert_eq!(wrap.narrow(&sum, IntWidth::Int), Range::INT_EVERYTHING);
///
/// let saturate = RangeDomain::new(OverflowPolicy::Saturate);
/// let sum = saturate.plus(&Range::create(0, i64::from(i32::MAX)), &Range::constant(1));
/// assert_eq!(
///     saturate.narrow(&sum, IntWidth::Int),
///     Range::create(1, i64::from(i32::MAX))
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RangeDomain {
    overflow: OverflowPolicy,
}

impl RangeDomain {
    pub fn new(overflow: OverflowPolicy) -> Self {
        Self { overflow }
    }

    pub fn overflow(&self) -> OverflowPolicy {
        self.overflow
    }

    /// Brings a big-integer interval back to 64 bits.
    fn from_big(&self, from: BigInt, to: BigInt, operation: &'static str) -> Range {
        match self.overflow {
            OverflowPolicy::Saturate => Range::create(saturate_i64(&from), saturate_i64(&to)),
            OverflowPolicy::Wrap => {
                let count = &to - &from + BigInt::one();
                if count > long_value_count() {
                    return give_up(operation);
                }
                Range::try_create(wrap_i64(&from), wrap_i64(&to))
                    .unwrap_or_else(|| give_up(operation))
            }
        }
    }

    pub fn plus(&self, left: &Range, right: &Range) -> Range {
        if left.is_nothing() || right.is_nothing() {
            return Range::NOTHING;
        }
        if left.is_within_half_long() && right.is_within_half_long() {
            return Range::create(left.from() + right.from(), left.to() + right.to());
        }
        self.from_big(
            BigInt::from(left.from()) + right.from(),
            BigInt::from(left.to()) + right.to(),
            "+",
        )
    }

    pub fn minus(&self, left: &Range, right: &Range) -> Range {
        if left.is_nothing() || right.is_nothing() {
            return Range::NOTHING;
        }
        if left.is_within_half_long() && right.is_within_half_long() {
            return Range::create(left.from() - right.to(), left.to() - right.from());
        }
        self.from_big(
            BigInt::from(left.from()) - right.to(),
            BigInt::from(left.to()) - right.from(),
            "-",
        )
    }

    pub fn times(&self, left: &Range, right: &Range) -> Range {
        if left.is_nothing() || right.is_nothing() {
            return Range::NOTHING;
        }
        let corners = [
            (left.from(), right.from()),
            (left.from(), right.to()),
            (left.to(), right.from()),
            (left.to(), right.to()),
        ];
        if left.is_within_int() && right.is_within_int() {
            return Range::from_values(corners.iter().map(|&(a, b)| a * b));
        }
        let products: Vec<BigInt> = corners
            .iter()
            .map(|&(a, b)| BigInt::from(a) * b)
            .collect();
        let (Some(min), Some(max)) = (products.iter().min(), products.iter().max()) else {
            return Range::NOTHING;
        };
        self.from_big(min.clone(), max.clone(), "*")
    }

    /// Integer division, truncating toward zero.
    ///
    /// A divisor range that is exactly `[0..0]` has no defined quotient, so the
    /// result is `NOTHING`.
    pub fn divide(&self, left: &Range, right: &Range) -> Range {
        if left.is_nothing() || right.is_nothing() {
            return Range::NOTHING;
        }
        if right.from() == 0 && right.to() == 0 {
            return Range::NOTHING;
        }
        let (from, to) = (left.from(), left.to());
        let (rfrom, rto) = (right.from(), right.to());

        // i64::MIN / -1 is the only quotient that overflows.
        if from == i64::MIN && right.contains(-1) {
            if from != to {
                return Range::EVERYTHING;
            }
            if rfrom != rto {
                return Range::create(i64::MIN, i64::MIN / -2);
            }
            return Range::constant(i64::MIN);
        }

        let (result_from, result_to) = if from > 0 {
            if rfrom >= 0 {
                (from / rto.max(1), to / rfrom.max(1))
            } else if rto <= 0 {
                (to / rto.min(-1), from / rfrom.min(-1))
            } else {
                (-to, to)
            }
        } else if to < 0 {
            if rfrom >= 0 {
                (from / rfrom.max(1), to / rto.max(1))
            } else if rto <= 0 {
                (to / rfrom.min(-1), from / rto.min(-1))
            } else {
                (from, -from)
            }
        } else if rfrom >= 0 {
            (from / rfrom.max(1), to / rfrom.max(1))
        } else if rto <= 0 {
            (to / rto.min(-1), from / rto.min(-1))
        } else {
            (from.min(-to), (-from).max(to))
        };
        Range::create(result_from, result_to)
    }

    /// Remainder with the sign of the dividend.
    ///
    /// The result may be wider than the tightest range.
    pub fn remainder(&self, left: &Range, right: &Range) -> Range {
        if left.is_nothing() || right.is_nothing() {
            return Range::NOTHING;
        }
        if right.from() == 0 && right.to() == 0 {
            return Range::NOTHING;
        }
        let (from, to) = (left.from(), left.to());

        if right.from() == i64::MIN {
            // x % i64::MIN is x, except i64::MIN % i64::MIN == 0.
            let mut range = if from == i64::MIN {
                if to == i64::MIN {
                    Range::constant(0)
                } else {
                    Range::create(from + 1, to).union(&Range::constant(0))
                }
            } else {
                *left
            };
            if right.to() > i64::MIN {
                let rest = self.remainder(left, &Range::create(right.from() + 1, right.to()));
                range = range.union(&rest);
            }
            return range;
        }

        // Dividend bound: {0} together with the dividend minus i64::MIN.
        let dividend_bound = Range::create(from.max(i64::MIN + 1), to.max(i64::MIN + 1))
            .union(&Range::constant(0));
        // Divisor bound: |result| < max |divisor|.
        let max_abs = right.from().abs().max(right.to().abs());
        let divisor_bound = Range::create(-max_abs + 1, max_abs - 1);
        dividend_bound.intersect(&divisor_bound)
    }

    /// Left shift of a `width`-typed value.
    ///
    /// Shift counts outside `[0, width.max_shift()]` are masked by the host,
    /// so they give up.
    pub fn shift_left(&self, left: &Range, right: &Range, width: IntWidth) -> Range {
        if left.is_nothing() || right.is_nothing() {
            return Range::NOTHING;
        }
        if !right.is_within(0, width.max_shift()) {
            return give_up("<<");
        }
        let (from, to) = (left.from(), left.to());
        let from_count = shift_count(if from >= 0 { right.from() } else { right.to() });
        let to_count = shift_count(if to >= 0 { right.to() } else { right.from() });
        if left.is_within_int() && right.is_within(0, 31) {
            return Range::create(from << from_count, to << to_count);
        }
        self.from_big(
            BigInt::from(from) << from_count,
            BigInt::from(to) << to_count,
            "<<",
        )
    }

    /// Arithmetic right shift of a `width`-typed value.
    pub fn signed_shift_right(&self, left: &Range, right: &Range, width: IntWidth) -> Range {
        if left.is_nothing() || right.is_nothing() {
            return Range::NOTHING;
        }
        let operand_fits = width == IntWidth::Long || left.is_within_int();
        if !operand_fits || !right.is_within(0, width.max_shift()) {
            return give_up(">>");
        }
        let (from, to) = (left.from(), left.to());
        let from_count = shift_count(if from >= 0 { right.to() } else { right.from() });
        let to_count = shift_count(if to >= 0 { right.from() } else { right.to() });
        Range::create(from >> from_count, to >> to_count)
    }

    /// Logical right shift; precise only for a non-negative left operand.
    pub fn unsigned_shift_right(&self, left: &Range, right: &Range, width: IntWidth) -> Range {
        if left.is_nothing() || right.is_nothing() {
            return Range::NOTHING;
        }
        if left.from() >= 0 {
            return self.signed_shift_right(left, right, width);
        }
        give_up(">>>")
    }

    /// Bitwise and; precise only when one operand is a single mask value.
    pub fn bitwise_and(&self, left: &Range, right: &Range) -> Range {
        if left.is_nothing() || right.is_nothing() {
            return Range::NOTHING;
        }
        let (mask, variable) = if right.is_constant() {
            (right.from(), left)
        } else if left.is_constant() {
            (left.from(), right)
        } else {
            return give_up("&");
        };

        if mask >= 0 {
            // Result is non-negative and at most the mask.
            if variable.from() >= 0 {
                Range::create(0, mask.min(variable.to()))
            } else if variable.to() < 0 {
                Range::create(0, mask.min(without_sign_bit(variable.to())))
            } else {
                Range::create(0, mask)
            }
        } else if variable.from() >= 0 {
            Range::create(0, without_sign_bit(mask).min(variable.to()))
        } else if variable.to() < 0 {
            Range::create(i64::MIN, mask.min(variable.to()))
        } else {
            Range::create(i64::MIN, without_sign_bit(mask).min(variable.to()))
        }
    }

    pub fn bitwise_or(&self, left: &Range, right: &Range) -> Range {
        if left.is_nothing() || right.is_nothing() {
            return Range::NOTHING;
        }
        give_up("|")
    }

    pub fn bitwise_xor(&self, left: &Range, right: &Range) -> Range {
        if left.is_nothing() || right.is_nothing() {
            return Range::NOTHING;
        }
        give_up("^")
    }

    pub fn unary_plus(&self, operand: &Range) -> Range {
        *operand
    }

    pub fn unary_minus(&self, operand: &Range) -> Range {
        if operand.is_nothing() {
            return Range::NOTHING;
        }
        if operand.from() == i64::MIN && operand.to() != i64::MIN {
            return give_up("unary -");
        }
        Range::create(operand.to().wrapping_neg(), operand.from().wrapping_neg())
    }

    pub fn bitwise_complement(&self, operand: &Range) -> Range {
        if operand.is_nothing() {
            return Range::NOTHING;
        }
        Range::create(!operand.to(), !operand.from())
    }

    /// Converts a range to the values a `width`-typed variable can hold.
    ///
    /// Ranges already inside the width are returned unchanged. Otherwise the
    /// bounds are clipped (`Saturate`) or reinterpreted in two's complement
    /// (`Wrap`), giving up to the whole width when the wrapped bounds cross.
    pub fn narrow(&self, range: &Range, width: IntWidth) -> Range {
        let everything = width.everything();
        if range.is_nothing() || everything.contains_range(range) {
            return *range;
        }
        match self.overflow {
            OverflowPolicy::Saturate => Range::create(
                range.from().clamp(everything.from(), everything.to()),
                range.to().clamp(everything.from(), everything.to()),
            ),
            OverflowPolicy::Wrap => {
                let count = match width {
                    IntWidth::Byte => Range::BYTE_WIDTH,
                    IntWidth::Short => Range::SHORT_WIDTH,
                    IntWidth::Char => Range::CHAR_WIDTH,
                    IntWidth::Int => Range::INT_WIDTH,
                    // Every i64 range is inside LONG_EVERYTHING.
                    IntWidth::Long => return *range,
                };
                if range.is_wider_than(count) {
                    return everything;
                }
                Range::create_or_else(width.wrap(range.from()), width.wrap(range.to()), everything)
            }
        }
    }
}

fn give_up(operation: &'static str) -> Range {
    emit_range_gave_up(operation);
    Range::EVERYTHING
}

/// Shift counts are checked to be in `[0, 63]` before this is called.
fn shift_count(count: i64) -> u32 {
    count.unsigned_abs() as u32
}

fn without_sign_bit(value: i64) -> i64 {
    value & i64::MAX
}

fn long_value_count() -> BigInt {
    BigInt::one() << 64
}

/// Low 64 bits of `value`, read as two's complement.
fn wrap_i64(value: &BigInt) -> i64 {
    let low = value.magnitude().iter_u64_digits().next().unwrap_or(0) as i64;
    if value.sign() == Sign::Minus {
        low.wrapping_neg()
    } else {
        low
    }
}

fn saturate_i64(value: &BigInt) -> i64 {
    value.to_i64().unwrap_or(if value.sign() == Sign::Minus {
        i64::MIN
    } else {
        i64::MAX
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrap() -> RangeDomain {
        RangeDomain::new(OverflowPolicy::Wrap)
    }

    fn saturate() -> RangeDomain {
        RangeDomain::new(OverflowPolicy::Saturate)
    }

    fn r(from: i64, to: i64) -> Range {
        Range::create(from, to)
    }

    #[test]
    fn test_default_policy_is_wrap() {
        assert_eq!(RangeDomain::default().overflow(), OverflowPolicy::Wrap);
    }

    #[test]
    fn test_plus_minus_fast_path() {
        assert_eq!(wrap().plus(&r(1, 5), &r(-2, 3)), r(-1, 8));
        assert_eq!(wrap().minus(&r(1, 5), &r(-2, 3)), r(-2, 7));
        assert!(wrap().plus(&Range::NOTHING, &r(0, 1)).is_nothing());
    }

    #[test]
    fn test_plus_overflow_wraps_or_saturates() {
        let max = Range::constant(i64::MAX);
        let one = Range::constant(1);
        assert_eq!(wrap().plus(&max, &one), Range::constant(i64::MIN));
        assert_eq!(saturate().plus(&max, &one), Range::constant(i64::MAX));

        // Crossing the boundary with a non-point range wraps into inverted bounds.
        assert_eq!(wrap().plus(&r(0, i64::MAX), &one), Range::EVERYTHING);
        assert_eq!(saturate().plus(&r(0, i64::MAX), &one), r(1, i64::MAX));
    }

    #[test]
    fn test_minus_wider_than_long_is_everything() {
        let result = wrap().minus(&Range::EVERYTHING, &r(-1, 1));
        assert_eq!(result, Range::EVERYTHING);
    }

    #[test]
    fn test_times() {
        assert_eq!(wrap().times(&r(-2, 3), &r(4, 5)), r(-10, 15));
        assert_eq!(wrap().times(&r(-2, -1), &r(-3, 4)), r(-8, 6));
        let big = r(1, 1 << 40);
        assert_eq!(wrap().times(&big, &r(2, 2)), r(2, 1 << 41));
        assert_eq!(wrap().times(&big, &big), Range::EVERYTHING);
        assert_eq!(saturate().times(&big, &big), r(1, i64::MAX));
    }

    #[test]
    fn test_divide_by_point_zero_is_nothing() {
        assert!(wrap().divide(&r(1, 10), &Range::constant(0)).is_nothing());
        assert!(wrap().remainder(&r(1, 10), &Range::constant(0)).is_nothing());
    }

    #[test]
    fn test_divide_sign_cases() {
        assert_eq!(wrap().divide(&r(10, 20), &r(2, 5)), r(2, 10));
        assert_eq!(wrap().divide(&r(10, 20), &r(-5, -2)), r(-10, -2));
        assert_eq!(wrap().divide(&r(10, 20), &r(-1, 1)), r(-20, 20));
        assert_eq!(wrap().divide(&r(-20, -10), &r(2, 5)), r(-10, -2));
        assert_eq!(wrap().divide(&r(-20, -10), &r(-5, -2)), r(2, 10));
        assert_eq!(wrap().divide(&r(-20, 10), &r(2, 5)), r(-10, 5));
        assert_eq!(wrap().divide(&r(-20, 10), &r(-5, -2)), r(-5, 10));
        assert_eq!(wrap().divide(&r(-20, 10), &r(-1, 1)), r(-20, 20));
    }

    #[test]
    fn test_divide_min_by_minus_one() {
        let min = Range::constant(i64::MIN);
        assert_eq!(wrap().divide(&min, &Range::constant(-1)), min);
        assert_eq!(wrap().divide(&min, &r(-2, -1)), r(i64::MIN, i64::MIN / -2));
        assert_eq!(wrap().divide(&r(i64::MIN, 0), &r(-2, -1)), Range::EVERYTHING);
    }

    #[test]
    fn test_remainder() {
        assert_eq!(wrap().remainder(&r(3, 5), &r(2, 2)), r(0, 1));
        assert_eq!(wrap().remainder(&r(-3, 4), &r(-10, 10)), r(-3, 4));
        assert_eq!(wrap().remainder(&r(0, 100), &r(3, 6)), r(0, 5));
        assert_eq!(
            wrap().remainder(&Range::constant(i64::MIN), &Range::constant(i64::MIN)),
            Range::constant(0)
        );
        assert_eq!(wrap().remainder(&r(5, 9), &Range::constant(i64::MIN)), r(5, 9));
    }

    #[test]
    fn test_shift_left() {
        assert_eq!(wrap().shift_left(&r(1, 3), &r(0, 2), IntWidth::Int), r(1, 12));
        assert_eq!(wrap().shift_left(&r(-3, -1), &r(1, 2), IntWidth::Int), r(-12, -2));
        assert_eq!(wrap().shift_left(&r(1, 3), &r(0, 32), IntWidth::Int), Range::EVERYTHING);
        assert_eq!(wrap().shift_left(&r(1, 1), &r(40, 40), IntWidth::Long), Range::constant(1 << 40));
        assert_eq!(wrap().shift_left(&r(0, 1), &r(-1, 0), IntWidth::Long), Range::EVERYTHING);
    }

    #[test]
    fn test_shift_right() {
        assert_eq!(wrap().signed_shift_right(&r(8, 64), &r(1, 3), IntWidth::Int), r(1, 32));
        assert_eq!(wrap().signed_shift_right(&r(-64, -8), &r(1, 3), IntWidth::Int), r(-32, -1));
        assert_eq!(
            wrap().signed_shift_right(&r(0, 1 << 40), &r(8, 8), IntWidth::Long),
            r(0, 1 << 32)
        );
        assert_eq!(
            wrap().signed_shift_right(&r(0, 1 << 40), &r(8, 8), IntWidth::Int),
            Range::EVERYTHING
        );
        assert_eq!(wrap().unsigned_shift_right(&r(8, 64), &r(3, 3), IntWidth::Int), r(1, 8));
        assert_eq!(wrap().unsigned_shift_right(&r(-1, 64), &r(3, 3), IntWidth::Int), Range::EVERYTHING);
        assert!(wrap().unsigned_shift_right(&Range::NOTHING, &r(3, 3), IntWidth::Int).is_nothing());
    }

    #[test]
    fn test_bitwise_and_with_mask() {
        let d = wrap();
        assert_eq!(d.bitwise_and(&r(0, 100), &Range::constant(15)), r(0, 15));
        assert_eq!(d.bitwise_and(&Range::constant(0xFF), &r(0, 10)), r(0, 10));
        assert_eq!(d.bitwise_and(&r(-5, 5), &Range::constant(7)), r(0, 7));
        assert_eq!(d.bitwise_and(&r(-5, -1), &Range::constant(-8)), r(i64::MIN, -8));
        assert_eq!(d.bitwise_and(&r(0, 10), &Range::constant(-8)), r(0, 10));
        assert_eq!(d.bitwise_and(&r(0, 10), &r(0, 3)), Range::EVERYTHING);
    }

    #[test]
    fn test_or_xor_give_up() {
        assert_eq!(wrap().bitwise_or(&r(0, 1), &r(0, 1)), Range::EVERYTHING);
        assert_eq!(wrap().bitwise_xor(&r(0, 1), &r(0, 1)), Range::EVERYTHING);
        assert!(wrap().bitwise_or(&Range::NOTHING, &r(0, 1)).is_nothing());
    }

    #[test]
    fn test_unary() {
        let d = wrap();
        assert_eq!(d.unary_minus(&r(-3, 5)), r(-5, 3));
        assert_eq!(d.unary_minus(&r(i64::MIN, 0)), Range::EVERYTHING);
        assert_eq!(d.unary_minus(&Range::constant(i64::MIN)), Range::constant(i64::MIN));
        assert_eq!(d.bitwise_complement(&r(0, 5)), r(-6, -1));
        assert_eq!(d.unary_plus(&r(2, 3)), r(2, 3));
    }

    #[test]
    fn test_narrow_inside_width_is_identity() {
        for width in [IntWidth::Byte, IntWidth::Short, IntWidth::Char, IntWidth::Int, IntWidth::Long] {
            let inside = r(0, 100);
            assert_eq!(wrap().narrow(&inside, width), inside);
            assert_eq!(saturate().narrow(&inside, width), inside);
        }
    }

    #[test]
    fn test_narrow_wraps_and_saturates() {
        let past_max = Range::constant(i64::from(i32::MAX) + 1);
        assert_eq!(wrap().narrow(&past_max, IntWidth::Int), Range::constant(i64::from(i32::MIN)));
        assert_eq!(saturate().narrow(&past_max, IntWidth::Int), Range::constant(i64::from(i32::MAX)));
        assert_eq!(wrap().narrow(&r(250, 260), IntWidth::Byte), r(-6, 4));
        assert_eq!(wrap().narrow(&r(0, 300), IntWidth::Byte), Range::BYTE_EVERYTHING);
        assert_eq!(wrap().narrow(&r(256, 260), IntWidth::Byte), r(0, 4));
        assert_eq!(wrap().narrow(&r(-1, 0), IntWidth::Char), Range::CHAR_EVERYTHING);
        assert_eq!(saturate().narrow(&r(-1, 0), IntWidth::Char), r(0, 0));
        assert_eq!(wrap().narrow(&Range::EVERYTHING, IntWidth::Short), Range::SHORT_EVERYTHING);
    }

    #[test]
    fn test_wrap_and_saturate_helpers() {
        let big = BigInt::from(i64::MAX) + 1;
        assert_eq!(wrap_i64(&big), i64::MIN);
        assert_eq!(wrap_i64(&BigInt::from(-5)), -5);
        assert_eq!(wrap_i64(&(BigInt::from(i64::MIN) - 1)), i64::MAX);
        assert_eq!(saturate_i64(&big), i64::MAX);
        assert_eq!(saturate_i64(&-big), i64::MIN);
    }
}
