//! Transfer functions for arithmetic and bitwise operators.
//!
//! Literal rules apply when an operand has an exact value and take
//! precedence over the generic rules on qualifiers. Bottom operands never
//! reach these functions; the registry maps them to Bottom.

use super::registry::{Operand, TFuncContext};
use crate::analysis::lattice::Qualifier;
use crate::diagnostics::emit_zero_divisor;
use crate::ir::{CallTarget, Expr};

/// `left + right`
pub fn tfunc_add(operands: &[Operand], ctx: &TFuncContext) -> Qualifier {
    let [left, right] = operands else {
        return Qualifier::Unknown;
    };
    if let Some(k) = ctx.literal(right.expr) {
        return literal_plus(k, left.qualifier);
    }
    if let Some(k) = ctx.literal(left.expr) {
        return literal_plus(k, right.qualifier);
    }
    generic_plus(left.qualifier, right.qualifier)
}

/// `left - right`
pub fn tfunc_sub(operands: &[Operand], ctx: &TFuncContext) -> Qualifier {
    let [left, right] = operands else {
        return Qualifier::Unknown;
    };
    if let Some(k) = ctx.literal(right.expr) {
        let Some(neg) = k.checked_neg() else {
            return Qualifier::Unknown;
        };
        let by_qualifier = literal_plus(neg, left.qualifier);
        return match ctx.min_len_of_length(left.expr) {
            // A length minus a literal is bounded by the minimum length.
            Some(min_len) => {
                let by_length = Qualifier::from_constant(min_len.saturating_sub(k));
                by_qualifier.glb(by_length)
            }
            None => by_qualifier,
        };
    }
    let order = ctx.facts.order;
    if order.is_less_than(right.expr, left.expr) {
        return Qualifier::Positive;
    }
    if order.is_less_than_or_equal(right.expr, left.expr) {
        return Qualifier::NonNegative;
    }
    Qualifier::Unknown
}

/// `left * right`
pub fn tfunc_mul(operands: &[Operand], ctx: &TFuncContext) -> Qualifier {
    let [left, right] = operands else {
        return Qualifier::Unknown;
    };
    if is_random_times_length(left.expr, right.expr) || is_random_times_length(right.expr, left.expr)
    {
        return Qualifier::NonNegative;
    }
    if let Some(k) = ctx.literal(right.expr) {
        return literal_times(k, left.qualifier);
    }
    if let Some(k) = ctx.literal(left.expr) {
        return literal_times(k, right.qualifier);
    }
    let (l, r) = (left.qualifier, right.qualifier);
    if l.is_positive() && r.is_positive() {
        Qualifier::Positive
    } else if l.is_non_negative() && r.is_non_negative() {
        Qualifier::NonNegative
    } else {
        Qualifier::Unknown
    }
}

/// `left / right`, truncating toward zero.
pub fn tfunc_div(operands: &[Operand], ctx: &TFuncContext) -> Qualifier {
    let [left, right] = operands else {
        return Qualifier::Unknown;
    };
    if let Some(k) = ctx.literal(right.expr) {
        return match k {
            0 => {
                // Division by a literal zero cannot complete normally.
                emit_zero_divisor(&format!("{} / {}", left.expr, right.expr), right.expr.span());
                Qualifier::Bottom
            }
            1 => left.qualifier,
            k if k >= 2 && left.qualifier.is_non_negative() => Qualifier::NonNegative,
            _ => Qualifier::Unknown,
        };
    }
    if let Some(k) = ctx.literal(left.expr) {
        return match k {
            0 => Qualifier::NonNegative,
            // 1 / x is in [-1, 1].
            1 if right.qualifier.is_non_negative() => Qualifier::NonNegative,
            1 => Qualifier::AtLeastNegOne,
            _ => Qualifier::Unknown,
        };
    }
    let (l, r) = (left.qualifier, right.qualifier);
    if l.is_positive() && r.is_non_negative() {
        Qualifier::NonNegative
    } else if r.is_non_negative() {
        l
    } else {
        Qualifier::Unknown
    }
}

/// `left % right`; the result has the sign of the dividend.
pub fn tfunc_rem(operands: &[Operand], ctx: &TFuncContext) -> Qualifier {
    let [left, right] = operands else {
        return Qualifier::Unknown;
    };
    if matches!(ctx.literal(right.expr), Some(1 | -1)) {
        return Qualifier::NonNegative;
    }
    if left.qualifier.is_non_negative() {
        Qualifier::NonNegative
    } else if left.qualifier.is_at_least_neg_one() {
        Qualifier::AtLeastNegOne
    } else {
        Qualifier::Unknown
    }
}

/// `left >> right` and `left >>> right`
pub fn tfunc_shift_right(operands: &[Operand], _ctx: &TFuncContext) -> Qualifier {
    match operands {
        [left, right] if left.qualifier.is_non_negative() && right.qualifier.is_non_negative() => {
            Qualifier::NonNegative
        }
        _ => Qualifier::Unknown,
    }
}

/// `left & right`: a non-negative mask clears the sign bit.
pub fn tfunc_bit_and(operands: &[Operand], _ctx: &TFuncContext) -> Qualifier {
    match operands {
        [left, right] if right.qualifier.is_non_negative() || left.qualifier.is_non_negative() => {
            Qualifier::NonNegative
        }
        _ => Qualifier::Unknown,
    }
}

fn literal_plus(k: i64, other: Qualifier) -> Qualifier {
    match k {
        -2 if other.is_positive() => Qualifier::AtLeastNegOne,
        -1 => other.demote(),
        0 => other,
        1 => other.promote(),
        k if k >= 2 && other.is_at_least_neg_one() => Qualifier::Positive,
        _ => Qualifier::Unknown,
    }
}

fn generic_plus(left: Qualifier, right: Qualifier) -> Qualifier {
    if left.is_positive() && right.is_positive() {
        return Qualifier::Positive;
    }
    // Adding an exact NonNegative keeps the other side's bound.
    if left == Qualifier::NonNegative {
        return right;
    }
    if right == Qualifier::NonNegative {
        return left;
    }
    if (left.is_positive() && right.is_at_least_neg_one())
        || (left.is_at_least_neg_one() && right.is_positive())
    {
        return Qualifier::NonNegative;
    }
    Qualifier::Unknown
}

fn literal_times(k: i64, other: Qualifier) -> Qualifier {
    match k {
        0 => Qualifier::NonNegative,
        1 => other,
        k if k > 1 && other.is_non_negative() => other,
        _ => Qualifier::Unknown,
    }
}

fn is_random_times_length(random: &Expr, length: &Expr) -> bool {
    matches!(
        random,
        Expr::Call {
            target: CallTarget::RandomFraction,
            ..
        }
    ) && matches!(length, Expr::Length { .. })
}
