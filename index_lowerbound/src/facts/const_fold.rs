//! Constant folding over ranges.
//!
//! Results are narrowed to the value width, so `i32::MAX + 1` folds to
//! `i32::MIN` under wrap-around when folding `int` values.

use super::ConstantFacts;
use crate::config::AnalysisConfig;
use crate::ir::{BinaryOp, CallTarget, Expr, UnaryOp};
use crate::range::{IntWidth, Range, RangeDomain};
use std::fmt;

/// Folds compound expressions over the ranges a host provider knows.
///
/// The host's answer for an expression wins; otherwise literals are points
/// and operator nodes are evaluated with the configured overflow policy
/// and value width.
#[derive(Clone, Copy)]
pub struct ConstantFolder<'a> {
    base: &'a dyn ConstantFacts,
    domain: RangeDomain,
    width: IntWidth,
}

impl<'a> ConstantFolder<'a> {
    pub fn new(base: &'a dyn ConstantFacts, config: &AnalysisConfig) -> Self {
        Self {
            base,
            domain: config.domain(),
            width: config.value_width,
        }
    }
}

impl ConstantFacts for ConstantFolder<'_> {
    fn range_of(&self, expr: &Expr) -> Option<Range> {
        if let Some(range) = self.base.range_of(expr) {
            return Some(range);
        }
        match expr {
            Expr::Literal(value, _) => Some(Range::constant(*value)),
            Expr::Binary {
                op, left, right, ..
            } => {
                let lhs = self.range_of(left)?;
                let rhs = self.range_of(right)?;
                eval_range_binary(&self.domain, self.width, *op, &lhs, &rhs)
            }
            Expr::Unary { op, operand, .. } => {
                let operand = self.range_of(operand)?;
                eval_range_unary(&self.domain, self.width, *op, &operand)
            }
            Expr::Call { target, args, .. } => {
                let args = args
                    .iter()
                    .map(|arg| self.range_of(arg))
                    .collect::<Option<Vec<_>>>()?;
                eval_range_call(target, &args)
            }
            Expr::Var(..) | Expr::Length { .. } | Expr::Index { .. } | Expr::NewSequence { .. } => {
                None
            }
        }
    }
}

impl fmt::Debug for ConstantFolder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstantFolder")
            .field("domain", &self.domain)
            .field("width", &self.width)
            .finish_non_exhaustive()
    }
}

/// Evaluates a binary operator on operand ranges.
///
/// Returns `None` for operators that do not produce an integer.
pub fn eval_range_binary(
    domain: &RangeDomain,
    width: IntWidth,
    op: BinaryOp,
    lhs: &Range,
    rhs: &Range,
) -> Option<Range> {
    let raw = match op {
        BinaryOp::Add => domain.plus(lhs, rhs),
        BinaryOp::Sub => domain.minus(lhs, rhs),
        BinaryOp::Mul => domain.times(lhs, rhs),
        BinaryOp::Div => domain.divide(lhs, rhs),
        BinaryOp::Rem => domain.remainder(lhs, rhs),
        BinaryOp::Shl => domain.shift_left(lhs, rhs, width),
        BinaryOp::Shr => domain.signed_shift_right(lhs, rhs, width),
        BinaryOp::UShr => domain.unsigned_shift_right(lhs, rhs, width),
        BinaryOp::BitAnd => domain.bitwise_and(lhs, rhs),
        BinaryOp::BitOr => domain.bitwise_or(lhs, rhs),
        BinaryOp::BitXor => domain.bitwise_xor(lhs, rhs),
        BinaryOp::Lt
        | BinaryOp::Le
        | BinaryOp::Gt
        | BinaryOp::Ge
        | BinaryOp::Eq
        | BinaryOp::Ne
        | BinaryOp::And
        | BinaryOp::Or => return None,
    };
    Some(domain.narrow(&raw, width))
}

/// Evaluates a side-effect-free unary operator on an operand range.
pub fn eval_range_unary(
    domain: &RangeDomain,
    width: IntWidth,
    op: UnaryOp,
    operand: &Range,
) -> Option<Range> {
    let raw = match op {
        UnaryOp::Neg => domain.unary_minus(operand),
        UnaryOp::BitNot => domain.bitwise_complement(operand),
        UnaryOp::PreInc
        | UnaryOp::PreDec
        | UnaryOp::PostInc
        | UnaryOp::PostDec
        | UnaryOp::Not => return None,
    };
    Some(domain.narrow(&raw, width))
}

/// Evaluates a two-argument `max`/`min` intrinsic.
pub fn eval_range_call(target: &CallTarget, args: &[Range]) -> Option<Range> {
    match (target, args) {
        (CallTarget::Max, [a, b]) => Some(a.max_with(b)),
        (CallTarget::Min, [a, b]) => Some(a.min_with(b)),
        _ => None,
    }
}
