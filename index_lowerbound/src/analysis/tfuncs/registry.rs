//! Transfer function registry for binary operators.
//!
//! A transfer function computes the qualifier of `left op right` from the
//! operand qualifiers at the current program point, consulting the fact
//! providers for literal values, minimum lengths and ordering.

use crate::analysis::lattice::Qualifier;
use crate::facts::FactProviders;
use crate::ir::{BinaryOp, Expr};
use std::collections::HashMap;

/// An evaluated operand: the expression and its qualifier at this point.
#[derive(Debug, Clone, Copy)]
pub struct Operand<'e> {
    pub expr: &'e Expr,
    pub qualifier: Qualifier,
}

impl<'e> Operand<'e> {
    pub fn new(expr: &'e Expr, qualifier: Qualifier) -> Self {
        Self { expr, qualifier }
    }
}

/// Context for transfer functions that need facts from other analyses.
#[derive(Debug, Clone, Copy)]
pub struct TFuncContext<'a> {
    pub facts: FactProviders<'a>,
}

impl<'a> TFuncContext<'a> {
    pub fn new(facts: FactProviders<'a>) -> Self {
        Self { facts }
    }

    /// The exact value of `expr`, if it is a literal or the constant
    /// provider pins it to a single value.
    pub fn literal(&self, expr: &Expr) -> Option<i64> {
        self.facts.exact_value(expr)
    }

    /// Minimum length of the sequence whose length `expr` reads.
    pub fn min_len_of_length(&self, expr: &Expr) -> Option<i64> {
        match expr {
            Expr::Length { sequence, .. } => self.facts.min_len.min_len(sequence),
            _ => None,
        }
    }
}

impl Default for TFuncContext<'_> {
    fn default() -> Self {
        Self::new(FactProviders::none())
    }
}

/// Type signature for a transfer function.
pub type TransferFn = fn(&[Operand], &TFuncContext) -> Qualifier;

/// Registry of transfer functions keyed by operator.
///
/// Operators without a registered function produce `Unknown`.
///
/// # Example
/// ```
/// use index_lowerbound::analysis::lattice::Qualifier;
/// use index_lowerbound::analysis::tfuncs::{register_all, Operand, TFuncContext, TransferFunctions};
/// use index_lowerbound::ir::{BinaryOp, Expr};
///
/// let mut registry = TransferFunctions::new();
/// register_all(&mut registry);
///
/// let (i, one) = (Expr::var("i"), Expr::lit(1));
/// let operands = [
///     Operand::new(&i, Qualifier::NonNegative),
///     Operand::new(&one, Qualifier::Positive),
/// ];
/// let q = registry.infer(BinaryOp::Add, &operands, &TFuncContext::default());
/// assert_eq!(q, Qualifier::Positive);
/// ```
#[derive(Debug, Default)]
pub struct TransferFunctions {
    functions: HashMap<BinaryOp, TransferFn>,
}

impl TransferFunctions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, op: BinaryOp, tfunc: TransferFn) {
        self.functions.insert(op, tfunc);
    }

    pub fn has(&self, op: BinaryOp) -> bool {
        self.functions.contains_key(&op)
    }

    /// Qualifier of `operands[0] op operands[1]`.
    ///
    /// A Bottom operand makes the whole expression unreachable.
    pub fn infer(&self, op: BinaryOp, operands: &[Operand], ctx: &TFuncContext) -> Qualifier {
        if operands.iter().any(|o| o.qualifier == Qualifier::Bottom) {
            return Qualifier::Bottom;
        }
        match self.functions.get(&op) {
            Some(tfunc) => tfunc(operands, ctx),
            None => Qualifier::Unknown,
        }
    }
}
