//! Flow-insensitive introduction rules.
//!
//! The classifier looks at a single expression node and the qualifiers of
//! its operands, never at the store. Its answer is combined with the
//! flow-sensitive result by `glb`, so it can only sharpen a fact.

use crate::analysis::lattice::Qualifier;
use crate::diagnostics::emit_unknown_call;
use crate::facts::FactProviders;
use crate::ir::{CallTarget, Expr, UnaryOp};
use log::trace;

/// Applies the static rules to expression nodes.
#[derive(Debug, Clone, Copy)]
pub struct ExpressionClassifier<'a> {
    facts: FactProviders<'a>,
}

impl<'a> ExpressionClassifier<'a> {
    pub fn new(facts: FactProviders<'a>) -> Self {
        Self { facts }
    }

    /// Qualifier implied by the shape of `expr` alone.
    ///
    /// `operands` holds the qualifiers of the node's direct operands in
    /// source order: the operand of a unary node, or the arguments of a
    /// call. Other nodes ignore it.
    pub fn classify(&self, expr: &Expr, operands: &[Qualifier]) -> Qualifier {
        let q = self.from_constants(expr).glb(self.from_shape(expr, operands));
        trace!("classify {} -> {}", expr, q);
        q
    }

    fn from_constants(&self, expr: &Expr) -> Qualifier {
        if let Some(value) = expr.as_literal() {
            return Qualifier::from_constant(value);
        }
        match self.facts.constants.range_of(expr) {
            Some(range) if range.is_nothing() => Qualifier::Bottom,
            Some(range) => Qualifier::from_constant(range.from()),
            None => Qualifier::Unknown,
        }
    }

    fn from_shape(&self, expr: &Expr, operands: &[Qualifier]) -> Qualifier {
        match expr {
            Expr::Unary { op, operand, .. } => {
                let Some(&q) = operands.first() else {
                    return Qualifier::Unknown;
                };
                match op {
                    UnaryOp::PreInc => q.promote(),
                    UnaryOp::PreDec => q.demote(),
                    UnaryOp::BitNot if self.facts.search.is_negative_index_complement(operand) => {
                        Qualifier::NonNegative
                    }
                    // Postfix forms are modelled by the engine as an assignment.
                    _ => Qualifier::Unknown,
                }
            }
            Expr::Call { target, .. } => match target {
                CallTarget::Max => operands
                    .iter()
                    .copied()
                    .reduce(Qualifier::glb)
                    .unwrap_or(Qualifier::Unknown),
                // The smaller argument is at least the weakest bound.
                CallTarget::Min => operands
                    .iter()
                    .copied()
                    .reduce(Qualifier::lub)
                    .unwrap_or(Qualifier::Unknown),
                CallTarget::RandomFraction => Qualifier::Unknown,
                CallTarget::Other(name) => {
                    emit_unknown_call(name, expr.span());
                    Qualifier::Unknown
                }
            },
            Expr::Length { sequence, .. } => {
                Qualifier::from_constant(self.facts.min_len.min_len(sequence).unwrap_or(0))
            }
            _ => Qualifier::Unknown,
        }
    }
}
