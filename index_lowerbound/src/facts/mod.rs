//! Facts supplied by analyses that run alongside the lower-bound analysis.
//!
//! Each provider answers questions about host expressions. `None` or `false`
//! always means "no information", never "proven otherwise".
//!
//! # Module structure
//!
//! - `const_fold`: [`ConstantFolder`], range evaluation of operator nodes
//! - `table`: [`FactTable`], an in-memory provider for all four traits

pub mod const_fold;
pub mod table;

pub use const_fold::ConstantFolder;
pub use table::FactTable;

use crate::ir::Expr;
use crate::range::Range;
use std::fmt;

/// Integer ranges of expressions.
pub trait ConstantFacts {
    /// Range of values `expr` can take, or `None` if unknown.
    ///
    /// [`Range::NOTHING`] means the expression has no value (it is dead).
    fn range_of(&self, expr: &Expr) -> Option<Range>;
}

/// Ordering between expressions.
pub trait OrderFacts {
    /// Whether `a < b` holds at the expression's program point.
    fn is_less_than(&self, a: &Expr, b: &Expr) -> bool;

    /// Whether `a <= b` holds at the expression's program point.
    fn is_less_than_or_equal(&self, a: &Expr, b: &Expr) -> bool;
}

/// Results of search routines.
pub trait SearchIndexFacts {
    /// Whether `operand` is known to be negative and its complement `~operand`
    /// is a valid insertion index (the result of a failed binary search).
    fn is_negative_index_complement(&self, operand: &Expr) -> bool;
}

/// Minimum lengths of sequences.
pub trait MinLenFacts {
    fn min_len(&self, sequence: &Expr) -> Option<i64>;
}

/// Provider that knows nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFacts;

impl ConstantFacts for NoFacts {
    fn range_of(&self, _expr: &Expr) -> Option<Range> {
        None
    }
}

impl OrderFacts for NoFacts {
    fn is_less_than(&self, _a: &Expr, _b: &Expr) -> bool {
        false
    }

    fn is_less_than_or_equal(&self, _a: &Expr, _b: &Expr) -> bool {
        false
    }
}

impl SearchIndexFacts for NoFacts {
    fn is_negative_index_complement(&self, _operand: &Expr) -> bool {
        false
    }
}

impl MinLenFacts for NoFacts {
    fn min_len(&self, _sequence: &Expr) -> Option<i64> {
        None
    }
}

static NO_FACTS: NoFacts = NoFacts;

/// The providers consulted during one analysis run.
#[derive(Clone, Copy)]
pub struct FactProviders<'a> {
    pub constants: &'a dyn ConstantFacts,
    pub order: &'a dyn OrderFacts,
    pub search: &'a dyn SearchIndexFacts,
    pub min_len: &'a dyn MinLenFacts,
}

impl<'a> FactProviders<'a> {
    /// Uses one value for every provider.
    pub fn uniform<P>(provider: &'a P) -> Self
    where
        P: ConstantFacts + OrderFacts + SearchIndexFacts + MinLenFacts,
    {
        Self {
            constants: provider,
            order: provider,
            search: provider,
            min_len: provider,
        }
    }

    pub fn none() -> FactProviders<'static> {
        FactProviders::uniform(&NO_FACTS)
    }

    /// The same providers with `constants` answering range questions.
    pub fn with_constants<'b>(self, constants: &'b dyn ConstantFacts) -> FactProviders<'b>
    where
        'a: 'b,
    {
        FactProviders {
            constants,
            order: self.order,
            search: self.search,
            min_len: self.min_len,
        }
    }

    /// The exact value of `expr`: a literal, or an expression the constant
    /// provider pins to a single value.
    pub fn exact_value(&self, expr: &Expr) -> Option<i64> {
        if let Some(value) = expr.as_literal() {
            return Some(value);
        }
        self.constants
            .range_of(expr)
            .filter(Range::is_constant)
            .map(|range| range.from())
    }
}

impl fmt::Debug for FactProviders<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactProviders").finish_non_exhaustive()
    }
}
