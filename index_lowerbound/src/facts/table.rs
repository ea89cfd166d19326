//! In-memory fact provider.

use super::{ConstantFacts, FactProviders, MinLenFacts, OrderFacts, SearchIndexFacts};
use crate::ir::{Expr, ExprKey};
use crate::range::Range;
use std::collections::{HashMap, HashSet};

/// Facts registered by the host.
///
/// Facts are keyed by expression identity and hold at every program point.
/// Compound expressions are folded by the engine, not here.
///
/// # Example
/// ```
/// use index_lowerbound::facts::{ConstantFacts, FactTable, MinLenFacts};
/// use index_lowerbound::ir::Expr;
/// use index_lowerbound::range::Range;
///
/// let facts = FactTable::new()
///     .with_range(&Expr::var("k"), Range::create(2, 4))
///     .with_min_len(&Expr::var("a"), 5);
///
/// assert_eq!(facts.range_of(&Expr::var("k")), Some(Range::create(2, 4)));
/// assert_eq!(facts.min_len(&Expr::var("a")), Some(5));
/// ```
#[derive(Debug, Clone, Default)]
pub struct FactTable {
    ranges: HashMap<ExprKey, Range>,
    less_than: HashSet<(ExprKey, ExprKey)>,
    less_than_or_equal: HashSet<(ExprKey, ExprKey)>,
    negative_index: HashSet<ExprKey>,
    min_lens: HashMap<ExprKey, i64>,
}

impl FactTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_range(mut self, expr: &Expr, range: Range) -> Self {
        self.ranges.insert(ExprKey::of(expr), range);
        self
    }

    /// Marks an expression as having no value, e.g. code after an
    /// unconditional throw.
    pub fn mark_dead(self, expr: &Expr) -> Self {
        self.with_range(expr, Range::NOTHING)
    }

    /// Records `a < b`.
    pub fn with_less_than(mut self, a: &Expr, b: &Expr) -> Self {
        self.less_than.insert((ExprKey::of(a), ExprKey::of(b)));
        self
    }

    /// Records `a <= b`.
    pub fn with_less_than_or_equal(mut self, a: &Expr, b: &Expr) -> Self {
        self.less_than_or_equal
            .insert((ExprKey::of(a), ExprKey::of(b)));
        self
    }

    /// Records that `operand` is a negative search result, so `~operand` is
    /// non-negative.
    pub fn with_negative_index_for(mut self, operand: &Expr) -> Self {
        self.negative_index.insert(ExprKey::of(operand));
        self
    }

    pub fn with_min_len(mut self, sequence: &Expr, len: i64) -> Self {
        self.min_lens.insert(ExprKey::of(sequence), len);
        self
    }

    /// All four providers backed by this table.
    pub fn providers(&self) -> FactProviders<'_> {
        FactProviders::uniform(self)
    }
}

impl ConstantFacts for FactTable {
    fn range_of(&self, expr: &Expr) -> Option<Range> {
        self.ranges.get(&ExprKey::of(expr)).copied()
    }
}

impl OrderFacts for FactTable {
    fn is_less_than(&self, a: &Expr, b: &Expr) -> bool {
        self.less_than.contains(&(ExprKey::of(a), ExprKey::of(b)))
    }

    fn is_less_than_or_equal(&self, a: &Expr, b: &Expr) -> bool {
        let pair = (ExprKey::of(a), ExprKey::of(b));
        pair.0 == pair.1 || self.less_than_or_equal.contains(&pair) || self.less_than.contains(&pair)
    }
}

impl SearchIndexFacts for FactTable {
    fn is_negative_index_complement(&self, operand: &Expr) -> bool {
        self.negative_index.contains(&ExprKey::of(operand))
    }
}

impl MinLenFacts for FactTable {
    fn min_len(&self, sequence: &Expr) -> Option<i64> {
        self.min_lens.get(&ExprKey::of(sequence)).copied()
    }
}
