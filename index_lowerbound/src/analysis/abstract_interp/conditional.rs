//! Store refinement across conditional branches.
//!
//! A branch condition is decomposed into two primitives:
//!
//! - `GT(l, r)`: `l > r` holds, so `l` is one step above `r`'s bound
//! - `GTE(l, r)`: `l >= r` holds, so `l` inherits `r`'s bound
//!
//! | Test     | then       | else       |
//! |----------|------------|------------|
//! | `a > b`  | GT(a, b)   | GTE(b, a)  |
//! | `a >= b` | GTE(a, b)  | GT(b, a)   |
//! | `a < b`  | GT(b, a)   | GTE(a, b)  |
//! | `a <= b` | GTE(b, a)  | GT(a, b)   |
//! | `a == b` | equal      | not equal  |
//! | `a != b` | not equal  | equal      |
//!
//! `&&`, `||` and `!` split compositionally. Any other condition is
//! evaluated for its effects and leaves both branches with the same store.

use super::store::{BoundFact, FlowStore};
use crate::analysis::lattice::Qualifier;
use crate::facts::FactProviders;
use crate::ir::{BinaryOp, Expr, ExprKey, UnaryOp};
use log::trace;

/// Result of splitting a store by a condition.
#[derive(Debug, Clone)]
pub struct SplitStore {
    /// Store for the then-branch (condition is true)
    pub then_store: FlowStore,
    /// Store for the else-branch (condition is false)
    pub else_store: FlowStore,
}

impl SplitStore {
    fn same(store: FlowStore) -> Self {
        Self {
            then_store: store.clone(),
            else_store: store,
        }
    }

    fn swap(self) -> Self {
        Self {
            then_store: self.else_store,
            else_store: self.then_store,
        }
    }
}

/// Splits `store` by `condition`.
///
/// `eval` computes the qualifier of an expression in a store, applying the
/// expression's effects to that store. Operands are evaluated exactly once,
/// left to right, and the right side of `&&` / `||` only on the path where
/// it runs.
///
/// # Example
/// ```
/// use index_lowerbound::analysis::abstract_interp::{split_store_by_condition, FlowStore};
/// use index_lowerbound::analysis::lattice::Qualifier;
/// use index_lowerbound::facts::FactProviders;
/// use index_lowerbound::ir::{BinaryOp, Expr};
///
/// let cond = Expr::binary(BinaryOp::Ge, Expr::var("x"), Expr::lit(0));
/// let mut eval = |e: &Expr, s: &mut FlowStore| match e.as_literal() {
///     Some(v) => Qualifier::from_constant(v),
///     None => s.lookup(e),
/// };
/// let split = split_store_by_condition(&FlowStore::new(), &cond, &FactProviders::none(), &mut eval);
/// assert_eq!(split.then_store.lookup(&Expr::var("x")), Qualifier::NonNegative);
/// assert_eq!(split.else_store.lookup(&Expr::var("x")), Qualifier::Unknown);
/// ```
pub fn split_store_by_condition<F>(
    store: &FlowStore,
    condition: &Expr,
    facts: &FactProviders,
    eval: &mut F,
) -> SplitStore
where
    F: FnMut(&Expr, &mut FlowStore) -> Qualifier,
{
    match condition {
        Expr::Binary {
            op: BinaryOp::And,
            left,
            right,
            ..
        } => {
            let lhs = split_store_by_condition(store, left, facts, eval);
            let rhs = split_store_by_condition(&lhs.then_store, right, facts, eval);
            let mut else_store = lhs.else_store;
            else_store.merge(&rhs.else_store);
            SplitStore {
                then_store: rhs.then_store,
                else_store,
            }
        }
        Expr::Binary {
            op: BinaryOp::Or,
            left,
            right,
            ..
        } => {
            let lhs = split_store_by_condition(store, left, facts, eval);
            let rhs = split_store_by_condition(&lhs.else_store, right, facts, eval);
            let mut then_store = lhs.then_store;
            then_store.merge(&rhs.then_store);
            SplitStore {
                then_store,
                else_store: rhs.else_store,
            }
        }
        Expr::Unary {
            op: UnaryOp::Not,
            operand,
            ..
        } => split_store_by_condition(store, operand, facts, eval).swap(),
        Expr::Binary {
            op, left, right, ..
        } if op.is_comparison() => {
            let mut base = store.clone();
            let ql = eval(left, &mut base);
            let qr = eval(right, &mut base);
            let l = Side::new(left, ql);
            let r = Side::new(right, qr);
            split_comparison(base, *op, &l, &r, facts)
        }
        _ => {
            let mut base = store.clone();
            eval(condition, &mut base);
            SplitStore::same(base)
        }
    }
}

/// One operand of a comparison with its qualifier before the branch.
struct Side<'e> {
    expr: &'e Expr,
    qualifier: Qualifier,
    key: Option<ExprKey>,
}

impl<'e> Side<'e> {
    fn new(expr: &'e Expr, qualifier: Qualifier) -> Self {
        Self {
            expr,
            qualifier,
            key: trackable_key(expr),
        }
    }
}

/// Only side-effect-free, non-literal expressions have stable facts.
fn trackable_key(expr: &Expr) -> Option<ExprKey> {
    if expr.as_literal().is_some() || expr.has_side_effects() {
        return None;
    }
    Some(ExprKey::of(expr))
}

fn split_comparison(
    base: FlowStore,
    op: BinaryOp,
    l: &Side,
    r: &Side,
    facts: &FactProviders,
) -> SplitStore {
    let mut split = SplitStore::same(base);
    let (then_store, else_store) = (&mut split.then_store, &mut split.else_store);
    match op {
        BinaryOp::Gt => {
            greater_than(then_store, l, r);
            greater_or_equal(else_store, r, l);
        }
        BinaryOp::Ge => {
            greater_or_equal(then_store, l, r);
            greater_than(else_store, r, l);
        }
        BinaryOp::Lt => {
            greater_than(then_store, r, l);
            greater_or_equal(else_store, l, r);
        }
        BinaryOp::Le => {
            greater_or_equal(then_store, r, l);
            greater_than(else_store, l, r);
        }
        BinaryOp::Eq => {
            equal(then_store, l, r);
            not_equal(else_store, l, r, facts);
        }
        BinaryOp::Ne => {
            not_equal(then_store, l, r, facts);
            equal(else_store, l, r);
        }
        _ => {}
    }
    split
}

fn refine(store: &mut FlowStore, side: &Side, qualifier: Qualifier) {
    if let Some(key) = &side.key {
        let q = side.qualifier.glb(qualifier);
        trace!("refine {} to {}", key, q);
        store.insert_fact(BoundFact::new(key.clone(), q));
    }
}

/// `l > r`
fn greater_than(store: &mut FlowStore, l: &Side, r: &Side) {
    let q = match r.qualifier {
        Qualifier::Bottom | Qualifier::Positive | Qualifier::NonNegative => Qualifier::Positive,
        Qualifier::AtLeastNegOne => Qualifier::NonNegative,
        Qualifier::Unknown => return,
    };
    refine(store, l, q);
}

/// `l >= r`
fn greater_or_equal(store: &mut FlowStore, l: &Side, r: &Side) {
    refine(store, l, r.qualifier);
}

/// `l == r`: both sides share the better bound.
fn equal(store: &mut FlowStore, l: &Side, r: &Side) {
    let q = l.qualifier.glb(r.qualifier);
    refine(store, l, q);
    refine(store, r, q);
}

/// `l != r`
fn not_equal(store: &mut FlowStore, l: &Side, r: &Side, facts: &FactProviders) {
    not_equal_one_way(store, l, r, facts);
    not_equal_one_way(store, r, l, facts);
}

/// Refines `target` given `target != other`.
fn not_equal_one_way(store: &mut FlowStore, target: &Side, other: &Side, facts: &FactProviders) {
    match facts.exact_value(other.expr) {
        Some(0) if target.qualifier.is_non_negative() => {
            refine(store, target, Qualifier::Positive);
        }
        Some(-1) if target.qualifier.is_at_least_neg_one() => {
            refine(store, target, Qualifier::NonNegative);
        }
        _ => {}
    }
    // other <= target and other >= 0, so target > other >= 0.
    if target.qualifier.is_non_negative()
        && other.qualifier.is_non_negative()
        && facts.order.is_less_than_or_equal(other.expr, target.expr)
    {
        refine(store, target, Qualifier::Positive);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::FactTable;
    use crate::ir::CallTarget;
    use pretty_assertions::assert_eq;

    /// Evaluates literals by value and everything else from the store.
    fn lookup_eval(expr: &Expr, store: &mut FlowStore) -> Qualifier {
        match expr.as_literal() {
            Some(value) => Qualifier::from_constant(value),
            None => store.lookup(expr),
        }
    }

    fn store_with(facts: &[(&str, Qualifier)]) -> FlowStore {
        let mut store = FlowStore::new();
        for (name, q) in facts {
            store.set(ExprKey::variable(name), *q);
        }
        store
    }

    fn split(store: &FlowStore, cond: &Expr, facts: &FactTable) -> SplitStore {
        split_store_by_condition(store, cond, &facts.providers(), &mut lookup_eval)
    }

    fn var(name: &str) -> Expr {
        Expr::var(name)
    }

    #[test]
    fn test_greater_than_literal() {
        let cond = Expr::binary(BinaryOp::Gt, var("x"), Expr::lit(0));
        let s = split(&FlowStore::new(), &cond, &FactTable::default());
        assert_eq!(s.then_store.lookup(&var("x")), Qualifier::Positive);
        assert_eq!(s.else_store.lookup(&var("x")), Qualifier::Unknown);

        let cond = Expr::binary(BinaryOp::Gt, var("x"), Expr::lit(-1));
        let s = split(&FlowStore::new(), &cond, &FactTable::default());
        assert_eq!(s.then_store.lookup(&var("x")), Qualifier::NonNegative);
    }

    #[test]
    fn test_less_than_refines_right_side() {
        let store = store_with(&[("i", Qualifier::NonNegative)]);
        let cond = Expr::binary(BinaryOp::Lt, var("i"), var("n"));
        let s = split(&store, &cond, &FactTable::default());
        assert_eq!(s.then_store.lookup(&var("n")), Qualifier::Positive);
        assert_eq!(s.then_store.lookup(&var("i")), Qualifier::NonNegative);
        // else: i >= n, nothing known about n
        assert_eq!(s.else_store.lookup(&var("i")), Qualifier::NonNegative);
        assert_eq!(s.else_store.lookup(&var("n")), Qualifier::Unknown);
    }

    #[test]
    fn test_else_branch_of_less_or_equal() {
        // !(x <= -1) means x > -1, so x >= 0
        let cond = Expr::binary(BinaryOp::Le, var("x"), Expr::lit(-1));
        let s = split(&FlowStore::new(), &cond, &FactTable::default());
        assert_eq!(s.then_store.lookup(&var("x")), Qualifier::Unknown);
        assert_eq!(s.else_store.lookup(&var("x")), Qualifier::NonNegative);
    }

    #[test]
    fn test_refinement_never_widens() {
        let store = store_with(&[("x", Qualifier::Positive)]);
        let cond = Expr::binary(BinaryOp::Ge, var("x"), Expr::lit(-1));
        let s = split(&store, &cond, &FactTable::default());
        assert_eq!(s.then_store.lookup(&var("x")), Qualifier::Positive);
    }

    #[test]
    fn test_equality() {
        let store = store_with(&[("a", Qualifier::Positive)]);
        let cond = Expr::binary(BinaryOp::Eq, var("a"), var("b"));
        let s = split(&store, &cond, &FactTable::default());
        assert_eq!(s.then_store.lookup(&var("b")), Qualifier::Positive);
        assert_eq!(s.else_store.lookup(&var("b")), Qualifier::Unknown);
    }

    #[test]
    fn test_not_equal_minus_one() {
        let store = store_with(&[("i", Qualifier::AtLeastNegOne)]);
        let cond = Expr::binary(BinaryOp::Ne, var("i"), Expr::lit(-1));
        let s = split(&store, &cond, &FactTable::default());
        assert_eq!(s.then_store.lookup(&var("i")), Qualifier::NonNegative);
        assert_eq!(s.else_store.lookup(&var("i")), Qualifier::AtLeastNegOne);

        // literal on the left works too
        let cond = Expr::binary(BinaryOp::Ne, Expr::lit(-1), var("i"));
        let s = split(&store, &cond, &FactTable::default());
        assert_eq!(s.then_store.lookup(&var("i")), Qualifier::NonNegative);
    }

    #[test]
    fn test_not_equal_zero() {
        let store = store_with(&[("n", Qualifier::NonNegative)]);
        let cond = Expr::binary(BinaryOp::Eq, var("n"), Expr::lit(0));
        let s = split(&store, &cond, &FactTable::default());
        assert_eq!(s.else_store.lookup(&var("n")), Qualifier::Positive);
        assert_eq!(s.then_store.lookup(&var("n")), Qualifier::NonNegative);

        // unknown operand is not refined
        let cond = Expr::binary(BinaryOp::Ne, var("m"), Expr::lit(0));
        let s = split(&store, &cond, &FactTable::default());
        assert_eq!(s.then_store.lookup(&var("m")), Qualifier::Unknown);
    }

    #[test]
    fn test_not_equal_with_order_fact() {
        let store = store_with(&[("i", Qualifier::NonNegative), ("j", Qualifier::NonNegative)]);
        let facts = FactTable::default().with_less_than_or_equal(&var("i"), &var("j"));
        let cond = Expr::binary(BinaryOp::Ne, var("i"), var("j"));
        let s = split(&store, &cond, &facts);
        assert_eq!(s.then_store.lookup(&var("j")), Qualifier::Positive);
        assert_eq!(s.then_store.lookup(&var("i")), Qualifier::NonNegative);
    }

    #[test]
    fn test_logical_and_or_not() {
        let gt = Expr::binary(BinaryOp::Gt, var("x"), Expr::lit(0));
        let ge = Expr::binary(BinaryOp::Ge, var("y"), Expr::lit(0));
        let and = Expr::binary(BinaryOp::And, gt.clone(), ge.clone());
        let s = split(&FlowStore::new(), &and, &FactTable::default());
        assert_eq!(s.then_store.lookup(&var("x")), Qualifier::Positive);
        assert_eq!(s.then_store.lookup(&var("y")), Qualifier::NonNegative);
        assert_eq!(s.else_store.lookup(&var("x")), Qualifier::Unknown);

        // !(x > 0 || y >= 0): else branch of the disjunction
        let or = Expr::binary(BinaryOp::Or, gt.clone(), ge);
        let s = split(&FlowStore::new(), &or, &FactTable::default());
        assert_eq!(s.then_store.lookup(&var("x")), Qualifier::Unknown);

        let not = Expr::unary(UnaryOp::Not, gt);
        let s = split(&FlowStore::new(), &not, &FactTable::default());
        assert_eq!(s.then_store.lookup(&var("x")), Qualifier::Unknown);
        assert_eq!(s.else_store.lookup(&var("x")), Qualifier::Positive);
    }

    #[test]
    fn test_effectful_operands_are_not_tracked() {
        let call = Expr::call(CallTarget::Other("next".to_string()), vec![]);
        let cond = Expr::binary(BinaryOp::Gt, call.clone(), Expr::lit(0));
        let s = split(&FlowStore::new(), &cond, &FactTable::default());
        assert_eq!(s.then_store.lookup(&call), Qualifier::Unknown);
        assert!(s.then_store.is_empty());
    }

    #[test]
    fn test_non_comparison_condition_is_evaluated_once() {
        let mut calls = 0;
        let mut eval = |_: &Expr, _: &mut FlowStore| {
            calls += 1;
            Qualifier::Unknown
        };
        let cond = var("flag");
        let s = split_store_by_condition(&FlowStore::new(), &cond, &FactProviders::none(), &mut eval);
        assert_eq!(calls, 1);
        assert_eq!(s.then_store, s.else_store);
    }
}
