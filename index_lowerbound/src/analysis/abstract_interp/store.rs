//! Qualifier store for one program point.
//!
//! The `FlowStore` maps expression keys to the qualifier known for them.
//! A missing key means `Unknown`, so the store only ever holds facts.

use crate::analysis::lattice::Qualifier;
use crate::ir::{Expr, ExprKey};
use std::collections::HashMap;

/// A fact produced by refinement, waiting to be inserted into a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundFact {
    pub key: ExprKey,
    pub qualifier: Qualifier,
}

impl BoundFact {
    pub fn new(key: ExprKey, qualifier: Qualifier) -> Self {
        Self { key, qualifier }
    }
}

/// Per-program-point mapping from expression identity to qualifier.
///
/// # Example
/// ```
/// use index_lowerbound::analysis::abstract_interp::FlowStore;
/// use index_lowerbound::analysis::lattice::Qualifier;
/// use index_lowerbound::ir::ExprKey;
///
/// let i = ExprKey::variable("i");
/// let mut then_store = FlowStore::new();
/// then_store.set(i.clone(), Qualifier::Positive);
///
/// let mut else_store = FlowStore::new();
/// else_store.set(i.clone(), Qualifier::AtLeastNegOne);
///
/// then_store.merge(&else_store);
/// assert_eq!(then_store.get(&i), Qualifier::AtLeastNegOne);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FlowStore {
    facts: HashMap<ExprKey, Qualifier>,
}

impl FlowStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Qualifier recorded for `key`, `Unknown` if there is none.
    pub fn get(&self, key: &ExprKey) -> Qualifier {
        self.facts.get(key).copied().unwrap_or(Qualifier::Unknown)
    }

    /// Qualifier recorded for the expression `expr`.
    pub fn lookup(&self, expr: &Expr) -> Qualifier {
        self.get(&ExprKey::of(expr))
    }

    /// Replaces the fact for `key`.
    pub fn set(&mut self, key: ExprKey, qualifier: Qualifier) {
        if qualifier == Qualifier::Unknown {
            self.facts.remove(&key);
        } else {
            self.facts.insert(key, qualifier);
        }
    }

    /// Adds a fact, keeping whatever was already known.
    ///
    /// Returns `true` if the stored qualifier became more precise.
    pub fn insert_fact(&mut self, fact: BoundFact) -> bool {
        let existing = self.get(&fact.key);
        let refined = existing.glb(fact.qualifier);
        if refined == existing {
            return false;
        }
        self.facts.insert(fact.key, refined);
        true
    }

    /// Drops every fact whose expression reads `name`.
    pub fn invalidate(&mut self, name: &str) {
        self.facts.retain(|key, _| !key.mentions(name));
    }

    /// Joins `other` into this store.
    ///
    /// A key survives only if both stores know something about it.
    pub fn merge(&mut self, other: &FlowStore) {
        self.merge_changed(other);
    }

    /// Joins `other` into this store and reports whether anything changed.
    pub fn merge_changed(&mut self, other: &FlowStore) -> bool {
        let mut changed = false;
        self.facts.retain(|key, q| {
            let joined = q.lub(other.get(key));
            if joined == Qualifier::Unknown {
                changed = true;
                return false;
            }
            if joined != *q {
                *q = joined;
                changed = true;
            }
            true
        });
        changed
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// Facts in key order, for stable output.
    pub fn sorted_facts(&self) -> Vec<(&ExprKey, Qualifier)> {
        let mut facts: Vec<_> = self.facts.iter().map(|(k, q)| (k, *q)).collect();
        facts.sort_by(|a, b| a.0.text().cmp(b.0.text()));
        facts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::BinaryOp;

    fn key(name: &str) -> ExprKey {
        ExprKey::variable(name)
    }

    #[test]
    fn test_absent_is_unknown() {
        let mut store = FlowStore::new();
        assert_eq!(store.get(&key("x")), Qualifier::Unknown);
        store.set(key("x"), Qualifier::Positive);
        assert_eq!(store.lookup(&Expr::var("x")), Qualifier::Positive);
        store.set(key("x"), Qualifier::Unknown);
        assert!(store.is_empty());
    }

    #[test]
    fn test_insert_fact_takes_glb() {
        let mut store = FlowStore::new();
        store.set(key("x"), Qualifier::NonNegative);
        assert!(!store.insert_fact(BoundFact::new(key("x"), Qualifier::AtLeastNegOne)));
        assert_eq!(store.get(&key("x")), Qualifier::NonNegative);
        assert!(store.insert_fact(BoundFact::new(key("x"), Qualifier::Positive)));
        assert_eq!(store.get(&key("x")), Qualifier::Positive);
        assert!(!store.insert_fact(BoundFact::new(key("y"), Qualifier::Unknown)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_invalidate_drops_mentioning_keys() {
        let mut store = FlowStore::new();
        let sum = Expr::binary(BinaryOp::Add, Expr::var("i"), Expr::var("j"));
        store.set(ExprKey::of(&sum), Qualifier::Positive);
        store.set(key("i"), Qualifier::Positive);
        store.set(key("j"), Qualifier::NonNegative);
        store.invalidate("i");
        assert_eq!(store.lookup(&sum), Qualifier::Unknown);
        assert_eq!(store.get(&key("i")), Qualifier::Unknown);
        assert_eq!(store.get(&key("j")), Qualifier::NonNegative);
    }

    #[test]
    fn test_merge_takes_lub_and_drops_one_sided_keys() {
        let mut left = FlowStore::new();
        left.set(key("a"), Qualifier::Positive);
        left.set(key("b"), Qualifier::Positive);
        let mut right = FlowStore::new();
        right.set(key("a"), Qualifier::NonNegative);
        right.set(key("c"), Qualifier::Positive);

        assert!(left.merge_changed(&right));
        assert_eq!(left.get(&key("a")), Qualifier::NonNegative);
        assert_eq!(left.get(&key("b")), Qualifier::Unknown);
        assert_eq!(left.get(&key("c")), Qualifier::Unknown);
        assert!(!left.merge_changed(&right));
    }

    #[test]
    fn test_bottom_is_merge_identity() {
        let mut left = FlowStore::new();
        left.set(key("a"), Qualifier::Bottom);
        let mut right = FlowStore::new();
        right.set(key("a"), Qualifier::NonNegative);
        left.merge(&right);
        assert_eq!(left.get(&key("a")), Qualifier::NonNegative);
    }

    #[test]
    fn test_sorted_facts() {
        let mut store = FlowStore::new();
        store.set(key("z"), Qualifier::Positive);
        store.set(key("a"), Qualifier::NonNegative);
        let names: Vec<_> = store
            .sorted_facts()
            .into_iter()
            .map(|(k, _)| k.text().to_string())
            .collect();
        assert_eq!(names, vec!["a", "z"]);
    }
}
