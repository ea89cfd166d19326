//! Expression identity used as a store key.

use super::core::Expr;
use serde::{Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Canonical identity of a source expression.
///
/// Two keys are equal when their canonical text is equal; the span is not
/// part of the identity. The key also remembers which variables the
/// expression reads so that an assignment can drop stale facts.
#[derive(Debug, Clone)]
pub struct ExprKey {
    text: String,
    mentions: BTreeSet<String>,
}

impl ExprKey {
    pub fn of(expr: &Expr) -> Self {
        Self {
            text: expr.to_string(),
            mentions: expr.mentions().into_iter().map(str::to_string).collect(),
        }
    }

    /// Key of a plain variable.
    pub fn variable(name: &str) -> Self {
        Self {
            text: name.to_string(),
            mentions: BTreeSet::from([name.to_string()]),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn mentions(&self, name: &str) -> bool {
        self.mentions.contains(name)
    }
}

impl PartialEq for ExprKey {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for ExprKey {}

impl Hash for ExprKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.text.hash(state);
    }
}

impl fmt::Display for ExprKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl Serialize for ExprKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text)
    }
}
