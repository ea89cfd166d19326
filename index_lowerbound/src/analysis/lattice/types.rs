//! The lower-bound qualifier chain.
//!
//! ```text
//!   Unknown          any value
//!      |
//!   AtLeastNegOne    >= -1
//!      |
//!   NonNegative      >= 0
//!      |
//!   Positive         >= 1
//!      |
//!   Bottom           no value (unreachable)
//! ```
//!
//! The derived `Ord` follows the chain, so `a <= b` means `a` is at least as
//! precise as `b`.

use crate::ir::DeclaredBound;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Qualifier {
    Bottom,
    Positive,
    NonNegative,
    AtLeastNegOne,
    Unknown,
}

impl Qualifier {
    /// The most precise qualifier that holds for the constant `value`.
    pub fn from_constant(value: i64) -> Qualifier {
        if value >= 1 {
            Qualifier::Positive
        } else if value >= 0 {
            Qualifier::NonNegative
        } else if value >= -1 {
            Qualifier::AtLeastNegOne
        } else {
            Qualifier::Unknown
        }
    }

    /// The lower bound implied by a declared annotation.
    pub fn from_declared(bound: DeclaredBound) -> Qualifier {
        match bound {
            DeclaredBound::Positive => Qualifier::Positive,
            DeclaredBound::NonNegative
            | DeclaredBound::IndexFor
            | DeclaredBound::IndexOrHigh
            | DeclaredBound::LengthOf => Qualifier::NonNegative,
            DeclaredBound::GteNegativeOne
            | DeclaredBound::IndexOrLow
            | DeclaredBound::SubstringIndexFor => Qualifier::AtLeastNegOne,
        }
    }

    /// Whether every value is `>= 1`. Bottom satisfies every bound.
    pub fn is_positive(self) -> bool {
        self <= Qualifier::Positive
    }

    /// Whether every value is `>= 0`.
    pub fn is_non_negative(self) -> bool {
        self <= Qualifier::NonNegative
    }

    /// Whether every value is `>= -1`.
    pub fn is_at_least_neg_one(self) -> bool {
        self <= Qualifier::AtLeastNegOne
    }
}

impl fmt::Display for Qualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Qualifier::Bottom => "Bottom",
            Qualifier::Positive => "Positive",
            Qualifier::NonNegative => "NonNegative",
            Qualifier::AtLeastNegOne => "GTENegativeOne",
            Qualifier::Unknown => "LowerBoundUnknown",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_constant() {
        assert_eq!(Qualifier::from_constant(i64::MAX), Qualifier::Positive);
        assert_eq!(Qualifier::from_constant(1), Qualifier::Positive);
        assert_eq!(Qualifier::from_constant(0), Qualifier::NonNegative);
        assert_eq!(Qualifier::from_constant(-1), Qualifier::AtLeastNegOne);
        assert_eq!(Qualifier::from_constant(-2), Qualifier::Unknown);
        assert_eq!(Qualifier::from_constant(i64::MIN), Qualifier::Unknown);
    }

    #[test]
    fn test_from_declared_aliases() {
        assert_eq!(Qualifier::from_declared(DeclaredBound::IndexFor), Qualifier::NonNegative);
        assert_eq!(Qualifier::from_declared(DeclaredBound::IndexOrHigh), Qualifier::NonNegative);
        assert_eq!(Qualifier::from_declared(DeclaredBound::LengthOf), Qualifier::NonNegative);
        assert_eq!(Qualifier::from_declared(DeclaredBound::IndexOrLow), Qualifier::AtLeastNegOne);
        assert_eq!(
            Qualifier::from_declared(DeclaredBound::SubstringIndexFor),
            Qualifier::AtLeastNegOne
        );
        assert_eq!(Qualifier::from_declared(DeclaredBound::Positive), Qualifier::Positive);
    }

    #[test]
    fn test_chain_order() {
        assert!(Qualifier::Bottom < Qualifier::Positive);
        assert!(Qualifier::Positive < Qualifier::NonNegative);
        assert!(Qualifier::NonNegative < Qualifier::AtLeastNegOne);
        assert!(Qualifier::AtLeastNegOne < Qualifier::Unknown);
    }

    #[test]
    fn test_predicates_include_more_precise() {
        assert!(Qualifier::Bottom.is_positive());
        assert!(Qualifier::Positive.is_non_negative());
        assert!(!Qualifier::AtLeastNegOne.is_non_negative());
        assert!(Qualifier::NonNegative.is_at_least_neg_one());
        assert!(!Qualifier::Unknown.is_at_least_neg_one());
    }
}
