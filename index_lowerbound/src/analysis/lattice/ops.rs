//! Lattice operations on qualifiers.
//!
//! - glb (⊓): the more precise of two qualifiers
//! - lub (⊔): the less precise of two qualifiers
//! - promote / demote: the qualifier of `x + 1` / `x - 1`

use super::types::Qualifier;

impl Qualifier {
    /// Greatest lower bound: both facts hold.
    ///
    /// # Examples
    /// ```text
    /// Positive.glb(Unknown) = Positive
    /// NonNegative.glb(AtLeastNegOne) = NonNegative
    /// Bottom.glb(T) = Bottom
    /// ```
    pub fn glb(self, other: Qualifier) -> Qualifier {
        self.min(other)
    }

    /// Least upper bound: one of the facts holds.
    ///
    /// # Examples
    /// ```text
    /// Positive.lub(NonNegative) = NonNegative
    /// Bottom.lub(T) = T
    /// T.lub(Unknown) = Unknown
    /// ```
    pub fn lub(self, other: Qualifier) -> Qualifier {
        self.max(other)
    }

    /// Qualifier of a value one greater.
    pub fn promote(self) -> Qualifier {
        match self {
            Qualifier::Bottom => Qualifier::Bottom,
            Qualifier::Positive | Qualifier::NonNegative => Qualifier::Positive,
            Qualifier::AtLeastNegOne => Qualifier::NonNegative,
            Qualifier::Unknown => Qualifier::Unknown,
        }
    }

    /// Qualifier of a value one smaller.
    pub fn demote(self) -> Qualifier {
        match self {
            Qualifier::Bottom => Qualifier::Bottom,
            Qualifier::Positive => Qualifier::NonNegative,
            Qualifier::NonNegative => Qualifier::AtLeastNegOne,
            Qualifier::AtLeastNegOne | Qualifier::Unknown => Qualifier::Unknown,
        }
    }
}
