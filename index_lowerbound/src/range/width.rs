//! Integer widths and the overflow policy used when narrowing ranges.

use super::Range;
use serde::{Deserialize, Serialize};

/// How arithmetic that leaves the representable range is modelled.
///
/// - `Wrap`: two's-complement wrap-around, e.g. `i32::MAX + 1 == i32::MIN`.
/// - `Saturate`: out-of-range bounds are clipped to the extremal values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverflowPolicy {
    #[default]
    Wrap,
    Saturate,
}

/// A primitive integral width of the host language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntWidth {
    Byte,
    Short,
    /// Unsigned 16-bit character.
    Char,
    #[default]
    Int,
    Long,
}

impl IntWidth {
    /// The range of every value representable in this width.
    pub fn everything(self) -> Range {
        match self {
            IntWidth::Byte => Range::BYTE_EVERYTHING,
            IntWidth::Short => Range::SHORT_EVERYTHING,
            IntWidth::Char => Range::CHAR_EVERYTHING,
            IntWidth::Int => Range::INT_EVERYTHING,
            IntWidth::Long => Range::LONG_EVERYTHING,
        }
    }

    /// Largest shift count that is not masked by the host's shift semantics.
    ///
    /// Narrow operands are promoted to 32 bits before shifting, so only `Long`
    /// uses the 6-bit mask.
    pub fn max_shift(self) -> i64 {
        match self {
            IntWidth::Long => 63,
            _ => 31,
        }
    }

    /// Reinterprets the low bits of `value` in this width.
    pub(crate) fn wrap(self, value: i64) -> i64 {
        match self {
            IntWidth::Byte => i64::from(value as i8),
            IntWidth::Short => i64::from(value as i16),
            IntWidth::Char => i64::from(value as u16),
            IntWidth::Int => i64::from(value as i32),
            IntWidth::Long => value,
        }
    }
}
