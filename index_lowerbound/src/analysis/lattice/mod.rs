//! Lower-bound qualifier lattice.
//!
//! # Module structure
//!
//! - `types`: the `Qualifier` chain and its introduction from constants and
//!   declarations
//! - `ops`: glb, lub, promote, demote

pub mod ops;
pub mod types;

pub use types::Qualifier;
