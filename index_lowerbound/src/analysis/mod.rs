//! Lower-bound analysis.
//!
//! # Module structure
//!
//! - `lattice`: the qualifier chain and its operations
//! - `classify`: flow-insensitive introduction rules
//! - `tfuncs`: per-operator transfer functions
//! - `abstract_interp`: stores, branch refinement and the fixed-point engine
//! - `verify`: reports sites whose lower bound is not proven

pub mod abstract_interp;
pub mod classify;
pub mod lattice;
pub mod tfuncs;
pub mod verify;

pub use abstract_interp::LowerBoundEngine;
pub use classify::ExpressionClassifier;
pub use lattice::Qualifier;
pub use verify::VerificationPass;
