//! Lower-bound analysis of sequence indices.
//!
//! Proves that integer expressions used to index fixed-length sequences are
//! never negative, and reports every access, creation dimension and subrange
//! start where that cannot be shown.

// Library code reports through `log` and the diagnostics collector only.
#![deny(clippy::print_stderr)]

// Leaf modules
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod range;
pub mod span;

// Host IR and the facts other analyses supply about it
pub mod facts;
pub mod ir;

// Lattice, transfer functions, engine and verification
pub mod analysis;

// Reports and the entry points that produce them
pub mod api;
pub mod report;

pub use analysis::Qualifier;
pub use api::{analyze_routine, analyze_routine_json};
pub use config::AnalysisConfig;
pub use error::{AnalysisError, ApiError, ConfigError};
pub use range::{Range, RangeDomain};
pub use report::{AnalysisReport, Violation, ViolationKind};
