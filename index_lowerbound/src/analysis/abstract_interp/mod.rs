//! Flow-sensitive lower-bound inference.
//!
//! # Module structure
//!
//! - `store`: [`FlowStore`], the qualifier facts at one program point
//! - `conditional`: store splitting by branch conditions
//! - `engine`: worklist fixed point over a routine's blocks

pub mod conditional;
pub mod engine;
pub mod store;

pub use conditional::{split_store_by_condition, SplitStore};
pub use engine::{BlockStates, CheckedSite, LowerBoundEngine, SiteSink};
pub use store::{BoundFact, FlowStore};
