//! Cache utilities
//!
//! Provides caching primitives for FeatureCalc:
//! - `ResettableSet`: Deduplicating registry for shared sub-computations

mod resettable;

pub use resettable::{Deduplicate, ResettableSet, ResettableSetStats};
