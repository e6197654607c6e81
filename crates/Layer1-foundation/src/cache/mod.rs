//! # FeatureCalc Cache Primitives
//!
//! Building blocks shared by the session caches in `featurecalc-core`.
//!
//! ## Modules
//!
//! - [`config`] - Cache settings (ignore-prefixes, NaN warnings, statistics)
//! - [`util`] - Utilities (deduplicating registry)

pub mod config;
pub mod util;

pub use config::{CacheSettings, SETTINGS_FILE};
pub use util::{Deduplicate, ResettableSet, ResettableSetStats};
