//! Cache configuration

use crate::storage::JsonStore;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Settings file name inside a [`JsonStore`]
pub const SETTINGS_FILE: &str = "feature-cache.json";

/// Feature cache settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Prefixes stripped from symbolic identifiers, checked in order
    ///
    /// The first matching prefix is removed; the rest are not consulted.
    #[serde(default = "default_ignore_prefixes")]
    pub ignore_prefixes: Vec<String>,

    /// Log a warning when a named feature evaluates to NaN
    #[serde(default = "default_warn_on_nan")]
    pub warn_on_nan: bool,

    /// Count memoization hits and misses
    #[serde(default = "default_track_statistics")]
    pub track_statistics: bool,
}

// Default value functions
fn default_ignore_prefixes() -> Vec<String> {
    Vec::new()
}
fn default_warn_on_nan() -> bool {
    true
}
fn default_track_statistics() -> bool {
    true
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ignore_prefixes: default_ignore_prefixes(),
            warn_on_nan: default_warn_on_nan(),
            track_statistics: default_track_statistics(),
        }
    }
}

impl CacheSettings {
    /// Settings with every optional behavior switched off
    pub fn minimal() -> Self {
        Self {
            ignore_prefixes: Vec::new(),
            warn_on_nan: false,
            track_statistics: false,
        }
    }

    /// Append an ignore-prefix (checked after the existing ones)
    pub fn with_ignore_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.ignore_prefixes.push(prefix.into());
        self
    }

    /// Strip the first matching ignore-prefix from `id`
    pub fn strip_prefix<'a>(&self, id: &'a str) -> &'a str {
        self.ignore_prefixes
            .iter()
            .filter(|prefix| !prefix.is_empty())
            .find_map(|prefix| id.strip_prefix(prefix.as_str()))
            .unwrap_or(id)
    }

    /// Load settings from a store, falling back to defaults when the file is absent
    pub fn load_from(store: &JsonStore) -> Result<Self> {
        match store.load_optional(SETTINGS_FILE)? {
            Some(settings) => Ok(settings),
            None => {
                debug!(
                    "No {} in {}, using defaults",
                    SETTINGS_FILE,
                    store.base_dir().display()
                );
                Ok(Self::default())
            }
        }
    }

    /// Save settings into a store
    pub fn save_to(&self, store: &JsonStore) -> Result<()> {
        store.save(SETTINGS_FILE, self)
    }

    /// Parse settings from a TOML document (e.g. a `[feature_cache]` table of a larger config)
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Config(format!("Invalid cache settings: {}", e)))
    }
}
