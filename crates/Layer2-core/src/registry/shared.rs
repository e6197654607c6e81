//! Shared Features - 식별자 기반 Feature 레지스트리

use crate::feature::{FeatureList, FeatureRef, Initializer};
use featurecalc_foundation::{Error, FeatureInitParams, InputType, Result};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Registry of features addressable by identifier
///
/// The identifier of a feature is its custom name. The first feature
/// registered under an identifier keeps it.
#[derive(Debug, Clone, Default)]
pub struct SharedFeatures {
    order: Vec<FeatureRef>,
    by_identifier: HashMap<String, FeatureRef>,
}

impl SharedFeatures {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every named feature of `list`
    pub fn from_list(list: &FeatureList) -> Self {
        let mut shared = Self::new();
        for feature in list {
            shared.insert(feature.clone());
        }
        shared
    }

    /// Register a feature under its custom name
    ///
    /// Returns `false` when the feature is unnamed or the name is taken.
    pub fn insert(&mut self, feature: FeatureRef) -> bool {
        let Some(identifier) = feature.custom_name().map(str::to_string) else {
            debug!("Skipping unnamed shared feature {}", feature);
            return false;
        };
        if self.by_identifier.contains_key(&identifier) {
            debug!("Shared identifier '{}' already registered, ignoring {}", identifier, feature);
            return false;
        }
        self.by_identifier.insert(identifier, feature.clone());
        self.order.push(feature);
        true
    }

    /// Feature registered under `id`
    pub fn lookup_by_identifier(&self, id: &str) -> Result<FeatureRef> {
        self.by_identifier
            .get(id)
            .cloned()
            .ok_or_else(|| Error::UnresolvedIdentifier(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_identifier.contains_key(id)
    }

    /// Features calculable on inputs of `input_type`, in registration order
    pub fn subset_compatible_with(&self, input_type: InputType) -> SharedFeatures {
        self.subset(|f| f.is_compatible_with(input_type))
    }

    /// Initialize every feature and its dependencies
    ///
    /// All features are attempted. Failures are reported together as
    /// [`Error::SharedInitialization`].
    pub fn initialize_recursive(&self, params: &FeatureInitParams) -> Result<()> {
        let failed = self.initialize_with(&mut Initializer::new(params));
        if failed.is_empty() {
            Ok(())
        } else {
            Err(Error::SharedInitialization(failed))
        }
    }

    /// Initialize every feature within `pass`, returning the identifiers that failed
    pub fn initialize_with(&self, pass: &mut Initializer<'_>) -> Vec<String> {
        let mut failed = Vec::new();
        for feature in &self.order {
            if let Err(e) = pass.run(feature) {
                warn!("Shared feature {} failed to initialize: {}", feature, e);
                failed.push(feature.display_name());
            }
        }
        failed
    }

    /// Features that initialized successfully in `pass`
    pub fn retain_succeeded(&self, pass: &Initializer<'_>) -> SharedFeatures {
        self.subset(|f| pass.succeeded(f))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FeatureRef> {
        self.order.iter()
    }

    /// Identifiers in registration order
    pub fn identifiers(&self) -> Vec<String> {
        self.order.iter().map(FeatureRef::display_name).collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    fn subset(&self, mut keep: impl FnMut(&FeatureRef) -> bool) -> SharedFeatures {
        let mut subset = SharedFeatures::new();
        for feature in self.order.iter().filter(|f| keep(f)) {
            subset.insert(feature.clone());
        }
        subset
    }
}

impl<'a> IntoIterator for &'a SharedFeatures {
    type Item = &'a FeatureRef;
    type IntoIter = std::slice::Iter<'a, FeatureRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.order.iter()
    }
}
