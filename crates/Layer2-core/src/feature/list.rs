//! Ordered feature lists

use super::{Feature, FeatureRef};
use featurecalc_foundation::{InputType, Result};

/// Ordered list of features declared for a session
#[derive(Debug, Clone, Default)]
pub struct FeatureList {
    features: Vec<FeatureRef>,
}

impl FeatureList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, feature: FeatureRef) {
        self.features.push(feature);
    }

    /// Append a feature
    pub fn with(mut self, feature: FeatureRef) -> Self {
        self.push(feature);
        self
    }

    /// Append a feature, assigning its custom name
    pub fn with_named(
        mut self,
        name: impl Into<String>,
        feature: impl Feature + 'static,
    ) -> Result<Self> {
        self.push(FeatureRef::named(name, feature)?);
        Ok(self)
    }

    /// Features that can be calculated on inputs of `input_type`
    pub fn filter_compatible(&self, input_type: InputType) -> FeatureList {
        self.features
            .iter()
            .filter(|f| f.is_compatible_with(input_type))
            .cloned()
            .collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FeatureRef> {
        self.features.iter()
    }

    pub fn get(&self, index: usize) -> Option<&FeatureRef> {
        self.features.get(index)
    }

    /// Display names in list order
    pub fn names(&self) -> Vec<String> {
        self.features.iter().map(FeatureRef::display_name).collect()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

impl FromIterator<FeatureRef> for FeatureList {
    fn from_iter<I: IntoIterator<Item = FeatureRef>>(iter: I) -> Self {
        Self {
            features: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a FeatureList {
    type Item = &'a FeatureRef;
    type IntoIter = std::slice::Iter<'a, FeatureRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.features.iter()
    }
}

impl From<Vec<FeatureRef>> for FeatureList {
    fn from(features: Vec<FeatureRef>) -> Self {
        Self { features }
    }
}
