//! Result Index - 마지막 계산 결과 조회 테이블
//!
//! 세 개의 테이블:
//! - Feature ID → 결과
//! - 이름 → 결과
//! - 이름 → Feature (등록 테이블, 무효화 대상 아님)

use crate::feature::FeatureRef;
use featurecalc_foundation::FeatureId;
use std::collections::HashMap;
use tracing::debug;

/// Last computed values, indexed by feature identity and by name
#[derive(Debug, Clone, Default)]
pub struct ResultIndex {
    by_feature: HashMap<FeatureId, f64>,
    by_name: HashMap<String, f64>,
    features_by_name: HashMap<String, FeatureRef>,
}

impl ResultIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `value` for `feature`, and under `name` when non-empty
    pub fn add(&mut self, feature: &FeatureRef, name: &str, value: f64) {
        self.by_feature.insert(feature.id(), value);
        if !name.is_empty() {
            self.by_name.insert(name.to_string(), value);
        }
    }

    pub fn result_for_feature(&self, feature: &FeatureRef) -> Option<f64> {
        self.by_feature.get(&feature.id()).copied()
    }

    pub fn result_for_name(&self, name: &str) -> Option<f64> {
        self.by_name.get(name).copied()
    }

    /// Feature registered under `name`
    pub fn feature_for(&self, name: &str) -> Option<&FeatureRef> {
        self.features_by_name.get(name)
    }

    /// Bind a feature's custom name to the feature
    ///
    /// A name already bound keeps its first feature; the new registration is
    /// ignored. Returns whether the feature was bound.
    // TODO: decide whether a second feature under a bound name should be rejected
    pub fn register_feature(&mut self, feature: &FeatureRef) -> bool {
        let Some(name) = feature.custom_name() else {
            return false;
        };
        match self.features_by_name.get(name) {
            Some(existing) => {
                if existing != feature {
                    debug!("Name '{}' already bound to {}, ignoring {}", name, existing, feature);
                }
                false
            }
            None => {
                self.features_by_name.insert(name.to_string(), feature.clone());
                true
            }
        }
    }

    pub fn register_all<'a>(&mut self, features: impl IntoIterator<Item = &'a FeatureRef>) {
        for feature in features {
            self.register_feature(feature);
        }
    }

    /// Forget every stored result, by identity and by name
    ///
    /// Name registrations are kept.
    pub fn clear(&mut self) {
        self.by_feature.clear();
        self.by_name.clear();
    }

    /// Number of results stored by identity
    pub fn len(&self) -> usize {
        self.by_feature.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_feature.is_empty() && self.by_name.is_empty()
    }

    pub fn registered_len(&self) -> usize {
        self.features_by_name.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use featurecalc_foundation::InputType;

    static OBJECT: InputType = InputType::root("object");

    fn feature(name: Option<&str>) -> FeatureRef {
        let f = FeatureRef::from_fn("test", OBJECT, |_, _| Ok(0.0));
        if let Some(name) = name {
            f.set_custom_name(name).unwrap();
        }
        f
    }

    #[test]
    fn test_add_records_both_keys() {
        let mut index = ResultIndex::new();
        let area = feature(Some("area"));

        index.add(&area, "area", 12.5);

        assert_eq!(index.result_for_feature(&area), Some(12.5));
        assert_eq!(index.result_for_name("area"), Some(12.5));
        assert_eq!(index.result_for_name("perimeter"), None);
    }

    #[test]
    fn test_empty_name_only_identity() {
        let mut index = ResultIndex::new();
        let anon = feature(None);

        index.add(&anon, "", 3.0);

        assert_eq!(index.result_for_feature(&anon), Some(3.0));
        assert_eq!(index.result_for_name(""), None);
    }

    #[test]
    fn test_nan_is_a_stored_value() {
        let mut index = ResultIndex::new();
        let f = feature(Some("ratio"));

        index.add(&f, "ratio", f64::NAN);

        assert!(index.result_for_feature(&f).is_some_and(f64::is_nan));
    }

    #[test]
    fn test_overwrite() {
        let mut index = ResultIndex::new();
        let f = feature(Some("area"));

        index.add(&f, "area", 1.0);
        index.add(&f, "area", 2.0);

        assert_eq!(index.result_for_feature(&f), Some(2.0));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_duplicate_name_first_binding_wins() {
        let mut index = ResultIndex::new();
        let first = feature(Some("area"));
        let second = feature(Some("area"));

        assert!(index.register_feature(&first));
        assert!(!index.register_feature(&second));

        assert_eq!(index.feature_for("area"), Some(&first));
        assert_eq!(index.registered_len(), 1);
    }

    #[test]
    fn test_clear_removes_results_keeps_registrations() {
        let mut index = ResultIndex::new();
        let f = feature(Some("area"));
        index.register_feature(&f);
        index.add(&f, "area", 4.0);

        index.clear();

        assert!(index.is_empty());
        assert_eq!(index.result_for_feature(&f), None);
        assert_eq!(index.result_for_name("area"), None);
        assert_eq!(index.feature_for("area"), Some(&f));
    }
}
