//! Cache Factory - 입력 타입별 세션 캐시 생성
//!
//! 생성 순서:
//! 1. 입력 타입과 호환되는 Feature / 공유 Feature만 선택
//! 2. 공유 Feature와 이름 있는 Feature를 한 패스로 초기화 (실패한 것은 경고 후 제외)
//! 3. `CalculationCache` → `NamedResultCache` 조립 후 세션 초기화

use super::{CalculationCache, ChildCacheFactory, NamedResultCache, SessionCache};
use crate::feature::{FeatureList, Initializer};
use crate::registry::SharedFeatures;
use featurecalc_foundation::{CacheSettings, FeatureInitParams, InputType, Result};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Builds ready-to-use session caches for a fixed set of features
#[derive(Debug, Clone)]
pub struct CacheFactory {
    features: FeatureList,
    shared: SharedFeatures,
    params: FeatureInitParams,
    settings: CacheSettings,
}

impl CacheFactory {
    pub fn new(features: FeatureList, shared: SharedFeatures, params: FeatureInitParams) -> Self {
        Self {
            features,
            shared,
            params,
            settings: CacheSettings::default(),
        }
    }

    /// Factory whose features are also the shared features
    pub fn from_features(features: FeatureList, params: FeatureInitParams) -> Self {
        let shared = SharedFeatures::from_list(&features);
        Self::new(features, shared, params)
    }

    pub fn with_settings(mut self, settings: CacheSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn features(&self) -> &FeatureList {
        &self.features
    }

    pub fn shared(&self) -> &SharedFeatures {
        &self.shared
    }

    pub fn settings(&self) -> &CacheSettings {
        &self.settings
    }

    /// Initialized cache for inputs of `input_type`
    ///
    /// Features that fail to initialize, or depend on one that does, are
    /// left out of the cache with a warning.
    pub fn create(&self, input_type: InputType) -> Result<NamedResultCache> {
        let candidates = self.features.filter_compatible(input_type);
        let shared = self.shared.subset_compatible_with(input_type);

        let mut pass = Initializer::new(&self.params);
        let mut failed = shared.initialize_with(&mut pass);
        for feature in &candidates {
            if let Err(e) = pass.run(feature) {
                let name = feature.display_name();
                if !failed.contains(&name) {
                    warn!("Feature {} failed to initialize: {}", feature, e);
                    failed.push(name);
                }
            }
        }

        let (features, shared) = if failed.is_empty() {
            (candidates, shared)
        } else {
            warn!(
                "Continuing without features that failed to initialize: {}",
                failed.join(", ")
            );
            (pass.retain_succeeded(&candidates), shared.retain_succeeded(&pass))
        };

        debug!(
            "Creating cache for '{}': {} features, {} shared",
            input_type,
            features.len(),
            shared.len()
        );

        let delegate = CalculationCache::new(input_type, shared.clone())
            .with_child_factory(Arc::new(self.clone()));
        let mut cache = NamedResultCache::new(delegate, features, &shared, self.settings.clone());
        cache.initialize(self.params.clone())?;

        info!("Cache for '{}' ready", input_type);
        Ok(cache)
    }
}

impl ChildCacheFactory for CacheFactory {
    fn create_cache(&self, input_type: InputType) -> Result<Box<dyn SessionCache>> {
        Ok(Box::new(self.create(input_type)?))
    }
}
