//! Named-Result Cache - Feature 결과 메모이제이션 (outer layer)
//!
//! 이름 있는 Feature의 결과를 `ResultIndex`에 기록하고, 미스일 때만
//! 내부 `CalculationCache`에 위임합니다.
//!
//! - 이름 없는 Feature: 메모이제이션 없이 항상 재계산
//! - 식별자 조회: 접두사 제거 → 이름 테이블 → 등록 Feature → 내부 캐시

use super::{
    CalculationCache, CalculationContext, ChildCacheFactory, ResultIndex, SessionCache,
};
use crate::feature::{FeatureList, FeatureRef};
use crate::registry::SharedFeatures;
use featurecalc_foundation::{
    CacheSettings, ChildCacheName, FeatureInitParams, FeatureInput, InputType, ResettableSet,
    Result,
};
use std::collections::HashSet;
use tracing::{debug, trace, warn};

// ============================================================================
// CacheStats
// ============================================================================

/// Lookup counters of a [`NamedResultCache`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Named feature found in the index
    pub hits: u64,
    /// Named feature evaluated and stored
    pub misses: u64,
    /// Unnamed feature evaluated without memoization
    pub bypassed: u64,
    /// Identifier answered straight from the name table
    pub identifier_hits: u64,
}

impl CacheStats {
    /// Hits over hits plus misses; 0.0 before any lookup
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

// ============================================================================
// NamedResultCache
// ============================================================================

/// Outer session cache memoizing the results of named features
pub struct NamedResultCache {
    delegate: CalculationCache,
    index: ResultIndex,
    named: FeatureList,
    settings: CacheSettings,
    stats: CacheStats,
}

impl NamedResultCache {
    /// Wrap `delegate`, registering the names of `named` then of `shared`
    ///
    /// When two features carry the same name the first one registered keeps it.
    pub fn new(
        delegate: CalculationCache,
        named: FeatureList,
        shared: &SharedFeatures,
        settings: CacheSettings,
    ) -> Self {
        let mut index = ResultIndex::new();
        index.register_all(&named);
        index.register_all(shared);
        debug!(
            "Named result cache for '{}': {} names registered",
            delegate.input_type(),
            index.registered_len()
        );
        Self {
            delegate,
            index,
            named,
            settings,
            stats: CacheStats::default(),
        }
    }

    pub fn input_type(&self) -> InputType {
        self.delegate.input_type()
    }

    pub fn index(&self) -> &ResultIndex {
        &self.index
    }

    pub fn delegate(&self) -> &CalculationCache {
        &self.delegate
    }

    pub fn settings(&self) -> &CacheSettings {
        &self.settings
    }

    /// Features this cache was created for
    pub fn features(&self) -> &FeatureList {
        &self.named
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = CacheStats::default();
    }

    /// Independent copy with its own index and delegate
    pub fn duplicate(&self) -> Self {
        Self {
            delegate: self.delegate.duplicate(),
            index: self.index.clone(),
            named: self.named.clone(),
            settings: self.settings.clone(),
            stats: self.stats.clone(),
        }
    }

    fn store(&mut self, feature: &FeatureRef, name: &str, value: f64) {
        if value.is_nan() && self.settings.warn_on_nan {
            warn!("Feature '{}' evaluated to NaN", name);
        }
        self.index.add(feature, name, value);
    }
}

impl CalculationContext for NamedResultCache {
    /// Memoized value of a named feature; unnamed features are always evaluated
    ///
    /// Both kinds are evaluated with this cache as their context rather than
    /// the wrapped cache, so features they request by reference or identifier
    /// are memoized here as well.
    fn calculate(&mut self, feature: &FeatureRef, input: &dyn FeatureInput) -> Result<f64> {
        self.delegate.ensure_initialized()?;

        let Some(name) = feature.custom_name().map(str::to_owned) else {
            if self.settings.track_statistics {
                self.stats.bypassed += 1;
            }
            return feature.evaluate(input, self);
        };

        if let Some(value) = self.index.result_for_feature(feature) {
            if self.settings.track_statistics {
                self.stats.hits += 1;
            }
            return Ok(value);
        }

        if self.settings.track_statistics {
            self.stats.misses += 1;
        }
        trace!("Evaluating '{}'", name);
        // 자기 자신을 컨텍스트로: 의존 Feature도 메모이제이션됨
        let value = feature.evaluate(input, self)?;
        self.store(feature, &name, value);
        Ok(value)
    }

    fn calculate_by_identifier(&mut self, id: &str, input: &dyn FeatureInput) -> Result<f64> {
        self.delegate.ensure_initialized()?;

        if let Some(value) = self.index.result_for_name(id) {
            if self.settings.track_statistics {
                self.stats.identifier_hits += 1;
            }
            return Ok(value);
        }
        if let Some(feature) = self.index.feature_for(id).cloned() {
            return self.calculate(&feature, input);
        }
        self.delegate.calculate_by_identifier(id, input)
    }

    fn resolve_identifier(&self, id: &str) -> String {
        self.delegate.resolve_identifier(self.settings.strip_prefix(id))
    }

    fn parts(&mut self) -> Result<&mut ResettableSet> {
        self.delegate.parts()
    }

    fn child_cache_for(
        &mut self,
        name: &ChildCacheName,
        input_type: InputType,
        factory: &dyn ChildCacheFactory,
    ) -> Result<&mut dyn SessionCache> {
        self.delegate.child_cache_for(name, input_type, factory)
    }

    fn child_cache(
        &mut self,
        name: &ChildCacheName,
        input_type: InputType,
    ) -> Result<&mut dyn SessionCache> {
        self.delegate.child_cache(name, input_type)
    }

    fn init_params(&self) -> Option<&FeatureInitParams> {
        self.delegate.init_params()
    }
}

impl SessionCache for NamedResultCache {
    /// Start the session; features are initialized by whoever built the cache
    fn initialize(&mut self, params: FeatureInitParams) -> Result<()> {
        self.delegate.initialize(params)
    }

    fn is_initialized(&self) -> bool {
        self.delegate.is_initialized()
    }

    fn invalidate(&mut self) {
        self.index.clear();
        self.delegate.invalidate();
    }

    fn invalidate_except(&mut self, keep: &HashSet<ChildCacheName>) {
        self.index.clear();
        self.delegate.invalidate_except(keep);
    }

    fn duplicate_boxed(&self) -> Box<dyn SessionCache> {
        Box::new(self.duplicate())
    }

    fn as_context(&mut self) -> &mut dyn CalculationContext {
        self
    }
}

impl std::fmt::Debug for NamedResultCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NamedResultCache")
            .field("delegate", &self.delegate)
            .field("results", &self.index.len())
            .field("named", &self.named.len())
            .field("stats", &self.stats)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use featurecalc_foundation::Error;
    use std::any::Any;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    static CELL: InputType = InputType::root("cell");

    struct Cell {
        size: f64,
    }

    impl FeatureInput for Cell {
        fn input_type(&self) -> InputType {
            CELL
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    fn counting(name: &str, value: f64, calls: &Arc<AtomicUsize>) -> FeatureRef {
        let calls = calls.clone();
        let feature = FeatureRef::from_fn(name.to_string(), CELL, move |_, _| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(value)
        });
        if !name.is_empty() {
            feature.set_custom_name(name).unwrap();
        }
        feature
    }

    fn cache_for(named: FeatureList, settings: CacheSettings) -> NamedResultCache {
        let shared = SharedFeatures::from_list(&named);
        let delegate = CalculationCache::new(CELL, shared.clone());
        let mut cache = NamedResultCache::new(delegate, named, &shared, settings);
        cache.initialize(FeatureInitParams::new()).unwrap();
        cache
    }

    #[test]
    fn test_named_feature_memoized() {
        let calls = Arc::new(AtomicUsize::new(0));
        let area = counting("area", 4.0, &calls);
        let mut cache = cache_for(FeatureList::new().with(area.clone()), CacheSettings::default());
        let input = Cell { size: 2.0 };

        assert_eq!(cache.calculate(&area, &input).unwrap(), 4.0);
        assert_eq!(cache.calculate(&area, &input).unwrap(), 4.0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.stats().hits, 1);
        assert_eq!(cache.stats().misses, 1);
        assert_eq!(cache.index().result_for_name("area"), Some(4.0));
    }

    #[test]
    fn test_unnamed_feature_not_memoized() {
        let calls = Arc::new(AtomicUsize::new(0));
        let anonymous = counting("", 1.0, &calls);
        let mut cache = cache_for(FeatureList::new(), CacheSettings::default());
        let input = Cell { size: 1.0 };

        cache.calculate(&anonymous, &input).unwrap();
        cache.calculate(&anonymous, &input).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.stats().bypassed, 2);
        assert!(cache.index().is_empty());
    }

    #[test]
    fn test_dependencies_memoized_through_outer_cache() {
        let calls = Arc::new(AtomicUsize::new(0));
        let base = counting("base", 3.0, &calls);
        let dependent = {
            let base = base.clone();
            FeatureRef::named(
                "dependent",
                crate::feature::FnFeature::new("dependent", CELL, move |input, ctx| {
                    Ok(ctx.calculate(&base, input)? * 2.0)
                }),
            )
            .unwrap()
        };
        let mut cache = cache_for(
            FeatureList::new().with(base.clone()).with(dependent.clone()),
            CacheSettings::default(),
        );
        let input = Cell { size: 1.0 };

        assert_eq!(cache.calculate(&dependent, &input).unwrap(), 6.0);
        assert_eq!(cache.calculate(&base, &input).unwrap(), 3.0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_identifier_with_prefix() {
        let calls = Arc::new(AtomicUsize::new(0));
        let area = counting("area", 9.0, &calls);
        let settings = CacheSettings::default().with_ignore_prefix("px_");
        let mut cache = cache_for(FeatureList::new().with(area), settings);

        let resolved = cache.resolve_identifier("px_area");
        assert_eq!(resolved, "area");
        assert_eq!(
            cache
                .calculate_by_identifier(&resolved, &Cell { size: 3.0 })
                .unwrap(),
            9.0
        );
        assert_eq!(cache.index().result_for_name("area"), Some(9.0));
    }

    #[test]
    fn test_identifier_hit_after_calculation() {
        let calls = Arc::new(AtomicUsize::new(0));
        let area = counting("area", 2.0, &calls);
        let mut cache = cache_for(FeatureList::new().with(area), CacheSettings::default());
        let input = Cell { size: 1.0 };

        cache.calculate_by_identifier("area", &input).unwrap();
        cache.calculate_by_identifier("area", &input).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.stats().identifier_hits, 1);
    }

    #[test]
    fn test_unresolved_identifier_leaves_no_trace() {
        let mut cache = cache_for(FeatureList::new(), CacheSettings::default());
        let err = cache
            .calculate_by_identifier("nothing", &Cell { size: 1.0 })
            .unwrap_err();

        assert!(matches!(err, Error::UnresolvedIdentifier(_)));
        assert!(cache.index().is_empty());
        assert_eq!(cache.index().result_for_name("nothing"), None);
    }

    #[test]
    fn test_invalidate_forgets_results() {
        let calls = Arc::new(AtomicUsize::new(0));
        let area = counting("area", 1.0, &calls);
        let mut cache = cache_for(FeatureList::new().with(area.clone()), CacheSettings::default());
        let input = Cell { size: 1.0 };

        cache.calculate(&area, &input).unwrap();
        cache.invalidate();
        assert!(cache.index().is_empty());
        assert_eq!(cache.index().registered_len(), 1);

        cache.calculate(&area, &input).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_reads_input() {
        let size = FeatureRef::named(
            "size",
            crate::feature::FnFeature::new("size", CELL, |input, _| {
                let cell = featurecalc_foundation::downcast_input::<Cell>(input, "size")?;
                Ok(cell.size)
            }),
        )
        .unwrap();
        let mut cache = cache_for(FeatureList::new().with(size.clone()), CacheSettings::default());

        assert_eq!(cache.calculate(&size, &Cell { size: 5.0 }).unwrap(), 5.0);
        cache.invalidate();
        assert_eq!(cache.calculate(&size, &Cell { size: 7.0 }).unwrap(), 7.0);
    }

    #[test]
    fn test_uninitialized_cache_fails() {
        let delegate = CalculationCache::new(CELL, SharedFeatures::new());
        let mut cache = NamedResultCache::new(
            delegate,
            FeatureList::new(),
            &SharedFeatures::new(),
            CacheSettings::default(),
        );
        let feature = FeatureRef::from_fn("one", CELL, |_, _| Ok(1.0));

        assert!(matches!(
            cache.calculate(&feature, &Cell { size: 1.0 }),
            Err(Error::Uninitialized(_))
        ));
    }

    #[test]
    fn test_statistics_can_be_disabled() {
        let calls = Arc::new(AtomicUsize::new(0));
        let area = counting("area", 1.0, &calls);
        let settings = CacheSettings {
            track_statistics: false,
            ..CacheSettings::default()
        };
        let mut cache = cache_for(FeatureList::new().with(area.clone()), settings);

        cache.calculate(&area, &Cell { size: 1.0 }).unwrap();
        assert_eq!(cache.stats(), &CacheStats::default());
        assert_eq!(CacheStats::default().hit_rate(), 0.0);
    }
}
