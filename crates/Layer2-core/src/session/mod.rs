//! # Session Caches
//!
//! Memoization for one evaluation session over one input at a time.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CacheFactory::create(input_type)                           │
//! │       │                                                      │
//! │       ▼                                                      │
//! │  NamedResultCache          ResultIndex (id / name → value)   │
//! │       │ miss                                                 │
//! │       ▼                                                      │
//! │  CalculationCache          ResettableSet (calculation parts) │
//! │       │                                                      │
//! │       └── child caches (ChildCacheName, InputType) → cache   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! `invalidate()` on the outer cache clears every layer and every child in
//! one call. `invalidate_except()` leaves the named children untouched.
//!
//! Caches are single-threaded. To evaluate in parallel, give each thread its
//! own copy from [`SessionCache::duplicate_boxed`].

mod calculation;
mod factory;
mod named;
mod part;
mod result_index;

pub use calculation::{CacheState, CalculationCache};
pub use factory::CacheFactory;
pub use named::{CacheStats, NamedResultCache};
pub use part::{CalculationPart, CalculationPartMap, ResolvedPart, ResolvedPartMap};
pub use result_index::ResultIndex;

use crate::feature::FeatureRef;
use featurecalc_foundation::{
    ChildCacheName, FeatureInitParams, FeatureInput, InputType, ResettableSet, Result,
};
use std::collections::HashSet;
use std::sync::Arc;

// ============================================================================
// CalculationContext - Feature가 보는 인터페이스
// ============================================================================

/// What a feature sees while it is being evaluated
pub trait CalculationContext {
    /// Value of `feature` for `input`
    fn calculate(&mut self, feature: &FeatureRef, input: &dyn FeatureInput) -> Result<f64>;

    /// Value of the feature known as `id`
    ///
    /// Fails with `UnresolvedIdentifier` when no layer knows `id`.
    fn calculate_by_identifier(&mut self, id: &str, input: &dyn FeatureInput) -> Result<f64>;

    /// Canonical form of a symbolic identifier
    fn resolve_identifier(&self, id: &str) -> String;

    /// Registry of shared calculation parts for the current session
    fn parts(&mut self) -> Result<&mut ResettableSet>;

    /// Nested cache for `name`, created by `factory` on first request
    fn child_cache_for(
        &mut self,
        name: &ChildCacheName,
        input_type: InputType,
        factory: &dyn ChildCacheFactory,
    ) -> Result<&mut dyn SessionCache>;

    /// Nested cache for `name`, created by the factory this cache was built with
    fn child_cache(
        &mut self,
        name: &ChildCacheName,
        input_type: InputType,
    ) -> Result<&mut dyn SessionCache>;

    /// Parameters given to `initialize`
    fn init_params(&self) -> Option<&FeatureInitParams>;
}

// ============================================================================
// SessionCache - 수명주기
// ============================================================================

/// A cache with a lifecycle: initialize once, then evaluate and invalidate
pub trait SessionCache: CalculationContext + Send + Sync {
    /// Must be called exactly once, before any evaluation
    fn initialize(&mut self, params: FeatureInitParams) -> Result<()>;

    fn is_initialized(&self) -> bool;

    /// Discard every memoized result here and in all child caches
    fn invalidate(&mut self);

    /// Like [`invalidate`](SessionCache::invalidate), leaving children named in `keep` untouched
    fn invalidate_except(&mut self, keep: &HashSet<ChildCacheName>);

    /// Independent copy sharing no mutable state with this cache
    fn duplicate_boxed(&self) -> Box<dyn SessionCache>;

    fn as_context(&mut self) -> &mut dyn CalculationContext;
}

/// Builds caches for nested input types
pub trait ChildCacheFactory: Send + Sync {
    fn create_cache(&self, input_type: InputType) -> Result<Box<dyn SessionCache>>;
}

impl<F: ChildCacheFactory + ?Sized> ChildCacheFactory for Arc<F> {
    fn create_cache(&self, input_type: InputType) -> Result<Box<dyn SessionCache>> {
        (**self).create_cache(input_type)
    }
}

// ============================================================================
// CalculationContextExt - 제네릭 헬퍼
// ============================================================================

/// Typed helpers over any [`CalculationContext`]
pub trait CalculationContextExt: CalculationContext {
    /// Shared handle for `part`; equal parts yield the same handle
    fn search<P: CalculationPart>(&mut self, part: P) -> Result<Arc<ResolvedPart<P>>> {
        Ok(self.parts()?.find_or_add(ResolvedPart::new(part)))
    }

    /// Shared handle for `part`; equal part maps yield the same handle
    fn search_map<P: CalculationPartMap>(&mut self, part: P) -> Result<Arc<ResolvedPartMap<P>>> {
        Ok(self.parts()?.find_or_add(ResolvedPartMap::new(part)))
    }

    /// Resolve `id`, then calculate the feature it names
    fn calculate_resolved(&mut self, id: &str, input: &dyn FeatureInput) -> Result<f64> {
        let resolved = self.resolve_identifier(id);
        self.calculate_by_identifier(&resolved, input)
    }
}

impl<C: CalculationContext + ?Sized> CalculationContextExt for C {}
