//! featurecalc-core: Session caches for feature calculation
//!
//! Layer2 - Feature 계산 세션 캐시 레이어
//!
//! # 주요 모듈
//!
//! - `feature`: Feature 트레이트, 공유 핸들 (`FeatureRef`), Feature 목록
//! - `registry`: 식별자로 참조 가능한 공유 Feature 레지스트리
//! - `session`: 세션 캐시 (결과 메모이제이션, 계산 파트, 자식 캐시)
//! - `batch`: 여러 입력에 대한 병렬 계산
//!
//! # 사용 예시
//!
//! ```ignore
//! use featurecalc_core::{CacheFactory, CalculationContext, FeatureList, SessionCache};
//!
//! let features = FeatureList::new()
//!     .with_named("area", AreaFeature)?
//!     .with_named("perimeter", PerimeterFeature)?;
//!
//! let factory = CacheFactory::from_features(features, FeatureInitParams::new());
//! let mut cache = factory.create(OBJECT)?;
//!
//! for object in &objects {
//!     cache.invalidate();
//!     let area = cache.calculate_by_identifier("area", object)?;
//!     // ...
//! }
//! ```

pub mod batch;
pub mod feature;
pub mod registry;
pub mod session;

// Re-exports: Feature
pub use feature::{Feature, FeatureList, FeatureRef, FnFeature, Initializer};

// Re-exports: Registry
pub use registry::SharedFeatures;

// Re-exports: Session
pub use session::{
    CacheFactory, CacheState, CacheStats, CalculationCache, CalculationContext,
    CalculationContextExt, CalculationPart, CalculationPartMap, ChildCacheFactory,
    NamedResultCache, ResolvedPart, ResolvedPartMap, ResultIndex, SessionCache,
};

// Re-exports: Batch
pub use batch::{BatchEvaluator, FeatureTable};

// Re-exports: Foundation
pub use featurecalc_foundation::{
    downcast_input, CacheSettings, ChildCacheName, Error, FeatureId, FeatureInitParams,
    FeatureInput, InputType, ResettableSet, Result,
};
