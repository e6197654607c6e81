//! # featurecalc-foundation
//!
//! Foundation layer for FeatureCalc:
//! - Error: 중앙 에러 타입 (`Error`, `Result`)
//! - Core: 입력 타입 판별자, Feature ID, 초기화 번들, 자식 캐시 이름
//! - Cache: 중복 제거 레지스트리 (`ResettableSet`), 캐시 설정 (`CacheSettings`)
//! - Storage: JsonStore (설정 파일)
//!
//! ## 아키텍처
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Layer2-core (featurecalc-core)                         │
//! │  ├── CacheFactory → NamedResultCache                   │
//! │  │                     └── CalculationCache            │
//! │  │                           ├── ResettableSet         │
//! │  │                           └── child caches          │
//! │  └── Feature / SharedFeatures / ResultIndex            │
//! ├─────────────────────────────────────────────────────────┤
//! │  Layer1-foundation (이 레이어)                          │
//! │  ├── Error, Result                                     │
//! │  ├── InputType, FeatureId, FeatureInitParams           │
//! │  ├── ResettableSet, CacheSettings                      │
//! │  └── JsonStore                                         │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod cache;
pub mod core;
pub mod error;
pub mod storage;

// ============================================================================
// Error
// ============================================================================
pub use error::{Error, Result};

// ============================================================================
// Core (핵심 타입)
// ============================================================================
pub use core::{
    downcast_input, ChildCacheName, FeatureId, FeatureInitParams, FeatureInput, InputType,
};

// ============================================================================
// Cache (캐시 프리미티브)
// ============================================================================
pub use cache::{CacheSettings, Deduplicate, ResettableSet, ResettableSetStats, SETTINGS_FILE};

// ============================================================================
// Storage (저장소)
// ============================================================================
pub use storage::JsonStore;
