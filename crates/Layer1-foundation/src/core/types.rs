//! Core Types - 캐시 계층 전반에서 공유하는 값 타입
//!
//! - `InputType`: 입력 타입 판별자 (명시적 부모 체인)
//! - `FeatureId`: Feature 식별 핸들 (등록 시 할당되는 고유 정수)
//! - `FeatureInitParams`: 초기화 번들 (캐시는 해석하지 않음)
//! - `ChildCacheName`: 중첩 캐시 스코프 키

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

// ============================================================================
// InputType
// ============================================================================

/// Discriminator for the kind of object a feature is calculated on.
///
/// Types form a single-inheritance chain through `parent`. A feature declared
/// on a type applies to that type and to every type derived from it.
///
/// ```ignore
/// static OBJECT: InputType = InputType::root("object");
/// static NUCLEUS: InputType = InputType::derived("nucleus", &OBJECT);
///
/// assert!(OBJECT.accepts(NUCLEUS));
/// assert!(!NUCLEUS.accepts(OBJECT));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InputType {
    name: &'static str,
    parent: Option<&'static InputType>,
}

impl InputType {
    /// Accepts inputs of every type
    pub const ANY: InputType = InputType::root("any");

    pub const fn root(name: &'static str) -> Self {
        Self { name, parent: None }
    }

    pub const fn derived(name: &'static str, parent: &'static InputType) -> Self {
        Self {
            name,
            parent: Some(parent),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn parent(&self) -> Option<InputType> {
        self.parent.copied()
    }

    /// This type followed by its ancestors, nearest first
    pub fn lineage(&self) -> impl Iterator<Item = InputType> {
        std::iter::successors(Some(*self), |t| t.parent())
    }

    /// Whether a feature declared on `self` may be calculated on `other`
    ///
    /// True when `self` equals `other`, is one of its ancestors, or is [`InputType::ANY`].
    pub fn accepts(&self, other: InputType) -> bool {
        *self == Self::ANY || other.lineage().any(|t| t == *self)
    }
}

impl fmt::Display for InputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

// ============================================================================
// FeatureId
// ============================================================================

static NEXT_FEATURE_ID: AtomicU64 = AtomicU64::new(1);

/// Stable identity of a registered feature
///
/// Identity, not structure, decides whether two handles are "the same feature".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FeatureId(u64);

impl FeatureId {
    /// 새 고유 ID 할당
    pub fn next() -> Self {
        Self(NEXT_FEATURE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ============================================================================
// FeatureInitParams
// ============================================================================

/// Initialization bundle handed to features before a session starts
///
/// The caches pass it through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureInitParams {
    /// Physical size of one input unit (e.g. microns per pixel)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<f64>,

    /// Free-form values for feature implementations
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extras: Map<String, Value>,
}

impl FeatureInitParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resolution(mut self, resolution: f64) -> Self {
        self.resolution = Some(resolution);
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extras.insert(key.into(), value);
        self
    }

    pub fn extra(&self, key: &str) -> Option<&Value> {
        self.extras.get(key)
    }
}

// ============================================================================
// ChildCacheName
// ============================================================================

/// Key of a nested cache scope (e.g. per-nucleus sub-features of an object)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChildCacheName {
    owner: &'static str,
    part: String,
}

impl ChildCacheName {
    pub fn new(owner: &'static str, part: impl Into<String>) -> Self {
        Self {
            owner,
            part: part.into(),
        }
    }

    /// Scope identified by its owner alone
    pub fn of(owner: &'static str) -> Self {
        Self::new(owner, "")
    }

    pub fn owner(&self) -> &'static str {
        self.owner
    }

    pub fn part(&self) -> &str {
        &self.part
    }
}

impl fmt::Display for ChildCacheName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.part.is_empty() {
            f.write_str(self.owner)
        } else {
            write!(f, "{}/{}", self.owner, self.part)
        }
    }
}
