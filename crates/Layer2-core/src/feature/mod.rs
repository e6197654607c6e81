//! Feature - 스칼라 측정값을 계산하는 단위
//!
//! ## 구성
//! - `Feature` trait: 계산 로직 (입력 + 계산 컨텍스트 → f64)
//! - `FeatureRef`: 고유 ID를 가진 공유 핸들 (식별 기준은 구조가 아닌 ID)
//! - `FeatureList`: 순서가 있는 Feature 목록
//!
//! ```ignore
//! let area = FeatureRef::named("area", AreaFeature::default())?;
//! let value = cache.calculate(&area, &object)?;
//! ```

mod init;
mod list;

pub use init::Initializer;
pub use list::FeatureList;

use crate::session::CalculationContext;
use featurecalc_foundation::{Error, FeatureId, FeatureInitParams, FeatureInput, InputType, Result};
use std::fmt;
use std::sync::{Arc, OnceLock};

// ============================================================================
// Feature Trait
// ============================================================================

/// A unit of computation producing one scalar for one input
pub trait Feature: Send + Sync {
    /// Short description for logs and error messages
    fn describe(&self) -> String;

    /// Most general input type this feature can be calculated on
    fn input_type(&self) -> InputType;

    /// Features this one calculates through its context
    ///
    /// Used to initialize dependencies before their dependents.
    fn dependencies(&self) -> Vec<FeatureRef> {
        Vec::new()
    }

    /// Prepare for a session
    fn initialize(&self, _params: &FeatureInitParams) -> Result<()> {
        Ok(())
    }

    /// Calculate the value for `input`
    ///
    /// Shared intermediate results are obtained through `ctx`, as are the
    /// values of other features.
    fn evaluate(&self, input: &dyn FeatureInput, ctx: &mut dyn CalculationContext)
        -> Result<f64>;
}

// ============================================================================
// FnFeature - 클로저 기반 Feature
// ============================================================================

/// Feature backed by a closure
pub struct FnFeature<F> {
    description: String,
    input_type: InputType,
    func: F,
}

impl<F> FnFeature<F>
where
    F: Fn(&dyn FeatureInput, &mut dyn CalculationContext) -> Result<f64> + Send + Sync,
{
    pub fn new(description: impl Into<String>, input_type: InputType, func: F) -> Self {
        Self {
            description: description.into(),
            input_type,
            func,
        }
    }
}

impl<F> Feature for FnFeature<F>
where
    F: Fn(&dyn FeatureInput, &mut dyn CalculationContext) -> Result<f64> + Send + Sync,
{
    fn describe(&self) -> String {
        self.description.clone()
    }

    fn input_type(&self) -> InputType {
        self.input_type
    }

    fn evaluate(
        &self,
        input: &dyn FeatureInput,
        ctx: &mut dyn CalculationContext,
    ) -> Result<f64> {
        (self.func)(input, ctx)
    }
}

// ============================================================================
// FeatureRef - 공유 핸들
// ============================================================================

struct FeatureEntry {
    id: FeatureId,
    custom_name: OnceLock<String>,
    feature: Box<dyn Feature>,
}

/// Shared handle to a feature with a stable identity
///
/// Clones refer to the same feature. Equality and hashing use the
/// [`FeatureId`] only, so two structurally identical features are distinct.
#[derive(Clone)]
pub struct FeatureRef {
    inner: Arc<FeatureEntry>,
}

impl FeatureRef {
    pub fn new(feature: impl Feature + 'static) -> Self {
        Self {
            inner: Arc::new(FeatureEntry {
                id: FeatureId::next(),
                custom_name: OnceLock::new(),
                feature: Box::new(feature),
            }),
        }
    }

    /// Create a feature carrying a custom name
    pub fn named(name: impl Into<String>, feature: impl Feature + 'static) -> Result<Self> {
        let handle = Self::new(feature);
        handle.set_custom_name(name)?;
        Ok(handle)
    }

    /// Closure-backed feature
    pub fn from_fn<F>(description: impl Into<String>, input_type: InputType, func: F) -> Self
    where
        F: Fn(&dyn FeatureInput, &mut dyn CalculationContext) -> Result<f64>
            + Send
            + Sync
            + 'static,
    {
        Self::new(FnFeature::new(description, input_type, func))
    }

    pub fn id(&self) -> FeatureId {
        self.inner.id
    }

    /// Custom name, if one was assigned and is non-empty
    pub fn custom_name(&self) -> Option<&str> {
        self.inner
            .custom_name
            .get()
            .map(String::as_str)
            .filter(|name| !name.is_empty())
    }

    /// Assign the custom name (once)
    pub fn set_custom_name(&self, name: impl Into<String>) -> Result<()> {
        let requested = name.into();
        match self.inner.custom_name.get() {
            Some(current) => Err(Error::CustomNameAlreadySet {
                current: current.clone(),
                requested,
            }),
            None => self
                .inner
                .custom_name
                .set(requested)
                .map_err(|requested| Error::CustomNameAlreadySet {
                    current: self.display_name(),
                    requested,
                }),
        }
    }

    /// Custom name, or the feature's description when unnamed
    pub fn display_name(&self) -> String {
        match self.custom_name() {
            Some(name) => name.to_string(),
            None => self.inner.feature.describe(),
        }
    }

    pub fn input_type(&self) -> InputType {
        self.inner.feature.input_type()
    }

    /// Whether this feature may be calculated on inputs of `input_type`
    pub fn is_compatible_with(&self, input_type: InputType) -> bool {
        self.input_type().accepts(input_type)
    }

    pub fn dependencies(&self) -> Vec<FeatureRef> {
        self.inner.feature.dependencies()
    }

    /// Initialize this feature only
    pub fn initialize(&self, params: &FeatureInitParams) -> Result<()> {
        self.inner.feature.initialize(params)
    }

    /// Initialize dependencies first, then this feature
    ///
    /// Each feature in the dependency graph is initialized at most once per call.
    pub fn initialize_recursive(&self, params: &FeatureInitParams) -> Result<()> {
        Initializer::new(params).run(self)
    }

    /// Calculate on `input`, checking the input type first
    pub fn evaluate(
        &self,
        input: &dyn FeatureInput,
        ctx: &mut dyn CalculationContext,
    ) -> Result<f64> {
        let actual = input.input_type();
        if !self.is_compatible_with(actual) {
            return Err(Error::IncompatibleInput {
                feature: self.display_name(),
                expected: self.input_type().to_string(),
                actual: actual.to_string(),
            });
        }
        self.inner.feature.evaluate(input, ctx)
    }
}

impl PartialEq for FeatureRef {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for FeatureRef {}

impl std::hash::Hash for FeatureRef {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl fmt::Debug for FeatureRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeatureRef")
            .field("id", &self.id())
            .field("name", &self.display_name())
            .field("input_type", &self.input_type().name())
            .finish()
    }
}

impl fmt::Display for FeatureRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.display_name(), self.id())
    }
}
