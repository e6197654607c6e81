//! Calculation Cache - 입력 타입별 세션 캐시 (leaf)
//!
//! Feature 평가를 수행하고, 공유 계산 파트 중복 제거와 자식 캐시를 소유합니다.
//! Feature ID 기반 메모이제이션은 하지 않습니다 (`NamedResultCache` 담당).

use super::{CalculationContext, ChildCacheFactory, SessionCache};
use crate::feature::FeatureRef;
use crate::registry::SharedFeatures;
use featurecalc_foundation::{
    ChildCacheName, Error, FeatureInitParams, FeatureInput, InputType, ResettableSet, Result,
};
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, trace};

/// Lifecycle of a session cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    Uninitialized,
    Initialized,
    /// Cleared; becomes `Initialized` again on the next evaluation
    Invalidated,
}

type ChildKey = (ChildCacheName, InputType);

/// Leaf session cache for one input type
pub struct CalculationCache {
    input_type: InputType,
    shared: SharedFeatures,
    parts: ResettableSet,
    children: HashMap<ChildKey, Box<dyn SessionCache>>,
    child_factory: Option<Arc<dyn ChildCacheFactory>>,
    params: Option<FeatureInitParams>,
    state: CacheState,
}

impl CalculationCache {
    /// Cache over `shared`, the features resolvable by identifier
    pub fn new(input_type: InputType, shared: SharedFeatures) -> Self {
        Self {
            input_type,
            shared,
            parts: ResettableSet::new(),
            children: HashMap::new(),
            child_factory: None,
            params: None,
            state: CacheState::Uninitialized,
        }
    }

    /// Factory used by [`CalculationContext::child_cache`]
    pub fn with_child_factory(mut self, factory: Arc<dyn ChildCacheFactory>) -> Self {
        self.child_factory = Some(factory);
        self
    }

    pub fn input_type(&self) -> InputType {
        self.input_type
    }

    pub fn state(&self) -> CacheState {
        self.state
    }

    pub fn shared(&self) -> &SharedFeatures {
        &self.shared
    }

    /// Number of child caches created so far
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Read-only view of the part registry
    pub fn part_registry(&self) -> &ResettableSet {
        &self.parts
    }

    /// Fail fast on use before `initialize`
    pub(crate) fn ensure_initialized(&mut self) -> Result<()> {
        match self.state {
            CacheState::Uninitialized => {
                error!("Calculation cache for '{}' used before initialization", self.input_type);
                Err(Error::Uninitialized(format!(
                    "calculation cache for '{}'",
                    self.input_type
                )))
            }
            CacheState::Invalidated => {
                self.state = CacheState::Initialized;
                Ok(())
            }
            CacheState::Initialized => Ok(()),
        }
    }

    /// Independent copy: parts, children and state are copied, nothing is shared
    pub fn duplicate(&self) -> Self {
        Self {
            input_type: self.input_type,
            shared: self.shared.clone(),
            parts: self.parts.duplicate(),
            children: self
                .children
                .iter()
                .map(|(key, child)| (key.clone(), child.duplicate_boxed()))
                .collect(),
            child_factory: self.child_factory.clone(),
            params: self.params.clone(),
            state: self.state,
        }
    }

    fn mark_invalidated(&mut self) {
        if self.state == CacheState::Initialized {
            self.state = CacheState::Invalidated;
        }
    }
}

impl CalculationContext for CalculationCache {
    fn calculate(&mut self, feature: &FeatureRef, input: &dyn FeatureInput) -> Result<f64> {
        self.ensure_initialized()?;
        feature.evaluate(input, self)
    }

    fn calculate_by_identifier(&mut self, id: &str, input: &dyn FeatureInput) -> Result<f64> {
        self.ensure_initialized()?;
        let feature = self.shared.lookup_by_identifier(id)?;
        self.calculate(&feature, input)
    }

    fn resolve_identifier(&self, id: &str) -> String {
        id.to_string()
    }

    fn parts(&mut self) -> Result<&mut ResettableSet> {
        self.ensure_initialized()?;
        Ok(&mut self.parts)
    }

    fn child_cache_for(
        &mut self,
        name: &ChildCacheName,
        input_type: InputType,
        factory: &dyn ChildCacheFactory,
    ) -> Result<&mut dyn SessionCache> {
        self.ensure_initialized()?;
        let child = match self.children.entry((name.clone(), input_type)) {
            Entry::Occupied(existing) => existing.into_mut(),
            Entry::Vacant(slot) => {
                debug!("Creating child cache '{}' for '{}'", name, input_type);
                slot.insert(factory.create_cache(input_type)?)
            }
        };
        Ok(child.as_mut())
    }

    fn child_cache(
        &mut self,
        name: &ChildCacheName,
        input_type: InputType,
    ) -> Result<&mut dyn SessionCache> {
        let factory = self
            .child_factory
            .clone()
            .ok_or_else(|| Error::NoChildFactory(name.to_string()))?;
        self.child_cache_for(name, input_type, factory.as_ref())
    }

    fn init_params(&self) -> Option<&FeatureInitParams> {
        self.params.as_ref()
    }
}

impl SessionCache for CalculationCache {
    fn initialize(&mut self, params: FeatureInitParams) -> Result<()> {
        if self.state != CacheState::Uninitialized {
            return Err(Error::AlreadyInitialized(format!(
                "calculation cache for '{}'",
                self.input_type
            )));
        }
        self.params = Some(params);
        self.state = CacheState::Initialized;
        debug!(
            "Initialized calculation cache for '{}' ({} shared features)",
            self.input_type,
            self.shared.len()
        );
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.state != CacheState::Uninitialized
    }

    fn invalidate(&mut self) {
        trace!(
            "Invalidating calculation cache for '{}' ({} parts, {} children)",
            self.input_type,
            self.parts.len(),
            self.children.len()
        );
        self.parts.reset();
        for child in self.children.values_mut() {
            child.invalidate();
        }
        self.mark_invalidated();
    }

    fn invalidate_except(&mut self, keep: &HashSet<ChildCacheName>) {
        trace!(
            "Invalidating calculation cache for '{}', keeping {} children",
            self.input_type,
            keep.len()
        );
        self.parts.reset();
        for ((name, _), child) in self.children.iter_mut() {
            if !keep.contains(name) {
                child.invalidate();
            }
        }
        self.mark_invalidated();
    }

    fn duplicate_boxed(&self) -> Box<dyn SessionCache> {
        Box::new(self.duplicate())
    }

    fn as_context(&mut self) -> &mut dyn CalculationContext {
        self
    }
}

impl fmt::Debug for CalculationCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CalculationCache")
            .field("input_type", &self.input_type.name())
            .field("state", &self.state)
            .field("shared", &self.shared.len())
            .field("parts", &self.parts)
            .field("children", &self.children.len())
            .finish()
    }
}
