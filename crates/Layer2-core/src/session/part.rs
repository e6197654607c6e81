//! Calculation parts: shared intermediate results
//!
//! A part describes a sub-computation by value (e.g. "convex hull of object
//! 3"). Features request parts through their context and receive the one
//! handle registered for that description, so the work runs once per session
//! no matter how many features need it.

use super::CalculationContext;
use featurecalc_foundation::{Deduplicate, FeatureInput, Result};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::OnceLock;

// ============================================================================
// CalculationPart
// ============================================================================

/// A reusable sub-computation producing one value per session input
pub trait CalculationPart: Clone + Send + Sync + 'static {
    /// Canonical form used to decide whether two parts are the same computation
    type Key: Eq + Hash + Send + Sync + 'static;
    type Output: Clone + Send + Sync + 'static;

    fn key(&self) -> Self::Key;

    fn execute(
        &self,
        input: &dyn FeatureInput,
        ctx: &mut dyn CalculationContext,
    ) -> Result<Self::Output>;
}

/// Registered part with its memoized output
#[derive(Clone)]
pub struct ResolvedPart<P: CalculationPart> {
    part: P,
    result: OnceLock<P::Output>,
}

impl<P: CalculationPart> ResolvedPart<P> {
    pub fn new(part: P) -> Self {
        Self {
            part,
            result: OnceLock::new(),
        }
    }

    pub fn part(&self) -> &P {
        &self.part
    }

    /// Whether the output has been computed
    pub fn is_resolved(&self) -> bool {
        self.result.get().is_some()
    }

    /// Output for the session input, computed on first request
    ///
    /// A failed execution stores nothing; the next request retries.
    pub fn value(
        &self,
        input: &dyn FeatureInput,
        ctx: &mut dyn CalculationContext,
    ) -> Result<P::Output> {
        if let Some(value) = self.result.get() {
            return Ok(value.clone());
        }
        let value = self.part.execute(input, ctx)?;
        Ok(self.result.get_or_init(|| value).clone())
    }
}

impl<P: CalculationPart> Deduplicate for ResolvedPart<P> {
    type Key = P::Key;

    fn dedup_key(&self) -> P::Key {
        self.part.key()
    }
}

impl<P: CalculationPart + fmt::Debug> fmt::Debug for ResolvedPart<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedPart")
            .field("part", &self.part)
            .field("resolved", &self.is_resolved())
            .finish()
    }
}

// ============================================================================
// CalculationPartMap
// ============================================================================

/// A reusable sub-computation answering many indexed sub-queries
///
/// e.g. "distance transform of object 3", queried at individual points.
pub trait CalculationPartMap: Clone + Send + Sync + 'static {
    type Key: Eq + Hash + Send + Sync + 'static;
    type Index: Eq + Hash + Clone + Send + Sync + 'static;
    type Output: Clone + Send + Sync + 'static;

    fn key(&self) -> Self::Key;

    fn execute(
        &self,
        input: &dyn FeatureInput,
        index: &Self::Index,
        ctx: &mut dyn CalculationContext,
    ) -> Result<Self::Output>;
}

/// Registered part map with one lazily memoized output per index
pub struct ResolvedPartMap<P: CalculationPartMap> {
    part: P,
    values: Mutex<HashMap<P::Index, P::Output>>,
}

impl<P: CalculationPartMap> ResolvedPartMap<P> {
    pub fn new(part: P) -> Self {
        Self {
            part,
            values: Mutex::new(HashMap::new()),
        }
    }

    pub fn part(&self) -> &P {
        &self.part
    }

    /// Output for `index`, computed on first request
    pub fn value(
        &self,
        input: &dyn FeatureInput,
        index: &P::Index,
        ctx: &mut dyn CalculationContext,
    ) -> Result<P::Output> {
        let cached = self.values.lock().get(index).cloned();
        if let Some(value) = cached {
            return Ok(value);
        }
        // lock released: execution may request other parts
        let value = self.part.execute(input, index, ctx)?;
        Ok(self
            .values
            .lock()
            .entry(index.clone())
            .or_insert(value)
            .clone())
    }

    /// Number of memoized indices
    pub fn len(&self) -> usize {
        self.values.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<P: CalculationPartMap> Clone for ResolvedPartMap<P> {
    fn clone(&self) -> Self {
        Self {
            part: self.part.clone(),
            values: Mutex::new(self.values.lock().clone()),
        }
    }
}

impl<P: CalculationPartMap> Deduplicate for ResolvedPartMap<P> {
    type Key = P::Key;

    fn dedup_key(&self) -> P::Key {
        self.part.key()
    }
}

impl<P: CalculationPartMap + fmt::Debug> fmt::Debug for ResolvedPartMap<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedPartMap")
            .field("part", &self.part)
            .field("memoized", &self.len())
            .finish()
    }
}
