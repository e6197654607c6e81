//! Batch evaluation - 여러 입력에 대한 병렬 Feature 계산
//!
//! 캐시는 단일 스레드용이므로, 워커마다 템플릿 캐시를 한 번 복제해서
//! 입력마다 `invalidate()` 후 재사용합니다.

use crate::feature::FeatureList;
use crate::session::SessionCache;
use featurecalc_foundation::{FeatureInput, Result};
use rayon::prelude::*;
use tracing::debug;

// ============================================================================
// FeatureTable
// ============================================================================

/// Feature values: one column per feature, one row per input
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureTable {
    names: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl FeatureTable {
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&[f64]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    /// All values of the feature named `name`, in input order
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let position = self.names.iter().position(|n| n == name)?;
        Some(self.rows.iter().map(|row| row[position]).collect())
    }

    pub fn value(&self, row: usize, name: &str) -> Option<f64> {
        let position = self.names.iter().position(|n| n == name)?;
        self.rows.get(row).map(|r| r[position])
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ============================================================================
// BatchEvaluator
// ============================================================================

/// Evaluates a feature list over many inputs
pub struct BatchEvaluator<'a> {
    template: &'a dyn SessionCache,
    features: &'a FeatureList,
}

impl<'a> BatchEvaluator<'a> {
    /// `template` must be initialized; each worker works on its own copy
    pub fn new(template: &'a dyn SessionCache, features: &'a FeatureList) -> Self {
        Self { template, features }
    }

    /// Evaluate in parallel; rows keep the order of `inputs`
    ///
    /// The first failing evaluation fails the batch.
    pub fn evaluate<I: FeatureInput>(&self, inputs: &[I]) -> Result<FeatureTable> {
        debug!(
            "Batch evaluating {} features over {} inputs",
            self.features.len(),
            inputs.len()
        );
        let rows = inputs
            .par_iter()
            .map_init(
                || self.template.duplicate_boxed(),
                |cache, input| self.evaluate_row(cache.as_mut(), input),
            )
            .collect::<Result<Vec<_>>>()?;
        Ok(self.table(rows))
    }

    /// Evaluate on the calling thread with a single copy of the template
    pub fn evaluate_sequential<I: FeatureInput>(&self, inputs: &[I]) -> Result<FeatureTable> {
        let mut cache = self.template.duplicate_boxed();
        let rows = inputs
            .iter()
            .map(|input| self.evaluate_row(cache.as_mut(), input))
            .collect::<Result<Vec<_>>>()?;
        Ok(self.table(rows))
    }

    fn evaluate_row(
        &self,
        cache: &mut dyn SessionCache,
        input: &dyn FeatureInput,
    ) -> Result<Vec<f64>> {
        cache.invalidate();
        self.features
            .iter()
            .map(|feature| cache.calculate(feature, input))
            .collect()
    }

    fn table(&self, rows: Vec<Vec<f64>>) -> FeatureTable {
        FeatureTable {
            names: self.features.iter().map(|f| f.display_name()).collect(),
            rows,
        }
    }
}
