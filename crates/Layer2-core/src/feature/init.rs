//! Initialization pass - 한 번의 초기화 패스에서의 결과 기록
//!
//! 초기화 성공 여부는 Feature 핸들이 아니라 패스마다 기록합니다.
//! 같은 Feature가 다른 캐시/파라미터로 다시 초기화되어도 이전 결과가 섞이지 않습니다.

use super::{FeatureList, FeatureRef};
use featurecalc_foundation::{Error, FeatureId, FeatureInitParams, Result};
use std::collections::HashMap;

/// One initialization pass over a dependency graph
///
/// Every feature is attempted at most once per pass. A feature fails when its
/// own `initialize` fails or when any of its dependencies failed.
pub struct Initializer<'a> {
    params: &'a FeatureInitParams,
    // false while in progress or after a failure
    outcomes: HashMap<FeatureId, bool>,
}

impl<'a> Initializer<'a> {
    pub fn new(params: &'a FeatureInitParams) -> Self {
        Self {
            params,
            outcomes: HashMap::new(),
        }
    }

    pub fn params(&self) -> &FeatureInitParams {
        self.params
    }

    /// Initialize the dependencies of `feature`, then `feature`
    pub fn run(&mut self, feature: &FeatureRef) -> Result<()> {
        match self.outcomes.get(&feature.id()) {
            Some(true) => return Ok(()),
            Some(false) => {
                return Err(Error::initialization(
                    feature.display_name(),
                    "failed earlier in this pass or depends on itself",
                ))
            }
            None => {}
        }

        self.outcomes.insert(feature.id(), false);
        for dependency in feature.dependencies() {
            if let Err(e) = self.run(&dependency) {
                let message = format!("dependency {} not initialized: {}", dependency, e);
                return Err(Error::initialization(feature.display_name(), message));
            }
        }
        feature.initialize(self.params)?;
        self.outcomes.insert(feature.id(), true);
        Ok(())
    }

    /// Whether `feature` initialized successfully in this pass
    pub fn succeeded(&self, feature: &FeatureRef) -> bool {
        self.outcomes.get(&feature.id()).copied().unwrap_or(false)
    }

    /// Features of `list` that initialized successfully in this pass
    pub fn retain_succeeded(&self, list: &FeatureList) -> FeatureList {
        list.iter().filter(|f| self.succeeded(f)).cloned().collect()
    }
}
