//! JSON 설정 파일 저장소
//!
//! `CacheSettings`를 읽고 쓰는 디렉터리 하나. 파일이 없으면 `None`.

use crate::{Error, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directory holding JSON settings files
#[derive(Debug, Clone)]
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Per-user store (`<config dir>/featurecalc`)
    pub fn global() -> Result<Self> {
        dirs::config_dir()
            .map(|base| Self::new(base.join("featurecalc")))
            .ok_or_else(|| Error::Config("no user config directory".to_string()))
    }

    pub fn base_dir(&self) -> &Path {
        &self.dir
    }

    /// Parse `filename`, or `None` when it does not exist
    pub fn load_optional<T: DeserializeOwned>(&self, filename: &str) -> Result<Option<T>> {
        let path = self.dir.join(filename);
        if !path.is_file() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(&path)?;
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Write `value` as pretty JSON, creating the directory if needed
    pub fn save<T: Serialize>(&self, filename: &str, value: &T) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(filename);
        debug!("Saving {}", path.display());
        std::fs::write(&path, serde_json::to_string_pretty(value)?)?;
        Ok(())
    }
}
