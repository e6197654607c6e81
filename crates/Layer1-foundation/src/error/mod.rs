//! Error types for FeatureCalc
//!
//! 모든 에러를 중앙에서 관리

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// FeatureCalc 에러 타입
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Resolution
    // ========================================================================
    #[error("Unresolved feature identifier: {0}")]
    UnresolvedIdentifier(String),

    // ========================================================================
    // Evaluation
    // ========================================================================
    #[error("Evaluation of '{feature}' failed: {message}")]
    Evaluation { feature: String, message: String },

    #[error("Feature '{feature}' expects {expected} input, got {actual}")]
    IncompatibleInput {
        feature: String,
        expected: String,
        actual: String,
    },

    // ========================================================================
    // Lifecycle
    // ========================================================================
    #[error("Initialization of '{feature}' failed: {message}")]
    Initialization { feature: String, message: String },

    #[error("Shared features failed to initialize: {}", .0.join(", "))]
    SharedInitialization(Vec<String>),

    #[error("Cache used before initialization: {0}")]
    Uninitialized(String),

    #[error("Cache already initialized: {0}")]
    AlreadyInitialized(String),

    #[error("Custom name already set to '{current}', cannot assign '{requested}'")]
    CustomNameAlreadySet { current: String, requested: String },

    #[error("No child cache factory configured for '{0}'")]
    NoChildFactory(String),

    // ========================================================================
    // Configuration
    // ========================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    // ========================================================================
    // 외부 에러 변환
    // ========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// 호출자 설정 문제로 발생한 에러인지 확인
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Error::UnresolvedIdentifier(_)
                | Error::IncompatibleInput { .. }
                | Error::CustomNameAlreadySet { .. }
                | Error::Config(_)
        )
    }

    /// 프로그래밍 오류 (초기화 순서 위반)인지 확인
    pub fn is_lifecycle_violation(&self) -> bool {
        matches!(
            self,
            Error::Uninitialized(_) | Error::AlreadyInitialized(_)
        )
    }

    /// Evaluation 에러 생성 헬퍼
    pub fn evaluation(feature: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Evaluation {
            feature: feature.into(),
            message: message.into(),
        }
    }

    /// Initialization 에러 생성 헬퍼
    pub fn initialization(feature: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Initialization {
            feature: feature.into(),
            message: message.into(),
        }
    }
}
