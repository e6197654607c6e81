//! # Shared Feature Registry
//!
//! 세션 전체에서 식별자(custom name)로 참조할 수 있는 Feature 모음.
//! Feature 구현체는 `calculate_by_identifier`로 이 레지스트리의 Feature를 참조합니다.

mod shared;

pub use shared::SharedFeatures;
