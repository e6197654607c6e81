//! Core Traits - 입력 객체 인터페이스
//!
//! Feature가 계산되는 입력은 타입이 지워진 `&dyn FeatureInput`으로 전달되며,
//! 구현체는 `downcast_input`으로 구체 타입을 꺼냅니다.

use super::types::InputType;
use crate::{Error, Result};
use std::any::Any;

/// An object features are calculated on
pub trait FeatureInput: Any + Send + Sync {
    /// Runtime discriminator of this input
    fn input_type(&self) -> InputType;

    fn as_any(&self) -> &dyn Any;
}

impl dyn FeatureInput + '_ {
    pub fn downcast_ref<T: FeatureInput>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

/// Downcast an input for `feature`, failing with [`Error::IncompatibleInput`]
pub fn downcast_input<'a, T: FeatureInput>(
    input: &'a dyn FeatureInput,
    feature: &str,
) -> Result<&'a T> {
    input
        .downcast_ref::<T>()
        .ok_or_else(|| Error::IncompatibleInput {
            feature: feature.to_string(),
            expected: std::any::type_name::<T>().to_string(),
            actual: input.input_type().to_string(),
        })
}
