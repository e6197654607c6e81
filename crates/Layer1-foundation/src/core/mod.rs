//! Core - 컨텍스트에 독립적인 핵심 타입
//!
//! - `types.rs`: InputType, FeatureId, FeatureInitParams, ChildCacheName
//! - `traits.rs`: FeatureInput

mod traits;
mod types;

pub use traits::{downcast_input, FeatureInput};
pub use types::{ChildCacheName, FeatureId, FeatureInitParams, InputType};
