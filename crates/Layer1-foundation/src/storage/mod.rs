//! Storage - 설정 파일 저장소
//!
//! - `json/store.rs` - JsonStore (범용 JSON 파일 저장)

mod json {
    pub mod store;
}

pub use json::store::JsonStore;
