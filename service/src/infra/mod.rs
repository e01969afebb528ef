//! Infrastructure layer.

#[cfg(feature = "http")]
pub mod api;
pub mod pipeline;
pub mod storage;

#[cfg(feature = "http")]
pub use self::api::{Api, Http};
pub use self::{pipeline::Headers, storage::Storage};
