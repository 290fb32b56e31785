//! Shared types used across the lumen crates.
//!
//! # Invariants
//! - A `Transform` always holds an invertible matrix.
//! - Entity ids are allocated in increasing order by the component store.

mod handles;
mod types;

pub use handles::{FramebufferHandle, MeshHandle, TextureHandle};
pub use types::{EntityId, MAX_SCALE, MIN_SCALE, Transform, TransformError};

pub fn crate_info() -> &'static str {
    "lumen-common v0.1.0"
}
