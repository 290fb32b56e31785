//! Minimal deterministic entity-component store and the scene components the
//! renderer and editor consume.
//!
//! Components are stored in one `BTreeMap` per type keyed by `EntityId`.
//! Entity ids are allocated sequentially, so every query visits entities in
//! creation order.
//!
//! # Invariants
//! - All component mutations produce events.
//! - Iteration order is ascending `EntityId` (creation order).
//! - Components can only be attached to live entities.

mod components;
mod store;
mod system;

pub use components::{
    Active, AreaLight, Drawable, EntityInfo, GeometryChunk, Light, Material, ProjectionCamera,
    StaticModel,
};
pub use store::{Component, ComponentEvent, ComponentKind, ComponentStore, StoreError};
pub use system::{EventQueue, System, SystemEvent};

pub fn crate_info() -> &'static str {
    "lumen-ecs v0.1.0"
}
