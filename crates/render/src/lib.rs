//! Forward rendering for lumen scenes.
//!
//! The `ForwardRenderingSystem` walks the component store once per frame,
//! resolves a camera and a light, and drives an `Effect` that turns material,
//! light and matrix state into uniform uploads on a `GraphicsDevice`.
//!
//! # Invariants
//! - Every draw happens between an effect's `begin()` and `end()`; nested
//!   `begin()` is rejected.
//! - One draw per geometry chunk and one per light marker, each in its own
//!   begin/end bracket.
//! - The renderer only reads the component store.
//! - Frames are deterministic for an unchanged store: draw order is
//!   store iteration order.

mod config;
mod device;
mod effect;
mod mesh_cache;
mod phong;
mod recording;
mod resolve;
pub mod shaders;
mod system;

pub use config::{ConfigError, RenderConfig};
pub use device::{
    DeviceError, GraphicsDevice, MeshUpload, ProgramHandle, ShaderSource, TextureDesc,
    UniformLocation, UniformValue,
};
pub use effect::{Effect, EffectError, EffectScope};
pub use mesh_cache::MeshCache;
pub use phong::UniversalPhongEffect;
pub use recording::{DeviceCommand, RecordingDevice};
pub use resolve::{
    ResolutionPolicy, ResolveError, ResolvedCamera, ResolvedLight, Subject, resolve_camera,
    resolve_light,
};
pub use system::{ForwardRenderingSystem, FrameStats, RenderError};

pub fn crate_info() -> &'static str {
    "lumen-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
