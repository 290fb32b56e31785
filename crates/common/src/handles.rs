use serde::{Deserialize, Serialize};

/// Device-side mesh. The device (or a mesh cache) owns the vertex data;
/// handles are freely copied into geometry chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MeshHandle(pub u32);

/// Device-side 2D texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TextureHandle(pub u32);

/// Offscreen render target. `None` wherever a target is optional means the
/// default surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FramebufferHandle(pub u32);
