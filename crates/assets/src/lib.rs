//! Mesh data for the lumen engine.
//!
//! Meshes are plain CPU-side data. A device uploads them and hands back a
//! `MeshHandle`; renderers only ever see the handle. Every mesh carries a
//! content hash so identical geometry can be shared.

mod mesh;
pub mod shapes;

pub use mesh::{
    ContentHash, MeshData, StandardVertex2D, Topology, Vertex, VertexAttribute, VertexColor,
    VertexFormat, VertexNormalTexCoords,
};

pub fn crate_info() -> &'static str {
    "lumen-assets v0.1.0"
}
