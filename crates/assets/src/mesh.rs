use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Component format of a single vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VertexFormat {
    Float32x2,
    Float32x3,
}

impl VertexFormat {
    pub fn size(self) -> u32 {
        match self {
            Self::Float32x2 => 8,
            Self::Float32x3 => 12,
        }
    }
}

/// One attribute of an interleaved vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VertexAttribute {
    pub location: u32,
    pub format: VertexFormat,
    pub offset: u32,
}

/// A plain-old-data vertex with a fixed attribute layout.
pub trait Vertex: Pod {
    const ATTRIBUTES: &'static [VertexAttribute];

    fn stride() -> u32 {
        std::mem::size_of::<Self>() as u32
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct VertexNormalTexCoords {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coords: [f32; 2],
}

impl VertexNormalTexCoords {
    pub fn new(position: glam::Vec3, normal: glam::Vec3, tex_coords: glam::Vec2) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
            tex_coords: tex_coords.to_array(),
        }
    }
}

impl Vertex for VertexNormalTexCoords {
    const ATTRIBUTES: &'static [VertexAttribute] = &[
        VertexAttribute {
            location: 0,
            format: VertexFormat::Float32x3,
            offset: 0,
        },
        VertexAttribute {
            location: 1,
            format: VertexFormat::Float32x3,
            offset: 12,
        },
        VertexAttribute {
            location: 2,
            format: VertexFormat::Float32x2,
            offset: 24,
        },
    ];
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct VertexColor {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

impl Vertex for VertexColor {
    const ATTRIBUTES: &'static [VertexAttribute] = &[
        VertexAttribute {
            location: 0,
            format: VertexFormat::Float32x3,
            offset: 0,
        },
        VertexAttribute {
            location: 1,
            format: VertexFormat::Float32x3,
            offset: 12,
        },
    ];
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct StandardVertex2D {
    pub position: [f32; 2],
    pub tex_coords: [f32; 2],
    pub color: [f32; 3],
}

impl Vertex for StandardVertex2D {
    const ATTRIBUTES: &'static [VertexAttribute] = &[
        VertexAttribute {
            location: 0,
            format: VertexFormat::Float32x2,
            offset: 0,
        },
        VertexAttribute {
            location: 1,
            format: VertexFormat::Float32x2,
            offset: 8,
        },
        VertexAttribute {
            location: 2,
            format: VertexFormat::Float32x3,
            offset: 16,
        },
    ];
}

/// Primitive assembly mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Topology {
    #[default]
    Triangles,
    Lines,
}

/// SHA-256 of a mesh's topology, layout, vertex and index bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentHash(pub [u8; 32]);

impl std::fmt::Display for ContentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for byte in &self.0[..8] {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// Indexed vertex data, ready for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData<V> {
    vertices: Vec<V>,
    indices: Vec<u32>,
    topology: Topology,
}

impl<V: Vertex> MeshData<V> {
    pub fn new(vertices: Vec<V>, indices: Vec<u32>) -> Self {
        Self::with_topology(vertices, indices, Topology::Triangles)
    }

    pub fn with_topology(vertices: Vec<V>, indices: Vec<u32>, topology: Topology) -> Self {
        Self {
            vertices,
            indices,
            topology,
        }
    }

    pub fn vertices(&self) -> &[V] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Interleaved vertex bytes.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// True if every index points at an existing vertex.
    pub fn indices_in_bounds(&self) -> bool {
        let count = self.vertices.len() as u64;
        self.indices.iter().all(|&i| u64::from(i) < count)
    }

    pub fn content_hash(&self) -> ContentHash {
        let mut hasher = Sha256::new();
        hasher.update([match self.topology {
            Topology::Triangles => 0u8,
            Topology::Lines => 1u8,
        }]);
        hasher.update(V::stride().to_le_bytes());
        hasher.update((self.vertices.len() as u64).to_le_bytes());
        hasher.update(self.vertex_bytes());
        hasher.update(self.index_bytes());
        ContentHash(hasher.finalize().into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec2, Vec3};

    fn triangle() -> MeshData<VertexNormalTexCoords> {
        let v = |x: f32| VertexNormalTexCoords::new(Vec3::new(x, 0.0, 0.0), Vec3::Y, Vec2::ZERO);
        MeshData::new(vec![v(0.0), v(1.0), v(2.0)], vec![0, 1, 2])
    }

    #[test]
    fn strides_match_attribute_layouts() {
        assert_eq!(VertexNormalTexCoords::stride(), 32);
        assert_eq!(VertexColor::stride(), 24);
        assert_eq!(StandardVertex2D::stride(), 28);
        for layout in [
            VertexNormalTexCoords::ATTRIBUTES,
            VertexColor::ATTRIBUTES,
            StandardVertex2D::ATTRIBUTES,
        ] {
            let last = layout[layout.len() - 1];
            assert!(last.offset + last.format.size() <= 32);
        }
    }

    #[test]
    fn vertex_bytes_cover_all_vertices() {
        let mesh = triangle();
        assert_eq!(mesh.vertex_bytes().len(), 3 * 32);
        assert_eq!(mesh.index_bytes().len(), 3 * 4);
        assert!(mesh.indices_in_bounds());
    }

    #[test]
    fn identical_meshes_hash_equal() {
        assert_eq!(triangle().content_hash(), triangle().content_hash());
    }

    #[test]
    fn topology_changes_hash() {
        let tri = triangle();
        let lines = MeshData::with_topology(
            tri.vertices().to_vec(),
            tri.indices().to_vec(),
            Topology::Lines,
        );
        assert_ne!(tri.content_hash(), lines.content_hash());
    }

    #[test]
    fn out_of_bounds_index_detected() {
        let tri = triangle();
        let broken = MeshData::new(tri.vertices().to_vec(), vec![0, 1, 3]);
        assert!(!broken.indices_in_bounds());
    }

    #[test]
    fn hash_display_is_short_hex() {
        assert_eq!(triangle().content_hash().to_string().len(), 16);
    }
}
