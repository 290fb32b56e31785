use glam::{Mat4, Vec2, Vec3};
use lumen_common::{MeshHandle, TextureHandle};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Camera defined by its projection. The view matrix comes from the
/// entity's `Transform`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectionCamera {
    projection: Mat4,
}

impl ProjectionCamera {
    pub fn new(projection: Mat4) -> Self {
        Self { projection }
    }

    /// Right-handed perspective projection, `fov_y` in radians.
    pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self::new(Mat4::perspective_rh(fov_y, aspect, near, far))
    }

    /// Right-handed orthographic projection centred on the view axis.
    pub fn orthographic(width: f32, height: f32, near: f32, far: f32) -> Self {
        let (hw, hh) = (width * 0.5, height * 0.5);
        Self::new(Mat4::orthographic_rh(-hw, hw, -hh, hh, near, far))
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    pub fn set_projection_matrix(&mut self, projection: Mat4) {
        self.projection = projection;
    }
}

impl Default for ProjectionCamera {
    fn default() -> Self {
        Self::perspective(60.0_f32.to_radians(), 16.0 / 9.0, 0.1, 1000.0)
    }
}

/// Point light. Position comes from the `Transform` on the same entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Light {
    color: Vec3,
}

impl Light {
    /// A light that contributes nothing.
    pub const OFF: Self = Self { color: Vec3::ZERO };

    pub fn new(color: Vec3) -> Self {
        Self { color }
    }

    pub fn color(&self) -> Vec3 {
        self.color
    }

    pub fn set_color(&mut self, color: Vec3) {
        self.color = color;
    }
}

impl Default for Light {
    fn default() -> Self {
        Self::new(Vec3::ONE)
    }
}

/// Rectangular area light. Edited in the inspector; the forward pass does
/// not consume it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AreaLight {
    pub color: Vec3,
    pub size: Vec2,
    pub intensity: f32,
}

impl Default for AreaLight {
    fn default() -> Self {
        Self {
            color: Vec3::ONE,
            size: Vec2::ONE,
            intensity: 1.0,
        }
    }
}

/// Surface appearance. Read-only while a frame is being rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub albedo_color: Vec3,
    pub emission_color: Vec3,
    pub diffuse_texture: Option<TextureHandle>,
    pub normal_map: Option<TextureHandle>,
}

impl Material {
    pub fn new(albedo_color: Vec3) -> Self {
        Self {
            albedo_color,
            ..Self::default()
        }
    }

    pub fn with_emission(mut self, emission_color: Vec3) -> Self {
        self.emission_color = emission_color;
        self
    }

    pub fn with_diffuse_texture(mut self, texture: TextureHandle) -> Self {
        self.diffuse_texture = Some(texture);
        self
    }

    pub fn with_normal_map(mut self, texture: TextureHandle) -> Self {
        self.normal_map = Some(texture);
        self
    }

    pub fn albedo_color(&self) -> Vec3 {
        self.albedo_color
    }

    pub fn emission_color(&self) -> Vec3 {
        self.emission_color
    }
}

impl Default for Material {
    fn default() -> Self {
        Self {
            albedo_color: Vec3::ONE,
            emission_color: Vec3::ZERO,
            diffuse_texture: None,
            normal_map: None,
        }
    }
}

/// A mesh drawn with one material. Neither is owned by the chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryChunk {
    mesh: MeshHandle,
    material: Arc<Material>,
}

impl GeometryChunk {
    pub fn new(mesh: MeshHandle, material: Arc<Material>) -> Self {
        Self { mesh, material }
    }

    pub fn mesh(&self) -> MeshHandle {
        self.mesh
    }

    pub fn material(&self) -> &Arc<Material> {
        &self.material
    }
}

/// Named, ordered collection of geometry chunks.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StaticModel {
    name: String,
    chunks: Vec<GeometryChunk>,
}

impl StaticModel {
    pub fn new(name: impl Into<String>, chunks: Vec<GeometryChunk>) -> Self {
        Self {
            name: name.into(),
            chunks,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn geometry_chunks(&self) -> &[GeometryChunk] {
        &self.chunks
    }
}

/// Component attaching a shared model to an entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Drawable {
    pub model: Arc<StaticModel>,
}

impl Drawable {
    pub fn new(model: Arc<StaticModel>) -> Self {
        Self { model }
    }

    pub fn geometry_chunks(&self) -> &[GeometryChunk] {
        self.model.geometry_chunks()
    }
}

/// Human-readable entity name shown by the inspector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityInfo {
    name: String,
}

impl EntityInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }
}

/// Marks the camera or light that wins resolution under the tagged policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Active;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_light_is_white_and_off_is_black() {
        assert_eq!(Light::default().color(), Vec3::ONE);
        assert_eq!(Light::OFF.color(), Vec3::ZERO);
    }

    #[test]
    fn material_builder() {
        let m = Material::new(Vec3::new(1.0, 0.0, 0.0))
            .with_emission(Vec3::splat(0.5))
            .with_diffuse_texture(TextureHandle(3));
        assert_eq!(m.albedo_color(), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(m.emission_color(), Vec3::splat(0.5));
        assert_eq!(m.diffuse_texture, Some(TextureHandle(3)));
        assert_eq!(m.normal_map, None);
    }

    #[test]
    fn chunks_share_material() {
        let material = Arc::new(Material::default());
        let model = StaticModel::new(
            "pair",
            vec![
                GeometryChunk::new(MeshHandle(0), Arc::clone(&material)),
                GeometryChunk::new(MeshHandle(1), Arc::clone(&material)),
            ],
        );
        let drawable = Drawable::new(Arc::new(model));
        assert_eq!(drawable.geometry_chunks().len(), 2);
        assert_eq!(Arc::strong_count(&material), 3);
        assert_eq!(drawable.model.name(), "pair");
    }

    #[test]
    fn orthographic_maps_corner_to_ndc_edge() {
        let camera = ProjectionCamera::orthographic(4.0, 2.0, 0.1, 10.0);
        let p = camera
            .projection_matrix()
            .project_point3(Vec3::new(2.0, 1.0, -1.0));
        assert!((p.x - 1.0).abs() < 1e-5);
        assert!((p.y - 1.0).abs() < 1e-5);
    }
}
