//! YAML/JSON scene descriptions.
//!
//! A scene file lists entities with an optional camera, light, area light
//! and a model built from procedural shapes. Spawning uploads each distinct
//! shape once through a `MeshCache`.

use glam::{EulerRot, Mat4, Quat, Vec3};
use lumen_assets::shapes;
use lumen_common::{EntityId, Transform, TransformError};
use lumen_ecs::{
    Active, AreaLight, ComponentStore, Drawable, EntityInfo, GeometryChunk, Light, Material,
    ProjectionCamera, StaticModel, StoreError,
};
use lumen_render::{DeviceError, GraphicsDevice, MeshCache};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum SceneFileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported scene extension: {0:?}")]
    UnsupportedFormat(Option<String>),
    #[error("entity {name:?}: {reason}")]
    Invalid { name: String, reason: String },
    #[error("entity {name:?}: {source}")]
    Transform {
        name: String,
        #[source]
        source: TransformError,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Device(#[from] DeviceError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformDescription {
    pub translation: Vec3,
    /// Euler angles in degrees, applied X then Y then Z.
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for TransformDescription {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl TransformDescription {
    pub fn to_transform(&self) -> Result<Transform, TransformError> {
        let rotation = Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x.to_radians(),
            self.rotation.y.to_radians(),
            self.rotation.z.to_radians(),
        );
        Transform::new(Mat4::from_scale_rotation_translation(
            self.scale,
            rotation,
            self.translation,
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CameraDescription {
    Perspective {
        fov_y_degrees: f32,
        aspect: f32,
        near: f32,
        far: f32,
    },
    Orthographic {
        width: f32,
        height: f32,
        near: f32,
        far: f32,
    },
}

impl CameraDescription {
    fn validate(&self) -> Result<(), String> {
        let (near, far) = match *self {
            Self::Perspective {
                fov_y_degrees,
                aspect,
                near,
                far,
            } => {
                if !(fov_y_degrees > 0.0 && fov_y_degrees < 180.0) {
                    return Err(format!("fov_y_degrees {fov_y_degrees} out of range"));
                }
                if aspect <= 0.0 {
                    return Err(format!("aspect {aspect} must be positive"));
                }
                (near, far)
            }
            Self::Orthographic {
                width,
                height,
                near,
                far,
            } => {
                if width <= 0.0 || height <= 0.0 {
                    return Err("orthographic extent must be positive".into());
                }
                (near, far)
            }
        };
        if !(near > 0.0 && far > near) {
            return Err(format!("clip range {near}..{far} is invalid"));
        }
        Ok(())
    }

    pub fn to_camera(&self) -> ProjectionCamera {
        match *self {
            Self::Perspective {
                fov_y_degrees,
                aspect,
                near,
                far,
            } => ProjectionCamera::perspective(fov_y_degrees.to_radians(), aspect, near, far),
            Self::Orthographic {
                width,
                height,
                near,
                far,
            } => ProjectionCamera::orthographic(width, height, near, far),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialDescription {
    pub albedo: Vec3,
    pub emission: Vec3,
}

impl Default for MaterialDescription {
    fn default() -> Self {
        Self {
            albedo: Vec3::ONE,
            emission: Vec3::ZERO,
        }
    }
}

impl MaterialDescription {
    pub fn to_material(&self) -> Material {
        Material::new(self.albedo).with_emission(self.emission)
    }
}

/// Procedural shape for a geometry chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ShapeDescription {
    Box {
        size: Vec3,
        #[serde(default)]
        flip_normals: bool,
    },
    Plane {
        width: f32,
        length: f32,
    },
    Cylinder {
        height: f32,
        radius: f32,
        subdivisions: u32,
    },
    Sphere {
        radius: f32,
        latitude: u32,
        longitude: u32,
    },
    Cone {
        height: f32,
        radius: f32,
        subdivisions: u32,
        #[serde(default = "default_cone_cuts")]
        cuts: u32,
    },
}

fn default_cone_cuts() -> u32 {
    2
}

impl ShapeDescription {
    fn upload<D: GraphicsDevice + ?Sized>(
        &self,
        device: &mut D,
        cache: &mut MeshCache,
    ) -> Result<lumen_common::MeshHandle, DeviceError> {
        let mesh = match *self {
            Self::Box { size, flip_normals } => shapes::box_mesh(size, flip_normals),
            Self::Plane { width, length } => shapes::plane(width, length),
            Self::Cylinder {
                height,
                radius,
                subdivisions,
            } => shapes::cylinder(height, radius, subdivisions),
            Self::Sphere {
                radius,
                latitude,
                longitude,
            } => shapes::sphere(radius, latitude, longitude),
            Self::Cone {
                height,
                radius,
                subdivisions,
                cuts,
            } => shapes::cone(height, radius, subdivisions, cuts),
        };
        cache.get_or_upload(device, &mesh)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkDescription {
    #[serde(flatten)]
    pub shape: ShapeDescription,
    #[serde(default)]
    pub material: MaterialDescription,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescription {
    pub name: String,
    pub chunks: Vec<ChunkDescription>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDescription {
    pub name: String,
    #[serde(default)]
    pub transform: TransformDescription,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera: Option<CameraDescription>,
    /// Light colour.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub light: Option<Vec3>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_light: Option<AreaLight>,
    /// Tag for the `tagged` resolution policy.
    #[serde(default)]
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelDescription>,
    /// Overrides every chunk material of the model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<MaterialDescription>,
}

impl EntityDescription {
    fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            transform: TransformDescription::default(),
            camera: None,
            light: None,
            area_light: None,
            active: false,
            model: None,
            material: None,
        }
    }

    fn invalid(&self, reason: impl Into<String>) -> SceneFileError {
        SceneFileError::Invalid {
            name: self.name.clone(),
            reason: reason.into(),
        }
    }

    fn validate(&self) -> Result<(), SceneFileError> {
        if let Some(camera) = &self.camera {
            camera.validate().map_err(|reason| self.invalid(reason))?;
        }
        if let Some(color) = self.light {
            if !color.is_finite() || color.min_element() < 0.0 {
                return Err(self.invalid(format!(
                    "light color {color} must be finite and non-negative"
                )));
            }
        }
        if let Some(model) = &self.model {
            if model.chunks.is_empty() {
                return Err(self.invalid(format!("model {:?} has no chunks", model.name)));
            }
        }
        Ok(())
    }
}

/// A scene loaded from a file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDescription {
    #[serde(default)]
    pub name: String,
    pub entities: Vec<EntityDescription>,
}

impl SceneDescription {
    /// Load from a `.yaml`/`.yml` or `.json` file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SceneFileError> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        let scene: Self = match extension.as_deref() {
            Some("yaml" | "yml") => serde_yaml::from_str(&data)?,
            Some("json") => serde_json::from_str(&data)?,
            _ => return Err(SceneFileError::UnsupportedFormat(extension)),
        };
        scene.validate()?;
        tracing::info!(path = %path.display(), entities = scene.entities.len(), "loaded scene");
        Ok(scene)
    }

    /// Save as YAML.
    pub fn save_yaml(&self, path: impl AsRef<Path>) -> Result<(), SceneFileError> {
        let file = std::fs::File::create(path)?;
        serde_yaml::to_writer(file, self)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), SceneFileError> {
        for entity in &self.entities {
            entity.validate()?;
        }
        Ok(())
    }

    /// Create every entity in `store`, uploading meshes through `cache`.
    /// Returns the new entity ids in file order.
    ///
    /// Spawning is all or nothing for the store: on error every entity this
    /// call created is destroyed again. Meshes already uploaded stay in the
    /// cache.
    pub fn spawn<D: GraphicsDevice + ?Sized>(
        &self,
        store: &mut ComponentStore,
        device: &mut D,
        cache: &mut MeshCache,
    ) -> Result<Vec<EntityId>, SceneFileError> {
        self.validate()?;
        let mut spawned = Vec::with_capacity(self.entities.len());
        for desc in &self.entities {
            if let Err(err) = Self::spawn_entity(desc, store, device, cache, &mut spawned) {
                tracing::warn!(
                    name = %desc.name,
                    rolled_back = spawned.len(),
                    "scene spawn failed: {err}"
                );
                for entity in spawned {
                    store.destroy(entity);
                }
                return Err(err);
            }
        }
        Ok(spawned)
    }

    fn spawn_entity<D: GraphicsDevice + ?Sized>(
        desc: &EntityDescription,
        store: &mut ComponentStore,
        device: &mut D,
        cache: &mut MeshCache,
        spawned: &mut Vec<EntityId>,
    ) -> Result<(), SceneFileError> {
        let transform = desc
            .transform
            .to_transform()
            .map_err(|source| SceneFileError::Transform {
                name: desc.name.clone(),
                source,
            })?;

        let entity = store.create();
        spawned.push(entity);
        store.assign(entity, EntityInfo::new(desc.name.as_str()))?;
        store.assign(entity, transform)?;
        if let Some(camera) = &desc.camera {
            store.assign(entity, camera.to_camera())?;
        }
        if let Some(color) = desc.light {
            store.assign(entity, Light::new(color))?;
        }
        if let Some(area_light) = desc.area_light {
            store.assign(entity, area_light)?;
        }
        if desc.active {
            store.assign(entity, Active)?;
        }
        if let Some(model) = &desc.model {
            let mut chunks = Vec::with_capacity(model.chunks.len());
            for chunk in &model.chunks {
                let mesh = chunk.shape.upload(device, cache)?;
                let material = Arc::new(chunk.material.to_material());
                chunks.push(GeometryChunk::new(mesh, material));
            }
            let model = StaticModel::new(model.name.as_str(), chunks);
            store.assign(entity, Drawable::new(Arc::new(model)))?;
        }
        if let Some(material) = &desc.material {
            store.assign(entity, material.to_material())?;
        }
        tracing::debug!(%entity, name = %desc.name, "spawned entity");
        Ok(())
    }

    /// A lit cube on a floor, seen from a camera above and in front.
    pub fn demo() -> Self {
        let camera = EntityDescription {
            transform: TransformDescription {
                translation: Vec3::new(0.0, 3.0, 8.0),
                rotation: Vec3::new(-20.0, 0.0, 0.0),
                ..TransformDescription::default()
            },
            camera: Some(CameraDescription::Perspective {
                fov_y_degrees: 60.0,
                aspect: 16.0 / 9.0,
                near: 0.1,
                far: 100.0,
            }),
            ..EntityDescription::named("Camera")
        };
        let light = EntityDescription {
            transform: TransformDescription {
                translation: Vec3::new(2.0, 4.0, 2.0),
                ..TransformDescription::default()
            },
            light: Some(Vec3::ONE),
            ..EntityDescription::named("Light")
        };
        let cube = EntityDescription {
            transform: TransformDescription {
                translation: Vec3::new(0.0, 0.5, 0.0),
                rotation: Vec3::new(0.0, 30.0, 0.0),
                ..TransformDescription::default()
            },
            model: Some(ModelDescription {
                name: "cube".into(),
                chunks: vec![ChunkDescription {
                    shape: ShapeDescription::Box {
                        size: Vec3::ONE,
                        flip_normals: false,
                    },
                    material: MaterialDescription {
                        albedo: Vec3::new(0.8, 0.3, 0.2),
                        emission: Vec3::ZERO,
                    },
                }],
            }),
            ..EntityDescription::named("Cube")
        };
        let floor = EntityDescription {
            model: Some(ModelDescription {
                name: "floor".into(),
                chunks: vec![ChunkDescription {
                    shape: ShapeDescription::Plane {
                        width: 10.0,
                        length: 10.0,
                    },
                    material: MaterialDescription::default(),
                }],
            }),
            ..EntityDescription::named("Floor")
        };
        Self {
            name: "demo".into(),
            entities: vec![camera, light, cube, floor],
        }
    }
}
