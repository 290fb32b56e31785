use crate::config::{ConfigError, RenderConfig};
use crate::device::{DeviceError, GraphicsDevice, MeshUpload};
use crate::effect::{Effect, EffectError, EffectScope};
use crate::phong::UniversalPhongEffect;
use crate::resolve::{ResolveError, ResolvedCamera, ResolvedLight, resolve_camera, resolve_light};
use glam::{Vec3, Vec4};
use lumen_assets::shapes;
use lumen_common::{EntityId, FramebufferHandle, MeshHandle, Transform};
use lumen_ecs::{ComponentStore, Drawable, EventQueue, Light, Material, System, SystemEvent};
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error(transparent)]
    Effect(#[from] EffectError),
    #[error(transparent)]
    Device(#[from] DeviceError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Summary of one rendered frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameStats {
    pub frame: u64,
    pub chunk_draws: usize,
    pub marker_draws: usize,
    /// Entity the view came from, if any camera was found.
    pub camera: Option<EntityId>,
    pub light: Option<EntityId>,
}

impl FrameStats {
    pub fn draw_calls(&self) -> usize {
        self.chunk_draws + self.marker_draws
    }
}

/// Forward renderer: resolves one camera and one light per frame, then
/// draws every geometry chunk and light marker in its own effect bracket.
///
/// Draw order is store iteration order. Each chunk is drawn as
/// set light, set material, begin, set matrices, draw, end.
#[derive(Debug)]
pub struct ForwardRenderingSystem<E: Effect> {
    effect: E,
    marker_mesh: MeshHandle,
    config: RenderConfig,
    framebuffer: Option<FramebufferHandle>,
    frame: u64,
    last_stats: Option<FrameStats>,
}

impl<D: GraphicsDevice> ForwardRenderingSystem<UniversalPhongEffect<D>> {
    /// Upload the light marker cube and build the phong effect on `device`.
    pub fn new(mut device: D, config: RenderConfig) -> Result<Self, RenderError> {
        config.validate()?;
        let marker = shapes::box_mesh(Vec3::splat(config.light_marker_size), false);
        let marker_mesh = device.upload_mesh(MeshUpload::from(&marker))?;
        let effect = UniversalPhongEffect::new(device)?;
        Ok(Self::with_effect(effect, marker_mesh, config))
    }

    pub fn device(&self) -> &D {
        self.effect.device()
    }

    pub fn device_mut(&mut self) -> &mut D {
        self.effect.device_mut()
    }
}

impl<E: Effect> ForwardRenderingSystem<E> {
    pub fn with_effect(effect: E, marker_mesh: MeshHandle, config: RenderConfig) -> Self {
        Self {
            effect,
            marker_mesh,
            config,
            framebuffer: None,
            frame: 0,
            last_stats: None,
        }
    }

    /// Output target for subsequent frames. `None` is the default surface.
    pub fn set_framebuffer(&mut self, target: Option<FramebufferHandle>) {
        self.framebuffer = target;
    }

    pub fn framebuffer(&self) -> Option<FramebufferHandle> {
        self.framebuffer
    }

    pub fn effect(&self) -> &E {
        &self.effect
    }

    pub fn effect_mut(&mut self) -> &mut E {
        &mut self.effect
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn marker_mesh(&self) -> MeshHandle {
        self.marker_mesh
    }

    /// Frames rendered so far.
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    pub fn last_frame_stats(&self) -> Option<&FrameStats> {
        self.last_stats.as_ref()
    }

    /// Render one frame. `delta_time` is accepted for the host loop and not
    /// used.
    pub fn update(
        &mut self,
        entities: &ComponentStore,
        events: &mut EventQueue,
        _delta_time: Duration,
    ) -> Result<FrameStats, RenderError> {
        self.draw_frame(entities, events)
    }

    fn draw_frame(
        &mut self,
        entities: &ComponentStore,
        events: &mut EventQueue,
    ) -> Result<FrameStats, RenderError> {
        self.effect.set_render_target(self.framebuffer)?;

        let policy = self.config.resolution_policy;
        let camera = resolve_camera(entities, policy)?;
        let light = resolve_light(entities, policy)?;
        if camera.entity.is_none() {
            tracing::debug!("no camera in scene, using identity view and projection");
        }

        let chunk_draws = self.draw_geometry(entities, &camera, &light)?;
        let marker_draws = if self.config.draw_light_markers {
            self.draw_light_markers(entities, &camera, &light)?
        } else {
            0
        };

        let stats = FrameStats {
            frame: self.frame,
            chunk_draws,
            marker_draws,
            camera: camera.entity,
            light: light.entity,
        };
        self.frame += 1;
        self.last_stats = Some(stats);
        events.emit(SystemEvent::FrameRendered {
            frame: stats.frame,
            chunk_draws,
            marker_draws,
        });
        tracing::debug!(
            frame = stats.frame,
            chunk_draws,
            marker_draws,
            camera = ?camera.entity,
            light = ?light.entity,
            "frame rendered"
        );
        Ok(stats)
    }

    fn draw_geometry(
        &mut self,
        entities: &ComponentStore,
        camera: &ResolvedCamera,
        light: &ResolvedLight,
    ) -> Result<usize, RenderError> {
        let mut draws = 0;
        for (entity, transform, drawable) in entities.query::<Transform, Drawable>() {
            // An entity-level material replaces every chunk's own material.
            let entity_material = entities.get::<Material>(entity);
            for chunk in drawable.geometry_chunks() {
                let material = entity_material.unwrap_or_else(|| chunk.material().as_ref());
                self.effect.set_light(&light.transform, &light.light);
                self.effect.set_material(material);
                self.effect.set_diffuse_texture(material.diffuse_texture);
                self.effect.set_normal_map(material.normal_map);
                self.effect.set_diffuse_texture_color(match material.diffuse_texture {
                    Some(_) => Vec4::ONE,
                    None => Vec4::ZERO,
                });

                let mut scope = EffectScope::begin(&mut self.effect)?;
                scope.set_projection_matrix(camera.projection);
                scope.set_view_matrix(camera.view);
                scope.set_model_matrix(transform.matrix());
                scope.draw(chunk.mesh())?;
                drop(scope);

                tracing::trace!(%entity, mesh = chunk.mesh().0, "drew geometry chunk");
                draws += 1;
            }
        }
        Ok(draws)
    }

    fn draw_light_markers(
        &mut self,
        entities: &ComponentStore,
        camera: &ResolvedCamera,
        resolved: &ResolvedLight,
    ) -> Result<usize, RenderError> {
        let mut draws = 0;
        for (entity, transform, light) in entities.query::<Transform, Light>() {
            self.effect.set_light(&resolved.transform, &resolved.light);
            self.effect.set_solid_color(Vec3::ZERO);
            self.effect.set_emission_color(light.color());
            self.effect.set_diffuse_texture_color(Vec4::ZERO);

            let mut scope = EffectScope::begin(&mut self.effect)?;
            scope.set_projection_matrix(camera.projection);
            scope.set_view_matrix(camera.view);
            scope.set_model_matrix(transform.matrix());
            scope.draw(self.marker_mesh)?;
            drop(scope);

            tracing::trace!(%entity, "drew light marker");
            draws += 1;
        }
        Ok(draws)
    }
}

impl<E: Effect> System for ForwardRenderingSystem<E> {
    type Error = RenderError;

    fn update(
        &mut self,
        entities: &mut ComponentStore,
        events: &mut EventQueue,
        _delta_time: Duration,
    ) -> Result<(), RenderError> {
        self.draw_frame(entities, events).map(|_| ())
    }
}
