use crate::device::{GraphicsDevice, ProgramHandle, ShaderSource, UniformLocation, UniformValue};
use crate::effect::{Effect, EffectError};
use crate::shaders::{self, uniform};
use glam::{Mat4, Vec3, Vec4};
use lumen_common::{FramebufferHandle, MeshHandle, TextureHandle, Transform};
use lumen_ecs::{Light, Material};

const DIFFUSE_TEXTURE_UNIT: u32 = 0;
const NORMAL_MAP_UNIT: u32 = 1;

/// Uniform locations, resolved once after the program links.
#[derive(Debug, Clone, Copy)]
struct Locations {
    projection: Option<UniformLocation>,
    view: Option<UniformLocation>,
    model: Option<UniformLocation>,
    albedo_sampler: Option<UniformLocation>,
    normal_sampler: Option<UniformLocation>,
    light_color: Option<UniformLocation>,
    light_direction: Option<UniformLocation>,
    light_position: Option<UniformLocation>,
    emission_color: Option<UniformLocation>,
    solid_color: Option<UniformLocation>,
    diffuse_map_color: Option<UniformLocation>,
}

impl Locations {
    fn resolve<D: GraphicsDevice>(device: &D, program: ProgramHandle) -> Self {
        let find = |name: &str| {
            let location = device.uniform_location(program, name);
            if location.is_none() {
                tracing::warn!(uniform = name, "program does not declare uniform");
            }
            location
        };
        Self {
            projection: find(uniform::PROJECTION_MATRIX),
            view: find(uniform::VIEW_MATRIX),
            model: find(uniform::MODEL_MATRIX),
            albedo_sampler: find(uniform::ALBEDO_MAP_SAMPLER),
            normal_sampler: find(uniform::NORMAL_MAP_SAMPLER),
            light_color: find(uniform::LIGHT_COLOR),
            light_direction: find(uniform::LIGHT_DIRECTION),
            light_position: find(uniform::LIGHT_POSITION),
            emission_color: find(uniform::EMISSION_COLOR),
            solid_color: find(uniform::SOLID_COLOR),
            diffuse_map_color: find(uniform::DIFFUSE_MAP_COLOR),
        }
    }
}

/// Phong lighting with solid, textured and emissive terms.
///
/// Owns its device. State set outside a `begin()`/`end()` bracket is pushed on
/// the next `begin()`.
#[derive(Debug)]
pub struct UniversalPhongEffect<D: GraphicsDevice> {
    device: D,
    program: ProgramHandle,
    locations: Locations,
    active: bool,
    light_transform: Transform,
    light: Light,
    light_direction: Vec3,
    emission_color: Vec3,
    solid_color: Vec4,
    diffuse_map_color: Vec4,
    diffuse_map: Option<TextureHandle>,
    normal_map: Option<TextureHandle>,
    projection: Mat4,
    view: Mat4,
    model: Mat4,
}

impl<D: GraphicsDevice> UniversalPhongEffect<D> {
    pub fn new(device: D) -> Result<Self, EffectError> {
        Self::with_source(device, &shaders::universal_phong())
    }

    /// Build the effect around a custom program exposing the same uniforms.
    pub fn with_source(mut device: D, source: &ShaderSource<'_>) -> Result<Self, EffectError> {
        let program = device.create_program(source)?;
        let locations = Locations::resolve(&device, program);
        tracing::debug!(label = source.label, program = program.0, "created phong effect");
        Ok(Self {
            device,
            program,
            locations,
            active: false,
            light_transform: Transform::IDENTITY,
            light: Light::OFF,
            light_direction: Vec3::NEG_Y,
            emission_color: Vec3::ZERO,
            solid_color: Vec4::new(1.0, 0.0, 0.0, 1.0),
            diffuse_map_color: Vec4::ZERO,
            diffuse_map: None,
            normal_map: None,
            projection: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            model: Mat4::IDENTITY,
        })
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    pub fn into_device(self) -> D {
        self.device
    }

    pub fn program(&self) -> ProgramHandle {
        self.program
    }

    /// Direction for directional lighting, uploaded with the other light
    /// uniforms.
    pub fn set_light_direction(&mut self, direction: Vec3) {
        self.light_direction = direction.normalize_or_zero();
        if self.active {
            self.upload_light();
        }
    }

    pub fn light(&self) -> (&Transform, &Light) {
        (&self.light_transform, &self.light)
    }

    pub fn emission_color(&self) -> Vec3 {
        self.emission_color
    }

    pub fn solid_color(&self) -> Vec4 {
        self.solid_color
    }

    pub fn diffuse_texture_color(&self) -> Vec4 {
        self.diffuse_map_color
    }

    pub fn diffuse_texture(&self) -> Option<TextureHandle> {
        self.diffuse_map
    }

    pub fn normal_map(&self) -> Option<TextureHandle> {
        self.normal_map
    }

    fn upload(&mut self, location: Option<UniformLocation>, value: UniformValue) {
        if let Some(location) = location {
            self.device.set_uniform(location, value);
        }
    }

    fn upload_light(&mut self) {
        let color = self.light.color();
        let position = self.light_transform.position();
        self.upload(self.locations.light_color, UniformValue::Vec3(color));
        self.upload(
            self.locations.light_direction,
            UniformValue::Vec3(self.light_direction),
        );
        self.upload(self.locations.light_position, UniformValue::Vec3(position));
    }

    fn upload_matrices(&mut self) {
        self.upload(self.locations.projection, UniformValue::Mat4(self.projection));
        self.upload(self.locations.view, UniformValue::Mat4(self.view));
        self.upload(self.locations.model, UniformValue::Mat4(self.model));
    }
}

impl<D: GraphicsDevice> Effect for UniversalPhongEffect<D> {
    fn begin(&mut self) -> Result<(), EffectError> {
        if self.active {
            tracing::error!("begin() called on an active effect");
            return Err(EffectError::AlreadyActive);
        }
        self.device.use_program(self.program)?;

        if let Some(texture) = self.diffuse_map {
            self.device.bind_texture(DIFFUSE_TEXTURE_UNIT, texture)?;
            self.upload(
                self.locations.albedo_sampler,
                UniformValue::Int(DIFFUSE_TEXTURE_UNIT as i32),
            );
        }
        if let Some(texture) = self.normal_map {
            self.device.bind_texture(NORMAL_MAP_UNIT, texture)?;
            self.upload(
                self.locations.normal_sampler,
                UniformValue::Int(NORMAL_MAP_UNIT as i32),
            );
        }

        self.upload(
            self.locations.emission_color,
            UniformValue::Vec3(self.emission_color),
        );
        self.upload(self.locations.solid_color, UniformValue::Vec4(self.solid_color));
        self.upload(
            self.locations.diffuse_map_color,
            UniformValue::Vec4(self.diffuse_map_color),
        );
        self.upload_light();
        self.upload_matrices();

        self.active = true;
        Ok(())
    }

    fn end(&mut self) {
        self.active = false;
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn set_light(&mut self, transform: &Transform, light: &Light) {
        self.light_transform = *transform;
        self.light = *light;
        if self.active {
            self.upload_light();
        }
    }

    fn set_material(&mut self, material: &Material) {
        self.set_emission_color(material.emission_color());
        self.set_solid_color(material.albedo_color());
    }

    fn set_solid_color_rgba(&mut self, color: Vec4) {
        self.solid_color = color;
    }

    fn set_emission_color(&mut self, color: Vec3) {
        self.emission_color = color;
    }

    fn set_diffuse_texture_color(&mut self, color: Vec4) {
        self.diffuse_map_color = color;
    }

    fn set_diffuse_texture(&mut self, texture: Option<TextureHandle>) {
        self.diffuse_map = texture;
    }

    fn set_normal_map(&mut self, texture: Option<TextureHandle>) {
        self.normal_map = texture;
    }

    fn set_projection_matrix(&mut self, matrix: Mat4) {
        self.projection = matrix;
        if self.active {
            self.upload(self.locations.projection, UniformValue::Mat4(matrix));
        }
    }

    fn set_view_matrix(&mut self, matrix: Mat4) {
        self.view = matrix;
        if self.active {
            self.upload(self.locations.view, UniformValue::Mat4(matrix));
        }
    }

    fn set_model_matrix(&mut self, matrix: Mat4) {
        self.model = matrix;
        if self.active {
            self.upload(self.locations.model, UniformValue::Mat4(matrix));
        }
    }

    fn draw(&mut self, mesh: MeshHandle) -> Result<(), EffectError> {
        if !self.active {
            tracing::error!(mesh = mesh.0, "draw() called outside begin()/end()");
            return Err(EffectError::NotActive);
        }
        self.device.draw_mesh(mesh)?;
        Ok(())
    }

    fn set_render_target(&mut self, target: Option<FramebufferHandle>) -> Result<(), EffectError> {
        self.device.bind_framebuffer(target)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{MeshUpload, TextureDesc};
    use crate::recording::{DeviceCommand, RecordingDevice};
    use lumen_assets::shapes;

    fn effect() -> UniversalPhongEffect<RecordingDevice> {
        let mut effect = UniversalPhongEffect::new(RecordingDevice::new()).unwrap();
        effect.device_mut().take_commands();
        effect
    }

    fn cube(effect: &mut UniversalPhongEffect<RecordingDevice>) -> MeshHandle {
        let mesh = shapes::box_mesh(Vec3::ONE, false);
        effect
            .device_mut()
            .upload_mesh(MeshUpload::from(&mesh))
            .unwrap()
    }

    #[test]
    fn initial_state_is_red_without_diffuse() {
        let effect = effect();
        assert_eq!(effect.solid_color(), Vec4::new(1.0, 0.0, 0.0, 1.0));
        assert_eq!(effect.diffuse_texture_color(), Vec4::ZERO);
        assert_eq!(effect.light().1, &Light::OFF);
        assert!(!effect.is_active());
    }

    #[test]
    fn begin_binds_program_and_pushes_colors() {
        let mut effect = effect();
        effect.set_emission_color(Vec3::new(0.1, 0.2, 0.3));
        effect.set_solid_color(Vec3::new(0.5, 0.5, 0.5));
        effect.begin().unwrap();

        let device = effect.device();
        assert_eq!(
            device.commands()[0],
            DeviceCommand::UseProgram(effect.program())
        );
        assert_eq!(
            device.last_uniform(uniform::EMISSION_COLOR),
            Some(UniformValue::Vec3(Vec3::new(0.1, 0.2, 0.3)))
        );
        assert_eq!(
            device.last_uniform(uniform::SOLID_COLOR),
            Some(UniformValue::Vec4(Vec4::new(0.5, 0.5, 0.5, 1.0)))
        );
        assert_eq!(
            device.last_uniform(uniform::DIFFUSE_MAP_COLOR),
            Some(UniformValue::Vec4(Vec4::ZERO))
        );
        assert!(effect.is_active());
    }

    #[test]
    fn begin_binds_textures_to_fixed_units() {
        let mut effect = effect();
        let desc = TextureDesc {
            width: 1,
            height: 1,
        };
        let albedo = effect.device_mut().create_texture(desc, &[255; 4]).unwrap();
        let normal = effect.device_mut().create_texture(desc, &[128; 4]).unwrap();
        effect.set_diffuse_texture(Some(albedo));
        effect.set_normal_map(Some(normal));
        effect.begin().unwrap();

        let commands = effect.device().commands();
        assert!(commands.contains(&DeviceCommand::BindTexture {
            unit: 0,
            texture: albedo
        }));
        assert!(commands.contains(&DeviceCommand::BindTexture {
            unit: 1,
            texture: normal
        }));
        assert_eq!(
            effect.device().last_uniform(uniform::ALBEDO_MAP_SAMPLER),
            Some(UniformValue::Int(0))
        );
        assert_eq!(
            effect.device().last_uniform(uniform::NORMAL_MAP_SAMPLER),
            Some(UniformValue::Int(1))
        );
    }

    #[test]
    fn no_texture_means_no_sampler_upload() {
        let mut effect = effect();
        effect.begin().unwrap();
        assert!(effect.device().last_uniform(uniform::ALBEDO_MAP_SAMPLER).is_none());
        assert!(!effect
            .device()
            .commands()
            .iter()
            .any(|c| matches!(c, DeviceCommand::BindTexture { .. })));
    }

    #[test]
    fn light_is_reuploaded_while_active() {
        let mut effect = effect();
        let light = Light::new(Vec3::new(1.0, 0.5, 0.0));
        let transform = Transform::from_translation(Vec3::new(0.0, 4.0, 0.0));

        effect.set_light(&transform, &light);
        assert!(effect.device().commands().is_empty());

        effect.begin().unwrap();
        effect.set_light(&Transform::IDENTITY, &Light::OFF);
        let positions = effect.device().uniform_writes(uniform::LIGHT_POSITION);
        assert_eq!(
            positions,
            vec![
                UniformValue::Vec3(Vec3::new(0.0, 4.0, 0.0)),
                UniformValue::Vec3(Vec3::ZERO)
            ]
        );
        assert_eq!(
            effect.device().last_uniform(uniform::LIGHT_COLOR),
            Some(UniformValue::Vec3(Vec3::ZERO))
        );
    }

    #[test]
    fn material_changes_wait_for_begin() {
        let mut effect = effect();
        effect.begin().unwrap();
        effect.device_mut().take_commands();
        effect.set_material(
            &Material::new(Vec3::new(0.0, 1.0, 0.0)).with_emission(Vec3::ONE),
        );
        assert!(effect.device().commands().is_empty());
        effect.end();

        effect.begin().unwrap();
        assert_eq!(
            effect.device().last_uniform(uniform::SOLID_COLOR),
            Some(UniformValue::Vec4(Vec4::new(0.0, 1.0, 0.0, 1.0)))
        );
        assert_eq!(
            effect.device().last_uniform(uniform::EMISSION_COLOR),
            Some(UniformValue::Vec3(Vec3::ONE))
        );
    }

    #[test]
    fn matrices_set_before_begin_are_pushed_by_begin() {
        let mut effect = effect();
        let model = Mat4::from_translation(Vec3::X);
        effect.set_model_matrix(model);
        assert!(effect.device().commands().is_empty());
        effect.begin().unwrap();
        assert_eq!(
            effect.device().last_uniform(uniform::MODEL_MATRIX),
            Some(UniformValue::Mat4(model))
        );
    }

    #[test]
    fn matrices_set_while_active_upload_immediately() {
        let mut effect = effect();
        effect.begin().unwrap();
        let view = Mat4::from_translation(Vec3::new(0.0, 0.0, -5.0));
        effect.set_view_matrix(view);
        assert_eq!(
            effect.device().last_uniform(uniform::VIEW_MATRIX),
            Some(UniformValue::Mat4(view))
        );
    }

    #[test]
    fn draw_requires_active_effect() {
        let mut effect = effect();
        let mesh = cube(&mut effect);
        assert_eq!(effect.draw(mesh), Err(EffectError::NotActive));
        effect.begin().unwrap();
        effect.draw(mesh).unwrap();
        effect.end();
        assert_eq!(effect.device().draw_count(), 1);
    }

    #[test]
    fn nested_begin_fails() {
        let mut effect = effect();
        effect.begin().unwrap();
        assert_eq!(effect.begin(), Err(EffectError::AlreadyActive));
        effect.end();
        assert!(effect.begin().is_ok());
    }

    #[test]
    fn light_direction_is_normalized() {
        let mut effect = effect();
        effect.set_light_direction(Vec3::new(0.0, -2.0, 0.0));
        effect.begin().unwrap();
        assert_eq!(
            effect.device().last_uniform(uniform::LIGHT_DIRECTION),
            Some(UniformValue::Vec3(Vec3::NEG_Y))
        );
    }

    #[test]
    fn missing_uniforms_are_skipped() {
        let source = ShaderSource {
            label: "bare",
            code: "fn main() {}",
            uniforms: &[uniform::MODEL_MATRIX],
        };
        let mut effect =
            UniversalPhongEffect::with_source(RecordingDevice::new(), &source).unwrap();
        effect.device_mut().take_commands();
        effect.begin().unwrap();
        let uploads = effect
            .device()
            .commands()
            .iter()
            .filter(|c| matches!(c, DeviceCommand::SetUniform { .. }))
            .count();
        assert_eq!(uploads, 1);
    }

    #[test]
    fn render_target_is_forwarded() {
        let mut effect = effect();
        let fb = effect.device_mut().create_framebuffer(32, 32).unwrap();
        effect.set_render_target(Some(fb)).unwrap();
        assert_eq!(
            effect.device().commands().last(),
            Some(&DeviceCommand::BindFramebuffer(Some(fb)))
        );
    }
}
