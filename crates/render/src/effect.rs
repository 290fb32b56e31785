use crate::device::DeviceError;
use glam::{Mat4, Vec3, Vec4};
use lumen_common::{FramebufferHandle, MeshHandle, TextureHandle, Transform};
use lumen_ecs::{Light, Material};
use std::ops::{Deref, DerefMut};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EffectError {
    #[error("effect is already active; end() must be called before begin()")]
    AlreadyActive,
    #[error("effect is not active; call begin() first")]
    NotActive,
    #[error(transparent)]
    Device(#[from] DeviceError),
}

/// A shader program wrapper with a begin/end activation protocol.
///
/// Setters cache state. Anything cached while inactive is uploaded by the
/// next `begin()`; light and matrices set while active are uploaded
/// immediately. Only one effect may be active on a device at a time.
pub trait Effect {
    /// Activate the program and push cached state.
    fn begin(&mut self) -> Result<(), EffectError>;

    fn end(&mut self);

    fn is_active(&self) -> bool;

    fn set_light(&mut self, transform: &Transform, light: &Light);

    /// Takes emission and albedo colours from the material.
    fn set_material(&mut self, material: &Material);

    fn set_solid_color_rgba(&mut self, color: Vec4);

    /// Opaque solid colour.
    fn set_solid_color(&mut self, color: Vec3) {
        self.set_solid_color_rgba(color.extend(1.0));
    }

    fn set_emission_color(&mut self, color: Vec3);

    /// Multiplier applied to the diffuse texture sample; zero suppresses it.
    fn set_diffuse_texture_color(&mut self, color: Vec4);

    fn set_diffuse_texture(&mut self, texture: Option<TextureHandle>);

    fn set_normal_map(&mut self, texture: Option<TextureHandle>);

    fn set_projection_matrix(&mut self, matrix: Mat4);

    fn set_view_matrix(&mut self, matrix: Mat4);

    fn set_model_matrix(&mut self, matrix: Mat4);

    /// Draw a mesh with the current state. Fails unless active.
    fn draw(&mut self, mesh: MeshHandle) -> Result<(), EffectError>;

    /// Select the framebuffer subsequent draws write to.
    fn set_render_target(&mut self, target: Option<FramebufferHandle>) -> Result<(), EffectError>;

    /// Begin and return a guard that ends the effect when dropped.
    fn scope(&mut self) -> Result<EffectScope<'_, Self>, EffectError>
    where
        Self: Sized,
    {
        EffectScope::begin(self)
    }
}

/// An active effect. `end()` runs on drop, including on early return.
pub struct EffectScope<'a, E: Effect + ?Sized> {
    effect: &'a mut E,
}

impl<'a, E: Effect + ?Sized> EffectScope<'a, E> {
    pub fn begin(effect: &'a mut E) -> Result<Self, EffectError> {
        effect.begin()?;
        Ok(Self { effect })
    }
}

impl<E: Effect + ?Sized> Deref for EffectScope<'_, E> {
    type Target = E;

    fn deref(&self) -> &E {
        self.effect
    }
}

impl<E: Effect + ?Sized> DerefMut for EffectScope<'_, E> {
    fn deref_mut(&mut self) -> &mut E {
        self.effect
    }
}

impl<E: Effect + ?Sized> Drop for EffectScope<'_, E> {
    fn drop(&mut self) {
        self.effect.end();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Flag {
        active: bool,
        ends: usize,
        solid: Vec4,
    }

    impl Effect for Flag {
        fn begin(&mut self) -> Result<(), EffectError> {
            if self.active {
                return Err(EffectError::AlreadyActive);
            }
            self.active = true;
            Ok(())
        }
        fn end(&mut self) {
            self.active = false;
            self.ends += 1;
        }
        fn is_active(&self) -> bool {
            self.active
        }
        fn set_light(&mut self, _: &Transform, _: &Light) {}
        fn set_material(&mut self, _: &Material) {}
        fn set_solid_color_rgba(&mut self, color: Vec4) {
            self.solid = color;
        }
        fn set_emission_color(&mut self, _: Vec3) {}
        fn set_diffuse_texture_color(&mut self, _: Vec4) {}
        fn set_diffuse_texture(&mut self, _: Option<TextureHandle>) {}
        fn set_normal_map(&mut self, _: Option<TextureHandle>) {}
        fn set_projection_matrix(&mut self, _: Mat4) {}
        fn set_view_matrix(&mut self, _: Mat4) {}
        fn set_model_matrix(&mut self, _: Mat4) {}
        fn draw(&mut self, _: MeshHandle) -> Result<(), EffectError> {
            if !self.active {
                return Err(EffectError::NotActive);
            }
            Err(EffectError::Device(DeviceError::NoProgramBound))
        }
        fn set_render_target(&mut self, _: Option<FramebufferHandle>) -> Result<(), EffectError> {
            Ok(())
        }
    }

    #[test]
    fn scope_ends_on_drop() {
        let mut effect = Flag::default();
        {
            let scope = effect.scope().unwrap();
            assert!(scope.is_active());
        }
        assert!(!effect.is_active());
        assert_eq!(effect.ends, 1);
    }

    #[test]
    fn scope_ends_on_error_path() {
        fn draw_once(effect: &mut Flag) -> Result<(), EffectError> {
            let mut scope = effect.scope()?;
            scope.draw(MeshHandle(0))?;
            Ok(())
        }
        let mut effect = Flag::default();
        assert!(draw_once(&mut effect).is_err());
        assert!(!effect.is_active());
        assert_eq!(effect.ends, 1);
    }

    #[test]
    fn nested_begin_is_rejected() {
        let mut effect = Flag::default();
        effect.begin().unwrap();
        assert_eq!(effect.begin(), Err(EffectError::AlreadyActive));
    }

    #[test]
    fn solid_color_defaults_to_opaque() {
        let mut effect = Flag::default();
        effect.set_solid_color(Vec3::new(0.2, 0.4, 0.6));
        assert_eq!(effect.solid, Vec4::new(0.2, 0.4, 0.6, 1.0));
    }
}
