use glam::{Mat4, Vec3, Vec4};
use lumen_assets::{MeshData, Topology, Vertex, VertexAttribute};
use lumen_common::{FramebufferHandle, MeshHandle, TextureHandle};

/// Linked shader program on a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgramHandle(pub u32);

/// Location of a uniform inside a program, resolved once after linking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UniformLocation(pub u32);

/// A value written to a uniform slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Int(i32),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat4(Mat4),
}

/// Shader code plus the uniform interface it declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShaderSource<'a> {
    pub label: &'a str,
    pub code: &'a str,
    pub uniforms: &'a [&'a str],
}

/// Borrowed view of mesh data for upload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshUpload<'a> {
    pub vertex_bytes: &'a [u8],
    pub vertex_stride: u32,
    pub attributes: &'a [VertexAttribute],
    pub indices: &'a [u32],
    pub topology: Topology,
}

impl MeshUpload<'_> {
    pub fn vertex_count(&self) -> u32 {
        if self.vertex_stride == 0 {
            return 0;
        }
        (self.vertex_bytes.len() / self.vertex_stride as usize) as u32
    }
}

impl<'a, V: Vertex> From<&'a MeshData<V>> for MeshUpload<'a> {
    fn from(mesh: &'a MeshData<V>) -> Self {
        Self {
            vertex_bytes: mesh.vertex_bytes(),
            vertex_stride: V::stride(),
            attributes: V::ATTRIBUTES,
            indices: mesh.indices(),
            topology: mesh.topology(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureDesc {
    pub width: u32,
    pub height: u32,
}

impl TextureDesc {
    /// Byte length of tightly packed RGBA8 pixel data.
    pub fn byte_len(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeviceError {
    #[error("program {0:?} does not exist")]
    UnknownProgram(ProgramHandle),
    #[error("mesh {0:?} does not exist")]
    UnknownMesh(MeshHandle),
    #[error("texture {0:?} does not exist")]
    UnknownTexture(TextureHandle),
    #[error("framebuffer {0:?} does not exist")]
    UnknownFramebuffer(FramebufferHandle),
    #[error("draw issued with no program bound")]
    NoProgramBound,
    #[error("mesh index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: u32 },
    #[error("texture data is {actual} bytes, expected {expected}")]
    TextureSize { expected: usize, actual: usize },
    #[error("shader {label} failed to compile: {reason}")]
    Compile { label: String, reason: String },
}

/// The GPU operations the effect and render system rely on.
///
/// Modelled on a bind-then-draw API: a program is made current, uniforms and
/// textures are written against it, then meshes are drawn.
pub trait GraphicsDevice {
    fn create_program(&mut self, source: &ShaderSource<'_>) -> Result<ProgramHandle, DeviceError>;

    /// `None` when the program does not declare `name`.
    fn uniform_location(&self, program: ProgramHandle, name: &str) -> Option<UniformLocation>;

    fn use_program(&mut self, program: ProgramHandle) -> Result<(), DeviceError>;

    /// Writes to the current program.
    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue);

    fn bind_texture(&mut self, unit: u32, texture: TextureHandle) -> Result<(), DeviceError>;

    fn upload_mesh(&mut self, mesh: MeshUpload<'_>) -> Result<MeshHandle, DeviceError>;

    fn create_texture(
        &mut self,
        desc: TextureDesc,
        pixels: &[u8],
    ) -> Result<TextureHandle, DeviceError>;

    fn create_framebuffer(
        &mut self,
        width: u32,
        height: u32,
    ) -> Result<FramebufferHandle, DeviceError>;

    /// `None` selects the default surface.
    fn bind_framebuffer(&mut self, target: Option<FramebufferHandle>) -> Result<(), DeviceError>;

    fn draw_mesh(&mut self, mesh: MeshHandle) -> Result<(), DeviceError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_assets::shapes;

    #[test]
    fn upload_view_of_box() {
        let mesh = shapes::box_mesh(Vec3::ONE, false);
        let upload = MeshUpload::from(&mesh);
        assert_eq!(upload.vertex_count(), 36);
        assert_eq!(upload.vertex_stride, 32);
        assert_eq!(upload.attributes.len(), 3);
        assert_eq!(upload.topology, Topology::Triangles);
    }

    #[test]
    fn texture_byte_len_is_rgba8() {
        let desc = TextureDesc {
            width: 4,
            height: 2,
        };
        assert_eq!(desc.byte_len(), 32);
    }
}
