//! Command-recording device.
//!
//! Stands in for a driver-backed device: every call is validated the way a
//! GPU API would validate it and then appended to a command log. The CLI
//! prints the log and the tests assert against it.

use crate::device::{
    DeviceError, GraphicsDevice, MeshUpload, ProgramHandle, ShaderSource, TextureDesc,
    UniformLocation, UniformValue,
};
use lumen_assets::Topology;
use lumen_common::{FramebufferHandle, MeshHandle, TextureHandle};

/// One recorded device call.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCommand {
    CreateProgram {
        program: ProgramHandle,
        label: String,
    },
    UploadMesh {
        mesh: MeshHandle,
        vertex_count: u32,
        index_count: u32,
        topology: Topology,
    },
    CreateTexture {
        texture: TextureHandle,
        width: u32,
        height: u32,
    },
    CreateFramebuffer {
        framebuffer: FramebufferHandle,
        width: u32,
        height: u32,
    },
    BindFramebuffer(Option<FramebufferHandle>),
    UseProgram(ProgramHandle),
    BindTexture {
        unit: u32,
        texture: TextureHandle,
    },
    SetUniform {
        location: UniformLocation,
        value: UniformValue,
    },
    DrawMesh {
        mesh: MeshHandle,
        program: ProgramHandle,
        index_count: u32,
    },
}

impl std::fmt::Display for DeviceCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CreateProgram { program, label } => {
                write!(f, "create_program {} ({label})", program.0)
            }
            Self::UploadMesh {
                mesh,
                vertex_count,
                index_count,
                topology,
            } => write!(
                f,
                "upload_mesh {} vertices={vertex_count} indices={index_count} {topology:?}",
                mesh.0
            ),
            Self::CreateTexture {
                texture,
                width,
                height,
            } => write!(f, "create_texture {} {width}x{height}", texture.0),
            Self::CreateFramebuffer {
                framebuffer,
                width,
                height,
            } => write!(f, "create_framebuffer {} {width}x{height}", framebuffer.0),
            Self::BindFramebuffer(Some(target)) => write!(f, "bind_framebuffer {}", target.0),
            Self::BindFramebuffer(None) => write!(f, "bind_framebuffer default"),
            Self::UseProgram(program) => write!(f, "use_program {}", program.0),
            Self::BindTexture { unit, texture } => {
                write!(f, "bind_texture unit={unit} texture={}", texture.0)
            }
            Self::SetUniform { location, value } => {
                write!(f, "set_uniform {} = {value:?}", location.0)
            }
            Self::DrawMesh {
                mesh,
                program,
                index_count,
            } => write!(
                f,
                "draw_mesh {} program={} indices={index_count}",
                mesh.0, program.0
            ),
        }
    }
}

#[derive(Debug, Clone)]
struct MeshRecord {
    index_count: u32,
}

/// Device that records commands instead of talking to a GPU.
#[derive(Debug, Clone, Default)]
pub struct RecordingDevice {
    programs: Vec<String>,
    /// Indexed by `UniformLocation`.
    uniforms: Vec<(ProgramHandle, String)>,
    meshes: Vec<MeshRecord>,
    textures: u32,
    framebuffers: u32,
    current_program: Option<ProgramHandle>,
    commands: Vec<DeviceCommand>,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DeviceCommand] {
        &self.commands
    }

    /// Take the recorded commands, leaving resources and bindings intact.
    pub fn take_commands(&mut self) -> Vec<DeviceCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn draw_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DeviceCommand::DrawMesh { .. }))
            .count()
    }

    pub fn current_program(&self) -> Option<ProgramHandle> {
        self.current_program
    }

    /// Name the uniform at `location` was declared with.
    pub fn uniform_name(&self, location: UniformLocation) -> Option<&str> {
        self.uniforms
            .get(location.0 as usize)
            .map(|(_, name)| name.as_str())
    }

    /// Every value written to the uniform called `name`, oldest first.
    pub fn uniform_writes(&self, name: &str) -> Vec<UniformValue> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DeviceCommand::SetUniform { location, value }
                    if self.uniform_name(*location) == Some(name) =>
                {
                    Some(*value)
                }
                _ => None,
            })
            .collect()
    }

    /// Most recent value written to the uniform called `name`.
    pub fn last_uniform(&self, name: &str) -> Option<UniformValue> {
        self.uniform_writes(name).last().copied()
    }
}

impl GraphicsDevice for RecordingDevice {
    fn create_program(&mut self, source: &ShaderSource<'_>) -> Result<ProgramHandle, DeviceError> {
        if source.code.trim().is_empty() {
            return Err(DeviceError::Compile {
                label: source.label.to_string(),
                reason: "empty shader source".into(),
            });
        }
        let program = ProgramHandle(self.programs.len() as u32);
        self.programs.push(source.label.to_string());
        for name in source.uniforms {
            self.uniforms.push((program, (*name).to_string()));
        }
        self.commands.push(DeviceCommand::CreateProgram {
            program,
            label: source.label.to_string(),
        });
        Ok(program)
    }

    fn uniform_location(&self, program: ProgramHandle, name: &str) -> Option<UniformLocation> {
        self.uniforms
            .iter()
            .position(|(p, n)| *p == program && n == name)
            .map(|i| UniformLocation(i as u32))
    }

    fn use_program(&mut self, program: ProgramHandle) -> Result<(), DeviceError> {
        if program.0 as usize >= self.programs.len() {
            return Err(DeviceError::UnknownProgram(program));
        }
        self.current_program = Some(program);
        self.commands.push(DeviceCommand::UseProgram(program));
        Ok(())
    }

    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue) {
        if self.current_program.is_none() {
            tracing::warn!(location = location.0, "uniform written with no program bound");
        }
        self.commands
            .push(DeviceCommand::SetUniform { location, value });
    }

    fn bind_texture(&mut self, unit: u32, texture: TextureHandle) -> Result<(), DeviceError> {
        if texture.0 >= self.textures {
            return Err(DeviceError::UnknownTexture(texture));
        }
        self.commands
            .push(DeviceCommand::BindTexture { unit, texture });
        Ok(())
    }

    fn upload_mesh(&mut self, mesh: MeshUpload<'_>) -> Result<MeshHandle, DeviceError> {
        let vertex_count = mesh.vertex_count();
        if let Some(&index) = mesh.indices.iter().find(|&&i| i >= vertex_count) {
            return Err(DeviceError::IndexOutOfRange {
                index,
                vertex_count,
            });
        }
        let handle = MeshHandle(self.meshes.len() as u32);
        let index_count = mesh.indices.len() as u32;
        self.meshes.push(MeshRecord { index_count });
        self.commands.push(DeviceCommand::UploadMesh {
            mesh: handle,
            vertex_count,
            index_count,
            topology: mesh.topology,
        });
        Ok(handle)
    }

    fn create_texture(
        &mut self,
        desc: TextureDesc,
        pixels: &[u8],
    ) -> Result<TextureHandle, DeviceError> {
        if pixels.len() != desc.byte_len() {
            return Err(DeviceError::TextureSize {
                expected: desc.byte_len(),
                actual: pixels.len(),
            });
        }
        let texture = TextureHandle(self.textures);
        self.textures += 1;
        self.commands.push(DeviceCommand::CreateTexture {
            texture,
            width: desc.width,
            height: desc.height,
        });
        Ok(texture)
    }

    fn create_framebuffer(
        &mut self,
        width: u32,
        height: u32,
    ) -> Result<FramebufferHandle, DeviceError> {
        let framebuffer = FramebufferHandle(self.framebuffers);
        self.framebuffers += 1;
        self.commands.push(DeviceCommand::CreateFramebuffer {
            framebuffer,
            width,
            height,
        });
        Ok(framebuffer)
    }

    fn bind_framebuffer(&mut self, target: Option<FramebufferHandle>) -> Result<(), DeviceError> {
        if let Some(fb) = target {
            if fb.0 >= self.framebuffers {
                return Err(DeviceError::UnknownFramebuffer(fb));
            }
        }
        self.commands.push(DeviceCommand::BindFramebuffer(target));
        Ok(())
    }

    fn draw_mesh(&mut self, mesh: MeshHandle) -> Result<(), DeviceError> {
        let program = self.current_program.ok_or(DeviceError::NoProgramBound)?;
        let record = self
            .meshes
            .get(mesh.0 as usize)
            .ok_or(DeviceError::UnknownMesh(mesh))?;
        self.commands.push(DeviceCommand::DrawMesh {
            mesh,
            program,
            index_count: record.index_count,
        });
        Ok(())
    }
}
