use crate::device::ShaderSource;

/// Uniform names declared by the universal phong program.
pub mod uniform {
    pub const PROJECTION_MATRIX: &str = "ProjectionMatrix";
    pub const VIEW_MATRIX: &str = "ViewMatrix";
    pub const MODEL_MATRIX: &str = "ModelMatrix";
    pub const ALBEDO_MAP_SAMPLER: &str = "AlbedoMapSampler";
    pub const NORMAL_MAP_SAMPLER: &str = "NormalMapSampler";
    pub const LIGHT_COLOR: &str = "LightColor";
    pub const LIGHT_DIRECTION: &str = "LightDirection";
    pub const LIGHT_POSITION: &str = "LightPosition";
    pub const EMISSION_COLOR: &str = "EmissionColor";
    pub const SOLID_COLOR: &str = "SolidColor";
    pub const DIFFUSE_MAP_COLOR: &str = "DiffuseMapColor";
}

pub const UNIVERSAL_PHONG_UNIFORMS: &[&str] = &[
    uniform::PROJECTION_MATRIX,
    uniform::VIEW_MATRIX,
    uniform::MODEL_MATRIX,
    uniform::ALBEDO_MAP_SAMPLER,
    uniform::NORMAL_MAP_SAMPLER,
    uniform::LIGHT_COLOR,
    uniform::LIGHT_DIRECTION,
    uniform::LIGHT_POSITION,
    uniform::EMISSION_COLOR,
    uniform::SOLID_COLOR,
    uniform::DIFFUSE_MAP_COLOR,
];

/// WGSL phong shader. Final colour is
/// `(SolidColor + albedo_sample * DiffuseMapColor) * lighting + EmissionColor`,
/// so zero solid and diffuse colours leave a purely emissive surface.
pub const UNIVERSAL_PHONG: &str = r#"
struct Matrices {
    ProjectionMatrix: mat4x4<f32>,
    ViewMatrix: mat4x4<f32>,
    ModelMatrix: mat4x4<f32>,
};

struct Surface {
    LightColor: vec3<f32>,
    LightDirection: vec3<f32>,
    LightPosition: vec3<f32>,
    EmissionColor: vec3<f32>,
    SolidColor: vec4<f32>,
    DiffuseMapColor: vec4<f32>,
};

@group(0) @binding(0) var<uniform> matrices: Matrices;
@group(0) @binding(1) var<uniform> surface: Surface;
@group(1) @binding(0) var AlbedoMapSampler: texture_2d<f32>;
@group(1) @binding(1) var NormalMapSampler: texture_2d<f32>;
@group(1) @binding(2) var linear_sampler: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) tex_coords: vec2<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    @location(2) tex_coords: vec2<f32>,
    @location(3) eye_position: vec3<f32>,
};

@vertex
fn vs_main(vertex: VertexInput) -> VertexOutput {
    let world = matrices.ModelMatrix * vec4<f32>(vertex.position, 1.0);
    let inverse_view_origin = -(transpose(matrices.ViewMatrix) * matrices.ViewMatrix[3]).xyz;

    var out: VertexOutput;
    out.clip_position = matrices.ProjectionMatrix * matrices.ViewMatrix * world;
    out.world_position = world.xyz;
    out.world_normal = normalize((matrices.ModelMatrix * vec4<f32>(vertex.normal, 0.0)).xyz);
    out.tex_coords = vertex.tex_coords;
    out.eye_position = inverse_view_origin;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let albedo = textureSample(AlbedoMapSampler, linear_sampler, in.tex_coords);
    let base = surface.SolidColor.rgb + albedo.rgb * surface.DiffuseMapColor.rgb;

    let normal = normalize(in.world_normal);
    let to_light = normalize(surface.LightPosition - in.world_position);
    let to_eye = normalize(in.eye_position - in.world_position);
    let reflected = reflect(-to_light, normal);

    let ambient = 0.1;
    let diffuse = max(dot(normal, to_light), 0.0);
    let specular = pow(max(dot(to_eye, reflected), 0.0), 32.0) * 0.5;
    let lighting = surface.LightColor * (ambient + diffuse + specular);

    let alpha = max(surface.SolidColor.a, albedo.a * surface.DiffuseMapColor.a);
    return vec4<f32>(base * lighting + surface.EmissionColor, alpha);
}
"#;

pub fn universal_phong() -> ShaderSource<'static> {
    ShaderSource {
        label: "universal_phong",
        code: UNIVERSAL_PHONG,
        uniforms: UNIVERSAL_PHONG_UNIFORMS,
    }
}
