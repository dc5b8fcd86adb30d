use std::borrow::Cow;

use anyhow::{anyhow, Result};
use wgpu::naga::ShaderStage;

/// Compiles the particle vertex stage (drift, hover pull, sprite expansion).
pub(crate) fn compile_vertex_shader(device: &wgpu::Device) -> Result<wgpu::ShaderModule> {
    compile_glsl(device, "particle vertex", vertex_source(), ShaderStage::Vertex)
}

/// Compiles the particle fragment stage (disc mask and alpha falloff).
pub(crate) fn compile_fragment_shader(device: &wgpu::Device) -> Result<wgpu::ShaderModule> {
    compile_glsl(
        device,
        "particle fragment",
        fragment_source(),
        ShaderStage::Fragment,
    )
}

fn compile_glsl(
    device: &wgpu::Device,
    label: &str,
    source: String,
    stage: ShaderStage,
) -> Result<wgpu::ShaderModule> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Owned(source),
            stage,
            defines: &[],
        },
    });
    match pollster::block_on(device.pop_error_scope()) {
        Some(err) => Err(anyhow!("failed to compile {label}: {err}")),
        None => Ok(module),
    }
}

pub(crate) fn vertex_source() -> String {
    format!("#version 450\n{UNIFORM_BLOCK}\n{VERTEX_BODY}")
}

pub(crate) fn fragment_source() -> String {
    format!("#version 450\n{UNIFORM_BLOCK}\n{FRAGMENT_BODY}")
}

/// Uniform block shared by both stages.
///
/// Field order and std140 offsets must match [`crate::gpu::uniforms::FieldUniforms`].
const UNIFORM_BLOCK: &str = r"layout(std140, set = 0, binding = 0) uniform FieldParams {
    mat4 model_view;
    mat4 projection;
    vec2 mouse;
    vec2 viewport;
    float time;
    float speed;
    float size;
    float hover_factor;
    uint move_on_hover;
    uint alpha_particles;
    uvec2 _padding;
} u;
";

/// Each particle is an instanced quad of six vertices; the per-particle
/// attributes step per instance.
const VERTEX_BODY: &str = r"layout(location = 0) in vec3 a_position;
layout(location = 1) in vec3 a_seed;
layout(location = 2) in vec3 a_color;

layout(location = 0) out vec3 v_color;
layout(location = 1) out vec2 v_point_coord;

const vec2 corners[6] = vec2[6](
    vec2(-0.5, -0.5),
    vec2(0.5, -0.5),
    vec2(0.5, 0.5),
    vec2(-0.5, -0.5),
    vec2(0.5, 0.5),
    vec2(-0.5, 0.5)
);

void main() {
    v_color = a_color;

    float phase = u.time * u.speed;
    vec3 pos = a_position + vec3(
        sin(phase + a_seed.x * 10.0) * a_seed.x * 0.5,
        cos(phase + a_seed.y * 10.0) * a_seed.y * 0.5,
        sin(phase + a_seed.z * 10.0) * a_seed.z * 0.5
    );

    if (u.move_on_hover != 0u) {
        vec2 influence = (u.mouse - pos.xy) * u.hover_factor * 0.1;
        pos = pos + vec3(influence * a_seed.xy, 0.0);
    }

    vec4 mv_position = u.model_view * vec4(pos, 1.0);
    float point_size = u.size * a_seed.z * (1.0 / -mv_position.z);
    vec4 clip = u.projection * mv_position;

    // Expand the point into a screen-aligned square of point_size pixels.
    vec2 corner = corners[uint(gl_VertexIndex)];
    vec2 extent = corner * point_size * 2.0 / u.viewport * clip.w;
    clip = clip + vec4(extent, 0.0, 0.0);

    v_point_coord = vec2(corner.x + 0.5, 0.5 - corner.y);
    gl_Position = clip;
}
";

const FRAGMENT_BODY: &str = r"layout(location = 0) in vec3 v_color;
layout(location = 1) in vec2 v_point_coord;

layout(location = 0) out vec4 out_color;

void main() {
    float dist = length(v_point_coord - vec2(0.5, 0.5));
    if (dist > 0.5) {
        discard;
    }

    float alpha = 1.0;
    if (u.alpha_particles != 0u) {
        alpha = 1.0 - dist * 2.0;
    }
    out_color = vec4(v_color, alpha * 0.8);
}
";

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::{offset_of, size_of};

    use wgpu::naga;

    use crate::gpu::uniforms::FieldUniforms;

    fn parse_and_validate(source: &str, stage: ShaderStage) {
        let mut frontend = naga::front::glsl::Frontend::default();
        let module = frontend
            .parse(&naga::front::glsl::Options::from(stage), source)
            .unwrap_or_else(|err| panic!("{stage:?} shader failed to parse: {err:?}"));
        naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        )
        .validate(&module)
        .unwrap_or_else(|err| panic!("{stage:?} shader failed validation: {err:?}"));
    }

    #[test]
    fn vertex_stage_is_valid_glsl() {
        parse_and_validate(&vertex_source(), ShaderStage::Vertex);
    }

    #[test]
    fn fragment_stage_is_valid_glsl() {
        parse_and_validate(&fragment_source(), ShaderStage::Fragment);
    }

    #[test]
    fn uniform_block_matches_std140_layout() {
        assert_eq!(size_of::<FieldUniforms>(), 176);
        assert_eq!(offset_of!(FieldUniforms, model_view), 0);
        assert_eq!(offset_of!(FieldUniforms, projection), 64);
        assert_eq!(offset_of!(FieldUniforms, mouse), 128);
        assert_eq!(offset_of!(FieldUniforms, viewport), 136);
        assert_eq!(offset_of!(FieldUniforms, time), 144);
        assert_eq!(offset_of!(FieldUniforms, speed), 148);
        assert_eq!(offset_of!(FieldUniforms, size), 152);
        assert_eq!(offset_of!(FieldUniforms, hover_factor), 156);
        assert_eq!(offset_of!(FieldUniforms, move_on_hover), 160);
        assert_eq!(offset_of!(FieldUniforms, alpha_particles), 164);

        let fields: Vec<&str> = UNIFORM_BLOCK
            .lines()
            .skip(1)
            .take_while(|line| !line.starts_with('}'))
            .filter_map(|line| line.trim().strip_suffix(';'))
            .filter_map(|decl| decl.split_whitespace().nth(1))
            .collect();
        assert_eq!(
            fields,
            [
                "model_view",
                "projection",
                "mouse",
                "viewport",
                "time",
                "speed",
                "size",
                "hover_factor",
                "move_on_hover",
                "alpha_particles",
                "_padding",
            ]
        );
    }

    #[test]
    fn both_stages_share_the_uniform_block() {
        assert!(vertex_source().contains(UNIFORM_BLOCK));
        assert!(fragment_source().contains(UNIFORM_BLOCK));
        assert!(fragment_source().contains("discard"));
    }
}
