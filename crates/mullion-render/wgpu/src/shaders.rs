//! WGSL shaders for the quad pipelines and the present blit.

/// Solid and textured quads in pixel coordinates. `fs_solid` ignores the
/// uv channel; `fs_textured` modulates the vertex color with the sampled
/// texel, which is how both images and glyph atlas quads are drawn.
pub const QUAD_SHADER: &str = r#"
struct Uniforms {
    viewport: vec2<f32>,
    _padding: vec2<f32>,
}

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct VertexInput {
    @location(0) position: vec2<f32>,
    @location(1) color: vec4<f32>,
    @location(2) uv: vec2<f32>,
}

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
    @location(1) uv: vec2<f32>,
}

@vertex
fn vs_main(input: VertexInput) -> VertexOutput {
    var output: VertexOutput;

    // Convert from pixel coordinates to clip space
    let x = (input.position.x / uniforms.viewport.x) * 2.0 - 1.0;
    let y = 1.0 - (input.position.y / uniforms.viewport.y) * 2.0;

    output.clip_position = vec4<f32>(x, y, 0.0, 1.0);
    output.color = input.color;
    output.uv = input.uv;
    return output;
}

@fragment
fn fs_solid(input: VertexOutput) -> @location(0) vec4<f32> {
    return input.color;
}

@group(1) @binding(0)
var quad_texture: texture_2d<f32>;

@group(1) @binding(1)
var quad_sampler: sampler;

@fragment
fn fs_textured(input: VertexOutput) -> @location(0) vec4<f32> {
    return input.color * textureSample(quad_texture, quad_sampler, input.uv);
}
"#;

/// Fullscreen-triangle copy of the offscreen frame target into the
/// swap chain image.
pub const BLIT_SHADER: &str = r#"
struct BlitOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
}

@vertex
fn vs_blit(@builtin(vertex_index) index: u32) -> BlitOutput {
    let corner = vec2<f32>(f32((index << 1u) & 2u), f32(index & 2u));
    var output: BlitOutput;
    output.clip_position = vec4<f32>(corner * 2.0 - 1.0, 0.0, 1.0);
    output.uv = vec2<f32>(corner.x, 1.0 - corner.y);
    return output;
}

@group(0) @binding(0)
var frame_texture: texture_2d<f32>;

@group(0) @binding(1)
var frame_sampler: sampler;

@fragment
fn fs_blit(input: BlitOutput) -> @location(0) vec4<f32> {
    return textureSample(frame_texture, frame_sampler, input.uv);
}
"#;
