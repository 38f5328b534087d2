/// WGSL program for the textured sky sphere.
///
/// The fragment stage reconstructs the rest-frame direction from the sky-map
/// coordinate, aberrates it by the observer velocity and samples every layer
/// at the resulting coordinate. Layers are sampled unconditionally so the
/// derivative-based sampling stays in uniform control flow; hidden layers get
/// weight zero.
pub const SKY_SHADER: &str = r#"
const PI: f32 = 3.14159265358979;

struct SkyUniforms {
    view_proj: mat4x4<f32>,
    velocity: vec4<f32>,
    layer_mask: u32,
};

@group(0) @binding(0)
var<uniform> sky: SkyUniforms;

@group(1) @binding(0) var t_grid: texture_2d<f32>;
@group(1) @binding(1) var t_galaxy: texture_2d<f32>;
@group(1) @binding(2) var t_constellations: texture_2d<f32>;
@group(1) @binding(3) var t_stars: texture_2d<f32>;
@group(1) @binding(4) var t_overlay: texture_2d<f32>;
@group(1) @binding(5) var s_sky: sampler;

struct SphereVertex {
    @location(0) position: vec3<f32>,
    @location(1) texcoord: vec2<f32>,
};

struct SphereOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) texcoord: vec2<f32>,
};

@vertex
fn vs_sphere(vertex: SphereVertex) -> SphereOutput {
    var out: SphereOutput;
    out.clip_position = sky.view_proj * vec4<f32>(vertex.position, 1.0);
    out.texcoord = vertex.texcoord;
    return out;
}

fn layer_weight(unit: u32, weight: f32) -> f32 {
    return select(0.0, weight, (sky.layer_mask & (1u << unit)) != 0u);
}

fn aberrated_coord(uv: vec2<f32>) -> vec2<f32> {
    let v = sky.velocity.xyz;
    let beta = length(v);
    let gamma = 1.0 / sqrt(1.0 - beta * beta);

    let phi = uv.x * 2.0 * PI;
    let theta = (uv.y - 0.5) * PI;
    let pu = vec3<f32>(cos(theta) * cos(phi), cos(theta) * sin(phi), sin(theta));

    let pu_dot_v = dot(pu, v);
    let su = (pu + v * gamma * (1.0 + pu_dot_v * gamma / (gamma + 1.0)))
        / (gamma * (1.0 + pu_dot_v));

    return vec2<f32>(
        1.0 - atan2(su.y, su.x) / (2.0 * PI),
        0.5 + asin(clamp(su.z, -1.0, 1.0)) / PI,
    );
}

@fragment
fn fs_sphere(in: SphereOutput) -> @location(0) vec4<f32> {
    let coord = aberrated_coord(in.texcoord);

    var color = vec3<f32>(0.0);
    color += textureSample(t_grid, s_sky, coord).rgb * layer_weight(0u, 1.0);
    color += textureSample(t_galaxy, s_sky, coord).rgb * layer_weight(1u, 1.0);
    color += textureSample(t_constellations, s_sky, coord).rgb * layer_weight(2u, 0.2);
    color += textureSample(t_stars, s_sky, coord).rgb * layer_weight(3u, 1.0);
    color += textureSample(t_overlay, s_sky, coord).rgb * layer_weight(4u, 1.0);
    return vec4<f32>(color, 1.0);
}
"#;

/// WGSL program for the latitude/longitude lines.
pub const GRID_SHADER: &str = r#"
struct GridUniforms {
    view_proj: mat4x4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: GridUniforms;

struct GridVertex {
    @location(0) position: vec3<f32>,
    @location(1) color: vec4<f32>,
};

struct GridOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
};

@vertex
fn vs_grid(vertex: GridVertex) -> GridOutput {
    var out: GridOutput;
    out.clip_position = uniforms.view_proj * vec4<f32>(vertex.position, 1.0);
    out.color = vertex.color;
    return out;
}

@fragment
fn fs_grid(in: GridOutput) -> @location(0) vec4<f32> {
    return in.color;
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use aberration_common::LayerId;
    use aberration_render::{GridUniforms, SkyUniforms};

    fn validate(src: &str) -> naga::Module {
        let module = naga::front::wgsl::parse_str(src)
            .unwrap_or_else(|e| panic!("{}", e.emit_to_string(src)));
        naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::empty(),
        )
        .validate(&module)
        .unwrap_or_else(|e| panic!("{e:?}"));
        module
    }

    fn entry_points(module: &naga::Module) -> Vec<&str> {
        module.entry_points.iter().map(|e| e.name.as_str()).collect()
    }

    fn struct_span(module: &naga::Module, name: &str) -> u32 {
        module
            .types
            .iter()
            .find_map(|(_, ty)| match ty.inner {
                naga::TypeInner::Struct { span, .. } if ty.name.as_deref() == Some(name) => {
                    Some(span)
                }
                _ => None,
            })
            .unwrap_or_else(|| panic!("no struct {name}"))
    }

    #[test]
    fn sky_shader_validates() {
        let module = validate(SKY_SHADER);
        assert_eq!(entry_points(&module), ["vs_sphere", "fs_sphere"]);
    }

    #[test]
    fn grid_shader_validates() {
        let module = validate(GRID_SHADER);
        assert_eq!(entry_points(&module), ["vs_grid", "fs_grid"]);
    }

    #[test]
    fn uniform_layouts_match_host_structs() {
        let sky = validate(SKY_SHADER);
        assert_eq!(struct_span(&sky, "SkyUniforms") as usize, size_of::<SkyUniforms>());
        let grid = validate(GRID_SHADER);
        assert_eq!(struct_span(&grid, "GridUniforms") as usize, size_of::<GridUniforms>());
    }

    #[test]
    fn layer_weights_match_composite() {
        for layer in LayerId::ALL {
            let call = format!("layer_weight({}u, {:.1})", layer.unit(), layer.weight());
            assert!(SKY_SHADER.contains(&call), "missing {call}");
        }
    }
}
