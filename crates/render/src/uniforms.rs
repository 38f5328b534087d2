use aberration_common::LayerVisibility;
use bytemuck::{Pod, Zeroable};
use glam::{DVec3, Mat4};

/// Uniform block of the sphere program. Matches `SkyUniforms` in the WGSL source.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct SkyUniforms {
    pub view_proj: [[f32; 4]; 4],
    /// Observer velocity in units of c; `w` is unused.
    pub velocity: [f32; 4],
    /// Bit `unit` set for every visible layer.
    pub layer_mask: u32,
    pub _pad: [u32; 3],
}

impl SkyUniforms {
    pub fn new(view_proj: Mat4, velocity: DVec3, visibility: &LayerVisibility) -> Self {
        let v = velocity.as_vec3();
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            velocity: [v.x, v.y, v.z, 0.0],
            layer_mask: visibility.mask(),
            _pad: [0; 3],
        }
    }
}

/// Uniform block of the grid-line program.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct GridUniforms {
    pub view_proj: [[f32; 4]; 4],
}

impl GridUniforms {
    pub fn new(view_proj: Mat4) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aberration_common::LayerId;

    #[test]
    fn layouts_match_wgsl() {
        // mat4x4 (64) + vec4 (16) + u32 padded to the 16-byte struct alignment
        assert_eq!(std::mem::size_of::<SkyUniforms>(), 96);
        assert_eq!(std::mem::size_of::<GridUniforms>(), 64);
    }

    #[test]
    fn packs_velocity_and_mask() {
        let mut vis = LayerVisibility::NONE;
        vis.set(LayerId::Stars, true);
        let u = SkyUniforms::new(Mat4::IDENTITY, DVec3::new(0.5, -0.25, 0.125), &vis);
        assert_eq!(u.velocity, [0.5, -0.25, 0.125, 0.0]);
        assert_eq!(u.layer_mask, 1 << 3);
        assert_eq!(u.view_proj, Mat4::IDENTITY.to_cols_array_2d());
    }

    #[test]
    fn matrix_is_column_major() {
        let m = Mat4::from_translation(glam::Vec3::new(1.0, 2.0, 3.0));
        let u = GridUniforms::new(m);
        assert_eq!(u.view_proj[3], [1.0, 2.0, 3.0, 1.0]);
    }
}
