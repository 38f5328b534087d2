//! Procedural geometry for the celestial sphere.
//!
//! Two static meshes are produced here and uploaded once by the renderer:
//! a triangulated ellipsoid with sky-map texture coordinates, and a wireframe
//! of latitude rings and longitude meridians inset slightly below the surface.
//!
//! # Invariants
//! - Sphere vertex count is exactly `6 * n_lon * n_lat` (no index buffer).
//! - Grid position and color buffers always have the same length, `2 * line_count`.

mod grid;
mod sphere;

pub use grid::{
    GRID_INSET, GRID_SAMPLE_STEP_DEG, GridMesh, MAX_GRID_LINES, MERIDIAN_SEGMENTS, RING_SEGMENTS,
    grid_line_count,
};
pub use sphere::{
    MAX_SPHERE_VERTICES, SphereMesh, checked_sphere_vertex_count, sphere_vertex_count, write_sphere,
};

/// Errors from geometry generation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    #[error("tessellation counts must be >= 1, got n_lon={n_lon}, n_lat={n_lat}")]
    InvalidTessellation { n_lon: u32, n_lat: u32 },
    #[error("{n_lon}x{n_lat} sphere exceeds {MAX_SPHERE_VERTICES} vertices")]
    SphereTooDense { n_lon: u32, n_lat: u32 },
    #[error("radii must be positive and finite, got a={a}, b={b}")]
    InvalidRadii { a: f64, b: f64 },
    #[error("grid steps must be positive and finite, got lon={lon}, lat={lat}")]
    InvalidGridStep { lon: f64, lat: f64 },
    #[error("grid of {lines} lines exceeds the limit of {MAX_GRID_LINES}")]
    GridTooDense { lines: u64 },
    #[error("{buffer} buffer holds {actual} vertices, expected {expected}")]
    BufferSize {
        buffer: &'static str,
        expected: usize,
        actual: usize,
    },
}

fn check_radii(a: f64, b: f64) -> Result<(), GeometryError> {
    let ok = |r: f64| r.is_finite() && r > 0.0;
    if ok(a) && ok(b) {
        Ok(())
    } else {
        Err(GeometryError::InvalidRadii { a, b })
    }
}

/// Point on the ellipsoid with equatorial radius `a` and polar radius `b`. Angles in radians.
fn ellipsoid_point(a: f64, b: f64, lon: f64, lat: f64) -> [f32; 3] {
    [
        (a * lat.cos() * lon.cos()) as f32,
        (a * lat.cos() * lon.sin()) as f32,
        (b * lat.sin()) as f32,
    ]
}
