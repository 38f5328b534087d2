//! Ellipsoid tessellation.
//!
//! The surface is cut into `n_lon` x `n_lat` cells in parametric longitude and
//! latitude. Each cell becomes two triangles (corners 1-2-3 and 1-3-4), written
//! out as six independent vertices.

use crate::{GeometryError, check_radii, ellipsoid_point};
use std::f64::consts::PI;

/// Largest sphere that still fits a `u32` draw range.
pub const MAX_SPHERE_VERTICES: u64 = u32::MAX as u64;

/// Number of vertices produced for an `n_lon` x `n_lat` tessellation.
pub const fn sphere_vertex_count(n_lon: u32, n_lat: u32) -> usize {
    6 * n_lon as usize * n_lat as usize
}

/// Vertex count for a tessellation, rejecting zero counts and meshes past
/// [`MAX_SPHERE_VERTICES`]. Nothing is allocated.
pub fn checked_sphere_vertex_count(n_lon: u32, n_lat: u32) -> Result<u32, GeometryError> {
    if n_lon == 0 || n_lat == 0 {
        return Err(GeometryError::InvalidTessellation { n_lon, n_lat });
    }
    let count = 6u64
        .saturating_mul(u64::from(n_lon))
        .saturating_mul(u64::from(n_lat));
    if count > MAX_SPHERE_VERTICES {
        return Err(GeometryError::SphereTooDense { n_lon, n_lat });
    }
    Ok(count as u32)
}

/// Triangulated ellipsoid with per-vertex sky-map texture coordinates.
#[derive(Debug, Clone)]
pub struct SphereMesh {
    positions: Vec<[f32; 3]>,
    texcoords: Vec<[f32; 2]>,
    n_lon: u32,
    n_lat: u32,
}

impl SphereMesh {
    pub fn build(n_lon: u32, n_lat: u32, a: f64, b: f64) -> Result<Self, GeometryError> {
        let count = checked_sphere_vertex_count(n_lon, n_lat)? as usize;
        let mut positions = vec![[0.0; 3]; count];
        let mut texcoords = vec![[0.0; 2]; count];
        write_sphere(&mut positions, &mut texcoords, n_lon, n_lat, a, b)?;
        tracing::debug!(n_lon, n_lat, vertices = count, "built sphere mesh");
        Ok(Self {
            positions,
            texcoords,
            n_lon,
            n_lat,
        })
    }

    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    pub fn texcoords(&self) -> &[[f32; 2]] {
        &self.texcoords
    }

    pub fn vertex_count(&self) -> u32 {
        self.positions.len() as u32
    }

    pub fn resolution(&self) -> (u32, u32) {
        (self.n_lon, self.n_lat)
    }
}

/// Fill caller-provided buffers with the tessellated ellipsoid.
///
/// Both buffers must hold exactly [`sphere_vertex_count`] entries. Cell
/// `(i, j)` occupies vertices `6 * (j + i * n_lat)..+6` in both buffers, so
/// position and texture coordinate at the same index describe the same corner.
pub fn write_sphere(
    positions: &mut [[f32; 3]],
    texcoords: &mut [[f32; 2]],
    n_lon: u32,
    n_lat: u32,
    a: f64,
    b: f64,
) -> Result<(), GeometryError> {
    let expected = checked_sphere_vertex_count(n_lon, n_lat)? as usize;
    check_radii(a, b)?;
    for (buffer, actual) in [("position", positions.len()), ("texcoord", texcoords.len())] {
        if actual != expected {
            return Err(GeometryError::BufferSize {
                buffer,
                expected,
                actual,
            });
        }
    }

    for i in 0..n_lon {
        let lon = 2.0 * PI * (f64::from(i) / f64::from(n_lon) - 0.5);
        let lon_next = 2.0 * PI * (f64::from(i + 1) / f64::from(n_lon) - 0.5);

        for j in 0..n_lat {
            let lat = PI * (f64::from(j) / f64::from(n_lat) - 0.5);
            let lat_next = PI * (f64::from(j + 1) / f64::from(n_lat) - 0.5);
            let start = 6 * (j as usize + i as usize * n_lat as usize);

            let p1 = ellipsoid_point(a, b, lon, lat);
            let p2 = ellipsoid_point(a, b, lon_next, lat);
            let p3 = ellipsoid_point(a, b, lon_next, lat_next);
            let p4 = ellipsoid_point(a, b, lon, lat_next);
            positions[start..start + 6].copy_from_slice(&[p1, p2, p3, p1, p3, p4]);

            let (u0, u1) = (lon_to_u(lon), lon_to_u(lon_next));
            let (v0, v1) = (lat_to_v(lat), lat_to_v(lat_next));
            texcoords[start..start + 6].copy_from_slice(&[
                [u0, v0],
                [u1, v0],
                [u1, v1],
                [u0, v0],
                [u1, v1],
                [u0, v1],
            ]);
        }
    }
    Ok(())
}

fn lon_to_u(lon: f64) -> f32 {
    (lon / (2.0 * PI) + 0.5) as f32
}

fn lat_to_v(lat: f64) -> f32 {
    (-lat / PI + 0.5) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: f64 = 6378.137 * 15.0;
    const B: f64 = 6356.752 * 15.0;

    #[test]
    fn vertex_count_matches_closed_form() {
        for (n_lon, n_lat) in [(1, 1), (1, 7), (3, 2), (16, 9), (64, 32)] {
            let mesh = SphereMesh::build(n_lon, n_lat, 1.0, 1.0).unwrap();
            assert_eq!(mesh.positions().len(), 6 * (n_lon * n_lat) as usize);
            assert_eq!(mesh.texcoords().len(), mesh.positions().len());
        }
    }

    #[test]
    fn default_scene_has_15000_vertices() {
        let mesh = SphereMesh::build(50, 50, A, B).unwrap();
        assert_eq!(mesh.vertex_count(), 15000);
        assert_eq!(mesh.resolution(), (50, 50));
    }

    #[test]
    fn vertices_lie_on_ellipsoid() {
        let mesh = SphereMesh::build(12, 10, A, B).unwrap();
        for p in mesh.positions() {
            let (x, y, z) = (f64::from(p[0]), f64::from(p[1]), f64::from(p[2]));
            let r = (x * x + y * y) / (A * A) + z * z / (B * B);
            assert!((r - 1.0).abs() < 1e-5, "off surface: {p:?}");
        }
    }

    #[test]
    fn texcoords_stay_in_unit_square() {
        let mesh = SphereMesh::build(7, 5, 1.0, 1.0).unwrap();
        for t in mesh.texcoords() {
            assert!((0.0..=1.0).contains(&t[0]) && (0.0..=1.0).contains(&t[1]), "{t:?}");
        }
    }

    #[test]
    fn texcoord_describes_same_corner_as_position() {
        let mesh = SphereMesh::build(8, 6, 1.0, 1.0).unwrap();
        for (p, t) in mesh.positions().iter().zip(mesh.texcoords()) {
            let lon = (f64::from(t[0]) - 0.5) * 2.0 * PI;
            let lat = (0.5 - f64::from(t[1])) * PI;
            let q = ellipsoid_point(1.0, 1.0, lon, lat);
            for k in 0..3 {
                assert!((p[k] - q[k]).abs() < 1e-5, "{p:?} vs {q:?}");
            }
        }
    }

    #[test]
    fn first_cell_winding() {
        let mesh = SphereMesh::build(4, 2, 1.0, 1.0).unwrap();
        let p = mesh.positions();
        // 1-2-3, 1-3-4
        assert_eq!(p[0], p[3]);
        assert_eq!(p[2], p[4]);
        // south pole row: latitude -90 collapses corners 1 and 2
        assert!((p[0][2] + 1.0).abs() < 1e-6);
        assert!((p[5][2]).abs() < 1e-6);
    }

    #[test]
    fn rejects_sphere_past_u32_range() {
        assert_eq!(checked_sphere_vertex_count(50, 50).unwrap(), 15000);
        assert_eq!(
            SphereMesh::build(100_000, 100_000, 1.0, 1.0).unwrap_err(),
            GeometryError::SphereTooDense {
                n_lon: 100_000,
                n_lat: 100_000
            }
        );
        assert!(matches!(
            checked_sphere_vertex_count(u32::MAX, u32::MAX),
            Err(GeometryError::SphereTooDense { .. })
        ));
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(
            SphereMesh::build(0, 4, 1.0, 1.0).unwrap_err(),
            GeometryError::InvalidTessellation { n_lon: 0, n_lat: 4 }
        );
        assert!(matches!(
            SphereMesh::build(4, 4, 1.0, 0.0),
            Err(GeometryError::InvalidRadii { .. })
        ));
        assert!(matches!(
            SphereMesh::build(4, 4, f64::NAN, 1.0),
            Err(GeometryError::InvalidRadii { .. })
        ));
    }

    #[test]
    fn rejects_mis_sized_buffer() {
        let mut positions = vec![[0.0; 3]; 10];
        let mut texcoords = vec![[0.0; 2]; 24];
        let err = write_sphere(&mut positions, &mut texcoords, 2, 2, 1.0, 1.0).unwrap_err();
        assert_eq!(
            err,
            GeometryError::BufferSize {
                buffer: "position",
                expected: 24,
                actual: 10
            }
        );
    }
}
