//! Latitude/longitude wireframe drawn on top of the sky sphere.

use crate::{GeometryError, check_radii, ellipsoid_point};

/// Scale applied to grid points so lines sit just inside the sphere surface.
pub const GRID_INSET: f64 = 0.998;
/// Angular spacing of the points along a ring or meridian.
pub const GRID_SAMPLE_STEP_DEG: f64 = 2.0;
/// Segments per latitude ring: a full turn of longitude at the sample step.
pub const RING_SEGMENTS: u32 = 180;
/// Segments per meridian: pole to pole at the sample step.
pub const MERIDIAN_SEGMENTS: u32 = 90;
/// Upper bound on the number of lines in one grid.
pub const MAX_GRID_LINES: u64 = 1 << 22;

/// Rings at every multiple of `lat_step` within +-90 and meridians at every
/// multiple of `lon_step` within +-180, as `(rings, meridians)`.
fn line_families(lon_step: f64, lat_step: f64) -> Result<(i64, i64), GeometryError> {
    let ok = |s: f64| s.is_finite() && s > 0.0;
    if !ok(lon_step) || !ok(lat_step) {
        return Err(GeometryError::InvalidGridStep {
            lon: lon_step,
            lat: lat_step,
        });
    }
    let half_rings = (90.0 / lat_step).floor() as i64;
    let half_meridians = (180.0 / lon_step).floor() as i64;
    Ok((half_rings, half_meridians))
}

/// Closed-form line count for the given grid steps in degrees.
pub fn grid_line_count(lon_step: f64, lat_step: f64) -> Result<u32, GeometryError> {
    let (half_rings, half_meridians) = line_families(lon_step, lat_step)?;
    let family = |half: i64, segments: u32| {
        (half as u64)
            .saturating_mul(2)
            .saturating_add(1)
            .saturating_mul(u64::from(segments))
    };
    let lines = family(half_rings, RING_SEGMENTS)
        .saturating_add(family(half_meridians, MERIDIAN_SEGMENTS));
    if lines > MAX_GRID_LINES {
        return Err(GeometryError::GridTooDense { lines });
    }
    Ok(lines as u32)
}

/// Line-list mesh with a parallel per-vertex color buffer.
#[derive(Debug, Clone)]
pub struct GridMesh {
    positions: Vec<[f32; 3]>,
    colors: Vec<[u8; 4]>,
    line_count: u32,
    lon_step: f64,
    lat_step: f64,
}

impl GridMesh {
    pub fn build(
        lon_step: f64,
        lat_step: f64,
        a: f64,
        b: f64,
        color: [u8; 3],
    ) -> Result<Self, GeometryError> {
        check_radii(a, b)?;
        let line_count = grid_line_count(lon_step, lat_step)?;
        let (half_rings, half_meridians) = line_families(lon_step, lat_step)?;
        let (a, b) = (GRID_INSET * a, GRID_INSET * b);

        let mut positions = Vec::with_capacity(2 * line_count as usize);
        let mut push_segment = |lon0: f64, lat0: f64, lon1: f64, lat1: f64| {
            positions.push(ellipsoid_point(a, b, lon0.to_radians(), lat0.to_radians()));
            positions.push(ellipsoid_point(a, b, lon1.to_radians(), lat1.to_radians()));
        };

        for ring in -half_rings..=half_rings {
            let lat = ring as f64 * lat_step;
            for k in 0..RING_SEGMENTS {
                let lon = -180.0 + f64::from(k) * GRID_SAMPLE_STEP_DEG;
                push_segment(lon, lat, lon + GRID_SAMPLE_STEP_DEG, lat);
            }
        }
        for meridian in -half_meridians..=half_meridians {
            let lon = meridian as f64 * lon_step;
            for k in 0..MERIDIAN_SEGMENTS {
                let lat = -90.0 + f64::from(k) * GRID_SAMPLE_STEP_DEG;
                push_segment(lon, lat, lon, lat + GRID_SAMPLE_STEP_DEG);
            }
        }

        debug_assert_eq!(positions.len(), 2 * line_count as usize);
        let colors = vec![[color[0], color[1], color[2], 255]; positions.len()];
        tracing::debug!(lon_step, lat_step, line_count, "built grid mesh");

        Ok(Self {
            positions,
            colors,
            line_count,
            lon_step,
            lat_step,
        })
    }

    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    pub fn colors(&self) -> &[[u8; 4]] {
        &self.colors
    }

    pub fn line_count(&self) -> u32 {
        self.line_count
    }

    /// Vertex count for the line draw: two endpoints per line.
    pub fn vertex_count(&self) -> u32 {
        2 * self.line_count
    }

    pub fn steps(&self) -> (f64, f64) {
        (self.lon_step, self.lat_step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn radius(p: &[f32; 3]) -> f64 {
        let [x, y, z] = p.map(f64::from);
        (x * x + y * y + z * z).sqrt()
    }

    #[test]
    fn line_count_closed_form() {
        // 13 rings (-90..=90 by 15) and 25 meridians (-180..=180 by 15)
        assert_eq!(grid_line_count(15.0, 15.0).unwrap(), 13 * 180 + 25 * 90);
        // 7 rings, 13 meridians
        assert_eq!(grid_line_count(30.0, 30.0).unwrap(), 7 * 180 + 13 * 90);
        // step that does not divide 90: floor(90/40) = 2 -> 5 rings; floor(180/100) = 1 -> 3 meridians
        assert_eq!(grid_line_count(100.0, 40.0).unwrap(), 5 * 180 + 3 * 90);
        // steps beyond the range keep only the equator and prime meridian
        assert_eq!(grid_line_count(500.0, 120.0).unwrap(), 180 + 90);
    }

    #[test]
    fn buffers_match_line_count() {
        for (lon, lat) in [(15.0, 15.0), (30.0, 10.0), (7.5, 45.0), (200.0, 91.0)] {
            let grid = GridMesh::build(lon, lat, 2.0, 1.5, [80, 80, 80]).unwrap();
            let expected = grid_line_count(lon, lat).unwrap();
            assert_eq!(grid.line_count(), expected);
            assert_eq!(grid.positions().len(), 2 * expected as usize);
            assert_eq!(grid.colors().len(), grid.positions().len());
            assert_eq!(grid.vertex_count() as usize, grid.positions().len());
            assert_eq!(grid.steps(), (lon, lat));
        }
    }

    #[test]
    fn points_are_inset_below_surface() {
        let grid = GridMesh::build(30.0, 30.0, 1000.0, 1000.0, [1, 2, 3]).unwrap();
        for p in grid.positions() {
            assert!((radius(p) - 998.0).abs() < 1e-3);
        }
    }

    #[test]
    fn color_is_broadcast_opaque() {
        let grid = GridMesh::build(45.0, 45.0, 1.0, 1.0, [80, 81, 82]).unwrap();
        assert!(grid.colors().iter().all(|c| *c == [80, 81, 82, 255]));
    }

    #[test]
    fn rings_are_closed() {
        let grid = GridMesh::build(90.0, 90.0, 1.0, 1.0, [0; 3]).unwrap();
        // first ring is the south pole ring; the equator ring starts at segment 180
        let equator = &grid.positions()[2 * 180..2 * 360];
        let first = equator[0];
        let last = equator[equator.len() - 1];
        for k in 0..3 {
            assert!((first[k] - last[k]).abs() < 1e-5);
        }
    }

    #[test]
    fn rejects_invalid_steps() {
        assert!(matches!(
            GridMesh::build(0.0, 15.0, 1.0, 1.0, [0; 3]),
            Err(GeometryError::InvalidGridStep { .. })
        ));
        assert!(matches!(
            grid_line_count(15.0, f64::NAN),
            Err(GeometryError::InvalidGridStep { .. })
        ));
        assert!(matches!(
            grid_line_count(1e-6, 1e-6),
            Err(GeometryError::GridTooDense { .. })
        ));
    }
}
