//! Relativistic aberration of view directions.
//!
//! A view direction `pu` seen by an observer at rest maps to `su` for an
//! observer moving with velocity `v` (in units of c) by relativistic velocity
//! addition of `v` and the unit photon direction:
//!
//! ```text
//! su = (pu + v * gamma * (1 + (pu . v) * gamma / (gamma + 1))) / (gamma * (1 + pu . v))
//! ```
//!
//! Texture coordinates follow the sky-map convention of the sphere mesh:
//! longitude `u * 2pi`, latitude `(v - 0.5) * pi`.

use glam::{DVec2, DVec3};
use std::f64::consts::PI;

/// Lorentz factor for speed `beta`.
pub fn lorentz_factor(beta: f64) -> f64 {
    1.0 / (1.0 - beta * beta).sqrt()
}

/// Apparent direction of `pu` for an observer moving with `velocity`.
///
/// `|velocity|` must be below 1. Unit input gives unit output.
pub fn aberrate(pu: DVec3, velocity: DVec3) -> DVec3 {
    let gamma = lorentz_factor(velocity.length());
    let dot = pu.dot(velocity);
    (pu + velocity * gamma * (1.0 + dot * gamma / (gamma + 1.0))) / (gamma * (1.0 + dot))
}

/// Inverse of [`aberrate`]: the rest-frame direction seen as `su`.
pub fn deaberrate(su: DVec3, velocity: DVec3) -> DVec3 {
    aberrate(su, -velocity)
}

/// Unit direction addressed by sky-map texture coordinate `(u, v)`.
pub fn texcoord_to_direction(u: f64, v: f64) -> DVec3 {
    let phi = u * 2.0 * PI;
    let theta = (v - 0.5) * PI;
    DVec3::new(theta.cos() * phi.cos(), theta.cos() * phi.sin(), theta.sin())
}

/// Sky-map texture coordinate of a unit direction.
///
/// `u` lies in `[0.5, 1.5]`; samplers repeat in `u`.
pub fn direction_to_texcoord(d: DVec3) -> DVec2 {
    DVec2::new(
        1.0 - d.y.atan2(d.x) / (2.0 * PI),
        0.5 + d.z.clamp(-1.0, 1.0).asin() / PI,
    )
}

/// Coordinate the fragment at `(u, v)` samples every layer at.
pub fn aberrated_texcoord(u: f64, v: f64, velocity: DVec3) -> DVec2 {
    direction_to_texcoord(aberrate(texcoord_to_direction(u, v), velocity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use aberration_common::{MAX_BETA, ObserverVelocity};

    const EPS: f64 = 1e-9;

    /// Directions spread over the sphere, poles included.
    fn sample_directions() -> Vec<DVec3> {
        let mut dirs = Vec::new();
        for i in 0..24 {
            for j in 0..=12 {
                let u = f64::from(i) / 24.0;
                let v = f64::from(j) / 12.0;
                dirs.push(texcoord_to_direction(u, v));
            }
        }
        dirs
    }

    fn velocity(beta: f64, lon: f64, lat: f64) -> DVec3 {
        ObserverVelocity::new(beta, lon, lat).unwrap().cartesian()
    }

    #[test]
    fn identity_at_rest() {
        for pu in sample_directions() {
            let su = aberrate(pu, DVec3::ZERO);
            assert!((su - pu).length() < EPS, "{pu} -> {su}");
        }
    }

    #[test]
    fn aligned_direction_unchanged() {
        let v = velocity(0.5, 0.0, 0.0);
        assert!((v - DVec3::new(0.5, 0.0, 0.0)).length() < EPS);
        assert!((lorentz_factor(0.5) - 1.154_700_538).abs() < 1e-9);

        let su = aberrate(DVec3::X, v);
        assert!((su - DVec3::X).length() < EPS, "{su}");
        let back = aberrate(-DVec3::X, v);
        assert!((back + DVec3::X).length() < EPS, "{back}");
    }

    #[test]
    fn output_stays_on_unit_sphere() {
        for beta in [0.1, 0.5, 0.9, MAX_BETA] {
            let v = velocity(beta, 33.0, -12.0);
            for pu in sample_directions() {
                let su = aberrate(pu, v);
                assert!((su.length() - 1.0).abs() < 1e-7, "beta={beta}: |su|={}", su.length());
            }
        }
    }

    #[test]
    fn round_trip_recovers_direction() {
        for beta in [0.0, 0.3, 0.75, 0.95] {
            for (lon, lat) in [(0.0, 0.0), (120.0, 45.0), (-75.0, -80.0), (180.0, 10.0)] {
                let v = velocity(beta, lon, lat);
                for pu in sample_directions() {
                    let back = deaberrate(aberrate(pu, v), v);
                    assert!((back - pu).length() < 1e-9, "beta={beta}: {pu} -> {back}");
                }
            }
        }
    }

    #[test]
    fn round_trip_near_light_speed() {
        let v = velocity(MAX_BETA, -40.0, 25.0);
        for pu in sample_directions() {
            let back = deaberrate(aberrate(pu, v), v);
            assert!((back - pu).length() < 1e-6, "{pu} -> {back}");
        }
    }

    #[test]
    fn directions_crowd_toward_motion() {
        let v = velocity(0.6, 0.0, 0.0);
        let ahead = v.normalize();
        for pu in sample_directions() {
            let su = aberrate(pu, v);
            assert!(su.dot(ahead) >= pu.dot(ahead) - EPS);
        }
        // perpendicular ray tilts forward by exactly beta
        let su = aberrate(DVec3::Y, v);
        assert!((su.x - 0.6).abs() < EPS);
    }

    #[test]
    fn no_nan_at_max_beta() {
        assert!((lorentz_factor(MAX_BETA) - 22.366).abs() < 1e-3);
        for (lon, lat) in [(0.0, 0.0), (90.0, 0.0), (0.0, 90.0), (-135.0, -45.0)] {
            let v = velocity(MAX_BETA, lon, lat);
            for i in 0..=32 {
                for j in 0..=32 {
                    let uv = aberrated_texcoord(f64::from(i) / 32.0, f64::from(j) / 32.0, v);
                    assert!(uv.is_finite(), "({i}, {j}) -> {uv}");
                }
            }
            // straight behind the observer is the worst case for 1 + pu.v
            let su = aberrate(-v.normalize(), v);
            assert!(su.is_finite());
        }
    }

    #[test]
    fn texcoords_mirror_u_at_rest() {
        for i in 1..32 {
            for j in 1..16 {
                let (u, v) = (f64::from(i) / 32.0, f64::from(j) / 16.0);
                let uv = aberrated_texcoord(u, v, DVec3::ZERO);
                let du = (uv.x - (1.0 - u)).rem_euclid(1.0);
                assert!(du < 1e-9 || du > 1.0 - 1e-9, "u={u}: {}", uv.x);
                assert!((uv.y - v).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn texcoord_range() {
        for pu in sample_directions() {
            let uv = direction_to_texcoord(pu);
            assert!((0.5..=1.5).contains(&uv.x), "{uv}");
            assert!((0.0..=1.0).contains(&uv.y), "{uv}");
        }
    }
}
