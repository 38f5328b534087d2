use aberration_common::CameraConfig;
use glam::{DVec3, Mat4, Vec3};

/// Orbit camera at the centre of the sky sphere.
///
/// The eye sits at (0, 0, 1) looking at the origin; longitude and latitude
/// rotate the sphere under it, the up angles tilt the horizon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkyCamera {
    pub fov_deg: f64,
    pub lon_deg: f64,
    pub lat_deg: f64,
    pub up_lon_deg: f64,
    pub up_lat_deg: f64,
    pub aspect: f32,
}

impl SkyCamera {
    pub const NEAR: f32 = 1000.0;
    pub const FAR: f32 = 1.0e6;
    /// Widest usable field of view; a 180 degree frustum is degenerate.
    pub const MAX_FOV_DEG: f64 = 179.0;

    pub fn from_config(config: &CameraConfig, aspect: f32) -> Self {
        Self {
            fov_deg: config.fov_deg,
            lon_deg: config.lon_deg,
            lat_deg: config.lat_deg,
            up_lon_deg: config.up_lon_deg,
            up_lat_deg: config.up_lat_deg,
            aspect,
        }
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
    }

    fn up(&self) -> Vec3 {
        let (lon, lat) = (self.up_lon_deg.to_radians(), self.up_lat_deg.to_radians());
        let up = Vec3::new(
            (lat.cos() * lon.cos()) as f32,
            lat.sin() as f32,
            (lat.cos() * lon.sin()) as f32,
        );
        // Up along the view axis has no horizon.
        if up.cross(Vec3::Z).length_squared() < 1e-8 {
            Vec3::Y
        } else {
            up
        }
    }

    pub fn projection_matrix(&self) -> Mat4 {
        let fov = self.fov_deg.clamp(1.0, Self::MAX_FOV_DEG).to_radians() as f32;
        Mat4::perspective_rh(fov, self.aspect, Self::NEAR, Self::FAR)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(Vec3::Z, Vec3::ZERO, self.up())
    }

    /// Rotation taking sphere coordinates into the camera's frame.
    pub fn sky_rotation(&self) -> Mat4 {
        let rot_x = (self.lat_deg - 90.0).to_radians() as f32;
        let rot_z = (-90.0 - self.lon_deg).to_radians() as f32;
        Mat4::from_rotation_x(rot_x) * Mat4::from_rotation_z(rot_z)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix() * self.sky_rotation()
    }

    /// Sphere direction at the centre of the screen.
    pub fn look_direction(&self) -> DVec3 {
        let (lon, lat) = (self.lon_deg.to_radians(), self.lat_deg.to_radians());
        -DVec3::new(lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin())
    }
}

impl Default for SkyCamera {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default(), 16.0 / 9.0)
    }
}
