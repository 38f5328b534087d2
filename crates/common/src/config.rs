//! Viewer configuration: scene geometry, texture sources, initial control values.
//!
//! Every section carries `#[serde(default)]`, so a JSON file only needs the keys it overrides.

use crate::layer::{LayerId, LayerVisibility};
use crate::observer::{ObserverVelocity, ParamError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// WGS84 semi-major axis in km.
const WGS84_A: f64 = 6378.1370;
/// WGS84 semi-minor axis in km.
const WGS84_B: f64 = 6356.75231414;
const SKY_SCALE: f64 = 15.0;

/// Errors from loading or validating a [`SkyConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("tessellation counts must be >= 1, got n_lon={n_lon}, n_lat={n_lat}")]
    Tessellation { n_lon: u32, n_lat: u32 },
    #[error("radii must be positive and finite, got a={a}, b={b}")]
    Radii { a: f64, b: f64 },
    #[error("grid steps must be positive and finite, got lon={lon}, lat={lat}")]
    GridStep { lon: f64, lat: f64 },
    #[error("field of view {0} deg outside [1, 180]")]
    FieldOfView(f64),
    #[error("observer: {0}")]
    Observer(#[from] ParamError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SphereConfig {
    pub n_lon: u32,
    pub n_lat: u32,
    pub equatorial_radius: f64,
    pub polar_radius: f64,
}

impl Default for SphereConfig {
    fn default() -> Self {
        Self {
            n_lon: 50,
            n_lat: 50,
            equatorial_radius: WGS84_A * SKY_SCALE,
            polar_radius: WGS84_B * SKY_SCALE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub lon_step_deg: f64,
    pub lat_step_deg: f64,
    pub color: [u8; 3],
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            lon_step_deg: 15.0,
            lat_step_deg: 15.0,
            color: [80, 80, 80],
        }
    }
}

/// Image source per layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TexturePaths {
    pub grid: PathBuf,
    pub galaxy: PathBuf,
    pub constellations: PathBuf,
    pub stars: PathBuf,
    pub overlay: PathBuf,
}

impl Default for TexturePaths {
    fn default() -> Self {
        Self {
            grid: "textures/grid.png".into(),
            galaxy: "textures/galaxy.jpg".into(),
            constellations: "textures/constellations.png".into(),
            stars: "textures/stars.jpg".into(),
            overlay: "textures/overlay.jpg".into(),
        }
    }
}

impl TexturePaths {
    pub fn path(&self, layer: LayerId) -> &Path {
        match layer {
            LayerId::Grid => &self.grid,
            LayerId::Galaxy => &self.galaxy,
            LayerId::Constellations => &self.constellations,
            LayerId::Stars => &self.stars,
            LayerId::Overlay => &self.overlay,
        }
    }

    /// Rebase every relative path onto `root`.
    pub fn rebased(&self, root: &Path) -> Self {
        let join = |p: &PathBuf| {
            if p.is_absolute() {
                p.clone()
            } else {
                root.join(p)
            }
        };
        Self {
            grid: join(&self.grid),
            galaxy: join(&self.galaxy),
            constellations: join(&self.constellations),
            stars: join(&self.stars),
            overlay: join(&self.overlay),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (LayerId, &Path)> {
        LayerId::ALL.into_iter().map(|layer| (layer, self.path(layer)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObserverConfig {
    pub beta: f64,
    pub lon_deg: f64,
    pub lat_deg: f64,
    /// Motion direction follows the camera look direction.
    pub lock_to_camera: bool,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            beta: 0.0,
            lon_deg: 0.0,
            lat_deg: 0.0,
            lock_to_camera: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_deg: f64,
    pub lon_deg: f64,
    pub lat_deg: f64,
    pub up_lon_deg: f64,
    pub up_lat_deg: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_deg: 50.0,
            lon_deg: 90.0,
            lat_deg: 0.0,
            up_lon_deg: 0.0,
            up_lat_deg: 90.0,
        }
    }
}

/// Complete viewer configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkyConfig {
    pub sphere: SphereConfig,
    pub grid: GridConfig,
    pub textures: TexturePaths,
    pub display: LayerVisibility,
    pub observer: ObserverConfig,
    pub camera: CameraConfig,
}

impl SkyConfig {
    /// Load a configuration from a JSON file and validate it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let config: Self = serde_json::from_reader(std::io::BufReader::new(file))?;
        config.validate()?;
        tracing::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Reject values that would put NaN or infinities into the GPU buffers.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let s = &self.sphere;
        if s.n_lon == 0 || s.n_lat == 0 {
            return Err(ConfigError::Tessellation {
                n_lon: s.n_lon,
                n_lat: s.n_lat,
            });
        }
        if !is_positive(s.equatorial_radius) || !is_positive(s.polar_radius) {
            return Err(ConfigError::Radii {
                a: s.equatorial_radius,
                b: s.polar_radius,
            });
        }
        let g = &self.grid;
        if !is_positive(g.lon_step_deg) || !is_positive(g.lat_step_deg) {
            return Err(ConfigError::GridStep {
                lon: g.lon_step_deg,
                lat: g.lat_step_deg,
            });
        }
        if !(1.0..=180.0).contains(&self.camera.fov_deg) {
            return Err(ConfigError::FieldOfView(self.camera.fov_deg));
        }
        self.initial_velocity()?;
        Ok(())
    }

    pub fn initial_velocity(&self) -> Result<ObserverVelocity, ParamError> {
        ObserverVelocity::new(self.observer.beta, self.observer.lon_deg, self.observer.lat_deg)
    }
}

fn is_positive(v: f64) -> bool {
    v.is_finite() && v > 0.0
}
