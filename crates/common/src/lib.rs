//! Shared types for the aberration sky.
//!
//! # Invariants
//! - Layer identity fixes the texture unit: grid=0, galaxy=1, constellations=2, stars=3, overlay=4.
//! - An `ObserverVelocity` always has `0 <= beta <= MAX_BETA`; invalid input is rejected, never clamped.

mod config;
mod layer;
mod observer;

pub use config::{
    CameraConfig, ConfigError, GridConfig, ObserverConfig, SkyConfig, SphereConfig, TexturePaths,
};
pub use layer::{LAYER_COUNT, LayerId, LayerVisibility};
pub use observer::{MAX_BETA, ObserverVelocity, ParamError};
