//! wgpu backend for the relativistic sky.
//!
//! Draws the tessellated sky sphere with the aberration program and the
//! latitude/longitude grid on top. The orbit camera supplies the
//! view-projection matrix.
//!
//! # Invariants
//! - Each layer keeps its texture unit for the whole session; a 1x1
//!   placeholder is bound until the real image arrives.
//! - Grid position and color buffers are swapped together, never one alone.
//! - `draw` does nothing until at least two layers have loaded.

mod camera;
mod gpu;
mod shaders;

pub use camera::SkyCamera;
pub use gpu::{AberrationRenderer, FrameTarget, RenderError};
pub use shaders::{GRID_SHADER, SKY_SHADER};
