//! Rendering core shared by every backend.
//!
//! # Invariants
//! - Nothing is drawn until at least [`READY_THRESHOLD`] texture layers have loaded.
//! - A skipped frame has no side effect; the render loop keeps running.
//! - The aberration transform is the identity at zero velocity.
//!
//! The CPU functions in [`aberration`] mirror the fragment program's math.
//! The CLI and the unit tests use them to reason about where a texel lands.

pub mod aberration;
mod frame;
mod renderer;
mod state;
mod uniforms;

pub use frame::{DrawOutcome, FrameParams, FramePlan, GridPass, SkipReason, SpherePass, plan_frame};
pub use renderer::{DebugTextRenderer, Renderer};
pub use state::{Lifecycle, READY_THRESHOLD, RendererPhase};
pub use uniforms::{GridUniforms, SkyUniforms};
