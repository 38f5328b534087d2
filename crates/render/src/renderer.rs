use crate::frame::{DrawOutcome, FrameParams, FramePlan, plan_frame};
use crate::state::{Lifecycle, RendererPhase};
use std::fmt::Write;

/// Backend-agnostic interface. All renderers implement this trait.
///
/// A renderer owns its meshes and textures; the caller owns the frame
/// parameters and the target drawn into.
pub trait Renderer {
    /// What one frame is drawn into.
    type Target<'a>;

    /// Texture layers loaded so far.
    fn ready_count(&self) -> usize;

    fn phase(&self) -> RendererPhase;

    /// Draw one frame. Returns `Skipped` without touching `target` until ready.
    fn render(&mut self, target: Self::Target<'_>, frame: &FrameParams) -> DrawOutcome;
}

/// Debug text renderer, standing in for the GPU backend.
///
/// Writes the frame plan as readable text. Useful for CLI output, logging,
/// and testing the render interface without a device.
#[derive(Debug)]
pub struct DebugTextRenderer {
    lifecycle: Lifecycle,
    ready_count: usize,
    sphere_vertex_count: u32,
    grid_vertex_count: u32,
}

impl DebugTextRenderer {
    pub fn new(sphere_vertex_count: u32, grid_vertex_count: u32) -> Self {
        let mut lifecycle = Lifecycle::new();
        lifecycle.begin_init();
        lifecycle.finish_init(0);
        Self {
            lifecycle,
            ready_count: 0,
            sphere_vertex_count,
            grid_vertex_count,
        }
    }

    /// Pretend `count` layers have finished loading. Counts never go down.
    pub fn set_ready_count(&mut self, count: usize) {
        self.ready_count = self.ready_count.max(count);
        self.lifecycle.observe_ready_count(self.ready_count);
    }

    pub fn set_grid_vertex_count(&mut self, count: u32) {
        self.grid_vertex_count = count;
    }
}

fn describe(out: &mut String, plan: &FramePlan) -> std::fmt::Result {
    let s = &plan.sphere;
    let [vx, vy, vz, _] = s.uniforms.velocity;
    writeln!(out, "=== Frame ===")?;
    writeln!(
        out,
        "sphere: triangles vertices={} velocity=({vx:.4}, {vy:.4}, {vz:.4}) mask={:05b}",
        s.vertex_count, s.uniforms.layer_mask
    )?;
    match &plan.grid {
        Some(g) => writeln!(out, "grid: lines vertices={}", g.vertex_count),
        None => writeln!(out, "grid: off"),
    }
}

impl Renderer for DebugTextRenderer {
    type Target<'a> = &'a mut String;

    fn ready_count(&self) -> usize {
        self.ready_count
    }

    fn phase(&self) -> RendererPhase {
        self.lifecycle.phase()
    }

    fn render(&mut self, out: Self::Target<'_>, frame: &FrameParams) -> DrawOutcome {
        match plan_frame(
            self.lifecycle.phase(),
            self.ready_count,
            self.sphere_vertex_count,
            self.grid_vertex_count,
            frame,
        ) {
            Ok(plan) => {
                // Writing into a String cannot fail.
                let _ = describe(out, &plan);
                DrawOutcome::Drawn
            }
            Err(reason) => {
                tracing::debug!(%reason, "frame skipped");
                DrawOutcome::Skipped(reason)
            }
        }
    }
}
