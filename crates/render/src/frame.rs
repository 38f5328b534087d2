use crate::state::{READY_THRESHOLD, RendererPhase};
use crate::uniforms::{GridUniforms, SkyUniforms};
use aberration_common::{LayerVisibility, ObserverVelocity};
use glam::Mat4;

/// Everything the caller supplies for one frame. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameParams {
    pub view_proj: Mat4,
    pub velocity: ObserverVelocity,
    pub visibility: LayerVisibility,
}

/// Triangle draw of the whole sphere with the aberration program.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpherePass {
    pub vertex_count: u32,
    pub uniforms: SkyUniforms,
}

/// Line draw of the current grid mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridPass {
    pub vertex_count: u32,
    pub uniforms: GridUniforms,
}

/// The draws one frame issues, in order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FramePlan {
    pub sphere: SpherePass,
    /// Present only when the grid layer is visible and the grid is non-empty.
    pub grid: Option<GridPass>,
}

/// Why a frame drew nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SkipReason {
    #[error("{ready} of {required} required texture layers loaded")]
    NotReady { ready: usize, required: usize },
}

/// Result of a draw call. Skips are not errors; the next frame retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawOutcome {
    Drawn,
    Skipped(SkipReason),
}

impl DrawOutcome {
    pub fn is_drawn(self) -> bool {
        self == DrawOutcome::Drawn
    }
}

/// Decide what a draw issues. Pure: executing the plan is the backend's job.
pub fn plan_frame(
    phase: RendererPhase,
    ready_count: usize,
    sphere_vertex_count: u32,
    grid_vertex_count: u32,
    frame: &FrameParams,
) -> Result<FramePlan, SkipReason> {
    if !phase.is_ready() {
        return Err(SkipReason::NotReady {
            ready: ready_count,
            required: READY_THRESHOLD,
        });
    }

    let sphere = SpherePass {
        vertex_count: sphere_vertex_count,
        uniforms: SkyUniforms::new(frame.view_proj, frame.velocity.cartesian(), &frame.visibility),
    };
    let grid = (frame.visibility.grid && grid_vertex_count > 0).then(|| GridPass {
        vertex_count: grid_vertex_count,
        uniforms: GridUniforms::new(frame.view_proj),
    });
    Ok(FramePlan { sphere, grid })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(beta: f64, visibility: LayerVisibility) -> FrameParams {
        FrameParams {
            view_proj: Mat4::IDENTITY,
            velocity: ObserverVelocity::new(beta, 0.0, 0.0).unwrap(),
            visibility,
        }
    }

    #[test]
    fn not_ready_skips() {
        let f = frame(0.0, LayerVisibility::default());
        for phase in [
            RendererPhase::Uninitialized,
            RendererPhase::Initializing,
            RendererPhase::PartiallyReady,
        ] {
            assert_eq!(
                plan_frame(phase, 1, 15000, 9180, &f),
                Err(SkipReason::NotReady {
                    ready: 1,
                    required: READY_THRESHOLD
                })
            );
        }
    }

    #[test]
    fn ready_plans_sphere_and_grid() {
        let f = frame(0.5, LayerVisibility::default());
        let plan = plan_frame(RendererPhase::Ready, 2, 15000, 9180, &f).unwrap();
        assert_eq!(plan.sphere.vertex_count, 15000);
        assert_eq!(plan.sphere.uniforms.velocity, [0.5, 0.0, 0.0, 0.0]);
        assert_eq!(plan.sphere.uniforms.layer_mask, LayerVisibility::default().mask());
        let grid = plan.grid.unwrap();
        assert_eq!(grid.vertex_count, 9180);
        assert_eq!(grid.uniforms.view_proj, plan.sphere.uniforms.view_proj);
    }

    #[test]
    fn hidden_grid_is_not_drawn() {
        let mut vis = LayerVisibility::default();
        vis.grid = false;
        let plan = plan_frame(RendererPhase::Ready, 3, 6, 9180, &frame(0.0, vis)).unwrap();
        assert!(plan.grid.is_none());
        assert_eq!(plan.sphere.uniforms.layer_mask & 1, 0);
    }

    #[test]
    fn empty_grid_is_not_drawn() {
        let plan =
            plan_frame(RendererPhase::Ready, 2, 6, 0, &frame(0.0, LayerVisibility::ALL)).unwrap();
        assert!(plan.grid.is_none());
    }
}
