/// Loaded layers required before the main draw path runs: base grid and primary sky map.
pub const READY_THRESHOLD: usize = 2;

/// Renderer lifecycle. Phases only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RendererPhase {
    Uninitialized,
    /// Textures requested, programs being compiled.
    Initializing,
    /// Set up, fewer than [`READY_THRESHOLD`] layers loaded.
    PartiallyReady,
    Ready,
}

impl RendererPhase {
    /// Phase of an initialized renderer with `ready_count` loaded layers.
    pub fn from_ready_count(ready_count: usize) -> Self {
        if ready_count >= READY_THRESHOLD {
            RendererPhase::Ready
        } else {
            RendererPhase::PartiallyReady
        }
    }

    pub fn is_ready(self) -> bool {
        self == RendererPhase::Ready
    }
}

/// Tracks the phase of one renderer and logs each transition.
#[derive(Debug, Clone)]
pub struct Lifecycle {
    phase: RendererPhase,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    pub fn new() -> Self {
        Self {
            phase: RendererPhase::Uninitialized,
        }
    }

    pub fn phase(&self) -> RendererPhase {
        self.phase
    }

    pub fn begin_init(&mut self) {
        self.advance(RendererPhase::Initializing);
    }

    /// Setup finished; readiness now follows the loaded layer count.
    pub fn finish_init(&mut self, ready_count: usize) {
        self.advance(RendererPhase::from_ready_count(ready_count));
    }

    /// Feed the current ready count. Returns `true` when the phase changed.
    ///
    /// Ignored before `finish_init`; ready counts never decrease, so neither does the phase.
    pub fn observe_ready_count(&mut self, ready_count: usize) -> bool {
        if self.phase < RendererPhase::PartiallyReady {
            return false;
        }
        self.advance(RendererPhase::from_ready_count(ready_count))
    }

    fn advance(&mut self, next: RendererPhase) -> bool {
        if next <= self.phase {
            return false;
        }
        tracing::info!(from = ?self.phase, to = ?next, "renderer phase");
        self.phase = next;
        true
    }
}
