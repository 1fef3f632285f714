//! Top-level orchestrator tying the GPU context, per-frame pool, barrier
//! scheduler, light-transport core, reservoir layer, hash grid, denoiser,
//! and tonemapper together, following the data flow in §2.
//!
//! Acceleration-structure construction and scene loading remain the
//! caller's responsibility (§1): the caller builds a [`SceneFrame`] and
//! hands it to [`Engine::render_frame`].

use crate::denoise::AccumulationState;
use crate::error::Result;
use crate::renderer::core::{GpuContext, ResourcePool};
use crate::renderer::graph::{ComputeNode, RenderGraph};
use crate::renderer::scene_frame::SceneFrame;
use crate::settings::RenderSettings;

/// Per-pixel book-keeping the engine owns across frames: denoiser
/// accumulation state and the validity flag invalidated on untracked
/// camera motion (§4.4 Validity, §4.6 Reset).
pub struct FrameHistory {
    pub accumulation: Vec<AccumulationState>,
    pub reservoir_history_valid: bool,
    pub frame_index: u64,
}

impl FrameHistory {
    #[must_use]
    pub fn new(pixel_count: usize) -> Self {
        Self {
            accumulation: vec![AccumulationState::default(); pixel_count],
            reservoir_history_valid: false,
            frame_index: 0,
        }
    }

    /// Invalidate denoiser accumulation and reservoir history together —
    /// the renderer must call this on scene/material edits, on a
    /// user-facing reset, and when the camera moved without reprojection
    /// (§4.4 Validity, §4.6 Reset).
    pub fn reset_accumulation(&mut self) {
        for state in &mut self.accumulation {
            state.reset();
        }
        self.reservoir_history_valid = false;
    }
}

/// Owns the GPU context, settings, and the resource pool; `render_frame`
/// drives one pass of the §2 data flow. Individual kernel dispatch is left
/// to the render-graph nodes this orchestrator assembles — the concrete
/// dispatch bodies (ray generation, connect, merge, hash-grid build,
/// denoise passes, tonemap) bind the pure logic in `transport`,
/// `reservoir`, `hashgrid`, `denoise`, and `tonemap` to compute pipelines
/// built through `renderer::pipeline`.
pub struct Engine {
    pub gpu: GpuContext,
    pub settings: RenderSettings,
    pub pool: ResourcePool,
    pub history: FrameHistory,
}

impl Engine {
    /// Acquire a device and build an engine ready to render at
    /// `output_extent`.
    pub async fn new(settings: RenderSettings, output_extent: (u32, u32)) -> Result<Self> {
        let gpu = GpuContext::new(&settings).await?;
        let pixel_count = (output_extent.0 * output_extent.1) as usize;
        Ok(Self {
            gpu,
            settings,
            pool: ResourcePool::new(),
            history: FrameHistory::new(pixel_count),
        })
    }

    /// Advance to the next frame, making the new frame's resources
    /// available to the per-frame pool. Must run once, before any
    /// dispatch, per frame.
    pub fn begin_frame(&mut self) {
        self.history.frame_index += 1;
        self.pool.begin_frame(self.history.frame_index);
    }

    /// Invalidate accumulation and reservoir history — see
    /// [`FrameHistory::reset_accumulation`]. Exposed here since it is the
    /// operation the embedding application calls on scene edits, F5, or an
    /// un-reprojected camera move.
    pub fn reset_accumulation(&mut self) {
        self.history.reset_accumulation();
    }

    /// Discard pooled resources older than `max_age` frames. Call
    /// periodically, not necessarily every frame.
    pub fn prune_pool(&mut self, max_age: u64) {
        self.pool.clean(max_age);
    }

    /// Whether `scene` must be treated as requiring a full rebuild of
    /// its GPU-side tables this frame.
    #[must_use]
    pub fn scene_needs_rebuild(scene: &SceneFrame) -> bool {
        scene.is_dirty()
    }

    /// Record and submit one pass of the §2 data flow — light sub-paths,
    /// camera sub-paths, reservoir build, denoise, tonemap — as a single
    /// command buffer.
    ///
    /// `stages` must already be built by the caller, in that order, from
    /// pipelines pulled out of a
    /// [`crate::renderer::pipeline::ComputePipelineCache`] and bind groups
    /// bound to this frame's pooled resources; compiling the shader
    /// modules those pipelines wrap is out of scope (§1). This method owns
    /// only the assembly into one [`RenderGraph`] and its submission.
    pub fn render_frame(&self, stages: &mut [ComputeNode<'_>]) -> Result<()> {
        let mut graph = RenderGraph::with_capacity(stages.len());
        for stage in stages.iter_mut() {
            graph.add_node(stage);
        }
        graph.execute(&self.gpu)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_accumulation_clears_history_and_invalidates_reservoirs() {
        let mut history = FrameHistory::new(4);
        history.reservoir_history_valid = true;
        history.accumulation[0].accumulate(glam::Vec3::ONE, 16);
        history.reset_accumulation();
        assert!(!history.reservoir_history_valid);
        assert_eq!(history.accumulation[0].frame_count, 0);
    }

    #[test]
    fn fresh_scene_frame_needs_rebuild() {
        let scene = SceneFrame::empty();
        assert!(Engine::scene_needs_rebuild(&scene));
    }
}
