//! Generic single-dispatch render node.
//!
//! Every stage of the per-frame data flow (§2) — light sub-paths, camera
//! sub-paths, reservoir build, denoise, tonemap — reduces at recording time
//! to the same shape: bind one compute pipeline, bind one bind group,
//! dispatch a workgroup grid. `Engine::render_frame` assembles one of these
//! per stage, in data-flow order, from pipelines the caller built through
//! [`crate::renderer::pipeline::ComputePipelineCache`] and bind groups the
//! caller built against this frame's pooled resources — building the
//! `wgpu::ShaderModule`s those pipelines wrap is out of scope (§1).

use crate::error::Result;
use crate::renderer::core::GpuContext;
use crate::renderer::graph::node::RenderNode;

/// One pipeline dispatch: a label, the pipeline and bind group to bind,
/// and the workgroup grid to dispatch it over.
pub struct ComputeNode<'p> {
    label: String,
    pipeline: &'p wgpu::ComputePipeline,
    bind_group: &'p wgpu::BindGroup,
    workgroups: (u32, u32, u32),
}

impl<'p> ComputeNode<'p> {
    #[must_use]
    pub fn new(
        label: impl Into<String>,
        pipeline: &'p wgpu::ComputePipeline,
        bind_group: &'p wgpu::BindGroup,
        workgroups: (u32, u32, u32),
    ) -> Self {
        Self {
            label: label.into(),
            pipeline,
            bind_group,
            workgroups,
        }
    }
}

impl RenderNode for ComputeNode<'_> {
    fn label(&self) -> &str {
        &self.label
    }

    fn execute(&mut self, _gpu: &GpuContext, encoder: &mut wgpu::CommandEncoder) -> Result<()> {
        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some(&self.label),
            timestamp_writes: None,
        });
        pass.set_pipeline(self.pipeline);
        pass.set_bind_group(0, self.bind_group, &[]);
        pass.dispatch_workgroups(self.workgroups.0, self.workgroups.1, self.workgroups.2);
        Ok(())
    }
}
