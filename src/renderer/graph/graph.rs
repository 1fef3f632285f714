//! Linear frame-graph executor.
//!
//! The per-frame pipeline (§2) is a fixed, linear sequence of dispatches —
//! there is no branching or reordering to schedule, so the graph here is
//! deliberately a simple ordered list rather than a general DAG: it
//! exists to give every node a uniform `execute` entry point and a single
//! place that owns command-buffer creation and submission, matching the
//! "coroutine-style per-frame flow… keep a linear pipeline" redesign note
//! (§9).

use smallvec::SmallVec;

use crate::error::Result;
use crate::renderer::core::GpuContext;
use crate::renderer::graph::node::RenderNode;

/// Ordered sequence of render nodes executed within one command buffer.
pub struct RenderGraph<'a> {
    nodes: SmallVec<[&'a mut dyn RenderNode; 8]>,
}

impl<'a> RenderGraph<'a> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: SmallVec::new(),
        }
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: SmallVec::with_capacity(capacity),
        }
    }

    pub fn add_node(&mut self, node: &'a mut dyn RenderNode) {
        self.nodes.push(node);
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Record every node into one command encoder, in order, wrapping
    /// each in a debug push/pop group, then submit to `queue`.
    pub fn execute(&mut self, gpu: &GpuContext) -> Result<()> {
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame graph"),
            });

        for node in &mut self.nodes {
            encoder.push_debug_group(node.label());
            node.execute(gpu, &mut encoder)?;
            encoder.pop_debug_group();
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }
}

impl<'a> Default for RenderGraph<'a> {
    fn default() -> Self {
        Self::new()
    }
}
