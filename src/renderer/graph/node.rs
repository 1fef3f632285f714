//! A single dispatch step in the per-frame pipeline.

use crate::error::Result;
use crate::renderer::core::GpuContext;

/// One stage of the per-frame data flow (§2): generate light sub-paths,
/// generate camera sub-paths, build reservoirs, denoise, tonemap. Each
/// node records its own compute passes into the shared encoder and is
/// responsible for requesting the barriers its reads/writes need from the
/// barrier scheduler before recording.
pub trait RenderNode {
    /// Human-readable label used for the debug push/pop group around this
    /// node's recorded commands.
    fn label(&self) -> &str;

    /// Record this node's compute dispatches into `encoder`.
    fn execute(&mut self, gpu: &GpuContext, encoder: &mut wgpu::CommandEncoder) -> Result<()>;
}
