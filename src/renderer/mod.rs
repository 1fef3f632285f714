//! Renderer: GPU resource model, dispatch scheduler, and the concrete
//! render-node wiring that implements the per-frame data flow in §2.

pub mod core;
pub mod graph;
pub mod scene_frame;

pub use core::GpuContext;
pub use graph::{ComputeNode, RenderGraph, RenderNode};
