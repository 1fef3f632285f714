//! Per-frame dispatch scheduler: a linear sequence of render nodes
//! recorded into one command buffer and submitted together (§2, §5).

pub mod compute_node;
pub mod graph;
pub mod node;

pub use compute_node::ComputeNode;
pub use graph::RenderGraph;
pub use node::RenderNode;
