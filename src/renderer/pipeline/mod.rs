//! Compute pipeline construction and caching.
//!
//! Shader-source compilation and caching is out of scope (§1) — this
//! module owns only the host-side pipeline object cache the dispatcher
//! consults each frame, not the process that turns source into a
//! `wgpu::ShaderModule`.

pub mod cache;
pub mod id;

pub use cache::ComputePipelineCache;
pub use id::ComputePipelineId;
