//! GPU resource model: device acquisition, the per-frame pool, resource
//! identity tracking, and the layout/barrier scheduler (§3, §4.1, §4.2).

pub mod barrier;
pub mod context;
pub mod pool;
pub mod tracked;

pub use barrier::{Access, BarrierScheduler, Layout, PendingBarrier, ResourceState, Stage};
pub use context::GpuContext;
pub use pool::ResourcePool;
pub use tracked::Tracked;
