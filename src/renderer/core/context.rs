//! GPU device acquisition.
//!
//! Window/surface/swap-chain management is out of scope (§1); `GpuContext`
//! only carries what the transport, reservoir, hash-grid, denoiser, and
//! tonemap dispatchers need to build pipelines and submit work — an
//! adapter-selected device and its queue. A host embedding this crate in a
//! windowed application owns the surface itself and hands this context a
//! compatible device.

use crate::error::{RenderError, Result};
use crate::settings::RenderSettings;

/// The device handle every dispatcher in this crate is built against.
pub struct GpuContext {
    pub instance: wgpu::Instance,
    pub adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
}

impl GpuContext {
    /// Acquire an adapter and device matching `settings`. Mirrors the
    /// instance → adapter → device request sequence used throughout the
    /// corpus, minus the surface-compatibility step (no surface is owned
    /// here).
    pub async fn new(settings: &RenderSettings) -> Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: settings.power_preference,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| RenderError::AdapterRequestFailed(e.to_string()))?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("vkpt-core device"),
                required_features: settings.required_features,
                required_limits: settings.required_limits.clone(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await?;

        Ok(Self {
            instance,
            adapter,
            device,
            queue,
        })
    }

    /// Adapter feature/limit report, for settings validation at startup.
    #[must_use]
    pub fn adapter_info(&self) -> wgpu::AdapterInfo {
        self.adapter.get_info()
    }
}
