//! Per-frame resource pool (§4.1).
//!
//! Buffers and images are produced by `(name, shape, usage)` and recycled
//! across frames. The pool hands back the oldest matching instance whose
//! `lastFrameUsed + bufferCount < currentFrame`; if nothing matches it
//! allocates a new one and appends it to the named list. Descriptor sets
//! are cached the same way, keyed by pipeline layout identity, by the
//! pipeline cache rather than here.

use rustc_hash::FxHashMap;
use wgpu::util::DeviceExt;

use crate::error::{RenderError, Result};
use crate::renderer::core::tracked::Tracked;

/// Shape/usage key a buffer is requested under. Two requests with the same
/// `name` but different `usage`/`memory` are tracked as distinct pools so a
/// storage buffer and a uniform buffer never alias under one name.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct BufferKey {
    name: &'static str,
    usage: wgpu::BufferUsages,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct ImageKey {
    name: &'static str,
    format: wgpu::TextureFormat,
    usage: wgpu::TextureUsages,
}

struct PooledBuffer {
    buffer: wgpu::Buffer,
    size_bytes: u64,
    usage: wgpu::BufferUsages,
}

struct PooledImage {
    texture: wgpu::Texture,
    extent: wgpu::Extent3d,
    format: wgpu::TextureFormat,
    usage: wgpu::TextureUsages,
}

/// Named, per-frame-double-buffered pool of GPU buffers and images.
pub struct ResourcePool {
    buffers: FxHashMap<BufferKey, Vec<Tracked<PooledBuffer>>>,
    images: FxHashMap<ImageKey, Vec<Tracked<PooledImage>>>,
    current_frame: u64,
}

impl ResourcePool {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffers: FxHashMap::default(),
            images: FxHashMap::default(),
            current_frame: 0,
        }
    }

    /// Advance the frame counter. Called once per frame before any
    /// `get_*` request.
    pub fn begin_frame(&mut self, frame: u64) {
        self.current_frame = frame;
    }

    /// Request a buffer sized for at least `count` elements of `T`. Reuses
    /// the oldest free instance whose size covers the request and whose
    /// usage is a superset of what was asked for; otherwise allocates.
    pub fn get_buffer<T: bytemuck::Pod>(
        &mut self,
        device: &wgpu::Device,
        name: &'static str,
        count: usize,
        usage: wgpu::BufferUsages,
        buffer_count: u64,
    ) -> &wgpu::Buffer {
        let size_bytes = (count * std::mem::size_of::<T>()) as u64;
        let key = BufferKey { name, usage };
        let current_frame = self.current_frame;
        let list = self.buffers.entry(key).or_default();

        let reuse_index = list.iter().position(|entry| {
            entry.is_free_on(current_frame, buffer_count)
                && entry.get().size_bytes >= size_bytes
                && entry.get().usage.contains(usage)
        });

        let index = if let Some(i) = reuse_index {
            list[i].touch(current_frame);
            i
        } else {
            let buffer = device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(name),
                size: size_bytes.max(16),
                usage,
                mapped_at_creation: false,
            });
            list.push(Tracked::new(
                PooledBuffer {
                    buffer,
                    size_bytes: size_bytes.max(16),
                    usage,
                },
                current_frame,
            ));
            list.len() - 1
        };
        &list[index].get().buffer
    }

    /// Request an image covering at least `extent`, with `format` and a
    /// usage set that is a subset of what's stored.
    pub fn get_image(
        &mut self,
        device: &wgpu::Device,
        name: &'static str,
        format: wgpu::TextureFormat,
        extent: wgpu::Extent3d,
        usage: wgpu::TextureUsages,
        buffer_count: u64,
    ) -> &wgpu::Texture {
        let key = ImageKey {
            name,
            format,
            usage,
        };
        let current_frame = self.current_frame;
        let list = self.images.entry(key).or_default();

        let covers = |e: wgpu::Extent3d| {
            e.width >= extent.width && e.height >= extent.height && e.depth_or_array_layers >= extent.depth_or_array_layers
        };

        let reuse_index = list.iter().position(|entry| {
            entry.is_free_on(current_frame, buffer_count)
                && covers(entry.get().extent)
                && entry.get().format == format
                && entry.get().usage.contains(usage)
        });

        let index = if let Some(i) = reuse_index {
            list[i].touch(current_frame);
            i
        } else {
            let texture = device.create_texture(&wgpu::TextureDescriptor {
                label: Some(name),
                size: extent,
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format,
                usage,
                view_formats: &[],
            });
            list.push(Tracked::new(
                PooledImage {
                    texture,
                    extent,
                    format,
                    usage,
                },
                current_frame,
            ));
            list.len() - 1
        };
        &list[index].get().texture
    }

    /// Upload `data` into a device-local buffer named `name`, via a
    /// host-visible staging buffer. Returns the device-local buffer.
    pub fn upload_data<T: bytemuck::Pod>(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        name: &'static str,
        data: &[T],
        usage: wgpu::BufferUsages,
        buffer_count: u64,
    ) -> &wgpu::Buffer {
        let staging = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("staging"),
            contents: bytemuck::cast_slice(data),
            usage: wgpu::BufferUsages::COPY_SRC,
        });
        let size_bytes = (data.len() * std::mem::size_of::<T>()) as u64;
        let target = self.get_buffer::<T>(
            device,
            name,
            data.len(),
            usage | wgpu::BufferUsages::COPY_DST,
            buffer_count,
        );
        encoder.copy_buffer_to_buffer(&staging, 0, target, 0, size_bytes);
        queue.submit(std::iter::empty());
        target
    }

    /// Newest resource registered for `name` under `usage`, used to read
    /// previous-frame data (reprojection, reservoir reuse).
    pub fn get_last_buffer(&self, name: &'static str, usage: wgpu::BufferUsages) -> Result<&wgpu::Buffer> {
        let key = BufferKey { name, usage };
        self.buffers
            .get(&key)
            .and_then(|list| list.iter().max_by_key(|e| e.last_frame_used()))
            .map(|e| &e.get().buffer)
            .ok_or_else(|| RenderError::PoolExhausted(name.to_string()))
    }

    /// Newest image registered for `name` under `format`/`usage`, used to
    /// read previous-frame data (reprojection, reservoir reuse).
    pub fn get_last_image(
        &self,
        name: &'static str,
        format: wgpu::TextureFormat,
        usage: wgpu::TextureUsages,
    ) -> Result<&wgpu::Texture> {
        let key = ImageKey {
            name,
            format,
            usage,
        };
        self.images
            .get(&key)
            .and_then(|list| list.iter().max_by_key(|e| e.last_frame_used()))
            .map(|e| &e.get().texture)
            .ok_or_else(|| RenderError::PoolExhausted(name.to_string()))
    }

    /// Discard resources whose age (in frames) exceeds `max_age`.
    pub fn clean(&mut self, max_age: u64) {
        let frame = self.current_frame;
        for list in self.buffers.values_mut() {
            list.retain(|entry| frame.saturating_sub(entry.last_frame_used()) <= max_age);
        }
        for list in self.images.values_mut() {
            list.retain(|entry| frame.saturating_sub(entry.last_frame_used()) <= max_age);
        }
    }

    /// Drop every tracked resource.
    pub fn clear(&mut self) {
        self.buffers.clear();
        self.images.clear();
    }
}

impl Default for ResourcePool {
    fn default() -> Self {
        Self::new()
    }
}
