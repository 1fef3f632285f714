//! Compute pipeline cache.
//!
//! Every kernel this crate dispatches (transport, reservoir build, hash
//! grid phases, denoiser passes, tonemap reduction/apply) is a compute
//! pipeline keyed by its shader entry point plus the specialization
//! constants selecting an algorithm variant. The cache is a simple
//! hash-keyed `Vec`, matching the two-level fast/canonical split used
//! elsewhere in this codebase, collapsed to one level since compute
//! pipelines here have no render-pass-format axis to key on.

use rustc_hash::FxHashMap;
use std::hash::Hash;

use crate::renderer::pipeline::id::ComputePipelineId;

fn fx_hash_key<K: Hash>(key: &K) -> u64 {
    use std::hash::Hasher;
    let mut hasher = rustc_hash::FxHasher::default();
    key.hash(&mut hasher);
    hasher.finish()
}

/// Cache of compute pipelines keyed by a caller-defined specialization key
/// `K` (e.g. an enum naming the kernel entry point and its flag
/// combination).
pub struct ComputePipelineCache<K> {
    index: FxHashMap<u64, ComputePipelineId<K>>,
    pipelines: Vec<wgpu::ComputePipeline>,
}

impl<K: Hash> ComputePipelineCache<K> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            index: FxHashMap::default(),
            pipelines: Vec::new(),
        }
    }

    /// Fetch the cached pipeline for `key`, or build it with `build` and
    /// cache the result. `build` receives the device so it can create the
    /// shader module and layout on a cache miss only.
    pub fn get_or_create_compute(
        &mut self,
        device: &wgpu::Device,
        key: &K,
        build: impl FnOnce(&wgpu::Device) -> wgpu::ComputePipeline,
    ) -> ComputePipelineId<K> {
        let hash = fx_hash_key(key);
        if let Some(&id) = self.index.get(&hash) {
            return id;
        }
        let pipeline = build(device);
        let id = ComputePipelineId::new(self.pipelines.len() as u32);
        self.pipelines.push(pipeline);
        self.index.insert(hash, id);
        id
    }

    #[must_use]
    pub fn get(&self, id: ComputePipelineId<K>) -> &wgpu::ComputePipeline {
        &self.pipelines[id.index()]
    }
}

impl<K: Hash> Default for ComputePipelineCache<K> {
    fn default() -> Self {
        Self::new()
    }
}
