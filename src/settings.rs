//! Renderer configuration.
//!
//! [`RenderSettings`] collects every host-side knob named by the external
//! interface: device acquisition preferences, path-transport bounds, the
//! active algorithm and its behavioural toggles, reservoir parameters, hash
//! grid sizing, and tonemapping exposure. It has no notion of *how* these
//! values were parsed (CLI, config file, embedded defaults); callers build
//! one and pass it to [`crate::renderer::core::context::GpuContext::new`].

use bitflags::bitflags;

/// Which of the six unified light-transport strategies is active.
///
/// Mirrors the host/device-shared `VcmAlgorithmType` enum: every value
/// below selects which terms of the VCM MIS recurrence (§4.3) are live.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum AlgorithmSelect {
    /// Unidirectional path tracing with next-event estimation. No light
    /// sub-paths are generated.
    PathTrace = 0,
    /// Unidirectional tracing from light sources only, splatted into the
    /// view. No MIS bookkeeping.
    LightTrace = 1,
    /// Progressive photon mapping: merge only at the first non-specular
    /// camera hit.
    Ppm = 2,
    /// Bidirectional photon mapping: merge along the whole path.
    Bpm = 3,
    /// Bidirectional path tracing: connect along the whole path.
    Bpt = 4,
    /// Vertex connection and merging — connect and merge both active.
    /// The canonical unification; see design notes.
    Vcm = 5,
}

impl Default for AlgorithmSelect {
    fn default() -> Self {
        Self::Vcm
    }
}

bitflags! {
    /// Boolean behavioural toggles, one-to-one with `bdptFlag=<name>` /
    /// `bdptFlag=~<name>` command-line switches.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct BdptFlags: u32 {
        /// Sample light sources directly at every camera vertex (NEE).
        const NEXT_EVENT_ESTIMATION = 1 << 0;
        /// Weight strategies by multiple importance sampling rather than
        /// taking the first non-zero contribution.
        const MIS = 1 << 1;
        /// Maintain a light-vertex cache so camera vertices can connect to
        /// light sub-paths generated earlier in the frame.
        const LIGHT_VERTEX_CACHE = 1 << 2;
        /// Jitter hash-grid queries across neighbouring cells to hide grid
        /// bias in photon merging and reservoir reuse.
        const HASH_GRID_JITTER = 1 << 3;
        /// Sample the environment map directly instead of only via BSDF
        /// sampling escaping to infinity.
        const ENVIRONMENT_SAMPLING = 1 << 4;
        /// Enable cell-based (rather than purely screen-space) spatial
        /// reservoir reuse.
        const RESERVOIR_CELL_REUSE = 1 << 5;
        /// Keep temporal reservoir and denoiser history across frames.
        const REPROJECTION = 1 << 6;
    }
}

impl Default for BdptFlags {
    fn default() -> Self {
        Self::NEXT_EVENT_ESTIMATION
            | Self::MIS
            | Self::LIGHT_VERTEX_CACHE
            | Self::ENVIRONMENT_SAMPLING
            | Self::REPROJECTION
    }
}

/// Device acquisition and light-transport configuration.
///
/// | Field | Meaning |
/// |---|---|
/// | `power_preference` | GPU selection hint passed to `wgpu::Instance::request_adapter` |
/// | `required_features` | Feature bits the device must support (ray query, etc.) |
/// | `required_limits` | Minimum resource limits the device must support |
/// | `algorithm` | Active light-transport strategy |
/// | `bdpt_flags` | Behavioural toggles layered on top of `algorithm` |
/// | `min_path_length` | Russian roulette does not engage before this bounce |
/// | `max_path_length` | Hard cap on sub-path length |
/// | `max_diffuse_bounces` | Cap on non-specular bounces, independent of `max_path_length` |
/// | `max_null_collisions` | Bound on delta-tracking free-flight iterations per medium traversal |
/// | `environment_sample_probability` | Probability of sampling the environment map directly at NEE time |
/// | `light_image_quantization` | Fixed-point scale applied to light-trace splats before atomic accumulation |
/// | `hash_grid_bucket_count` | Number of buckets in the spatial hash grid |
/// | `hash_grid_min_bucket_radius` | Floor applied to the projected cell radius |
/// | `hash_grid_bucket_pixel_radius` | Target cell footprint, in pixels, at the view plane |
/// | `reservoir_m` | Candidate sample count per reservoir build |
/// | `reservoir_max_m` | Clamp applied to `M` after temporal/spatial combination |
/// | `reservoir_spatial_m` | Neighbour count consulted during spatial reuse |
/// | `exposure` | Scalar multiplier applied before the tonemap curve |
#[derive(Clone, Debug)]
pub struct RenderSettings {
    /// GPU selection hint.
    pub power_preference: wgpu::PowerPreference,
    /// Required device features.
    pub required_features: wgpu::Features,
    /// Required device limits.
    pub required_limits: wgpu::Limits,

    /// Active light-transport algorithm.
    pub algorithm: AlgorithmSelect,
    /// Behavioural toggles layered on top of `algorithm`.
    pub bdpt_flags: BdptFlags,

    /// Minimum sub-path length before Russian roulette may terminate it.
    pub min_path_length: u32,
    /// Hard cap on sub-path length.
    pub max_path_length: u32,
    /// Cap on non-specular ("diffuse") bounces.
    pub max_diffuse_bounces: u32,
    /// Bound on null-collision iterations per medium traversal.
    pub max_null_collisions: u32,
    /// Probability of sampling the environment map directly at NEE time.
    pub environment_sample_probability: f32,
    /// Fixed-point scale applied to light-trace splats.
    pub light_image_quantization: f32,

    /// Bucket count backing the spatial hash grid.
    pub hash_grid_bucket_count: u32,
    /// Floor applied to the projected cell radius.
    pub hash_grid_min_bucket_radius: f32,
    /// Target cell footprint in pixels at the view plane.
    pub hash_grid_bucket_pixel_radius: f32,

    /// Candidate sample count per reservoir build.
    pub reservoir_m: u32,
    /// Clamp on `M` after temporal/spatial combination.
    pub reservoir_max_m: u32,
    /// Neighbour count consulted during spatial reuse.
    pub reservoir_spatial_m: u32,

    /// Scalar multiplier applied before the tonemap curve.
    pub exposure: f32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            power_preference: wgpu::PowerPreference::HighPerformance,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),

            algorithm: AlgorithmSelect::default(),
            bdpt_flags: BdptFlags::default(),

            min_path_length: 3,
            max_path_length: 8,
            max_diffuse_bounces: 4,
            max_null_collisions: 64,
            environment_sample_probability: 0.5,
            light_image_quantization: 16384.0,

            hash_grid_bucket_count: 1 << 20,
            hash_grid_min_bucket_radius: 0.01,
            hash_grid_bucket_pixel_radius: 2.0,

            reservoir_m: 4,
            reservoir_max_m: 32,
            reservoir_spatial_m: 4,

            exposure: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_flags_enable_reprojection() {
        assert!(BdptFlags::default().contains(BdptFlags::REPROJECTION));
    }

    #[test]
    fn default_algorithm_is_vcm() {
        assert_eq!(AlgorithmSelect::default(), AlgorithmSelect::Vcm);
    }

    #[test]
    fn default_path_bounds_are_ordered() {
        let settings = RenderSettings::default();
        assert!(settings.min_path_length <= settings.max_path_length);
        assert!(settings.reservoir_m <= settings.reservoir_max_m);
    }
}
