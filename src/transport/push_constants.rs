//! GPU push-constant layouts.
//!
//! These blocks are the stable wire contract between host and kernel; every
//! field is `repr(C)` and laid out in declaration order with explicit
//! padding so host (Rust) and device (HLSL/Slang) agree bit-exactly. None
//! of them derive `Default` beyond what `bytemuck::Zeroable` gives for free
//! — a zeroed push-constant block is a meaningful "do nothing" state on the
//! device side, matching source behaviour.

use bytemuck::{Pod, Zeroable};

/// Push constants for the unified VCM/BPT/BPM/PPM kernel.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct VcmPushConstants {
    /// Render-target extent in pixels, `(width, height)`.
    pub output_extent: [u32; 2],
    /// `output_extent.x * output_extent.y`, precomputed for 1-D dispatches.
    pub screen_pixel_count: u32,
    /// Number of light sub-paths traced this frame.
    pub light_sub_path_count: u32,
    /// Number of active views.
    pub view_count: u32,
    /// Number of lights in the scene.
    pub light_count: u32,
    /// Material address of the environment map, or `u32::MAX` if absent.
    pub environment_material_address: u32,
    /// Probability of sampling the environment map directly at NEE time.
    pub environment_sample_probability: f32,
    /// Minimum sub-path length before Russian roulette may terminate it.
    pub min_path_length: u32,
    /// Hard cap on sub-path length.
    pub max_path_length: u32,
    /// Fixed-point scale applied to light-trace splats.
    pub light_image_quantization: f32,
    /// `BdptFlags` bits, reinterpreted for the device.
    pub flags: u32,
    /// Per-frame RNG seed.
    pub random_seed: u32,
    /// Packed `(cameraPathLength | lightPathLength << 16)` debug view
    /// selector: two 16-bit subfields, `0xffff` in either half disables
    /// that half's debug overlay.
    pub debug_path_lengths: u32,
    /// Padding to keep the block 16-byte aligned for push-constant rules.
    pub pad0: u32,
    pub pad1: u32,
    pub pad2: u32,
    /// Clamp on DI reservoir `M` after temporal/spatial combination.
    pub di_reservoir_max_m: f32,
    /// Clamp on LVC reservoir `M` after temporal/spatial combination.
    pub lvc_reservoir_max_m: f32,
    /// DI reservoir candidate sample count.
    pub di_reservoir_sample_count: u32,
    /// LVC reservoir candidate sample count.
    pub lvc_reservoir_sample_count: u32,
}

impl VcmPushConstants {
    const RESERVOIR_HISTORY_VALID_BIT: u32 = 1 << 0;
    const DEBUG_DISABLED_HALF: u32 = 0xffff;

    /// Whether the reservoir history from the previous frame is valid.
    /// Cleared on camera motion without reprojection (§4.4 Validity).
    #[must_use]
    pub fn reservoir_history_valid(&self) -> bool {
        self.flags & Self::RESERVOIR_HISTORY_VALID_BIT != 0
    }

    /// Whether the camera-path-length debug overlay is enabled: the low
    /// 16 bits of `debug_path_lengths` are not the `0xffff` sentinel.
    #[must_use]
    pub fn debug_camera_path_length(&self) -> bool {
        (self.debug_path_lengths & Self::DEBUG_DISABLED_HALF) != Self::DEBUG_DISABLED_HALF
    }

    /// Whether the light-path-length debug overlay is enabled: the high
    /// 16 bits of `debug_path_lengths` are not the `0xffff` sentinel.
    #[must_use]
    pub fn debug_light_path_length(&self) -> bool {
        (self.debug_path_lengths >> 16) != Self::DEBUG_DISABLED_HALF
    }
}

/// Push constants for the plain unidirectional path tracer
/// (`AlgorithmSelect::PathTrace`): the VCM bookkeeping fields
/// (`light_sub_path_count`, MIS weight factors) are omitted since no light
/// sub-paths are generated.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct PathTracerPushConstants {
    pub output_extent: [u32; 2],
    pub screen_pixel_count: u32,
    pub view_count: u32,
    pub light_count: u32,
    pub environment_material_address: u32,
    pub environment_sample_probability: f32,
    pub min_path_length: u32,
    pub max_path_length: u32,
    pub flags: u32,
    pub random_seed: u32,
}

/// Minimal push constants for the reference/tiny path tracer used in the
/// convergence-comparison scenario (§8 property 7): no reservoirs, no
/// environment importance sampling, no debug overlays.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct TinyPtPushConstants {
    pub output_extent: [u32; 2],
    pub max_path_length: u32,
    pub random_seed: u32,
}

/// Push constants for the bidirectional path tracer with an optional
/// light-vertex cache (`AlgorithmSelect::Bpt`, `BdptFlags::LIGHT_VERTEX_CACHE`).
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct BdptPushConstants {
    pub output_extent: [u32; 2],
    pub screen_pixel_count: u32,
    pub light_sub_path_count: u32,
    pub view_count: u32,
    pub light_count: u32,
    pub environment_material_address: u32,
    pub environment_sample_probability: f32,
    pub min_path_length: u32,
    pub max_path_length: u32,
    pub light_image_quantization: f32,
    pub flags: u32,
    pub random_seed: u32,
}

/// Host-side VCM weight factors, shared across a frame's dispatches. Not a
/// push constant itself — too large to push on some backends — but bound
/// as a small uniform buffer alongside the push-constant block.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct VcmConstantsGpu {
    pub scene_sphere_center: [f32; 3],
    pub scene_sphere_radius: f32,
    pub merge_radius: f32,
    pub mis_vm_weight_factor: f32,
    pub mis_vc_weight_factor: f32,
    pub vm_normalization: f32,
}

impl From<crate::transport::vcm::VcmConstants> for VcmConstantsGpu {
    fn from(c: crate::transport::vcm::VcmConstants) -> Self {
        Self {
            scene_sphere_center: c.scene_sphere.0.into(),
            scene_sphere_radius: c.scene_sphere.1,
            merge_radius: c.merge_radius,
            mis_vm_weight_factor: c.mis_vm_weight_factor,
            mis_vc_weight_factor: c.mis_vc_weight_factor,
            vm_normalization: c.vm_normalization,
        }
    }
}

/// Parameters for the four SVGF denoiser kernels (§4.6).
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct DenoiserParameters {
    pub output_extent: [u32; 2],
    /// À-trous iteration at which `copy_rgb` copies the filtered result
    /// back into the accumulation buffer; `u32::MAX` disables the copy.
    pub history_tap: u32,
    /// Selected edge-stopping filter kernel (`FilterType` as `u32`).
    pub filter_type: u32,
    /// Number of à-trous iterations to run.
    pub atrous_iterations: u32,
    /// Below this accumulated frame count, variance is estimated from a
    /// spatial 7x7 neighbourhood instead of the temporal moments.
    pub variance_boost_length: u32,
    /// Multiplier applied to the luminance edge-stopping sigma.
    pub sigma_luminance_boost: f32,
    pub check_normal: u32,
    pub normal_threshold: f32,
    pub check_depth: u32,
    pub depth_threshold: f32,
    /// `0` disables temporal reprojection entirely (every frame resets).
    pub reprojection_enabled: u32,
    pub demodulate_albedo: u32,
    /// Frames blended into the running moments before the weight clamps
    /// to `1/historyLimit`.
    pub history_limit: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reservoir_history_valid_reads_flags_bit_zero() {
        let mut pc = VcmPushConstants::zeroed();
        pc.flags = 0b1;
        assert!(pc.reservoir_history_valid());
    }

    #[test]
    fn debug_path_lengths_decode_as_16_bit_halves() {
        let mut pc = VcmPushConstants::zeroed();
        // camera half = 4 (enabled), light half = 0xffff (disabled).
        pc.debug_path_lengths = 0xffff_0004;
        assert!(pc.debug_camera_path_length());
        assert!(!pc.debug_light_path_length());

        pc.debug_path_lengths = 0xffff_ffff;
        assert!(!pc.debug_camera_path_length());
        assert!(!pc.debug_light_path_length());
    }

    #[test]
    fn push_constant_blocks_are_pod_sized_without_implicit_padding_surprises() {
        assert_eq!(std::mem::size_of::<TinyPtPushConstants>(), 4 * 3);
    }
}
