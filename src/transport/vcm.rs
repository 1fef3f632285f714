//! Unified VCM transport vertex and MIS bookkeeping.
//!
//! A single vertex representation and a single running set of MIS partial
//! sums (`dVCM`, `dVC`, `dVM`) drive every one of the six selectable
//! algorithms (`AlgorithmSelect`); which terms are read back at connection
//! and merge time is the only thing that differs between them. The
//! recurrence below follows Georgiev & Křivánek's vertex connection and
//! merging formulation, with `pow2` as the MIS power heuristic.

use glam::Vec3;

use crate::transport::shading::ShadingData;

/// MIS power heuristic. VCM uses the balance-heuristic-squared (power-2)
/// variant throughout.
#[inline]
#[must_use]
pub fn mis(pdf: f32) -> f32 {
    pdf * pdf
}

/// Host-supplied constants shared by every VCM dispatch in a frame.
#[derive(Clone, Copy, Debug)]
pub struct VcmConstants {
    /// World-space bounding sphere of the scene, `(center, radius)`.
    pub scene_sphere: (Vec3, f32),
    /// Photon-merge radius for the current frame (shrinks over time under
    /// progressive photon mapping).
    pub merge_radius: f32,
    /// MIS weight factor applied to the merging (`dVM`) term:
    /// `η_VCM = π · mergeRadius² · lightSubPathCount`.
    pub mis_vm_weight_factor: f32,
    /// MIS weight factor applied to the connection (`dVC`) term.
    pub mis_vc_weight_factor: f32,
    /// Normalization applied to merged contributions:
    /// `1 / (π · mergeRadius² · lightSubPathCount)`.
    pub vm_normalization: f32,
}

impl VcmConstants {
    /// Derive the VCM weight factors from the merge radius and the number
    /// of light sub-paths traced this frame, following the host
    /// computation the shaders expect to already be done.
    #[must_use]
    pub fn new(scene_sphere: (Vec3, f32), merge_radius: f32, light_sub_path_count: f32) -> Self {
        let eta_vcm = std::f32::consts::PI * merge_radius * merge_radius * light_sub_path_count;
        Self {
            scene_sphere,
            merge_radius,
            mis_vm_weight_factor: eta_vcm,
            mis_vc_weight_factor: 1.0 / eta_vcm,
            vm_normalization: 1.0 / eta_vcm,
        }
    }
}

/// Running MIS partial sums carried along a sub-path.
#[derive(Clone, Copy, Debug, Default)]
pub struct MisSums {
    /// Partial sum for the combined connection+merging strategy.
    pub d_vcm: f32,
    /// Partial sum for the connection-only strategy.
    pub d_vc: f32,
    /// Partial sum for the merging-only strategy.
    pub d_vm: f32,
}

impl MisSums {
    /// MIS sums for the very first vertex of a sub-path (emitted from a
    /// light, or the camera origin), given its area-measure emission PDF.
    #[must_use]
    pub fn first_vertex(pdf_fwd_a: f32) -> Self {
        Self {
            d_vcm: if pdf_fwd_a > 0.0 { 1.0 / pdf_fwd_a } else { 0.0 },
            d_vc: 0.0,
            d_vm: 0.0,
        }
    }

    /// Propagate the MIS sums across a bounce to the next vertex.
    ///
    /// `pdf_fwd_w`/`pdf_rev_w` are the forward/reverse solid-angle PDFs of
    /// the sampled direction at the *previous* vertex; `cos_theta` and `r2`
    /// convert between area and solid-angle measure
    /// (`pdfA = pdfW · cosθ / r²`). When the previous interaction was a
    /// delta event (perfect specular, or a delta phase function), MIS
    /// contributions from connection and merging cannot apply, so
    /// `d_vcm` resets to zero and only `pdf_fwd_w` survives the update —
    /// per the "previous interaction was a delta" edge case.
    #[must_use]
    pub fn propagate(
        &self,
        constants: &VcmConstants,
        pdf_fwd_w: f32,
        pdf_rev_w: f32,
        cos_theta_at_prev: f32,
        dist_sq: f32,
        is_delta: bool,
    ) -> Self {
        if pdf_fwd_w <= 0.0 || !pdf_fwd_w.is_finite() {
            return Self::default();
        }
        if is_delta {
            return Self {
                d_vcm: 0.0,
                d_vc: self.d_vc / pdf_fwd_w,
                d_vm: self.d_vm / pdf_fwd_w,
            };
        }
        let area_conversion = if cos_theta_at_prev > 0.0 {
            dist_sq / cos_theta_at_prev
        } else {
            0.0
        };
        let d_vcm = area_conversion / pdf_fwd_w;
        let d_vc = (constants.mis_vm_weight_factor + self.d_vcm + self.d_vc * mis(pdf_rev_w))
            / pdf_fwd_w;
        let d_vm =
            (1.0 + self.d_vcm * constants.mis_vc_weight_factor + self.d_vm * mis(pdf_rev_w))
                / pdf_fwd_w;
        Self { d_vcm, d_vc, d_vm }
    }

    /// MIS weight for a camera vertex directly hitting an emitter:
    /// `1 / (1 + dVCM · pdfLightA + dVC · pdfLightW)`.
    #[must_use]
    pub fn emission_hit_weight(&self, pdf_light_a: f32, pdf_light_w: f32) -> f32 {
        let denom = 1.0 + self.d_vcm * pdf_light_a + self.d_vc * mis(pdf_light_w);
        if denom > 0.0 { 1.0 / denom } else { 0.0 }
    }
}

/// Path-length and pdfA, bit-packed as the source layout does
/// (`packed{pathLength, pathSamplePdfA}`).
#[derive(Clone, Copy, Debug)]
pub struct PathLengthPdf {
    /// Number of vertices generated so far on this sub-path.
    pub path_length: u32,
    /// Area-measure probability of having reached this vertex along this
    /// sub-path. Undefined (left at `0.0`) when `shape_area == 0.0`.
    pub path_sample_pdf_a: f32,
}

/// A single transport vertex: a shading point plus the running
/// throughput, MIS sums, and the local incoming direction needed to
/// evaluate the BSDF when a later vertex connects to this one.
#[derive(Clone, Copy, Debug)]
pub struct VcmVertex {
    /// Underlying shading point.
    pub shading_data: ShadingData,
    /// Running product of BSDF · cosθ · transmittance / pdfW.
    pub throughput: Vec3,
    /// Path length and area-measure PDF, packed on the wire.
    pub packed_data: PathLengthPdf,
    /// Running MIS partial sums.
    pub mis: MisSums,
    /// Incoming direction at this vertex, in the local shading frame —
    /// needed to re-evaluate the BSDF when a later connection or merge
    /// references this vertex.
    pub local_direction_in: Vec3,
}

impl VcmVertex {
    /// Whether this vertex can participate in connection/merging: both
    /// require a well-defined local incoming direction and non-zero
    /// throughput.
    #[must_use]
    pub fn is_connectible(&self) -> bool {
        self.throughput.is_finite()
            && self.throughput != Vec3::ZERO
            && self.local_direction_in.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_vertex_handles_zero_area_pdf() {
        let sums = MisSums::first_vertex(0.0);
        assert_eq!(sums.d_vcm, 0.0);
    }

    #[test]
    fn delta_interaction_zeroes_d_vcm() {
        let constants = VcmConstants::new((Vec3::ZERO, 10.0), 0.01, 1_000_000.0);
        let sums = MisSums {
            d_vcm: 4.0,
            d_vc: 2.0,
            d_vm: 1.0,
        };
        let next = sums.propagate(&constants, 1.0, 1.0, 1.0, 1.0, true);
        assert_eq!(next.d_vcm, 0.0);
    }

    #[test]
    fn zero_forward_pdf_drops_the_path() {
        let constants = VcmConstants::new((Vec3::ZERO, 10.0), 0.01, 1_000_000.0);
        let sums = MisSums {
            d_vcm: 4.0,
            d_vc: 2.0,
            d_vm: 1.0,
        };
        let next = sums.propagate(&constants, 0.0, 1.0, 1.0, 1.0, false);
        assert_eq!(next.d_vcm, 0.0);
        assert_eq!(next.d_vc, 0.0);
        assert_eq!(next.d_vm, 0.0);
    }

    #[test]
    fn eta_vcm_matches_pi_r_squared_light_count() {
        let merge_radius = 0.05_f32;
        let light_count = 500_000.0_f32;
        let constants = VcmConstants::new((Vec3::ZERO, 1.0), merge_radius, light_count);
        let expected = std::f32::consts::PI * merge_radius * merge_radius * light_count;
        assert!((constants.mis_vm_weight_factor - expected).abs() < 1e-3);
    }
}
