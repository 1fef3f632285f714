//! ReSTIR-style reservoir resampling for direct illumination and global
//! illumination samples (§4.4).
//!
//! A [`Reservoir`] is the bare streaming-resampling state; [`DiReservoir`]
//! and [`GiReservoir`] attach the sample payload and a reference shading
//! point used for similarity tests during temporal/spatial reuse.

use glam::Vec3;

/// Online weighted-sample container. Streaming update accepts a candidate
/// with probability `w / total_weight` where `w = target_pdf / source_pdf`;
/// grounded directly in the reference `Reservoir::update`/`W` pair.
#[derive(Clone, Copy, Debug, Default)]
pub struct Reservoir {
    /// Sum of candidate weights seen so far.
    pub total_weight: f32,
    /// Target-function PDF of the currently held sample.
    pub sample_target_pdf: f32,
    /// Number of candidates folded into this reservoir.
    pub candidate_count: u32,
}

impl Reservoir {
    /// Stream one candidate into the reservoir. `rnd` must be uniform in
    /// `[0, 1)`. Returns `true` when this candidate became (or remains)
    /// the held sample, so the caller knows whether to overwrite the
    /// sample payload.
    pub fn update(&mut self, rnd: f32, source_pdf: f32, target_pdf: f32) -> bool {
        if source_pdf <= 0.0 || !source_pdf.is_finite() {
            return false;
        }
        let w = target_pdf / source_pdf;
        if !w.is_finite() {
            return false;
        }
        self.total_weight += w;
        self.candidate_count += 1;
        if rnd * self.total_weight <= w {
            self.sample_target_pdf = target_pdf;
            true
        } else {
            false
        }
    }

    /// Unbiased contribution weight of the held sample:
    /// `totalWeight / (candidateCount · sampleTargetPdf)`, or `0.0` when
    /// `sampleTargetPdf == 0` (the reservoir contributes nothing — §3
    /// Reservoir invariant).
    #[must_use]
    pub fn w(&self) -> f32 {
        if self.sample_target_pdf <= 0.0 || self.candidate_count == 0 {
            return 0.0;
        }
        self.total_weight / (self.candidate_count as f32 * self.sample_target_pdf)
    }

    /// Clamp `candidate_count` after a temporal/spatial merge, bounding
    /// variance growth (`DIMaxM`/`GIMaxM`). The clamp scales `total_weight`
    /// proportionally so `W` is unaffected by the clamp itself.
    pub fn clamp_candidate_count(&mut self, max_m: u32) {
        if self.candidate_count > max_m && self.candidate_count > 0 {
            let scale = max_m as f32 / self.candidate_count as f32;
            self.total_weight *= scale;
            self.candidate_count = max_m;
        }
    }

    /// Combine `other` into `self` via pairwise MIS (§4.4 "Combining
    /// reservoirs"): `other`'s candidates are re-weighted by its own
    /// target pdf at the merge point (`other_target_pdf_here`), evaluated
    /// by the caller at `self`'s shading point, and a Jacobian factor
    /// accounting for the domain change between the two shading points.
    /// Reservoirs are dropped (no-op) when the Jacobian is below `eps` or
    /// the reprojected target pdf is zero.
    pub fn combine(
        &mut self,
        rnd: f32,
        other: &Reservoir,
        other_target_pdf_here: f32,
        jacobian: f32,
        eps: f32,
    ) -> bool {
        if jacobian < eps || other_target_pdf_here <= 0.0 || !jacobian.is_finite() {
            return false;
        }
        let reprojected_source_pdf = if other.sample_target_pdf > 0.0 {
            other.sample_target_pdf / jacobian
        } else {
            0.0
        };
        if reprojected_source_pdf <= 0.0 {
            return false;
        }
        let candidate_weight = other.w() * other.candidate_count as f32;
        let w = other_target_pdf_here * candidate_weight / reprojected_source_pdf.max(f32::MIN_POSITIVE);
        if !w.is_finite() || w <= 0.0 {
            return false;
        }
        self.total_weight += w;
        self.candidate_count += other.candidate_count;
        if rnd * self.total_weight <= w {
            self.sample_target_pdf = other_target_pdf_here;
            true
        } else {
            false
        }
    }
}

/// Geometric similarity reference used to validate temporal/spatial reuse
/// candidates before merging their reservoirs.
#[derive(Clone, Copy, Debug)]
pub struct ShadingPointRef {
    pub position: Vec3,
    pub geometry_normal: Vec3,
    pub shading_normal: Vec3,
    pub depth: f32,
}

impl ShadingPointRef {
    /// Whether `other` is similar enough to reuse a reservoir built at
    /// `other`'s shading point, using the same position/normal/depth
    /// thresholds the temporal-reuse rejection test applies.
    #[must_use]
    pub fn is_similar(&self, other: &ShadingPointRef, normal_threshold: f32, depth_threshold: f32) -> bool {
        let normal_cos = self.shading_normal.dot(other.shading_normal);
        if normal_cos < normal_threshold {
            return false;
        }
        if self.depth <= 0.0 || other.depth <= 0.0 {
            return false;
        }
        let depth_rel = (self.depth - other.depth).abs() / self.depth.max(other.depth);
        depth_rel <= depth_threshold
    }
}

/// RNG seed quad identifying a light sample losslessly: rather than
/// storing the sampled direction, the winning candidate's RNG seed is kept
/// so the sample can be regenerated bit-for-bit at the reuse site (§9
/// "Reservoir RNG replay").
pub type RngSeedQuad = [u32; 4];

/// A direct-illumination reservoir: a [`Reservoir`] plus the winning
/// sample's RNG seed and the shading point it was built at.
#[derive(Clone, Copy, Debug)]
pub struct DiReservoir {
    pub reservoir: Reservoir,
    pub rnd: RngSeedQuad,
    pub shading_point: ShadingPointRef,
}

/// A global-illumination reservoir: holds a full next-bounce path vertex
/// rather than a light sample.
#[derive(Clone, Copy, Debug)]
pub struct GiReservoir {
    pub reservoir: Reservoir,
    pub sample_vertex: crate::transport::VcmVertex,
    pub shading_point: ShadingPointRef,
}

/// Talbot MIS combine weight for one of `n` candidates given each
/// candidate's target pdf evaluated at every other candidate's shading
/// point (`target_pdfs[i][j]` = candidate `j`'s sample evaluated at
/// candidate `i`'s point). This is the unbiased, higher-variance-reducing
/// alternative to pairwise MIS named in §4.4.
#[must_use]
pub fn talbot_mis_weight(target_pdfs: &[f32], self_index: usize) -> f32 {
    let sum: f32 = target_pdfs.iter().copied().sum();
    if sum <= 0.0 {
        0.0
    } else {
        target_pdfs[self_index] / sum
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn w_matches_closed_form_after_updates() {
        let mut r = Reservoir::default();
        r.update(0.0, 1.0, 2.0);
        r.update(1.0, 1.0, 3.0);
        let expected = r.total_weight / (r.candidate_count as f32 * r.sample_target_pdf);
        assert!((r.w() - expected).abs() < 1e-6);
    }

    #[test]
    fn zero_target_pdf_contributes_nothing() {
        let mut r = Reservoir::default();
        r.update(0.5, 1.0, 0.0);
        assert_eq!(r.w(), 0.0);
    }

    #[test]
    fn negative_or_zero_source_pdf_is_rejected() {
        let mut r = Reservoir::default();
        let accepted = r.update(0.1, 0.0, 5.0);
        assert!(!accepted);
        assert_eq!(r.candidate_count, 0);
    }

    #[test]
    fn clamp_preserves_w_up_to_rounding() {
        let mut r = Reservoir::default();
        for i in 0..10 {
            r.update(f32::from(i % 2), 1.0, 1.0 + f32::from(i));
        }
        let w_before = r.w();
        r.clamp_candidate_count(4);
        assert_eq!(r.candidate_count, 4);
        assert!((r.w() - w_before).abs() < 1e-4);
    }

    #[test]
    fn combine_drops_reservoir_below_jacobian_epsilon() {
        let mut a = Reservoir {
            total_weight: 1.0,
            sample_target_pdf: 1.0,
            candidate_count: 1,
        };
        let b = Reservoir {
            total_weight: 2.0,
            sample_target_pdf: 1.0,
            candidate_count: 1,
        };
        let before = a;
        let accepted = a.combine(0.5, &b, 1.0, 1e-9, 1e-4);
        assert!(!accepted);
        assert_eq!(a.candidate_count, before.candidate_count);
    }

    #[test]
    fn talbot_weight_sums_to_one_across_candidates() {
        let pdfs = [1.0, 2.0, 3.0];
        let sum: f32 = (0..3).map(|i| talbot_mis_weight(&pdfs, i)).sum();
        assert!((sum - 1.0).abs() < 1e-6);
    }
}
