//! SVGF-style denoiser: temporal accumulation, variance estimation, and
//! à-trous edge-stopping filtering (§4.6).
//!
//! The four-kernel pipeline (`temporal_accumulation`, `estimate_variance`,
//! `atrous` × N, optional `copy_rgb`) is modeled here as plain functions
//! over `Vec<f32>`/`Vec<Vec3>` buffers rather than GPU dispatches, so the
//! edge-stopping and reprojection-rejection math is independently
//! testable; the dispatcher binds these same computations to compute
//! shaders for the real per-pixel workload.

use glam::{Vec2, Vec3};

/// One of the five selectable denoise filter kernels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum FilterType {
    Box3x3 = 0,
    Gaussian3x3 = 1,
    Box5x5 = 2,
    Gaussian5x5 = 3,
    Atrous = 4,
}

/// Per-pixel reprojection inputs consulted by temporal accumulation.
#[derive(Clone, Copy, Debug)]
pub struct ReprojectionSample {
    pub prev_uv: Vec2,
    pub visibility: bool,
    pub instance_id: u32,
    pub normal: Vec3,
    pub depth: f32,
}

/// Running accumulation state for one pixel.
#[derive(Clone, Copy, Debug, Default)]
pub struct AccumulationState {
    pub color: Vec3,
    pub moment1: f32,
    pub moment2: f32,
    pub frame_count: u32,
}

impl AccumulationState {
    /// Clear accumulated color and moments. Must be invoked on scene /
    /// material edits, on the user-facing "reset" action, and whenever the
    /// camera moved while reprojection is disabled.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Blend a new sample into the running accumulation, using
    /// `1 / min(frame_count, history_limit)` as the temporal blend weight
    /// — standard exponential-moving-average accumulation that converges
    /// to a plain average for the first `history_limit` frames, then
    /// holds a fixed-length window afterward.
    pub fn accumulate(&mut self, sample: Vec3, history_limit: u32) {
        self.frame_count += 1;
        let weight = 1.0 / (self.frame_count.min(history_limit) as f32);
        let luminance = luminance(sample);
        self.color = self.color * (1.0 - weight) + sample * weight;
        self.moment1 = self.moment1 * (1.0 - weight) + luminance * weight;
        self.moment2 = self.moment2 * (1.0 - weight) + luminance * luminance * weight;
    }

    /// Per-pixel variance: `moment2 - moment1^2`, floored at zero to guard
    /// against the tiny negative values floating-point cancellation can
    /// produce.
    #[must_use]
    pub fn variance(&self) -> f32 {
        (self.moment2 - self.moment1 * self.moment1).max(0.0)
    }
}

#[must_use]
fn luminance(c: Vec3) -> f32 {
    c.dot(Vec3::new(0.2126, 0.7152, 0.0722))
}

/// Decide whether a previous-frame sample may be reused for temporal
/// accumulation, given the current pixel's reference data and the
/// reprojected previous-frame data.
#[must_use]
pub fn reprojection_is_valid(
    current: &ReprojectionSample,
    previous: &ReprojectionSample,
    check_normal: bool,
    normal_threshold: f32,
    check_depth: bool,
    depth_threshold: f32,
) -> bool {
    if !previous.visibility || current.instance_id != previous.instance_id {
        return false;
    }
    if check_normal && current.normal.dot(previous.normal) < normal_threshold {
        return false;
    }
    if check_depth {
        let rel = (current.depth - previous.depth).abs() / current.depth.max(previous.depth).max(1e-6);
        if rel > depth_threshold {
            return false;
        }
    }
    true
}

/// Spatially estimate variance from a 7x7 neighbourhood of per-pixel
/// luminance moments, used in place of the temporal estimate while
/// `frame_count < variance_boost_length`.
#[must_use]
pub fn spatial_variance_7x7(neighborhood_luminance: &[f32]) -> f32 {
    debug_assert_eq!(neighborhood_luminance.len(), 49);
    let n = neighborhood_luminance.len() as f32;
    let mean: f32 = neighborhood_luminance.iter().sum::<f32>() / n;
    let mean_sq: f32 = neighborhood_luminance.iter().map(|l| l * l).sum::<f32>() / n;
    (mean_sq - mean * mean).max(0.0)
}

/// One à-trous tap's edge-stopping weight, combining luminance, depth, and
/// normal rejection terms. `step_size` is `2^iteration`.
#[must_use]
#[allow(clippy::too_many_arguments)]
pub fn atrous_weight(
    center_luminance: f32,
    tap_luminance: f32,
    variance: f32,
    sigma_luminance_boost: f32,
    center_depth: f32,
    tap_depth: f32,
    depth_gradient: f32,
    center_normal: Vec3,
    tap_normal: Vec3,
    normal_power: f32,
) -> f32 {
    let sigma_l = sigma_luminance_boost * (variance.max(0.0)).sqrt().max(1e-4);
    let w_luminance = (-((center_luminance - tap_luminance).abs()) / sigma_l).exp();

    let w_depth = if depth_gradient.abs() > 1e-6 {
        (-((center_depth - tap_depth).abs()) / depth_gradient.abs()).exp()
    } else if (center_depth - tap_depth).abs() < 1e-4 {
        1.0
    } else {
        0.0
    };

    let w_normal = center_normal
        .dot(tap_normal)
        .max(0.0)
        .powf(normal_power.max(1.0));

    w_luminance * w_depth * w_normal
}

/// Run one à-trous iteration over a flat RGB buffer using a 5-tap
/// cross/plus kernel at `step_size = 2^iteration`, weighting taps by
/// [`atrous_weight`]. `width`/`height` describe `color`'s layout; `aux`
/// supplies the per-pixel depth/normal/variance used for edge stopping.
pub struct AuxBuffers<'a> {
    pub depth: &'a [f32],
    pub normal: &'a [Vec3],
    pub variance: &'a [f32],
    pub depth_gradient: &'a [f32],
}

#[allow(clippy::too_many_arguments)]
pub fn atrous_iteration(
    color: &[Vec3],
    width: u32,
    height: u32,
    step_size: u32,
    aux: &AuxBuffers,
    sigma_luminance_boost: f32,
    normal_power: f32,
    out: &mut [Vec3],
) {
    const OFFSETS: [(i32, i32); 5] = [(0, 0), (1, 0), (-1, 0), (0, 1), (0, -1)];
    const KERNEL: [f32; 5] = [0.375, 0.25, 0.25, 0.25, 0.25];

    for y in 0..height {
        for x in 0..width {
            let center_idx = (y * width + x) as usize;
            let center_color = color[center_idx];
            let center_luminance = luminance(center_color);
            let center_depth = aux.depth[center_idx];
            let center_normal = aux.normal[center_idx];
            let variance = aux.variance[center_idx];
            let gradient = aux.depth_gradient[center_idx];

            let mut sum = Vec3::ZERO;
            let mut weight_sum = 0.0f32;
            for (k, &(dx, dy)) in OFFSETS.iter().enumerate() {
                let tx = x as i32 + dx * step_size as i32;
                let ty = y as i32 + dy * step_size as i32;
                if tx < 0 || ty < 0 || tx >= width as i32 || ty >= height as i32 {
                    continue;
                }
                let tap_idx = (ty as u32 * width + tx as u32) as usize;
                let tap_color = color[tap_idx];
                let w = atrous_weight(
                    center_luminance,
                    luminance(tap_color),
                    variance,
                    sigma_luminance_boost,
                    center_depth,
                    aux.depth[tap_idx],
                    gradient,
                    center_normal,
                    aux.normal[tap_idx],
                    normal_power,
                ) * KERNEL[k];
                sum += tap_color * w;
                weight_sum += w;
            }
            out[center_idx] = if weight_sum > 1e-6 {
                sum / weight_sum
            } else {
                center_color
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_clears_accumulation() {
        let mut acc = AccumulationState::default();
        acc.accumulate(Vec3::ONE, 16);
        acc.reset();
        assert_eq!(acc.frame_count, 0);
        assert_eq!(acc.color, Vec3::ZERO);
    }

    #[test]
    fn variance_is_never_negative() {
        let mut acc = AccumulationState::default();
        for _ in 0..5 {
            acc.accumulate(Vec3::new(1.0, 1.0, 1.0), 16);
        }
        assert!(acc.variance() >= 0.0);
    }

    #[test]
    fn reprojection_rejects_instance_mismatch() {
        let current = ReprojectionSample {
            prev_uv: Vec2::ZERO,
            visibility: true,
            instance_id: 1,
            normal: Vec3::Z,
            depth: 1.0,
        };
        let previous = ReprojectionSample {
            instance_id: 2,
            ..current
        };
        assert!(!reprojection_is_valid(&current, &previous, true, 0.9, true, 0.1));
    }

    #[test]
    fn reprojection_accepts_matching_sample() {
        let current = ReprojectionSample {
            prev_uv: Vec2::ZERO,
            visibility: true,
            instance_id: 1,
            normal: Vec3::Z,
            depth: 1.0,
        };
        assert!(reprojection_is_valid(&current, &current, true, 0.9, true, 0.1));
    }

    #[test]
    fn atrous_weight_is_one_for_identical_neighbor() {
        let w = atrous_weight(0.5, 0.5, 0.01, 4.0, 1.0, 1.0, 0.0, Vec3::Z, Vec3::Z, 32.0);
        assert!((w - 1.0).abs() < 1e-4);
    }
}
