//! Tonemapping: a parallel per-channel max reduction followed by a curve
//! application kernel (§4.7).
//!
//! [`TonemapMode::needs_max`] mirrors the `gTonemapModeNeedsMax` set in the
//! shared shader headers: only the modes whose curve depends on the scene
//! maximum (extended Reinhard, Uncharted 2, extended luminance Reinhard, the
//! `R`-channel viridis debug view) require the reduction pass to run at all.

use glam::Vec3;

/// Tone-curve selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum TonemapMode {
    Raw = 0,
    Reinhard = 1,
    ReinhardExtended = 2,
    ReinhardLuminance = 3,
    ReinhardLuminanceExtended = 4,
    Uncharted2 = 5,
    Filmic = 6,
    Aces = 7,
    AcesApprox = 8,
    ViridisR = 9,
    ViridisLengthRgb = 10,
}

impl TonemapMode {
    /// Whether this mode's curve is parameterized by the scene's maximum
    /// radiance and therefore requires the max-reduction pre-pass.
    #[must_use]
    pub fn needs_max(self) -> bool {
        matches!(
            self,
            Self::ReinhardExtended
                | Self::ReinhardLuminanceExtended
                | Self::Uncharted2
                | Self::ViridisR
        )
    }
}

/// Parallel per-channel maximum reduction over an input buffer, packed as
/// three fixed-point `u32`s on the device so atomics can combine partial
/// results across workgroups without floating-point non-associativity
/// ordering bugs. Mirrored here as plain float max for host-side use
/// (testing, CPU fallback paths).
#[must_use]
pub fn reduce_max(samples: &[Vec3]) -> Vec3 {
    samples.iter().fold(Vec3::ZERO, |acc, &s| acc.max(s))
}

fn reinhard(c: Vec3) -> Vec3 {
    c / (Vec3::ONE + c)
}

fn reinhard_extended(c: Vec3, max: Vec3) -> Vec3 {
    let max = max.max(Vec3::splat(1e-4));
    c * (Vec3::ONE + c / (max * max)) / (Vec3::ONE + c)
}

fn reinhard_luminance(c: Vec3) -> Vec3 {
    let l = luminance(c);
    let scaled = l / (1.0 + l);
    if l > 0.0 { c * (scaled / l) } else { Vec3::ZERO }
}

fn reinhard_luminance_extended(c: Vec3, max_luminance: f32) -> Vec3 {
    let l = luminance(c);
    if l <= 0.0 {
        return Vec3::ZERO;
    }
    let max_luminance = max_luminance.max(1e-4);
    let scaled = l * (1.0 + l / (max_luminance * max_luminance)) / (1.0 + l);
    c * (scaled / l)
}

fn uncharted2_partial(x: Vec3) -> Vec3 {
    const A: f32 = 0.15;
    const B: f32 = 0.50;
    const C: f32 = 0.10;
    const D: f32 = 0.20;
    const E: f32 = 0.02;
    const F: f32 = 0.30;
    (x * (x * A + Vec3::splat(C * B)) + Vec3::splat(D * E))
        / (x * (x * A + Vec3::splat(B)) + Vec3::splat(D * F))
        - Vec3::splat(E / F)
}

fn uncharted2(c: Vec3, max: Vec3) -> Vec3 {
    const WHITE_SCALE: f32 = 11.2;
    let exposure_bias = 2.0;
    let curr = uncharted2_partial(c * exposure_bias);
    let white = uncharted2_partial(Vec3::splat(WHITE_SCALE).max(max));
    curr / white
}

fn filmic(c: Vec3) -> Vec3 {
    let x = (c - Vec3::splat(0.004)).max(Vec3::ZERO);
    (x * (x * 6.2 + Vec3::splat(0.5))) / (x * (x * 6.2 + Vec3::splat(1.7)) + Vec3::splat(0.06))
}

fn aces(c: Vec3) -> Vec3 {
    const A: f32 = 2.51;
    const B: f32 = 0.03;
    const C: f32 = 2.43;
    const D: f32 = 0.59;
    const E: f32 = 0.14;
    ((c * (c * A + Vec3::splat(B))) / (c * (c * C + Vec3::splat(D)) + Vec3::splat(E)))
        .clamp(Vec3::ZERO, Vec3::ONE)
}

fn aces_approx(c: Vec3) -> Vec3 {
    let c = c * 0.6;
    aces(c)
}

/// Viridis colormap sample at `t in [0, 1]`, via a cheap cubic polynomial
/// fit (sufficient for the debug-visualization modes that use it).
fn viridis(t: f32) -> Vec3 {
    let t = t.clamp(0.0, 1.0);
    let r = 0.280 + t * (-0.143 + t * (1.618 + t * -1.614));
    let g = 0.004 + t * (1.384 + t * (-0.654 + t * 0.183));
    let b = 0.329 + t * (0.718 + t * (-1.312 + t * 0.618));
    Vec3::new(r.clamp(0.0, 1.0), g.clamp(0.0, 1.0), b.clamp(0.0, 1.0))
}

#[must_use]
fn luminance(c: Vec3) -> f32 {
    c.dot(Vec3::new(0.2126, 0.7152, 0.0722))
}

/// Apply exposure, the selected tone curve, optional albedo remodulation,
/// and optional gamma encoding to a single linear-radiance sample.
#[must_use]
pub fn tonemap(
    mode: TonemapMode,
    radiance: Vec3,
    scene_max: Vec3,
    exposure: f32,
    albedo: Option<Vec3>,
    apply_gamma: bool,
) -> Vec3 {
    let demodulated = match albedo {
        Some(a) if a != Vec3::ZERO => radiance / a.max(Vec3::splat(1e-4)),
        _ => radiance,
    };
    let exposed = demodulated * exposure;
    let max_luminance = luminance(scene_max).max(1e-4);

    let mapped = match mode {
        TonemapMode::Raw => exposed,
        TonemapMode::Reinhard => reinhard(exposed),
        TonemapMode::ReinhardExtended => reinhard_extended(exposed, scene_max),
        TonemapMode::ReinhardLuminance => reinhard_luminance(exposed),
        TonemapMode::ReinhardLuminanceExtended => {
            reinhard_luminance_extended(exposed, max_luminance)
        }
        TonemapMode::Uncharted2 => uncharted2(exposed, scene_max),
        TonemapMode::Filmic => filmic(exposed),
        TonemapMode::Aces => aces(exposed),
        TonemapMode::AcesApprox => aces_approx(exposed),
        TonemapMode::ViridisR => {
            let max_r = scene_max.x.max(1e-4);
            viridis((exposed.x / max_r).clamp(0.0, 1.0))
        }
        TonemapMode::ViridisLengthRgb => viridis((exposed.length() / 3f32.sqrt()).clamp(0.0, 1.0)),
    };

    let remodulated = match albedo {
        Some(a) if a != Vec3::ZERO && mode != TonemapMode::Raw => mapped * a,
        _ => mapped,
    };

    if apply_gamma {
        remodulated.max(Vec3::ZERO).powf(1.0 / 2.2)
    } else {
        remodulated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn needs_max_matches_known_set() {
        assert!(TonemapMode::Uncharted2.needs_max());
        assert!(TonemapMode::ReinhardExtended.needs_max());
        assert!(TonemapMode::ReinhardLuminanceExtended.needs_max());
        assert!(TonemapMode::ViridisR.needs_max());
        assert!(!TonemapMode::Aces.needs_max());
        assert!(!TonemapMode::Raw.needs_max());
    }

    #[test]
    fn viridis_r_scales_by_scene_max() {
        let dim = tonemap(TonemapMode::ViridisR, Vec3::splat(1.0), Vec3::splat(10.0), 1.0, None, false);
        let bright = tonemap(TonemapMode::ViridisR, Vec3::splat(1.0), Vec3::splat(1.0), 1.0, None, false);
        assert_ne!(dim, bright);
    }

    #[test]
    fn reduce_max_takes_per_channel_max() {
        let samples = [Vec3::new(1.0, 5.0, 0.0), Vec3::new(3.0, 2.0, 9.0)];
        let max = reduce_max(&samples);
        assert_eq!(max, Vec3::new(3.0, 5.0, 9.0));
    }

    #[test]
    fn reinhard_maps_large_values_below_one() {
        let c = Vec3::splat(1000.0);
        let mapped = tonemap(TonemapMode::Reinhard, c, c, 1.0, None, false);
        assert!(mapped.max_element() < 1.0);
    }

    #[test]
    fn raw_mode_only_applies_exposure() {
        let c = Vec3::new(0.5, 0.25, 0.1);
        let mapped = tonemap(TonemapMode::Raw, c, c, 2.0, None, false);
        assert_eq!(mapped, c * 2.0);
    }

    #[test]
    fn aces_output_stays_within_unit_range() {
        let c = Vec3::splat(100.0);
        let mapped = tonemap(TonemapMode::Aces, c, c, 1.0, None, false);
        assert!(mapped.x <= 1.0 && mapped.y <= 1.0 && mapped.z <= 1.0);
    }
}
