//! Packed shading-point representation and octahedral normal (de)coding.
//!
//! [`ShadingData`] is the 48-byte vertex the transport kernels read at every
//! surface hit: position, packed normals/tangent, texture coordinates, and
//! the bookkeeping the BSDF abstraction needs (`shape_area`, a flags word,
//! a mean-curvature term used for ray differential / LoD heuristics
//! upstream). Normals and tangent are stored as octahedral-encoded unit
//! vectors in a single `u32` each, matching the wire layout the kernels
//! share with the host.

use bitflags::bitflags;
use glam::{Vec2, Vec3};

bitflags! {
    /// Per-vertex shading flags packed alongside the material address.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ShadingFlags: u32 {
        /// Set when the hit was on the geometric front face.
        const FRONT_FACE = 1 << 0;
        /// Set when the bitangent must be flipped to keep the shading
        /// frame right-handed (mirrored UV islands).
        const FLIP_BITANGENT = 1 << 1;
    }
}

/// Encode a unit vector into octahedral form, returned as two `[-1, 1]`
/// components ready for snorm quantization.
fn octahedral_encode(n: Vec3) -> Vec2 {
    let l1 = n.x.abs() + n.y.abs() + n.z.abs();
    let v = Vec2::new(n.x, n.y) / l1;
    if n.z >= 0.0 {
        v
    } else {
        Vec2::new(
            (1.0 - v.y.abs()) * v.x.signum(),
            (1.0 - v.x.abs()) * v.y.signum(),
        )
    }
}

/// Decode an octahedral-encoded unit vector from its two `[-1, 1]`
/// components.
fn octahedral_decode(e: Vec2) -> Vec3 {
    let mut n = Vec3::new(e.x, e.y, 1.0 - e.x.abs() - e.y.abs());
    if n.z < 0.0 {
        let xy = Vec2::new(
            (1.0 - n.y.abs()) * n.x.signum(),
            (1.0 - n.x.abs()) * n.y.signum(),
        );
        n.x = xy.x;
        n.y = xy.y;
    }
    n.normalize()
}

/// Quantize a single `[-1, 1]` component to a 16-bit signed normalized int.
fn quantize_snorm16(x: f32) -> i32 {
    (x.clamp(-1.0, 1.0) * f32::from(i16::MAX)).round() as i32
}

fn dequantize_snorm16(x: i32) -> f32 {
    (x as i16) as f32 / f32::from(i16::MAX)
}

/// Pack a unit normal into a single `u32` via octahedral encoding + snorm16.
pub fn pack_normal(n: Vec3) -> u32 {
    let e = octahedral_encode(n);
    let x = quantize_snorm16(e.x) as u32 & 0xffff;
    let y = quantize_snorm16(e.y) as u32 & 0xffff;
    x | (y << 16)
}

/// Unpack a `u32` produced by [`pack_normal`] back into a unit normal.
pub fn unpack_normal(packed: u32) -> Vec3 {
    let x = dequantize_snorm16((packed & 0xffff) as i16 as i32);
    let y = dequantize_snorm16(((packed >> 16) & 0xffff) as i16 as i32);
    octahedral_decode(Vec2::new(x, y))
}

/// Build an arbitrary vector orthogonal to `n`, per Duff et al. 2017.
fn orthonormal_vector(n: Vec3) -> Vec3 {
    let s = n.z.signum();
    let a = -1.0 / (s + n.z);
    let b = n.x * n.y * a;
    Vec3::new(1.0 + s * n.x * n.x * a, s * b, -s * n.x)
}

/// A single shading point: the inputs the abstract BSDF/phase-function
/// boundary needs, independent of which light-transport algorithm is
/// running.
#[derive(Clone, Copy, Debug)]
pub struct ShadingData {
    /// World-space hit position.
    pub position: Vec3,
    /// Shading flags (front face, bitangent handedness).
    pub flags: ShadingFlags,
    /// Geometric normal, octahedral-packed.
    pub packed_geometry_normal: u32,
    /// Shading (possibly bump/normal-mapped) normal, octahedral-packed.
    pub packed_shading_normal: u32,
    /// Shading tangent, octahedral-packed.
    pub packed_tangent: u32,
    /// Surface area of the hit primitive; `0.0` for delta lights, where
    /// area-measure PDFs are left undefined (§4.3 edge cases).
    pub shape_area: f32,
    /// Texture coordinates.
    pub uv: Vec2,
    /// Projected footprint of one pixel at this hit, in UV space.
    pub uv_screen_size: f32,
    /// Mean curvature of the surface at the hit, for upstream LoD/ray
    /// differential heuristics.
    pub mean_curvature: f32,
}

impl ShadingData {
    /// Decode the geometric normal. Falls back to the shading normal if
    /// geometry normal decoding degenerates (zero packed value), matching
    /// the "fall back to geometry normal" edge case inverted for the rare
    /// case a geometry normal itself is unavailable.
    #[must_use]
    pub fn geometry_normal(&self) -> Vec3 {
        unpack_normal(self.packed_geometry_normal)
    }

    /// Decode the shading normal.
    #[must_use]
    pub fn shading_normal(&self) -> Vec3 {
        unpack_normal(self.packed_shading_normal)
    }

    /// Decode the shading tangent.
    #[must_use]
    pub fn tangent(&self) -> Vec3 {
        unpack_normal(self.packed_tangent)
    }

    /// Build an orthonormal shading frame, falling back to the geometry
    /// normal when the tangent is degenerate (zero-length after decode due
    /// to a zero-area UV chart) per §4.3's edge-case rule.
    #[must_use]
    pub fn frame(&self) -> (Vec3, Vec3, Vec3) {
        let n = self.shading_normal();
        let mut t = self.tangent();
        if !t.is_finite() || t.length_squared() < 1e-12 {
            t = orthonormal_vector(n);
        }
        let sign = if self.flags.contains(ShadingFlags::FLIP_BITANGENT) {
            -1.0
        } else {
            1.0
        };
        let b = n.cross(t) * sign;
        (t, b, n)
    }

    /// Transform a local-space direction (tangent, bitangent, normal basis)
    /// into world space.
    #[must_use]
    pub fn to_world(&self, v: Vec3) -> Vec3 {
        let (t, b, n) = self.frame();
        v.x * t + v.y * b + v.z * n
    }

    /// Transform a world-space direction into the local shading frame.
    #[must_use]
    pub fn to_local(&self, v: Vec3) -> Vec3 {
        let (t, b, n) = self.frame();
        Vec3::new(v.dot(t), v.dot(b), v.dot(n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn angular_error(a: Vec3, b: Vec3) -> f32 {
        a.normalize().dot(b.normalize()).clamp(-1.0, 1.0).acos()
    }

    #[test]
    fn octahedral_round_trip_within_angular_tolerance() {
        // 2^-10 radians, per the testable-property invariant.
        let tolerance = 2f32.powi(-10);
        let dirs = [
            Vec3::X,
            Vec3::Y,
            Vec3::Z,
            -Vec3::X,
            -Vec3::Y,
            -Vec3::Z,
            Vec3::new(1.0, 1.0, 1.0).normalize(),
            Vec3::new(0.2, -0.7, 0.4).normalize(),
            Vec3::new(-0.9, 0.05, -0.2).normalize(),
            Vec3::new(0.001, 0.999, -0.03).normalize(),
        ];
        for d in dirs {
            let packed = pack_normal(d);
            let back = unpack_normal(packed);
            let err = angular_error(d, back);
            assert!(err < tolerance, "angular error {err} for {d:?} -> {back:?}");
        }
    }

    #[test]
    fn frame_falls_back_to_orthonormal_when_tangent_degenerate() {
        let data = ShadingData {
            position: Vec3::ZERO,
            flags: ShadingFlags::empty(),
            packed_geometry_normal: pack_normal(Vec3::Z),
            packed_shading_normal: pack_normal(Vec3::Z),
            packed_tangent: pack_normal(Vec3::ZERO.normalize_or_zero()),
            shape_area: 1.0,
            uv: Vec2::ZERO,
            uv_screen_size: 0.0,
            mean_curvature: 0.0,
        };
        let (t, b, n) = data.frame();
        assert!(t.is_finite() && b.is_finite() && n.is_finite());
        assert!((t.dot(n)).abs() < 1e-4);
    }
}
