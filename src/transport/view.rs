//! View and projection math.
//!
//! Cameras use a reversed-Z projection (`1` at the near plane, `0` at the
//! far plane) so depth-buffer precision concentrates where it is visually
//! relevant. `verticalFoV < 0` marks an orthographic view, which skips the
//! perspective divide entirely.

use glam::{Vec2, Vec3};

/// Projection parameters for a single view.
#[derive(Clone, Copy, Debug)]
pub struct Projection {
    /// Per-axis scale applied before the perspective divide.
    pub scale: Vec2,
    /// Per-axis offset applied before the perspective divide.
    pub offset: Vec2,
    /// Near plane distance.
    pub near_plane: f32,
    /// Far plane distance.
    pub far_plane: f32,
    /// Physical sensor area, used by light-tracing PDF conversions.
    pub sensor_area: f32,
    /// Vertical field of view in radians; negative marks an orthographic
    /// projection.
    pub vertical_fov: f32,
}

impl Projection {
    /// True when this projection is orthographic.
    #[must_use]
    pub fn is_orthographic(&self) -> bool {
        self.vertical_fov < 0.0
    }

    /// Project a view-space point to clip-space `xy` plus the reversed-Z
    /// depth and the homogeneous `w` used for the perspective divide.
    #[must_use]
    pub fn project_point(&self, v: Vec3) -> glam::Vec4 {
        if self.is_orthographic() {
            let xy = v.truncate() * self.scale + self.offset;
            let z = (self.far_plane - v.z) / (self.far_plane - self.near_plane);
            glam::Vec4::new(xy.x, xy.y, z, 1.0)
        } else {
            let xy = v.truncate() * self.scale + self.offset * v.z;
            // Reversed-Z perspective: z/w = near / v.z at v.z = near -> 1.
            let z = self.near_plane * (self.far_plane - v.z)
                / (v.z * (self.far_plane - self.near_plane));
            glam::Vec4::new(xy.x, xy.y, z * v.z, v.z)
        }
    }

    /// Reconstruct a view-space ray direction (unnormalized, `z = 1`) from
    /// a clip-space `xy` coordinate produced by dividing
    /// `project_point(v).xy` by its `w`.
    #[must_use]
    pub fn back_project(&self, clip_xy: Vec2) -> Vec3 {
        if self.is_orthographic() {
            let xy = (clip_xy - self.offset) / self.scale;
            xy.extend(1.0)
        } else {
            let xy = (clip_xy - self.offset) / self.scale;
            xy.extend(1.0)
        }
    }
}

/// A view: a projection plus the screen-space rectangle it covers, in
/// pixels. Used both for the primary camera and, during light-trace
/// splatting, for testing whether a light vertex's projection lands inside
/// the visible rectangle.
#[derive(Clone, Copy, Debug)]
pub struct View {
    /// Camera/view projection.
    pub projection: Projection,
    /// Minimum pixel coordinate (inclusive) of this view's rectangle.
    pub image_min: Vec2,
    /// Maximum pixel coordinate (exclusive) of this view's rectangle.
    pub image_max: Vec2,
}

impl View {
    /// Whether a clip-space `xy` (in `[-1, 1]`) projects inside this view's
    /// pixel rectangle, given the full render-target extent.
    #[must_use]
    pub fn contains_clip_xy(&self, clip_xy: Vec2, extent: Vec2) -> bool {
        let pixel = (clip_xy * Vec2::new(0.5, -0.5) + Vec2::splat(0.5)) * extent;
        pixel.x >= self.image_min.x
            && pixel.y >= self.image_min.y
            && pixel.x < self.image_max.x
            && pixel.y < self.image_max.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn perspective(vfov: f32) -> Projection {
        Projection {
            scale: Vec2::splat(1.0 / (vfov * 0.5).tan()),
            offset: Vec2::ZERO,
            near_plane: 0.1,
            far_plane: 1000.0,
            sensor_area: 1.0,
            vertical_fov: vfov,
        }
    }

    #[test]
    fn reversed_z_is_one_at_near_and_zero_at_far() {
        let proj = perspective(1.0);
        let near = proj.project_point(Vec3::new(0.0, 0.0, proj.near_plane));
        assert!((near.z / near.w - 1.0).abs() < 1e-5);
        let far = proj.project_point(Vec3::new(0.0, 0.0, proj.far_plane));
        assert!((far.z / far.w).abs() < 1e-4);
    }

    #[test]
    fn back_project_reconstructs_ray_within_one_ulp() {
        let proj = perspective(1.0);
        let v = Vec3::new(0.37, -0.21, 4.5);
        let clip = proj.project_point(v);
        let clip_xy = clip.truncate().truncate() / clip.w;
        let dir = proj.back_project(clip_xy);
        let reconstructed = dir * v.z;
        assert!((reconstructed.x - v.x).abs() <= f32::EPSILON * v.x.abs().max(1.0) * 4.0);
        assert!((reconstructed.y - v.y).abs() <= f32::EPSILON * v.y.abs().max(1.0) * 4.0);
    }

    #[test]
    fn orthographic_projection_skips_perspective_divide() {
        let proj = Projection {
            scale: Vec2::ONE,
            offset: Vec2::ZERO,
            near_plane: 0.0,
            far_plane: 10.0,
            sensor_area: 1.0,
            vertical_fov: -1.0,
        };
        assert!(proj.is_orthographic());
        let p = proj.project_point(Vec3::new(1.0, 2.0, 5.0));
        assert!((p.w - 1.0).abs() < 1e-6);
    }
}
