//! Flattened per-frame scene data consumed by the transport kernels (§2,
//! §6 "Material record", "Vertex layouts", "Environment map").
//!
//! Scene-graph construction, acceleration-structure building, and asset
//! loading are out of scope (§1); this module owns only the packed,
//! GPU-ready tables the kernels read — rebuilt when the scene is marked
//! dirty, otherwise reused verbatim frame to frame (§3 Lifecycle).

use bytemuck::{Pod, Zeroable};

/// Packed vertex layout used by ray-tracing kernels: position, an
/// octahedral-packed normal, and a texture coordinate.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct PackedVertexData {
    pub position: [f32; 3],
    pub packed_normal: u32,
    pub uv: [f32; 2],
    pub _pad: [f32; 2],
}

/// One instance's transform and material binding, as flattened for the
/// kernels (acceleration-structure placement is out of scope; this is the
/// per-instance metadata the kernels join against a hit's instance index).
#[derive(Clone, Copy, Debug)]
pub struct InstanceRecord {
    pub transform: glam::Mat4,
    pub material_address: u32,
    pub light_index: Option<u32>,
}

/// Packed material record (§6): 8-bit-per-channel color terms plus
/// referenced image indices. `u32::MAX` marks an unused image slot.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct MaterialRecord {
    pub base_color_rgb_8: u32,
    pub emission_rgb_8_scale: u32,
    pub metallic: f32,
    pub roughness: f32,
    pub anisotropic: f32,
    pub subsurface: f32,
    pub clearcoat: f32,
    pub clearcoat_gloss: f32,
    pub transmission: f32,
    pub eta: f32,
    pub base_color_image: u32,
    pub normal_image: u32,
    pub alpha_image: u32,
    pub bump_image: u32,
}

/// A light source's flattened representation: emitters are referenced
/// either through an instance (area lights) or stand alone (point/distant
/// lights); power-weighted selection during light sub-path generation
/// reads `power` directly.
#[derive(Clone, Copy, Debug)]
pub struct LightRecord {
    pub power: f32,
    pub instance_index: Option<u32>,
}

/// Equirectangular environment map metadata: importance sampling is done
/// via marginal/conditional CDFs built from the map's luminance, with
/// `pdf = texelPdf / (2 pi^2 sin(theta))` (§6).
pub struct EnvironmentMap {
    pub width: u32,
    pub height: u32,
    /// Marginal CDF over rows, length `height + 1`.
    pub marginal_cdf: Vec<f32>,
    /// Conditional CDF over columns per row, length `height * (width + 1)`.
    pub conditional_cdf: Vec<f32>,
}

impl EnvironmentMap {
    /// Solid-angle PDF of sampling direction `(theta, phi)` via the CDFs,
    /// given the importance-sampled texel PDF (already the product of the
    /// marginal and conditional densities).
    #[must_use]
    pub fn solid_angle_pdf(texel_pdf: f32, theta: f32) -> f32 {
        let sin_theta = theta.sin();
        if sin_theta <= 0.0 {
            0.0
        } else {
            texel_pdf / (2.0 * std::f32::consts::PI * std::f32::consts::PI * sin_theta)
        }
    }
}

/// The read-only, per-frame scene data a dispatch reads: flattened
/// instance/vertex/material/light tables plus the optional environment
/// map. Rebuilt only when the host marks the scene dirty.
pub struct SceneFrame {
    pub vertices: Vec<PackedVertexData>,
    pub indices_32: Vec<u32>,
    pub instances: Vec<InstanceRecord>,
    pub materials: Vec<MaterialRecord>,
    pub lights: Vec<LightRecord>,
    pub environment: Option<EnvironmentMap>,
    dirty: bool,
}

impl SceneFrame {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            vertices: Vec::new(),
            indices_32: Vec::new(),
            instances: Vec::new(),
            materials: Vec::new(),
            lights: Vec::new(),
            environment: None,
            dirty: true,
        }
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Sum of light power, used to build the power-weighted light
    /// selection distribution for the first light sub-path vertex (§4.3).
    #[must_use]
    pub fn total_light_power(&self) -> f32 {
        self.lights.iter().map(|l| l.power).sum()
    }
}

impl Default for SceneFrame {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_scene_has_no_light_power() {
        let scene = SceneFrame::empty();
        assert_eq!(scene.total_light_power(), 0.0);
    }

    #[test]
    fn environment_pdf_is_zero_at_poles() {
        assert_eq!(EnvironmentMap::solid_angle_pdf(1.0, 0.0), 0.0);
    }

    #[test]
    fn new_scene_starts_dirty() {
        let scene = SceneFrame::empty();
        assert!(scene.is_dirty());
    }
}
