//! Abstract BSDF / phase-function boundary.
//!
//! Material and volume sampling routines are out of scope: the transport
//! core invokes them only through this trait, which the host binds to
//! whatever concrete material model a scene uses. A reimplementation of
//! this crate's transport core never needs to know about Disney BSDFs,
//! Henyey-Greenstein phase functions, or any other concrete model — only
//! that each interaction produces a sampled direction, and can be
//! evaluated/queried for a PDF given an arbitrary direction pair.

use glam::Vec3;

/// Outcome of sampling a scattering direction at an interaction vertex.
#[derive(Clone, Copy, Debug)]
pub struct DirectionSample {
    /// Sampled direction, in the local shading frame.
    pub direction: Vec3,
    /// `BSDF · cosθ / pdfW` (or the volume-phase analogue), already
    /// divided through — the factor the path throughput is multiplied by.
    pub weight: Vec3,
    /// Forward solid-angle PDF of the sampled direction.
    pub pdf_fwd_w: f32,
    /// Solid-angle PDF of sampling the reverse direction (`-direction`)
    /// from the new vertex back toward the old one; needed by the MIS
    /// recurrence (§4.3).
    pub pdf_rev_w: f32,
    /// True when the interaction is a delta event (perfect specular, or a
    /// delta phase function) and therefore cannot participate in
    /// next-event estimation, connection, or merging.
    pub is_delta: bool,
}

/// The interactions a transport vertex can query, independent of whether
/// it is a surface BSDF or a participating-medium phase function.
pub trait Scatter {
    /// Importance-sample an outgoing direction given the incoming
    /// direction `wi` (in the local frame, pointing away from the
    /// surface/medium toward the previous vertex).
    fn sample_direction(&self, wi: Vec3, rng: &mut dyn FnMut() -> f32) -> Option<DirectionSample>;

    /// Evaluate the scattering function for an explicit direction pair,
    /// e.g. for next-event estimation or connection, where the direction
    /// is dictated by the other endpoint rather than sampled.
    fn evaluate(&self, wi: Vec3, wo: Vec3) -> Vec3;

    /// Solid-angle PDF of sampling `wo` given `wi`, without drawing a
    /// sample — needed to compute the reverse PDF when a later vertex
    /// connects back to this one.
    fn pdf(&self, wi: Vec3, wo: Vec3) -> f32;

    /// Whether this interaction is a delta event (no next-event
    /// estimation, connection, or merging is possible here).
    fn is_delta(&self) -> bool {
        false
    }
}
