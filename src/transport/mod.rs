//! Light-transport core: the shared vertex representation, MIS bookkeeping,
//! and algorithm switch that unifies path tracing, light tracing,
//! progressive/bidirectional photon mapping, bidirectional path tracing,
//! and vertex connection and merging (§4.3).
//!
//! Concrete ray/scene traversal (intersection, acceleration structures) is
//! out of scope; this module owns the numeric substance — PDF conversions,
//! MIS weights, and the packed wire layouts — that every algorithm variant
//! shares.

pub mod bsdf;
pub mod push_constants;
pub mod shading;
pub mod vcm;
pub mod view;

pub use bsdf::{DirectionSample, Scatter};
pub use shading::{ShadingData, ShadingFlags, pack_normal, unpack_normal};
pub use vcm::{MisSums, PathLengthPdf, VcmConstants, VcmVertex, mis};
pub use view::{Projection, View};
