#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::too_many_lines)]

//! GPU-resident light-transport core.
//!
//! This crate implements the per-frame light-transport pipeline of an
//! interactive, physically-based renderer: the resource and barrier
//! scheduler that drives it, the shared MIS bookkeeping and algorithm
//! switch unifying unidirectional/bidirectional path tracing, photon
//! mapping, and vertex connection and merging under one vertex
//! representation, ReSTIR-style reservoir resampling for direct and global
//! illumination, a spatial hash grid for photon merging and reservoir
//! reuse, and an SVGF-style denoiser.
//!
//! Scene loading, shader compilation, GUI, windowing, and
//! acceleration-structure construction are out of scope — this crate
//! consumes those as abstract inputs (a [`renderer::scene_frame::SceneFrame`],
//! a [`transport::Scatter`] implementation, a pre-built `wgpu::Device`).

pub mod denoise;
pub mod engine;
pub mod error;
pub mod hashgrid;
pub mod renderer;
pub mod reservoir;
pub mod settings;
pub mod tonemap;
pub mod transport;

pub use engine::Engine;
pub use error::{RenderError, Result};
pub use settings::RenderSettings;
