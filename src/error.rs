//! Error Types
//!
//! This module defines the error types used throughout the renderer core.
//!
//! # Overview
//!
//! The main error type [`RenderError`] covers all failure modes including:
//! - GPU initialization failures
//! - Frame resource / pool exhaustion
//! - Algorithm configuration errors
//!
//! # Usage
//!
//! All public APIs return [`Result<T>`] which is an alias for `std::result::Result<T, RenderError>`.

use thiserror::Error;

/// The main error type for the renderer core.
#[derive(Error, Debug)]
pub enum RenderError {
    // ========================================================================
    // GPU & Device Errors
    // ========================================================================
    /// Failed to request a compatible GPU adapter.
    #[error("failed to request wgpu adapter: {0}")]
    AdapterRequestFailed(String),

    /// Failed to create the GPU device.
    #[error("failed to create wgpu device: {0}")]
    DeviceCreateFailed(#[from] wgpu::RequestDeviceError),

    // ========================================================================
    // Resource Pool Errors
    // ========================================================================
    /// A per-frame pool request could not be satisfied (capacity exhausted).
    #[error("resource pool exhausted: {0}")]
    PoolExhausted(String),

    /// A barrier-tracked resource was queried for a subresource range that
    /// does not exist.
    #[error("subresource out of range: level {level}, layer {layer}")]
    SubresourceOutOfRange {
        /// Requested mip level.
        level: u32,
        /// Requested array layer.
        layer: u32,
    },

    // ========================================================================
    // Algorithm / Configuration Errors
    // ========================================================================
    /// An algorithm combination requested by settings is not supported.
    #[error("unsupported light transport configuration: {0}")]
    UnsupportedConfiguration(String),

    /// Hash grid build exceeded its fixed bucket capacity.
    #[error("hash grid capacity exceeded: {used} entries requested, capacity {capacity}")]
    HashGridOverflow {
        /// Number of entries the caller attempted to insert.
        used: u32,
        /// Fixed bucket capacity of the grid.
        capacity: u32,
    },

    // ========================================================================
    // I/O Errors
    // ========================================================================
    /// File I/O error (configuration loading, etc.)
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),

    /// Feature not enabled at build time.
    #[error("feature not enabled: {0}")]
    FeatureNotEnabled(String),
}

/// Alias for `Result<T, RenderError>`.
pub type Result<T> = std::result::Result<T, RenderError>;
