//! Error Types
//!
//! This module defines the error types used throughout the crate.
//!
//! # Overview
//!
//! The main error type [`AfterglowError`] covers all failure modes:
//! - GPU initialization failures
//! - Degenerate render-target configuration
//!
//! Shader template expansion failure is *not* represented here: a broken
//! template is a programming error and panics at the generation site,
//! exactly like a missing embedded asset would.
//!
//! # Usage
//!
//! All fallible public APIs return [`Result<T>`], an alias for
//! `std::result::Result<T, AfterglowError>`.

use thiserror::Error;

/// The main error type for the afterglow compositor.
#[derive(Error, Debug)]
pub enum AfterglowError {
    // ========================================================================
    // GPU Errors
    // ========================================================================
    /// Failed to request a compatible GPU adapter.
    #[error("Failed to request WGPU adapter: {0}")]
    AdapterRequestFailed(String),

    /// Failed to create the GPU device.
    #[error("Failed to create WGPU device: {0}")]
    DeviceCreateFailed(#[from] wgpu::RequestDeviceError),

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// A render target was requested with a zero dimension.
    #[error("Invalid render target size: {width}x{height}")]
    InvalidTargetSize {
        /// Requested width in pixels
        width: u32,
        /// Requested height in pixels
        height: u32,
    },
}

/// Convenience result alias used by all fallible APIs in this crate.
pub type Result<T> = std::result::Result<T, AfterglowError>;
