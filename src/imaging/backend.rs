//! Image encoding backend trait and shared types.
//!
//! The [`ImageBackend`] trait is the seam between the cache logic and the
//! pixel work. The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend). Unit tests use the
//! recording `MockBackend` defined below.

use super::params::EncodeParams;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode {path}: {reason}")]
    DecodeFailed { path: String, reason: String },
    #[error("{format} encode failed for {path}: {reason}")]
    EncodeFailed {
        format: &'static str,
        path: String,
        reason: String,
    },
}

/// Trait for image encoding backends.
///
/// Decoding and encoding are separate so one decoded source can feed every
/// size and format.
pub trait ImageBackend {
    /// Decoded pixels of one source image.
    type Image;

    fn decode(&self, source: &Path) -> Result<Self::Image, BackendError>;

    /// Produce one derived file from `image` as described by `params`.
    ///
    /// Implementations write `params.output` and nothing else. Whether the
    /// output already exists is the caller's concern.
    fn encode(&self, image: &Self::Image, params: &EncodeParams) -> Result<(), BackendError>;
}
