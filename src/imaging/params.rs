//! Parameter types for image operations.
//!
//! These structs describe *what* to encode, not *how*. They are the interface
//! between [`operations`](super::operations), which decides which variants to
//! produce, and the [`backend`](super::backend), which does the pixel work.
//!
//! ## Types
//!
//! - [`Quality`]: Encoding quality (1–100). Clamped on construction.
//! - [`CropMode`]: How the source is fitted into the target box.
//! - [`EncodeParams`]: Full specification for one derived file.

use crate::types::AssetFormat;
use std::path::PathBuf;

/// Quality of the modern (WebP) encode.
pub const MODERN_QUALITY: Quality = Quality(85);

/// Quality of the fallback (PNG) encode.
pub const FALLBACK_QUALITY: Quality = Quality(90);

/// Quality setting for image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }

    /// Fixed quality for a format. Not configurable per call.
    pub fn for_format(format: AssetFormat) -> Self {
        match format {
            AssetFormat::Modern => MODERN_QUALITY,
            AssetFormat::Fallback => FALLBACK_QUALITY,
        }
    }
}

/// How the source is fitted into the `width × height` target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropMode {
    /// Scale to cover the target, then crop the overflow around the center.
    CoverCenter,
}

impl CropMode {
    /// Stable tag fed into the parameter fingerprint.
    pub fn tag(self) -> &'static str {
        match self {
            CropMode::CoverCenter => "cover-center",
        }
    }
}

/// Parameters for encoding one derived file.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
    pub crop: CropMode,
    pub format: AssetFormat,
    pub quality: Quality,
}

impl EncodeParams {
    /// Square center-crop at `size × size` with the format's fixed quality.
    pub fn square(source: PathBuf, output: PathBuf, size: u32, format: AssetFormat) -> Self {
        Self {
            source,
            output,
            width: size,
            height: size,
            crop: CropMode::CoverCenter,
            format,
            quality: Quality::for_format(format),
        }
    }
}
