//! Image processing: decode, square crop, WebP + PNG encode.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::ImageReader` (JPEG, PNG) |
//! | **Cover crop** | `resize_to_fill` (Lanczos3) |
//! | **Encode → WebP** | `webp::Encoder`, quality 85 |
//! | **Encode → PNG** | `PngEncoder`, quality 90 → best compression |
//!
//! The module is split into:
//! - **Parameters**: Data structures describing one encode
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: Cache-aware generation of a WebP/PNG pair

pub mod backend;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, ImageBackend};
pub use operations::{
    SourcePixels, VariantCache, VariantOutcome, create_variant_pair, plan_variant,
};
pub use params::{CropMode, EncodeParams, FALLBACK_QUALITY, MODERN_QUALITY, Quality};
pub use rust_backend::RustBackend;
