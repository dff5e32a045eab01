//! Production encoding backend built on the `image` crate ecosystem.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG) | `image::ImageReader` with content sniffing |
//! | Cover + center crop | `image::DynamicImage::resize_to_fill` (Lanczos3) |
//! | Encode → WebP (lossy) | `webp::Encoder` (libwebp) |
//! | Encode → PNG | `image::codecs::png::PngEncoder` |
//!
//! PNG is lossless, so the fallback quality selects compression effort
//! instead of discarding detail: 90 and above compresses with `Best`.
//!
//! A source is decoded once and the decoded image is reused for every size
//! and format. Encoded bytes are written to a `.partial` sibling and renamed into place.
//! A failed encode leaves no file at the output path.

use super::backend::{BackendError, ImageBackend};
use super::params::{CropMode, EncodeParams, Quality};
use crate::types::AssetFormat;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use std::path::Path;

/// Pure-Rust decode and resize, libwebp for the lossy WebP encode.
#[derive(Debug, Default, Clone, Copy)]
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

/// Load and decode an image from disk, sniffing the real format.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    let decode_err = |reason: String| BackendError::DecodeFailed {
        path: path.display().to_string(),
        reason,
    };
    ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .map_err(|e| decode_err(e.to_string()))
}

fn fit(img: &DynamicImage, params: &EncodeParams) -> DynamicImage {
    match params.crop {
        CropMode::CoverCenter => {
            img.resize_to_fill(params.width, params.height, FilterType::Lanczos3)
        }
    }
}

fn encode_webp(img: &DynamicImage, quality: Quality) -> Result<Vec<u8>, String> {
    // libwebp only accepts 8-bit RGB(A) buffers.
    let rgb = if img.color().has_alpha() {
        DynamicImage::ImageRgba8(img.to_rgba8())
    } else {
        DynamicImage::ImageRgb8(img.to_rgb8())
    };
    let encoder = webp::Encoder::from_image(&rgb).map_err(|e| e.to_string())?;
    Ok(encoder.encode(quality.value() as f32).to_vec())
}

fn png_compression(quality: Quality) -> CompressionType {
    match quality.value() {
        90.. => CompressionType::Best,
        50..=89 => CompressionType::Default,
        _ => CompressionType::Fast,
    }
}

fn encode_png(img: &DynamicImage, quality: Quality) -> Result<Vec<u8>, String> {
    let mut buf = Vec::new();
    let encoder =
        PngEncoder::new_with_quality(&mut buf, png_compression(quality), PngFilter::Adaptive);
    img.write_with_encoder(encoder).map_err(|e| e.to_string())?;
    Ok(buf)
}

/// Write `bytes` next to `path` and rename into place.
fn write_atomically(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut partial = path.as_os_str().to_owned();
    partial.push(".partial");
    let partial = std::path::PathBuf::from(partial);
    std::fs::write(&partial, bytes)?;
    std::fs::rename(&partial, path).inspect_err(|_| {
        let _ = std::fs::remove_file(&partial);
    })
}

impl ImageBackend for RustBackend {
    type Image = DynamicImage;

    fn decode(&self, source: &Path) -> Result<DynamicImage, BackendError> {
        load_image(source)
    }

    fn encode(&self, image: &DynamicImage, params: &EncodeParams) -> Result<(), BackendError> {
        let fitted = fit(image, params);

        let encoded = match params.format {
            AssetFormat::Modern => encode_webp(&fitted, params.quality),
            AssetFormat::Fallback => encode_png(&fitted, params.quality),
        }
        .map_err(|reason| BackendError::EncodeFailed {
            format: params.format.label(),
            path: params.output.display().to_string(),
            reason,
        })?;

        write_atomically(&params.output, &encoded)?;
        Ok(())
    }
}
