//! Variant generation for one source image at one target size.
//!
//! For every `(image, size)` pair two derived files are produced: a WebP and
//! a PNG, both a square center crop of `size × size`. Each format is checked
//! against the cache independently, so a pair where only the PNG went
//! missing re-encodes just the PNG.
//!
//! The source is decoded at most once per build, on the first variant that
//! actually needs encoding. An image whose variants are all cached is never
//! decoded.
//!
//! Any decode or encode failure is returned immediately; the caller treats
//! it as fatal for the whole build.

use super::backend::{BackendError, ImageBackend};
use super::params::EncodeParams;
use crate::cache::{
    CacheEntry, CacheLookup, CacheManifest, VariantStatus, hash_variant_params,
};
use crate::types::{AssetFormat, DerivedAsset, SourceImage};
use std::path::Path;
use tracing::debug;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Cache context shared by every variant of one source image.
pub struct VariantCache<'a> {
    pub manifest: &'a mut CacheManifest,
    /// SHA-256 of the source contents.
    pub source_hash: &'a str,
    /// When false, existing files are ignored and everything is re-encoded.
    pub enabled: bool,
}

/// One generated (or reused) derived file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantOutcome {
    pub asset: DerivedAsset,
    pub status: VariantStatus,
    /// Size of the file in the cache after this step.
    pub bytes: u64,
}

/// One source image, decoded on first use and kept for later encodes.
pub struct SourcePixels<'a, B: ImageBackend> {
    backend: &'a B,
    path: &'a Path,
    decoded: Option<B::Image>,
}

impl<'a, B: ImageBackend> SourcePixels<'a, B> {
    pub fn new(backend: &'a B, path: &'a Path) -> Self {
        Self {
            backend,
            path,
            decoded: None,
        }
    }

    pub fn is_decoded(&self) -> bool {
        self.decoded.is_some()
    }

    /// Encode one derived file, decoding the source first if needed.
    pub fn encode(&mut self, params: &EncodeParams) -> Result<()> {
        let image = match self.decoded.take() {
            Some(image) => image,
            None => {
                debug!("decoding {}", self.path.display());
                self.backend.decode(self.path)?
            }
        };
        let result = self.backend.encode(&image, params);
        self.decoded = Some(image);
        result
    }
}

/// Plan the encode for one derived asset without executing it.
pub fn plan_variant(
    source: &SourceImage,
    cache_dir: &Path,
    size: u32,
    format: AssetFormat,
) -> EncodeParams {
    let asset = DerivedAsset::new(source.basename.clone(), size, format);
    EncodeParams::square(source.path.clone(), asset.path_in(cache_dir), size, format)
}

/// Ensure the WebP + PNG pair for `(source, size)` exists in `cache_dir`.
///
/// Returns one outcome per format, modern first.
pub fn create_variant_pair<B: ImageBackend>(
    pixels: &mut SourcePixels<'_, B>,
    source: &SourceImage,
    cache_dir: &Path,
    size: u32,
    cache: &mut VariantCache<'_>,
) -> Result<Vec<VariantOutcome>> {
    let mut outcomes = Vec::with_capacity(AssetFormat::ALL.len());

    for format in AssetFormat::ALL {
        let params = plan_variant(source, cache_dir, size, format);
        let asset = DerivedAsset::new(source.basename.clone(), size, format);
        let file_name = asset.file_name();
        let params_hash = hash_variant_params(&params);

        let lookup = if cache.enabled {
            cache
                .manifest
                .lookup(&file_name, cache.source_hash, &params_hash, cache_dir)
        } else {
            CacheLookup::Miss
        };

        let status = match lookup {
            CacheLookup::Hit | CacheLookup::Adopt => VariantStatus::Cached,
            CacheLookup::Stale => {
                debug!("{file_name}: source or parameters changed, re-encoding");
                pixels.encode(&params)?;
                VariantStatus::Refreshed
            }
            CacheLookup::Miss => {
                pixels.encode(&params)?;
                VariantStatus::Encoded
            }
        };

        if lookup != CacheLookup::Hit {
            cache.manifest.insert(
                file_name,
                CacheEntry {
                    basename: source.basename.clone(),
                    size,
                    format,
                    source_hash: cache.source_hash.to_string(),
                    params_hash,
                },
            );
        }

        let bytes = std::fs::metadata(&params.output)?.len();
        outcomes.push(VariantOutcome {
            asset,
            status,
            bytes,
        });
    }

    Ok(outcomes)
}
