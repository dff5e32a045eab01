//! Source discovery and responsive variant generation.
//!
//! Takes the source images directory and the sizes read from the stylesheet,
//! and makes sure every `(image, size)` pair has its WebP + PNG variants in
//! the cache directory.
//!
//! ## Output Structure
//!
//! ```text
//! .cache/images/
//! ├── .cache-manifest.json      # How each file below was produced
//! ├── logo-480.webp
//! ├── logo-480.png
//! ├── logo-1024.webp
//! └── logo-1024.png
//! ```
//!
//! ## Ordering
//!
//! Images are processed in file-name order and sizes in stylesheet order.
//! Processing is sequential: one encode at a time, each finishing before
//! the next starts.
//!
//! ## Progress events
//!
//! Progress is reported through an optional [`std::sync::mpsc::Sender`] of
//! [`ProcessEvent`]; the CLI renders them with
//! [`output::format_process_event`](crate::output::format_process_event).

use crate::breakpoints::Breakpoint;
use crate::cache::{CacheManifest, CacheStats, VariantStatus, hash_file};
use crate::imaging::{
    BackendError, ImageBackend, SourcePixels, VariantCache, create_variant_pair,
};
use crate::naming::{is_source_image, source_basename};
use crate::types::{AssetFormat, SourceImage};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to read source {path}: {source}")]
    SourceRead {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Image processing failed for {image}: {source}")]
    Imaging {
        image: String,
        source: BackendError,
    },
}

/// Per-size result for one image: both formats side by side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeReport {
    pub size: u32,
    pub webp_bytes: u64,
    pub webp_status: VariantStatus,
    pub png_bytes: u64,
    pub png_status: VariantStatus,
}

/// Events emitted while a build runs.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessEvent {
    /// Breakpoints read from the stylesheet.
    SizesDetected { breakpoints: Vec<Breakpoint> },
    /// The stylesheet declares no breakpoints.
    NoSizes { stylesheet: PathBuf },
    /// The images directory is missing or has no accepted images.
    NoImages { dir: PathBuf },
    /// A second source with an already-seen basename was skipped.
    DuplicateBasename { kept: String, skipped: String },
    /// Generation is about to start.
    ImagesFound { count: usize },
    /// One source image finished all its sizes.
    ImageProcessed {
        file_name: String,
        source_bytes: u64,
        sizes: Vec<SizeReport>,
    },
    /// A derived file with no live source was deleted.
    OrphanRemoved { file_name: String },
    /// A cache entry could not be inspected or deleted.
    OrphanFailed { file_name: String, reason: String },
    /// The cache was mirrored into the output directory.
    Published { count: usize, dir: PathBuf },
}

/// Source images found in the images directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Discovery {
    pub images: Vec<SourceImage>,
    /// `(kept, skipped)` file names for basename collisions.
    pub duplicates: Vec<(String, String)>,
}

impl Discovery {
    pub fn basenames(&self) -> impl Iterator<Item = &str> {
        self.images.iter().map(|i| i.basename.as_str())
    }
}

fn emit(events: Option<&Sender<ProcessEvent>>, event: ProcessEvent) {
    if let Some(tx) = events {
        // A dropped receiver only means nobody is listening.
        let _ = tx.send(event);
    }
}

/// List accepted source images in `dir`, sorted by file name.
///
/// A missing directory yields an empty discovery. Subdirectories and files
/// with other extensions are ignored. When two files share a basename
/// (`logo.png`, `logo.jpg`) the first in sorted order is kept.
pub fn discover_sources(dir: &Path) -> Result<Discovery, ProcessError> {
    if !dir.is_dir() {
        warn!("images directory {} does not exist", dir.display());
        return Ok(Discovery::default());
    }

    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && is_source_image(p))
        .collect();
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    let mut discovery = Discovery::default();
    for path in paths {
        let Some(basename) = source_basename(&path) else {
            continue;
        };
        let candidate = SourceImage { basename, path };
        if let Some(kept) = discovery
            .images
            .iter()
            .find(|i| i.basename == candidate.basename)
        {
            discovery
                .duplicates
                .push((kept.file_name(), candidate.file_name()));
            continue;
        }
        discovery.images.push(candidate);
    }
    Ok(discovery)
}

/// Ensure every `(image, size)` variant pair exists in `cache_dir`.
///
/// Zero images or zero sizes is not an error: nothing is encoded and empty
/// stats are returned. The first encode failure aborts the whole run.
pub fn process(
    backend: &impl ImageBackend,
    images: &[SourceImage],
    sizes: &[u32],
    cache_dir: &Path,
    manifest: &mut CacheManifest,
    use_cache: bool,
    events: Option<&Sender<ProcessEvent>>,
) -> Result<CacheStats, ProcessError> {
    let mut stats = CacheStats::default();
    if images.is_empty() || sizes.is_empty() {
        return Ok(stats);
    }

    std::fs::create_dir_all(cache_dir)?;
    emit(
        events,
        ProcessEvent::ImagesFound {
            count: images.len(),
        },
    );

    for image in images {
        let read_err = |source| ProcessError::SourceRead {
            path: image.path.clone(),
            source,
        };
        let source_bytes = std::fs::metadata(&image.path).map_err(read_err)?.len();
        let source_hash = hash_file(&image.path).map_err(read_err)?;
        debug!("{}: sha256 {}", image.file_name(), &source_hash[..12]);

        let mut cache = VariantCache {
            manifest: &mut *manifest,
            source_hash: &source_hash,
            enabled: use_cache,
        };

        let mut pixels = SourcePixels::new(backend, &image.path);
        let mut reports = Vec::with_capacity(sizes.len());
        for &size in sizes {
            let outcomes = create_variant_pair(&mut pixels, image, cache_dir, size, &mut cache)
                .map_err(|source| ProcessError::Imaging {
                    image: image.file_name(),
                    source,
                })?;

            for outcome in &outcomes {
                stats.record(outcome.status);
            }
            reports.push(size_report(size, &outcomes));
        }

        emit(
            events,
            ProcessEvent::ImageProcessed {
                file_name: image.file_name(),
                source_bytes,
                sizes: reports,
            },
        );
    }

    Ok(stats)
}

fn size_report(size: u32, outcomes: &[crate::imaging::VariantOutcome]) -> SizeReport {
    let pick = |format| {
        outcomes
            .iter()
            .find(|o| o.asset.format == format)
            .map(|o| (o.bytes, o.status))
            .unwrap_or((0, VariantStatus::Cached))
    };
    let (webp_bytes, webp_status) = pick(AssetFormat::Modern);
    let (png_bytes, png_status) = pick(AssetFormat::Fallback);
    SizeReport {
        size,
        webp_bytes,
        webp_status,
        png_bytes,
        png_status,
    }
}
