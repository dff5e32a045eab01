//! One complete build: breakpoints → orphans → variants → publish.
//!
//! ```text
//! styles.css ──► sizes ─┐
//!                        ├─► collect orphans ─► ensure variants ─► publish
//! images/ ──► sources ──┘        (cache)            (cache)       (output)
//! ```
//!
//! Orphans are collected before generation so that a renamed source never
//! leaves variants under its old name in the published output. The cache
//! manifest is saved even when generation fails part way, so variants that
//! did finish are recognised on the next run.

use crate::breakpoints::{Breakpoints, read_breakpoints_file};
use crate::cache::{CacheManifest, CacheStats};
use crate::config::ProjectPaths;
use crate::imaging::ImageBackend;
use crate::orphans::{OrphanReport, collect_orphans};
use crate::process::{self, ProcessError, ProcessEvent, discover_sources};
use crate::publish::{PublishError, publish};
use std::path::PathBuf;
use std::sync::mpsc::Sender;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Failed to read stylesheet {path}: {source}")]
    Stylesheet {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to prepare cache directory {path}: {source}")]
    CacheDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to scan cache for orphans: {0}")]
    OrphanScan(std::io::Error),
    #[error("Failed to save cache manifest: {0}")]
    Manifest(std::io::Error),
    #[error(transparent)]
    Process(#[from] ProcessError),
    #[error(transparent)]
    Publish(#[from] PublishError),
}

/// What one build did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildSummary {
    pub breakpoints: Breakpoints,
    /// Source images that took part in generation.
    pub images: usize,
    pub orphans: OrphanReport,
    pub cache: CacheStats,
    /// Files copied into the output directory.
    pub published: usize,
}

fn emit(events: Option<&Sender<ProcessEvent>>, event: ProcessEvent) {
    if let Some(tx) = events {
        let _ = tx.send(event);
    }
}

/// Run the full build for one project.
///
/// With `use_cache` false, every variant is re-encoded and the cache
/// manifest is rebuilt from scratch.
pub fn build(
    paths: &ProjectPaths,
    backend: &impl ImageBackend,
    use_cache: bool,
    events: Option<&Sender<ProcessEvent>>,
) -> Result<BuildSummary, BuildError> {
    std::fs::create_dir_all(&paths.cache).map_err(|source| BuildError::CacheDir {
        path: paths.cache.clone(),
        source,
    })?;

    let breakpoints =
        read_breakpoints_file(&paths.stylesheet).map_err(|source| BuildError::Stylesheet {
            path: paths.stylesheet.clone(),
            source,
        })?;
    if breakpoints.is_empty() {
        warn!(
            "no --breakpoint-* declarations in {}, nothing will be generated",
            paths.stylesheet.display()
        );
        emit(
            events,
            ProcessEvent::NoSizes {
                stylesheet: paths.stylesheet.clone(),
            },
        );
    } else {
        emit(
            events,
            ProcessEvent::SizesDetected {
                breakpoints: breakpoints.entries().to_vec(),
            },
        );
    }

    let discovery = discover_sources(&paths.images)?;
    for (kept, skipped) in &discovery.duplicates {
        warn!("{skipped} has the same basename as {kept}, skipping it");
        emit(
            events,
            ProcessEvent::DuplicateBasename {
                kept: kept.clone(),
                skipped: skipped.clone(),
            },
        );
    }
    if discovery.images.is_empty() {
        emit(
            events,
            ProcessEvent::NoImages {
                dir: paths.images.clone(),
            },
        );
    }

    let mut manifest = if use_cache {
        CacheManifest::load(&paths.cache)
    } else {
        CacheManifest::empty()
    };

    let orphans = collect_orphans(&paths.cache, discovery.basenames(), &mut manifest)
        .map_err(BuildError::OrphanScan)?;
    for file_name in &orphans.removed {
        emit(
            events,
            ProcessEvent::OrphanRemoved {
                file_name: file_name.clone(),
            },
        );
    }
    for (file_name, reason) in &orphans.failed {
        emit(
            events,
            ProcessEvent::OrphanFailed {
                file_name: file_name.clone(),
                reason: reason.clone(),
            },
        );
    }

    let processed = process::process(
        backend,
        &discovery.images,
        &breakpoints.sizes(),
        &paths.cache,
        &mut manifest,
        use_cache,
        events,
    );
    manifest.save(&paths.cache).map_err(BuildError::Manifest)?;
    let cache = processed?;

    let published = publish(&paths.cache, &paths.output)?;
    emit(
        events,
        ProcessEvent::Published {
            count: published.len(),
            dir: paths.output.clone(),
        },
    );
    info!("build finished: {cache}");

    Ok(BuildSummary {
        breakpoints,
        images: discovery.images.len(),
        orphans,
        cache,
        published: published.len(),
    })
}
