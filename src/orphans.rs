//! Orphan collection for the derived-asset cache.
//!
//! A derived file is an orphan when its basename no longer belongs to any
//! current source image, for example after `old.png` was renamed or
//! deleted. Orphans are removed before generation so the published output
//! never carries variants of images that are gone.
//!
//! The basename comes from the cache manifest when the file is recorded
//! there, and from the `{basename}-{size}.{ext}` pattern otherwise. Files
//! matching neither (the manifest itself, stray notes) are left alone.
//!
//! Failing to inspect or delete one entry is logged and reported but never
//! aborts the scan.

use crate::cache::CacheManifest;
use crate::naming::parse_derived_name;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, warn};

/// Outcome of one orphan scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrphanReport {
    /// File names deleted from the cache, in scan order.
    pub removed: Vec<String>,
    /// `(file name, reason)` for entries that could not be handled.
    pub failed: Vec<(String, String)>,
}

impl OrphanReport {
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.failed.is_empty()
    }
}

/// Delete every derived file in `cache_dir` whose basename is not in `live`.
///
/// Entries for deleted (or already vanished) files are dropped from
/// `manifest`. A missing cache directory yields an empty report.
pub fn collect_orphans<'a>(
    cache_dir: &Path,
    live: impl IntoIterator<Item = &'a str>,
    manifest: &mut CacheManifest,
) -> io::Result<OrphanReport> {
    collect_orphans_with(cache_dir, live, manifest, |path| fs::remove_file(path))
}

/// [`collect_orphans`] with the file deletion supplied by the caller.
fn collect_orphans_with<'a>(
    cache_dir: &Path,
    live: impl IntoIterator<Item = &'a str>,
    manifest: &mut CacheManifest,
    mut remove: impl FnMut(&Path) -> io::Result<()>,
) -> io::Result<OrphanReport> {
    let mut report = OrphanReport::default();
    if !cache_dir.is_dir() {
        return Ok(report);
    }
    let live: HashSet<&str> = live.into_iter().collect();

    let mut entries: Vec<_> = fs::read_dir(cache_dir)?.collect();
    entries.sort_by_key(|e| e.as_ref().ok().map(|e| e.file_name()));

    for entry in entries {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!("cannot read cache entry: {e}");
                report.failed.push(("?".to_string(), e.to_string()));
                continue;
            }
        };
        let file_name = entry.file_name().to_string_lossy().into_owned();

        match entry.file_type() {
            Ok(ft) if ft.is_file() => {}
            Ok(_) => continue,
            Err(e) => {
                warn!("cannot stat {file_name}: {e}");
                report.failed.push((file_name, e.to_string()));
                continue;
            }
        }

        let basename = match manifest.basename_of(&file_name) {
            Some(recorded) => recorded.to_string(),
            None => match parse_derived_name(&file_name) {
                Some(parsed) => parsed.basename,
                None => continue,
            },
        };

        if live.contains(basename.as_str()) {
            continue;
        }

        match remove(&entry.path()) {
            Ok(()) => {
                debug!("removed orphan {file_name} (source {basename} is gone)");
                manifest.remove(&file_name);
                report.removed.push(file_name);
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                manifest.remove(&file_name);
            }
            Err(e) => {
                warn!("cannot remove orphan {file_name}: {e}");
                report.failed.push((file_name, e.to_string()));
            }
        }
    }

    let pruned = manifest.prune_missing(cache_dir);
    if pruned > 0 {
        debug!("dropped {pruned} manifest entries for missing files");
    }

    Ok(report)
}
