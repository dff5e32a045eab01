//! Derived-asset cache manifest for incremental builds.
//!
//! Derived images live in a persistent cache directory that survives across
//! builds. A file named `{basename}-{size}.{ext}` that already exists there
//! is normally reused as-is. Existence alone cannot tell whether the source
//! image was edited in place, so the cache directory also carries a sidecar
//! manifest recording how each file was produced.
//!
//! # Design
//!
//! ## Cache keys
//!
//! Entries are keyed by derived file name and record:
//!
//! - **`basename`, `size`, `format`**: the identity of the derived asset.
//!   Orphan collection reads the basename from here instead of re-parsing
//!   the file name, which removes the `-{digits}.` ambiguity.
//!
//! - **`source_hash`**: SHA-256 of the source file contents. Content-based
//!   rather than mtime-based so it survives `git checkout` (which resets
//!   modification times).
//!
//! - **`params_hash`**: SHA-256 of the encoding parameters (format, size,
//!   quality, crop mode). Changing a quality constant re-encodes everything.
//!
//! ## Lookup outcomes
//!
//! | File on disk | Manifest entry | Outcome |
//! |---|---|---|
//! | missing | any | [`CacheLookup::Miss`] |
//! | present | same hashes | [`CacheLookup::Hit`] |
//! | present | none | [`CacheLookup::Adopt`] (reuse, then record) |
//! | present | different hashes | [`CacheLookup::Stale`] |
//!
//! `Adopt` keeps the plain skip-if-exists behaviour for files produced
//! before the manifest existed or copied in by hand. Once recorded, later
//! edits to the source are detected.
//!
//! ## Storage
//!
//! The manifest is `.cache-manifest.json` inside the cache directory. It
//! does not match the derived-name pattern, so orphan collection leaves it
//! alone, and publishing skips it explicitly.
//!
//! ## Bypassing the cache
//!
//! `build --no-cache` starts from an empty manifest and treats every file as
//! missing, so every variant is re-encoded.

use crate::imaging::EncodeParams;
use crate::types::AssetFormat;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Name of the cache manifest file within the cache directory.
pub const MANIFEST_FILENAME: &str = ".cache-manifest.json";

/// Version of the cache manifest format. Bump this to invalidate all
/// existing manifests when the format or key computation changes.
const MANIFEST_VERSION: u32 = 1;

/// How one derived file was produced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CacheEntry {
    pub basename: String,
    pub size: u32,
    pub format: AssetFormat,
    pub source_hash: String,
    pub params_hash: String,
}

/// Result of checking the cache for one derived file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheLookup {
    Hit,
    Adopt,
    Stale,
    Miss,
}

/// What happened to one variant during a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantStatus {
    /// Reused from the cache without encoding.
    Cached,
    /// Present but produced from different content or parameters; re-encoded.
    Refreshed,
    /// Not present; encoded.
    Encoded,
}

/// On-disk cache manifest mapping derived file names to their entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheManifest {
    pub version: u32,
    pub entries: BTreeMap<String, CacheEntry>,
}

impl CacheManifest {
    /// Create an empty manifest (used for `--no-cache` or first build).
    pub fn empty() -> Self {
        Self {
            version: MANIFEST_VERSION,
            entries: BTreeMap::new(),
        }
    }

    /// Load from the cache directory. Returns an empty manifest if the file
    /// doesn't exist or can't be parsed (version mismatch, corruption).
    pub fn load(cache_dir: &Path) -> Self {
        let content = match std::fs::read_to_string(manifest_path(cache_dir)) {
            Ok(c) => c,
            Err(_) => return Self::empty(),
        };
        match serde_json::from_str::<Self>(&content) {
            Ok(m) if m.version == MANIFEST_VERSION => m,
            Ok(m) => {
                tracing::info!(
                    "cache manifest version {} != {}, starting fresh",
                    m.version,
                    MANIFEST_VERSION
                );
                Self::empty()
            }
            Err(e) => {
                tracing::warn!("unreadable cache manifest ({e}), starting fresh");
                Self::empty()
            }
        }
    }

    /// Save to the cache directory.
    pub fn save(&self, cache_dir: &Path) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(manifest_path(cache_dir), json)
    }

    /// Check whether `file_name` in `cache_dir` can be reused.
    pub fn lookup(
        &self,
        file_name: &str,
        source_hash: &str,
        params_hash: &str,
        cache_dir: &Path,
    ) -> CacheLookup {
        if !cache_dir.join(file_name).is_file() {
            return CacheLookup::Miss;
        }
        match self.entries.get(file_name) {
            None => CacheLookup::Adopt,
            Some(e) if e.source_hash == source_hash && e.params_hash == params_hash => {
                CacheLookup::Hit
            }
            Some(_) => CacheLookup::Stale,
        }
    }

    /// Record how `file_name` was produced, replacing any previous entry.
    pub fn insert(&mut self, file_name: String, entry: CacheEntry) {
        self.entries.insert(file_name, entry);
    }

    pub fn remove(&mut self, file_name: &str) -> Option<CacheEntry> {
        self.entries.remove(file_name)
    }

    /// Recorded source basename for a derived file, if any.
    pub fn basename_of(&self, file_name: &str) -> Option<&str> {
        self.entries.get(file_name).map(|e| e.basename.as_str())
    }

    /// Drop entries whose file is no longer in `cache_dir`.
    ///
    /// Returns the number of entries removed.
    pub fn prune_missing(&mut self, cache_dir: &Path) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|file_name, _| cache_dir.join(file_name).is_file());
        before - self.entries.len()
    }
}

/// SHA-256 hash of a file's contents, returned as a hex string.
pub fn hash_file(path: &Path) -> io::Result<String> {
    let bytes = std::fs::read(path)?;
    let digest = Sha256::digest(&bytes);
    Ok(format!("{:x}", digest))
}

/// SHA-256 hash of the parameters that shape one derived file.
///
/// Source and output paths are deliberately excluded: the source is covered
/// by `source_hash` and the output path is the manifest key.
pub fn hash_variant_params(params: &EncodeParams) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"variant\0");
    hasher.update(params.format.extension().as_bytes());
    hasher.update(b"\0");
    hasher.update(params.width.to_le_bytes());
    hasher.update(params.height.to_le_bytes());
    hasher.update(params.quality.value().to_le_bytes());
    hasher.update(params.crop.tag().as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Summary of cache performance for a build run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u32,
    pub refreshed: u32,
    pub encoded: u32,
}

impl CacheStats {
    pub fn record(&mut self, status: VariantStatus) {
        match status {
            VariantStatus::Cached => self.hits += 1,
            VariantStatus::Refreshed => self.refreshed += 1,
            VariantStatus::Encoded => self.encoded += 1,
        }
    }

    /// Variants that went through the encoder.
    pub fn encodes(&self) -> u32 {
        self.refreshed + self.encoded
    }

    pub fn total(&self) -> u32 {
        self.hits + self.refreshed + self.encoded
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.total() == 0 {
            return write!(f, "nothing to do");
        }
        if self.hits == 0 && self.refreshed == 0 {
            return write!(f, "{} encoded", self.encoded);
        }
        if self.refreshed > 0 {
            write!(
                f,
                "{} cached, {} refreshed, {} encoded ({} total)",
                self.hits,
                self.refreshed,
                self.encoded,
                self.total()
            )
        } else {
            write!(
                f,
                "{} cached, {} encoded ({} total)",
                self.hits,
                self.encoded,
                self.total()
            )
        }
    }
}

/// Resolve the cache manifest path for a cache directory.
pub fn manifest_path(cache_dir: &Path) -> PathBuf {
    cache_dir.join(MANIFEST_FILENAME)
}
