//! Shared types used across the build stages.
//!
//! [`AssetFormat`] is also serialized into the cache manifest, so its serde
//! names are part of the on-disk format.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// A raster source image discovered in the images directory.
///
/// Identity is the `basename` (file name without extension). Two sources
/// with the same basename but different extensions would produce the same
/// derived file names; discovery keeps only the first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    pub basename: String,
    pub path: PathBuf,
}

impl SourceImage {
    /// File name including extension, for display.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.basename.clone())
    }
}

/// The two encodings generated side by side for every `(image, size)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetFormat {
    /// Compact web format (WebP).
    Modern,
    /// Broadly compatible format (PNG).
    Fallback,
}

impl AssetFormat {
    /// Generation order within one size: modern first, then fallback.
    pub const ALL: [AssetFormat; 2] = [AssetFormat::Modern, AssetFormat::Fallback];

    pub fn extension(self) -> &'static str {
        match self {
            AssetFormat::Modern => "webp",
            AssetFormat::Fallback => "png",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            AssetFormat::Modern => "image/webp",
            AssetFormat::Fallback => "image/png",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "webp" => Some(AssetFormat::Modern),
            "png" => Some(AssetFormat::Fallback),
            _ => None,
        }
    }

    /// Short label used in progress output.
    pub fn label(self) -> &'static str {
        match self {
            AssetFormat::Modern => "WebP",
            AssetFormat::Fallback => "PNG",
        }
    }
}

impl fmt::Display for AssetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// One generated variant, identified by `(basename, size, format)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DerivedAsset {
    pub basename: String,
    pub size: u32,
    pub format: AssetFormat,
}

impl DerivedAsset {
    pub fn new(basename: impl Into<String>, size: u32, format: AssetFormat) -> Self {
        Self {
            basename: basename.into(),
            size,
            format,
        }
    }

    /// `{basename}-{size}.{ext}`
    pub fn file_name(&self) -> String {
        crate::naming::derived_file_name(&self.basename, self.size, self.format)
    }

    pub fn path_in(&self, dir: &Path) -> PathBuf {
        dir.join(self.file_name())
    }
}
