//! File naming conventions for source and derived images.
//!
//! Derived assets are written as `{basename}-{size}.{ext}` where `ext` is
//! `webp` or `png`. Parsing a derived name recovers the source basename so
//! stale files can be traced back to the image that produced them.
//!
//! ## Ambiguity
//!
//! The `-{digits}.` suffix is the only separator. A file placed in the cache
//! by hand that happens to look like `banner-2.png` parses as basename
//! `banner`. Files recorded in the cache manifest never go through this
//! parser; it is the fallback for unrecorded files only.

use crate::types::AssetFormat;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

/// Source extensions accepted by discovery (compared case-insensitively).
pub const SOURCE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

static DERIVED_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+)-([0-9]+)\.(webp|png)$").expect("valid derived-name regex"));

/// Result of parsing a derived file name like `logo-480.webp`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDerivedName {
    pub basename: String,
    /// `None` when the digits overflow `u32`; the name still matches.
    pub size: Option<u32>,
    pub format: AssetFormat,
}

/// Build the derived file name for `(basename, size, format)`.
pub fn derived_file_name(basename: &str, size: u32, format: AssetFormat) -> String {
    format!("{}-{}.{}", basename, size, format.extension())
}

/// Parse a cache file name following the `{basename}-{size}.{ext}` convention.
///
/// - `"logo-480.webp"` → basename="logo", size=480, format=Modern
/// - `"my-photo-1024.png"` → basename="my-photo", size=1024
/// - `"logo-480-480.png"` → basename="logo-480" (the last `-digits` wins)
/// - `"notes.txt"`, `"logo.webp"`, `"logo-480.jpg"` → `None`
pub fn parse_derived_name(file_name: &str) -> Option<ParsedDerivedName> {
    let caps = DERIVED_NAME.captures(file_name)?;
    let format = AssetFormat::from_extension(&caps[3])?;
    Some(ParsedDerivedName {
        basename: caps[1].to_string(),
        size: caps[2].parse().ok(),
        format,
    })
}

/// Whether a path has one of the accepted source extensions.
pub fn is_source_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            SOURCE_EXTENSIONS
                .iter()
                .any(|accepted| ext.eq_ignore_ascii_case(accepted))
        })
}

/// File name without its final extension.
pub fn source_basename(path: &Path) -> Option<String> {
    path.file_stem().map(|s| s.to_string_lossy().into_owned())
}
