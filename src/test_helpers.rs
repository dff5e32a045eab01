//! Shared test utilities for the breakpix test suite.
//!
//! Provides real image fixtures (encoded with the `image` crate) and a
//! throwaway project layout matching the stock config paths.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let project = setup_project(":root { --breakpoint-sm: 480px; }");
//! create_test_png(&project.path().join("src/assets/images/logo.png"), 64, 64);
//! ```

use image::{ImageBuffer, Rgb, Rgba};
use std::path::Path;
use tempfile::TempDir;

// =========================================================================
// Image fixtures
// =========================================================================

/// Write a gradient RGBA PNG of the given dimensions.
pub fn create_test_png(path: &Path, width: u32, height: u32) {
    let img = ImageBuffer::from_fn(width, height, |x, y| {
        Rgba([(x * 255 / width.max(1)) as u8, (y * 255 / height.max(1)) as u8, 128, 255])
    });
    img.save(path).unwrap();
}

/// Write a gradient RGB JPEG of the given dimensions.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    let img = ImageBuffer::from_fn(width, height, |x, y| {
        Rgb([(x * 255 / width.max(1)) as u8, 64, (y * 255 / height.max(1)) as u8])
    });
    img.save_with_format(path, image::ImageFormat::Jpeg).unwrap();
}

// =========================================================================
// Project layout
// =========================================================================

/// Create a project directory with the stock layout and the given stylesheet.
///
/// `src/assets/images/` exists but is empty; no `breakpix.toml` is written,
/// so stock defaults apply.
pub fn setup_project(stylesheet: &str) -> TempDir {
    let tmp = TempDir::new().unwrap();
    std::fs::create_dir_all(tmp.path().join("src/assets/images")).unwrap();
    std::fs::write(tmp.path().join("src/styles.css"), stylesheet).unwrap();
    tmp
}

/// Sorted file names directly inside `dir`.
pub fn list_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
