//! CLI output formatting for builds and watch mode.
//!
//! # Output Format
//!
//! ## Build
//!
//! ```text
//! Breakpoints
//!     sm: 480px
//!     lg: 1024px
//! Removed orphan old-480.webp
//! Processing 1 image
//! logo.png (120.50 KB)
//!     480px: WebP 12.30 KB | PNG 40.10 KB (WebP saves 69%)
//!     1024px: WebP 30.00 KB | PNG 98.20 KB (WebP saves 69%) [cached]
//!     Total saved with WebP: 96.00 KB
//! Published 4 files to dist/assets/images
//! ```
//!
//! Freshly encoded variants carry no marker; reused ones are tagged
//! `[cached]` and re-encoded ones `[refreshed]`.
//!
//! ## Watch
//!
//! ```text
//! Changed: src/styles.css
//! Rebuilding...
//! Rebuild finished: 2 cached, 2 encoded (4 total)
//! ```
//!
//! # Architecture
//!
//! Each event has a `format_*` function (returns `Vec<String>`) for
//! testability; `main` prints the lines. Format functions are pure: no I/O,
//! no side effects.

use crate::cache::VariantStatus;
use crate::pipeline::BuildSummary;
use crate::process::{ProcessEvent, SizeReport};
use crate::watch::{Changes, WatchEvent};
use std::path::Path;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Bytes as kilobytes with two decimals, e.g. `12.30 KB`.
fn format_kb(bytes: i64) -> String {
    format!("{:.2} KB", bytes as f64 / 1024.0)
}

/// Percentage of `fallback` saved by `modern`, rounded. Negative when the
/// modern file is larger.
fn savings_percent(modern: u64, fallback: u64) -> i64 {
    if fallback == 0 {
        return 0;
    }
    ((1.0 - modern as f64 / fallback as f64) * 100.0).round() as i64
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

/// Marker for the combined cache status of one size.
fn status_marker(report: &SizeReport) -> &'static str {
    use VariantStatus::*;
    match (report.webp_status, report.png_status) {
        (Cached, Cached) => " [cached]",
        (Encoded, Encoded) => "",
        (Refreshed, _) | (_, Refreshed) => " [refreshed]",
        _ => " [partly cached]",
    }
}

fn size_line(report: &SizeReport) -> String {
    format!(
        "{}px: WebP {} | PNG {} (WebP saves {}%){}",
        report.size,
        format_kb(report.webp_bytes as i64),
        format_kb(report.png_bytes as i64),
        savings_percent(report.webp_bytes, report.png_bytes),
        status_marker(report)
    )
}

/// Format a single build progress event as display lines.
pub fn format_process_event(event: &ProcessEvent) -> Vec<String> {
    match event {
        ProcessEvent::SizesDetected { breakpoints } => {
            let mut lines = vec!["Breakpoints".to_string()];
            for bp in breakpoints {
                lines.push(format!("{}{}: {}px", indent(1), bp.token, bp.size));
            }
            lines
        }
        ProcessEvent::NoSizes { stylesheet } => vec![format!(
            "No --breakpoint-* declarations in {}, nothing to generate",
            stylesheet.display()
        )],
        ProcessEvent::NoImages { dir } => {
            vec![format!("No images found in {}", dir.display())]
        }
        ProcessEvent::DuplicateBasename { kept, skipped } => {
            vec![format!("Skipping {skipped}: same name as {kept}")]
        }
        ProcessEvent::ImagesFound { count } => {
            vec![format!("Processing {}", plural(*count, "image"))]
        }
        ProcessEvent::ImageProcessed {
            file_name,
            source_bytes,
            sizes,
        } => {
            let mut lines = vec![format!(
                "{} ({})",
                file_name,
                format_kb(*source_bytes as i64)
            )];
            let mut total_saved: i64 = 0;
            for report in sizes {
                lines.push(format!("{}{}", indent(1), size_line(report)));
                total_saved += report.png_bytes as i64 - report.webp_bytes as i64;
            }
            lines.push(format!(
                "{}Total saved with WebP: {}",
                indent(1),
                format_kb(total_saved)
            ));
            lines
        }
        ProcessEvent::OrphanRemoved { file_name } => {
            vec![format!("Removed orphan {file_name}")]
        }
        ProcessEvent::OrphanFailed { file_name, reason } => {
            vec![format!("Could not remove {file_name}: {reason}")]
        }
        ProcessEvent::Published { count, dir } => vec![format!(
            "Published {} to {}",
            plural(*count, "file"),
            dir.display()
        )],
    }
}

/// Final line of a build.
pub fn format_build_summary(summary: &BuildSummary) -> Vec<String> {
    let mut lines = vec![format!("Cache: {}", summary.cache)];
    if !summary.orphans.failed.is_empty() {
        lines.push(format!(
            "{} could not be removed",
            plural(summary.orphans.failed.len(), "orphan")
        ));
    }
    lines
}

fn relative(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .display()
        .to_string()
}

fn format_changes(changes: &Changes, base: &Path) -> Vec<String> {
    let mut lines = Vec::with_capacity(changes.len());
    for p in &changes.added {
        lines.push(format!("Added: {}", relative(p, base)));
    }
    for p in &changes.modified {
        lines.push(format!("Changed: {}", relative(p, base)));
    }
    for p in &changes.removed {
        lines.push(format!("Removed: {}", relative(p, base)));
    }
    lines
}

/// Format a watch-mode event. Paths are shown relative to `base`.
pub fn format_watch_event(event: &WatchEvent, base: &Path) -> Vec<String> {
    match event {
        WatchEvent::Changed(changes) => format_changes(changes, base),
        WatchEvent::BuildStarted => vec!["Rebuilding...".to_string()],
        WatchEvent::BuildFinished(Ok(summary)) => {
            vec![format!("Rebuild finished: {}", summary.cache)]
        }
        WatchEvent::BuildFinished(Err(e)) => vec![format!("Rebuild failed: {e}")],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breakpoints::Breakpoint;
    use crate::cache::CacheStats;
    use crate::orphans::OrphanReport;
    use crate::pipeline::BuildError;
    use std::path::PathBuf;

    fn report(size: u32, webp: u64, png: u64, status: VariantStatus) -> SizeReport {
        SizeReport {
            size,
            webp_bytes: webp,
            webp_status: status,
            png_bytes: png,
            png_status: status,
        }
    }

    // =========================================================================
    // Helper tests
    // =========================================================================

    #[test]
    fn format_kb_two_decimals() {
        assert_eq!(format_kb(0), "0.00 KB");
        assert_eq!(format_kb(1024), "1.00 KB");
        assert_eq!(format_kb(12_595), "12.30 KB");
        assert_eq!(format_kb(-512), "-0.50 KB");
    }

    #[test]
    fn savings_percent_rounds() {
        assert_eq!(savings_percent(31, 100), 69);
        assert_eq!(savings_percent(100, 100), 0);
        assert_eq!(savings_percent(150, 100), -50);
        assert_eq!(savings_percent(10, 0), 0);
    }

    #[test]
    fn status_markers() {
        assert_eq!(status_marker(&report(1, 1, 1, VariantStatus::Encoded)), "");
        assert_eq!(
            status_marker(&report(1, 1, 1, VariantStatus::Cached)),
            " [cached]"
        );
        let mut mixed = report(1, 1, 1, VariantStatus::Cached);
        mixed.png_status = VariantStatus::Encoded;
        assert_eq!(status_marker(&mixed), " [partly cached]");
        mixed.webp_status = VariantStatus::Refreshed;
        assert_eq!(status_marker(&mixed), " [refreshed]");
    }

    // =========================================================================
    // Process events
    // =========================================================================

    #[test]
    fn sizes_detected_lists_tokens() {
        let lines = format_process_event(&ProcessEvent::SizesDetected {
            breakpoints: vec![
                Breakpoint {
                    token: "sm".into(),
                    size: 480,
                },
                Breakpoint {
                    token: "lg".into(),
                    size: 1024,
                },
            ],
        });
        assert_eq!(lines, vec!["Breakpoints", "    sm: 480px", "    lg: 1024px"]);
    }

    #[test]
    fn image_processed_lines() {
        let lines = format_process_event(&ProcessEvent::ImageProcessed {
            file_name: "logo.png".into(),
            source_bytes: 2048,
            sizes: vec![
                report(480, 1024, 4096, VariantStatus::Encoded),
                report(1024, 2048, 4096, VariantStatus::Cached),
            ],
        });
        assert_eq!(
            lines,
            vec![
                "logo.png (2.00 KB)",
                "    480px: WebP 1.00 KB | PNG 4.00 KB (WebP saves 75%)",
                "    1024px: WebP 2.00 KB | PNG 4.00 KB (WebP saves 50%) [cached]",
                "    Total saved with WebP: 5.00 KB",
            ]
        );
    }

    #[test]
    fn images_found_pluralizes() {
        assert_eq!(
            format_process_event(&ProcessEvent::ImagesFound { count: 1 }),
            vec!["Processing 1 image"]
        );
        assert_eq!(
            format_process_event(&ProcessEvent::ImagesFound { count: 3 }),
            vec!["Processing 3 images"]
        );
    }

    #[test]
    fn orphan_and_publish_lines() {
        assert_eq!(
            format_process_event(&ProcessEvent::OrphanRemoved {
                file_name: "old-480.webp".into()
            }),
            vec!["Removed orphan old-480.webp"]
        );
        assert_eq!(
            format_process_event(&ProcessEvent::Published {
                count: 4,
                dir: PathBuf::from("dist/assets/images"),
            }),
            vec!["Published 4 files to dist/assets/images"]
        );
    }

    #[test]
    fn orphan_failure_and_summary_lines() {
        assert_eq!(
            format_process_event(&ProcessEvent::OrphanFailed {
                file_name: "old-480.png".into(),
                reason: "Permission denied".into(),
            }),
            vec!["Could not remove old-480.png: Permission denied"]
        );
        let summary = BuildSummary {
            orphans: OrphanReport {
                removed: vec![],
                failed: vec![("old-480.png".into(), "Permission denied".into())],
            },
            ..BuildSummary::default()
        };
        assert_eq!(
            format_build_summary(&summary),
            vec!["Cache: nothing to do", "1 orphan could not be removed"]
        );
    }

    #[test]
    fn warnings_are_single_lines() {
        let no_sizes = format_process_event(&ProcessEvent::NoSizes {
            stylesheet: PathBuf::from("src/styles.css"),
        });
        assert_eq!(
            no_sizes,
            vec!["No --breakpoint-* declarations in src/styles.css, nothing to generate"]
        );
        let dup = format_process_event(&ProcessEvent::DuplicateBasename {
            kept: "logo.jpg".into(),
            skipped: "logo.png".into(),
        });
        assert_eq!(dup, vec!["Skipping logo.png: same name as logo.jpg"]);
    }

    #[test]
    fn build_summary_line() {
        let summary = BuildSummary {
            cache: CacheStats {
                hits: 2,
                refreshed: 0,
                encoded: 2,
            },
            ..BuildSummary::default()
        };
        assert_eq!(
            format_build_summary(&summary),
            vec!["Cache: 2 cached, 2 encoded (4 total)"]
        );
    }

    // =========================================================================
    // Watch events
    // =========================================================================

    #[test]
    fn watch_changes_relative_to_base() {
        let changes = Changes {
            added: vec![PathBuf::from("/site/src/assets/images/new.png")],
            removed: vec![],
            modified: vec![PathBuf::from("/site/src/styles.css")],
        };
        let lines = format_watch_event(&WatchEvent::Changed(changes), Path::new("/site"));
        assert_eq!(
            lines,
            vec!["Added: src/assets/images/new.png", "Changed: src/styles.css"]
        );
    }

    #[test]
    fn watch_build_results() {
        let base = Path::new("/site");
        assert_eq!(
            format_watch_event(&WatchEvent::BuildStarted, base),
            vec!["Rebuilding..."]
        );
        let ok = WatchEvent::BuildFinished(Ok(BuildSummary::default()));
        assert_eq!(
            format_watch_event(&ok, base),
            vec!["Rebuild finished: nothing to do"]
        );
        let err = WatchEvent::BuildFinished(Err(BuildError::Manifest(std::io::Error::other(
            "read-only",
        ))));
        assert_eq!(
            format_watch_event(&err, base),
            vec!["Rebuild failed: Failed to save cache manifest: read-only"]
        );
    }
}
