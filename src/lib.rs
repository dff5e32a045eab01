//! # breakpix
//!
//! Responsive image variants for static sites, driven by the breakpoints
//! already declared in the site's stylesheet.
//!
//! # Architecture: One Build, Four Steps
//!
//! ```text
//! 1. Sizes      styles.css  →  [480, 1024]            (--breakpoint-* declarations)
//! 2. Orphans    cache/      →  cache/                 (drop variants of deleted sources)
//! 3. Variants   images/     →  cache/                 (WebP + PNG per image and size)
//! 4. Publish    cache/      →  output/                (clear and mirror)
//! ```
//!
//! The cache directory is persistent and is the single source of truth; the
//! output directory is rebuilt from it every time. A rebuild with unchanged
//! inputs encodes nothing.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`breakpoints`] | Reads `--breakpoint-<token>: <int>px;` declarations from the stylesheet |
//! | [`process`] | Discovers source images and ensures every variant pair exists in the cache |
//! | [`imaging`] | Decode, square cover crop, WebP/PNG encode behind the [`imaging::ImageBackend`] trait |
//! | [`cache`] | Sidecar manifest recording how each cached file was produced |
//! | [`orphans`] | Deletes cached variants whose source image is gone |
//! | [`publish`] | Clears the output directory and copies the cache into it |
//! | [`pipeline`] | Runs the four steps in order and summarizes the build |
//! | [`trigger`] | Debounce state machine deciding when watch mode may build |
//! | [`watch`] | Polling file watcher running builds on a worker thread |
//! | [`markup`] | `<picture>` markup for published variants, rendered with Maud |
//! | [`config`] | `breakpix.toml` loading, merging with stock defaults, validation |
//! | [`naming`] | `{basename}-{size}.{ext}` naming convention |
//! | [`types`] | Shared types (`SourceImage`, `AssetFormat`, `DerivedAsset`) |
//! | [`output`] | CLI output formatting of build and watch events |
//!
//! # Design Decisions
//!
//! ## Sizes Come From CSS
//!
//! Layout breakpoints already live in the stylesheet. Reading them from
//! there keeps image sizes and media queries in step without a second list
//! to maintain. Sizes are used in the order they are declared.
//!
//! ## Square Cover Crops, Two Formats
//!
//! Every variant is a `size × size` center crop. WebP (quality 85) is
//! offered first, PNG (quality 90) is the fallback for browsers without
//! WebP support. Qualities are fixed constants, not configuration.
//!
//! ## Content-Fingerprinted Cache
//!
//! A cached file is reused when it was produced from the same source bytes
//! with the same parameters. Files present but not yet recorded (from an
//! older cache) are adopted as-is. See [`cache`] for the lookup table.
//!
//! ## Orphans Before Variants
//!
//! Collecting orphans first means a rename (`old.png` → `new.png`) never
//! publishes both generations side by side.
//!
//! ## Sequential Processing
//!
//! One encode runs at a time, and in watch mode at most one build. Builds
//! are cheap when the cache is warm, and a single image encoder keeps
//! memory flat on large sources.

pub mod breakpoints;
pub mod cache;
pub mod config;
pub mod imaging;
pub mod markup;
pub mod naming;
pub mod orphans;
pub mod output;
pub mod pipeline;
pub mod process;
pub mod publish;
pub mod trigger;
pub mod types;
pub mod watch;

#[cfg(test)]
pub(crate) mod test_helpers;
