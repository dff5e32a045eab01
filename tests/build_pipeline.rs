//! End-to-end builds through the public API with the real encoder.
//!
//! Sources are tiny generated images so the suite stays fast; most tests
//! use small breakpoints for the same reason.

use breakpix::cache::MANIFEST_FILENAME;
use breakpix::config::{CONFIG_FILENAME, ProjectPaths, load_config};
use breakpix::imaging::RustBackend;
use breakpix::pipeline::{BuildError, BuildSummary, build};
use breakpix::publish::PublishError;
use image::{ImageBuffer, Rgb, Rgba};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const SMALL_SIZES: &str = ":root {\n  --breakpoint-sm: 24px;\n  --breakpoint-lg: 40px;\n}\n";

fn write_png(path: &Path, w: u32, h: u32) {
    let img = ImageBuffer::from_fn(w, h, |x, y| Rgba([(x * 7) as u8, (y * 5) as u8, 90, 255]));
    img.save(path).unwrap();
}

fn write_jpeg(path: &Path, w: u32, h: u32) {
    let img = ImageBuffer::from_fn(w, h, |x, y| Rgb([(x * 3) as u8, 120, (y * 3) as u8]));
    img.save_with_format(path, image::ImageFormat::Jpeg).unwrap();
}

fn names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

fn project(stylesheet: &str) -> (TempDir, ProjectPaths) {
    let tmp = TempDir::new().unwrap();
    let config = load_config(tmp.path()).unwrap();
    let paths = config.paths.resolve(tmp.path());
    fs::create_dir_all(&paths.images).unwrap();
    fs::write(&paths.stylesheet, stylesheet).unwrap();
    (tmp, paths)
}

fn run(paths: &ProjectPaths) -> BuildSummary {
    build(paths, &RustBackend::new(), true, None).unwrap()
}

#[test]
fn single_image_two_breakpoints_gives_four_files() {
    let (_tmp, paths) = project(":root { --breakpoint-sm: 480px; --breakpoint-lg: 1024px; }");
    write_png(&paths.images.join("logo.png"), 64, 48);

    let summary = run(&paths);

    assert_eq!(
        names(&paths.output),
        vec![
            "logo-1024.png",
            "logo-1024.webp",
            "logo-480.png",
            "logo-480.webp"
        ]
    );
    assert_eq!(summary.cache.encoded, 4);
    for size in [480, 1024] {
        for ext in ["webp", "png"] {
            let file = paths.output.join(format!("logo-{size}.{ext}"));
            assert_eq!(image::image_dimensions(&file).unwrap(), (size, size));
        }
    }
}

#[test]
fn second_build_encodes_nothing_and_output_is_identical() {
    let (_tmp, paths) = project(SMALL_SIZES);
    write_png(&paths.images.join("a.png"), 30, 30);
    write_jpeg(&paths.images.join("b.jpg"), 50, 20);
    run(&paths);
    let first: Vec<Vec<u8>> = names(&paths.output)
        .iter()
        .map(|n| fs::read(paths.output.join(n)).unwrap())
        .collect();

    let summary = run(&paths);

    assert_eq!(summary.cache.encodes(), 0);
    assert_eq!(summary.cache.hits, 8);
    let second: Vec<Vec<u8>> = names(&paths.output)
        .iter()
        .map(|n| fs::read(paths.output.join(n)).unwrap())
        .collect();
    assert_eq!(first, second);
}

#[test]
fn orphaned_variants_disappear_from_cache_and_output() {
    let (_tmp, paths) = project(SMALL_SIZES);
    write_png(&paths.images.join("logo.png"), 30, 30);
    fs::create_dir_all(&paths.cache).unwrap();
    fs::write(paths.cache.join("old-480.webp"), b"stale").unwrap();
    fs::write(paths.cache.join("old-480.png"), b"stale").unwrap();

    let summary = run(&paths);

    assert_eq!(summary.orphans.removed.len(), 2);
    for dir in [&paths.cache, &paths.output] {
        assert!(!dir.join("old-480.webp").exists());
        assert!(!dir.join("old-480.png").exists());
    }
}

#[test]
fn deleting_a_source_removes_its_variants() {
    let (_tmp, paths) = project(SMALL_SIZES);
    write_png(&paths.images.join("keep.png"), 30, 30);
    write_png(&paths.images.join("drop.png"), 30, 30);
    run(&paths);

    fs::remove_file(paths.images.join("drop.png")).unwrap();
    run(&paths);

    assert!(names(&paths.output).iter().all(|n| n.starts_with("keep-")));
    assert!(names(&paths.cache)
        .iter()
        .all(|n| n.starts_with("keep-") || n == MANIFEST_FILENAME));
}

#[test]
fn no_breakpoints_means_no_variants() {
    let (_tmp, paths) = project("body { margin: 0; }");
    write_png(&paths.images.join("logo.png"), 30, 30);

    let summary = run(&paths);

    assert!(summary.breakpoints.is_empty());
    assert_eq!(summary.cache.total(), 0);
    assert!(paths.output.is_dir());
    assert!(names(&paths.output).is_empty());
}

#[test]
fn output_mirrors_cache_without_manifest() {
    let (_tmp, paths) = project(SMALL_SIZES);
    write_png(&paths.images.join("logo.png"), 30, 30);
    run(&paths);
    fs::write(paths.cache.join("hand-placed.txt"), b"kept").unwrap();

    run(&paths);

    let mut cache_files = names(&paths.cache);
    cache_files.retain(|n| n != MANIFEST_FILENAME);
    assert_eq!(names(&paths.output), cache_files);
}

#[test]
fn edited_source_is_reencoded() {
    let (_tmp, paths) = project(SMALL_SIZES);
    let source = paths.images.join("logo.png");
    write_png(&source, 30, 30);
    run(&paths);

    write_png(&source, 60, 20);
    let summary = run(&paths);

    assert_eq!(summary.cache.refreshed, 4);
    assert_eq!(summary.cache.hits, 0);
}

#[test]
fn no_cache_reencodes_everything() {
    let (_tmp, paths) = project(SMALL_SIZES);
    write_png(&paths.images.join("logo.png"), 30, 30);
    run(&paths);

    let summary = build(&paths, &RustBackend::new(), false, None).unwrap();

    assert_eq!(summary.cache.encoded, 4);
}

#[test]
fn undecodable_source_fails_the_build() {
    let (_tmp, paths) = project(SMALL_SIZES);
    fs::write(paths.images.join("broken.png"), b"not an image").unwrap();

    let result = build(&paths, &RustBackend::new(), true, None);

    assert!(matches!(result, Err(BuildError::Process(_))));
}

#[test]
fn config_file_moves_directories() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join(CONFIG_FILENAME),
        "[paths]\nimages = \"img\"\nstylesheet = \"site.css\"\noutput = \"public/img\"\n",
    )
    .unwrap();
    fs::create_dir_all(tmp.path().join("img")).unwrap();
    fs::write(tmp.path().join("site.css"), "--breakpoint-xs: 16px;").unwrap();
    write_png(&tmp.path().join("img/icon.png"), 20, 20);

    let paths = load_config(tmp.path()).unwrap().paths.resolve(tmp.path());
    run(&paths);

    assert_eq!(
        names(&tmp.path().join("public/img")),
        vec!["icon-16.png", "icon-16.webp"]
    );
    assert!(tmp.path().join(".cache/images/icon-16.webp").exists());
}

#[test]
fn cache_nested_in_output_survives_a_build() {
    let (_tmp, mut paths) = project(SMALL_SIZES);
    paths.cache = paths.output.join(".cache");
    write_png(&paths.images.join("logo.png"), 30, 30);

    let result = build(&paths, &RustBackend::new(), true, None);

    assert!(matches!(
        result,
        Err(BuildError::Publish(PublishError::Overlap { .. }))
    ));
    assert!(names(&paths.cache).contains(&"logo-24.webp".to_string()));
}
