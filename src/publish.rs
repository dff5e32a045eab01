//! Publishing the cache into the output directory.
//!
//! The output directory is a disposable mirror: it is deleted and recreated
//! on every build, then filled with a copy of every regular file in the
//! cache directory. The cache manifest stays behind.
//!
//! Clearing the output must never reach the cache, so the two directories
//! may not be equal or nested in either direction.

use crate::cache::MANIFEST_FILENAME;
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("Refusing to publish: output {output} and cache {cache} overlap")]
    Overlap { cache: PathBuf, output: PathBuf },
    #[error("Failed to clear output directory {path}: {source}")]
    Clear {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to read cache directory {path}: {source}")]
    ReadCache {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },
}

/// Lexically normalize a path: drop `.` and fold `name/..`.
///
/// No filesystem access, so symlinks are not resolved.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other),
        }
    }
    out
}

/// True when `a` and `b` are the same directory or one contains the other.
///
/// A relative path never overlaps an absolute one here.
pub fn dirs_overlap(a: &Path, b: &Path) -> bool {
    let (a, b) = (normalize(a), normalize(b));
    a.starts_with(&b) || b.starts_with(&a)
}

/// Replace `output_dir` with a copy of the files in `cache_dir`.
///
/// Returns the published file names, sorted. Subdirectories of the cache
/// are not copied. Fails before touching anything when the two
/// directories overlap.
pub fn publish(cache_dir: &Path, output_dir: &Path) -> Result<Vec<String>, PublishError> {
    if dirs_overlap(cache_dir, output_dir) {
        return Err(PublishError::Overlap {
            cache: cache_dir.to_path_buf(),
            output: output_dir.to_path_buf(),
        });
    }

    let clear_err = |source| PublishError::Clear {
        path: output_dir.to_path_buf(),
        source,
    };
    if output_dir.exists() {
        fs::remove_dir_all(output_dir).map_err(clear_err)?;
    }
    fs::create_dir_all(output_dir).map_err(clear_err)?;

    let read_err = |source| PublishError::ReadCache {
        path: cache_dir.to_path_buf(),
        source,
    };
    let mut files = Vec::new();
    for entry in fs::read_dir(cache_dir).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        if !entry.file_type().map_err(read_err)?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name == MANIFEST_FILENAME {
            continue;
        }
        files.push((name, entry.path()));
    }
    files.sort();

    let mut published = Vec::with_capacity(files.len());
    for (name, from) in files {
        let to = output_dir.join(&name);
        fs::copy(&from, &to).map_err(|source| PublishError::Copy {
            from: from.clone(),
            to: to.clone(),
            source,
        })?;
        published.push(name);
    }

    debug!(
        "published {} files to {}",
        published.len(),
        output_dir.display()
    );
    Ok(published)
}
