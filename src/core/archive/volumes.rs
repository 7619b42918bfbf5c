//! Publishing a finished archive, whole or split into volumes.
//!
//! A split archive is `{name}.zip` followed by `{name}.z01`, `{name}.z02`, …
//! Every volume but the last holds exactly `cap` bytes, and concatenating the
//! volumes in order gives back the original archive.

use crate::error::ArchiveError;
use std::fs;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Path of volume `index`; index 0 is the archive itself
pub fn volume_path(archive: &Path, index: usize) -> PathBuf {
    if index == 0 {
        archive.to_path_buf()
    } else {
        archive.with_extension(format!("z{:02}", index))
    }
}

/// Existing volumes of `archive`, found by probing `.z01`, `.z02`, … until
/// one is missing.
///
/// The archive itself comes first when present. Continuations are probed
/// even without it, so orphans of a removed archive are still found. A gap
/// truncates the result: if `.z02` was deleted, `.z03` and later are not
/// reported. Prefer the list returned by the packager when available.
pub fn discover_volumes(archive: &Path) -> Vec<PathBuf> {
    let mut volumes = Vec::new();
    if archive.is_file() {
        volumes.push(archive.to_path_buf());
    }

    for index in 1.. {
        let next = volume_path(archive, index);
        if !next.is_file() {
            break;
        }
        volumes.push(next);
    }
    volumes
}

/// Delete continuation volumes left by an earlier run
pub(crate) fn remove_stale_volumes(archive: &Path) -> Result<usize, ArchiveError> {
    let stale: Vec<PathBuf> = discover_volumes(archive)
        .into_iter()
        .filter(|path| path != archive)
        .collect();
    for path in &stale {
        fs::remove_file(path).map_err(|source| ArchiveError::Write {
            path: path.clone(),
            source,
        })?;
    }
    if !stale.is_empty() {
        tracing::info!(archive = %archive.display(), removed = stale.len(), "removed stale volumes");
    }
    Ok(stale.len())
}

/// Move the finished temporary archive into place.
///
/// Without a cap, or when the archive fits in one, it is renamed to
/// `archive`. Otherwise it is cut into volumes, each staged in its own
/// temporary file before being renamed.
pub(crate) fn publish(
    mut staged: NamedTempFile,
    archive: &Path,
    size: u64,
    cap: Option<u64>,
) -> Result<Vec<PathBuf>, ArchiveError> {
    let write_error = |path: &Path| {
        let path = path.to_path_buf();
        move |source| ArchiveError::Write { path, source }
    };

    let cap = match cap {
        Some(cap) if size > cap => cap,
        _ => {
            staged
                .persist(archive)
                .map_err(|e| ArchiveError::Write {
                    path: archive.to_path_buf(),
                    source: e.error,
                })?;
            return Ok(vec![archive.to_path_buf()]);
        }
    };

    let dir = archive.parent().unwrap_or_else(|| Path::new("."));
    let count = size.div_ceil(cap) as usize;
    let reader = staged.as_file_mut();
    reader
        .seek(SeekFrom::Start(0))
        .map_err(write_error(archive))?;

    let mut volumes = Vec::with_capacity(count);
    for index in 0..count {
        let path = volume_path(archive, index);
        let mut chunk = NamedTempFile::new_in(dir).map_err(write_error(&path))?;
        let written = io::copy(&mut reader.by_ref().take(cap), chunk.as_file_mut())
            .map_err(write_error(&path))?;
        if written == 0 {
            break;
        }
        chunk.as_file().sync_all().map_err(write_error(&path))?;
        chunk.persist(&path).map_err(|e| ArchiveError::Write {
            path: path.clone(),
            source: e.error,
        })?;
        volumes.push(path);
    }

    tracing::info!(
        archive = %archive.display(),
        volumes = volumes.len(),
        cap,
        "archive split"
    );
    Ok(volumes)
}
