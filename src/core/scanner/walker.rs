//! Directory listing using walkdir, limited to the direct children of a folder.

use super::{DateScan, FileName, SourceAnalysis};
use crate::core::classify::ExtensionTable;
use crate::core::metadata::resolve_timestamp;
use crate::error::ScanError;
use std::io;
use std::path::Path;
use walkdir::WalkDir;

/// Names of the files directly inside `dir`, sorted by name.
///
/// Symlinks count when they resolve to a file. Subdirectories, dangling links
/// and other special entries are skipped.
pub fn list_files(dir: &Path) -> Result<Vec<FileName>, ScanError> {
    if !dir.is_dir() {
        return Err(ScanError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name();

    let mut names = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(dir).to_path_buf();
            if e.io_error().map(|e| e.kind()) == Some(io::ErrorKind::PermissionDenied) {
                ScanError::PermissionDenied { path }
            } else {
                ScanError::ReadDirectory {
                    path,
                    source: io::Error::other(e.to_string()),
                }
            }
        })?;

        let is_file = entry.file_type().is_file()
            || (entry.path_is_symlink() && entry.path().is_file());
        if !is_file {
            tracing::trace!(path = %entry.path().display(), "skipping non-file entry");
            continue;
        }

        names.push(FileName::from(entry.file_name().to_os_string()));
    }

    Ok(names)
}

/// Classify every file of `dir` by extension
pub fn scan_by_type(dir: &Path, table: &ExtensionTable) -> Result<SourceAnalysis, ScanError> {
    let mut analysis = SourceAnalysis::default();

    for name in list_files(dir)? {
        let category = table.classify(&name.to_string_lossy());
        tracing::debug!(file = %name, ?category, "classified");
        analysis.push(category, name);
    }

    tracing::info!(
        source = %dir.display(),
        total = analysis.total(),
        ignored = analysis.unclassified.len(),
        kind = %analysis.project_kind(),
        "source analyzed"
    );

    Ok(analysis)
}

/// Resolve the effective date of every media file of `dir`
pub fn scan_by_date(dir: &Path, table: &ExtensionTable) -> Result<DateScan, ScanError> {
    let mut scan = DateScan::default();

    for name in list_files(dir)? {
        if !table.is_media(&name.to_string_lossy()) {
            continue;
        }

        match resolve_timestamp(&dir.join(&name), table) {
            Ok(timestamp) => scan.index.insert(name, timestamp),
            Err(e) => {
                tracing::warn!(file = %name, error = %e, "excluding file that cannot be stat'd");
                scan.excluded += 1;
            }
        }
    }

    tracing::info!(
        source = %dir.display(),
        total = scan.total(),
        excluded = scan.excluded,
        "source dated"
    );

    Ok(scan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::classify::FileCategory;
    use crate::core::scanner::ProjectKind;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        let mut file = File::create(dir.join(name)).unwrap();
        file.write_all(b"test").unwrap();
    }

    #[test]
    fn list_files_skips_subdirectories() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "b.jpg");
        touch(temp.path(), "a.mp4");
        fs::create_dir(temp.path().join("nested")).unwrap();
        touch(&temp.path().join("nested"), "deep.jpg");

        let names = list_files(temp.path()).unwrap();

        assert_eq!(names, vec!["a.mp4", "b.jpg"]);
    }

    #[test]
    fn list_files_rejects_missing_directory() {
        let result = list_files(Path::new("/nonexistent/path/12345"));
        assert!(matches!(result, Err(ScanError::DirectoryNotFound { .. })));
    }

    #[test]
    fn scan_by_type_partitions_files() {
        let temp = TempDir::new().unwrap();
        for name in ["1.jpg", "2.JPEG", "3.png", "4.cr2", "5.mov", "notes.txt"] {
            touch(temp.path(), name);
        }

        let analysis = scan_by_type(temp.path(), &ExtensionTable::default()).unwrap();

        assert_eq!(analysis.count(FileCategory::ImageStandard), 3);
        assert_eq!(analysis.count(FileCategory::ImageRaw), 1);
        assert_eq!(analysis.count(FileCategory::Video), 1);
        assert_eq!(analysis.unclassified, vec!["notes.txt"]);
        assert_eq!(analysis.project_kind(), ProjectKind::Mixed);
    }

    #[test]
    fn scan_by_type_on_empty_folder_is_empty() {
        let temp = TempDir::new().unwrap();
        let analysis = scan_by_type(temp.path(), &ExtensionTable::default()).unwrap();
        assert_eq!(analysis.project_kind(), ProjectKind::Empty);
    }

    #[test]
    fn scan_by_date_only_indexes_media() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "a.jpg");
        touch(temp.path(), "b.mkv");
        touch(temp.path(), "readme.md");

        let scan = scan_by_date(temp.path(), &ExtensionTable::default()).unwrap();

        assert_eq!(scan.total(), 2);
        assert_eq!(scan.excluded, 0);
        let names: Vec<_> = scan.index.iter().map(|f| f.name.to_string()).collect();
        assert_eq!(names, vec!["a.jpg", "b.mkv"]);
    }

    #[cfg(unix)]
    #[test]
    fn list_files_follows_links_to_files() {
        use std::os::unix::fs::symlink;

        let temp = TempDir::new().unwrap();
        let shots = temp.path().join("shots");
        let source = temp.path().join("source");
        fs::create_dir(&shots).unwrap();
        fs::create_dir(&source).unwrap();
        touch(&shots, "x.jpg");
        symlink(shots.join("x.jpg"), source.join("x.jpg")).unwrap();
        symlink(&shots, source.join("linked_dir")).unwrap();
        symlink(shots.join("gone.jpg"), source.join("dangling.jpg")).unwrap();

        assert_eq!(list_files(&source).unwrap(), vec!["x.jpg"]);

        let analysis = scan_by_type(&source, &ExtensionTable::default()).unwrap();
        assert_eq!(analysis.count(FileCategory::ImageStandard), 1);
        assert_eq!(analysis.project_kind(), ProjectKind::PhotoOnly);
    }

    #[cfg(unix)]
    #[test]
    fn list_files_keeps_non_utf8_names() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let temp = TempDir::new().unwrap();
        let raw = OsStr::from_bytes(b"b\xff.jpg");
        File::create(temp.path().join(raw)).unwrap();

        let names = list_files(temp.path()).unwrap();

        assert_eq!(names.len(), 1);
        assert_eq!(names[0].as_os_str(), raw);
        assert!(temp.path().join(&names[0]).is_file());
    }
}
