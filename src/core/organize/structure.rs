//! Destination folder layout.
//!
//! Type mode: `{dest}/img/jpg`, `{dest}/img/raw`, `{dest}/videos`.
//! Date mode: `{dest}/{bucket-label}`.

use super::types::StructureLayout;
use crate::core::bucket::BucketPlan;
use crate::core::classify::FileCategory;
use crate::core::scanner::SourceAnalysis;
use crate::error::OrganizeError;
use std::fs;
use std::path::{Path, PathBuf};

/// Path of a category folder below `dest`
pub fn category_dir(dest: &Path, category: FileCategory) -> Option<PathBuf> {
    category
        .relative_dir()
        .map(|segments| segments.iter().fold(dest.to_path_buf(), |path, s| path.join(s)))
}

/// Create the category folders for a type-mode run.
///
/// `targets` always lists every category; `created` only those that hold
/// files, unless `create_all` is set.
pub fn build_type_structure(
    dest: &Path,
    analysis: &SourceAnalysis,
    create_all: bool,
) -> Result<StructureLayout, OrganizeError> {
    let mut layout = StructureLayout::default();

    for category in FileCategory::TARGETS {
        let Some(path) = category_dir(dest, category) else {
            continue;
        };

        if create_all || analysis.count(category) > 0 {
            create_dir(&path)?;
            layout.created.push(path.clone());
        }
        layout.targets.insert(category.folder_key().to_string(), path);
    }

    Ok(layout)
}

/// Create one folder per bucket for a date-mode run
pub fn build_date_structure(dest: &Path, plan: &BucketPlan) -> Result<StructureLayout, OrganizeError> {
    let mut layout = StructureLayout::default();

    for label in plan.labels() {
        let path = dest.join(label);
        create_dir(&path)?;
        layout.created.push(path.clone());
        layout.targets.insert(label.to_string(), path);
    }

    Ok(layout)
}

pub(crate) fn create_dir(path: &Path) -> Result<(), OrganizeError> {
    fs::create_dir_all(path).map_err(|source| OrganizeError::CreateFolder {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "folder ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::bucket::Granularity;
    use crate::core::metadata::{ResolvedTimestamp, TimestampSource};
    use crate::core::scanner::DateIndex;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn mixed_analysis() -> SourceAnalysis {
        let mut analysis = SourceAnalysis::default();
        analysis.push(FileCategory::ImageStandard, "a.jpg".to_string());
        analysis.push(FileCategory::Video, "b.mp4".to_string());
        analysis
    }

    #[test]
    fn creates_only_populated_categories() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path();

        let layout = build_type_structure(dest, &mixed_analysis(), false).unwrap();

        assert_eq!(layout.created, vec![dest.join("img/jpg"), dest.join("videos")]);
        assert!(!dest.join("img/raw").exists());
        assert_eq!(layout.targets.len(), 3);
        assert_eq!(layout.target("raw"), Some(&dest.join("img").join("raw")));
    }

    #[test]
    fn create_all_builds_every_category() {
        let temp = TempDir::new().unwrap();

        let layout = build_type_structure(temp.path(), &SourceAnalysis::default(), true).unwrap();

        assert_eq!(layout.created.len(), 3);
        assert!(temp.path().join("img/raw").is_dir());
    }

    #[test]
    fn building_twice_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let analysis = mixed_analysis();

        let first = build_type_structure(temp.path(), &analysis, false).unwrap();
        let second = build_type_structure(temp.path(), &analysis, false).unwrap();

        assert_eq!(first, second);
        let top: Vec<_> = fs::read_dir(temp.path()).unwrap().collect();
        assert_eq!(top.len(), 2); // img, videos
    }

    #[test]
    fn date_structure_has_one_folder_per_bucket() {
        let temp = TempDir::new().unwrap();
        let mut index = DateIndex::default();
        for (name, day) in [("a.jpg", 1), ("b.jpg", 1), ("c.jpg", 2)] {
            let value = NaiveDate::from_ymd_opt(2024, 3, day)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap();
            index.insert(
                name.to_string(),
                ResolvedTimestamp {
                    value,
                    source: TimestampSource::Exif,
                },
            );
        }
        let plan = BucketPlan::build(&index, Granularity::Day);

        let layout = build_date_structure(temp.path(), &plan).unwrap();

        assert_eq!(layout.created.len(), 2);
        assert!(temp.path().join("2024-03-01").is_dir());
        assert!(temp.path().join("2024-03-02").is_dir());
    }
}
