//! README files for destination folders.

use crate::core::classify::FileCategory;
use crate::core::config::ReadmeTexts;
use crate::core::organize::StructureLayout;
use crate::error::ReportError;
use std::fs;
use std::path::{Path, PathBuf};

pub const README_FILE: &str = "README.md";

fn write_readme(dir: &Path, text: &str) -> Result<PathBuf, ReportError> {
    let path = dir.join(README_FILE);
    fs::create_dir_all(dir)
        .and_then(|_| fs::write(&path, text))
        .map_err(|source| ReportError::Write {
            path: path.clone(),
            source,
        })?;
    Ok(path)
}

/// One README per category in `layout.targets`.
///
/// Folders that were not created for lack of files are created here, so
/// asking for READMEs always yields the full category tree.
pub fn write_category_readmes(
    layout: &StructureLayout,
    texts: &ReadmeTexts,
) -> Result<Vec<PathBuf>, ReportError> {
    let mut written = Vec::new();
    for category in FileCategory::TARGETS {
        let (Some(dir), Some(text)) = (
            layout.target(category.folder_key()),
            texts.for_category(category),
        ) else {
            continue;
        };
        written.push(write_readme(dir, text)?);
    }
    Ok(written)
}

/// One README per bucket folder
pub fn write_bucket_readmes(
    layout: &StructureLayout,
    texts: &ReadmeTexts,
) -> Result<Vec<PathBuf>, ReportError> {
    layout
        .targets
        .iter()
        .map(|(label, dir)| write_readme(dir, &texts.for_bucket(label)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::organize::structure::build_type_structure;
    use crate::core::scanner::SourceAnalysis;
    use tempfile::TempDir;

    #[test]
    fn category_readmes_cover_every_target() {
        let temp = TempDir::new().unwrap();
        let mut analysis = SourceAnalysis::default();
        analysis.push(FileCategory::ImageStandard, "a.jpg".to_string());
        let layout = build_type_structure(temp.path(), &analysis, false).unwrap();
        let texts = ReadmeTexts::default();

        let written = write_category_readmes(&layout, &texts).unwrap();

        assert_eq!(written.len(), 3);
        let raw = fs::read_to_string(temp.path().join("img/raw/README.md")).unwrap();
        assert_eq!(raw, texts.raw);
    }

    #[test]
    fn bucket_readme_names_the_bucket() {
        let temp = TempDir::new().unwrap();
        let mut layout = StructureLayout::default();
        layout
            .targets
            .insert("2024-05".to_string(), temp.path().join("2024-05"));

        write_bucket_readmes(&layout, &ReadmeTexts::default()).unwrap();

        let text = fs::read_to_string(temp.path().join("2024-05/README.md")).unwrap();
        assert!(text.contains("2024-05"));
    }
}
