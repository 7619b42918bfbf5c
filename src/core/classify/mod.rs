//! # Classify Module
//!
//! Maps file names to a [`FileCategory`] by extension.
//!
//! ## Default Tables
//! - Standard images: `.jpg`, `.jpeg`, `.png`
//! - RAW images: `.cr2`, `.nef`, `.arw`, `.raw`
//! - Videos: `.mp4`, `.mov`, `.avi`, `.mkv`
//!
//! Tables are plain data carried by [`ExtensionTable`], usually loaded as part
//! of `OrganizerConfig`. New formats are added there, never in this code.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Category a file is sorted into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileCategory {
    ImageStandard,
    ImageRaw,
    Video,
    Unclassified,
}

impl FileCategory {
    /// Categories that own a destination folder, in processing order
    pub const TARGETS: [FileCategory; 3] = [Self::ImageStandard, Self::ImageRaw, Self::Video];

    /// Key used for counts in the manifest and labels in the log
    pub fn label(&self) -> &'static str {
        match self {
            Self::ImageStandard => "JPG",
            Self::ImageRaw => "RAW",
            Self::Video => "VIDEO",
            Self::Unclassified => "OTHER",
        }
    }

    /// Key used for README texts and target lookups
    pub fn folder_key(&self) -> &'static str {
        match self {
            Self::ImageStandard => "jpg",
            Self::ImageRaw => "raw",
            Self::Video => "videos",
            Self::Unclassified => "other",
        }
    }

    /// Path segments below the destination root
    pub fn relative_dir(&self) -> Option<&'static [&'static str]> {
        match self {
            Self::ImageStandard => Some(&["img", "jpg"]),
            Self::ImageRaw => Some(&["img", "raw"]),
            Self::Video => Some(&["videos"]),
            Self::Unclassified => None,
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, Self::ImageStandard | Self::ImageRaw)
    }
}

/// Extension membership tables, one per target category.
///
/// Extensions are stored without the leading dot and compared lower-cased.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtensionTable {
    pub image_standard: Vec<String>,
    pub image_raw: Vec<String>,
    pub video: Vec<String>,
}

impl Default for ExtensionTable {
    fn default() -> Self {
        fn owned(list: &[&str]) -> Vec<String> {
            list.iter().map(|s| s.to_string()).collect()
        }

        Self {
            image_standard: owned(&["jpg", "jpeg", "png"]),
            image_raw: owned(&["cr2", "nef", "arw", "raw"]),
            video: owned(&["mp4", "mov", "avi", "mkv"]),
        }
    }
}

impl ExtensionTable {
    fn tables(&self) -> [(FileCategory, &Vec<String>); 3] {
        [
            (FileCategory::ImageStandard, &self.image_standard),
            (FileCategory::ImageRaw, &self.image_raw),
            (FileCategory::Video, &self.video),
        ]
    }

    /// Check that no extension appears in two categories
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen: HashMap<String, FileCategory> = HashMap::new();
        for (category, extensions) in self.tables() {
            for ext in extensions {
                let ext = normalize(ext);
                match seen.get(&ext) {
                    Some(other) if *other != category => {
                        return Err(ConfigError::OverlappingExtension { extension: ext });
                    }
                    _ => {
                        seen.insert(ext, category);
                    }
                }
            }
        }
        Ok(())
    }

    /// Classify a file name by its extension (text after the last `.`)
    pub fn classify(&self, name: &str) -> FileCategory {
        let Some(ext) = Path::new(name).extension().and_then(|e| e.to_str()) else {
            return FileCategory::Unclassified;
        };
        let ext = ext.to_lowercase();

        self.tables()
            .into_iter()
            .find(|(_, extensions)| extensions.iter().any(|e| normalize(e) == ext))
            .map(|(category, _)| category)
            .unwrap_or(FileCategory::Unclassified)
    }

    /// True for any file that lands in a target category
    pub fn is_media(&self, name: &str) -> bool {
        self.classify(name) != FileCategory::Unclassified
    }
}

fn normalize(ext: &str) -> String {
    ext.trim_start_matches('.').to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_default_extensions() {
        let table = ExtensionTable::default();
        assert_eq!(table.classify("photo.jpg"), FileCategory::ImageStandard);
        assert_eq!(table.classify("photo.png"), FileCategory::ImageStandard);
        assert_eq!(table.classify("IMG_0001.CR2"), FileCategory::ImageRaw);
        assert_eq!(table.classify("clip.Mp4"), FileCategory::Video);
    }

    #[test]
    fn unknown_or_missing_extension_is_unclassified() {
        let table = ExtensionTable::default();
        assert_eq!(table.classify("notes.txt"), FileCategory::Unclassified);
        assert_eq!(table.classify("Makefile"), FileCategory::Unclassified);
        assert_eq!(table.classify(".hidden"), FileCategory::Unclassified);
        assert_eq!(table.classify("trailing."), FileCategory::Unclassified);
    }

    #[test]
    fn only_last_extension_counts() {
        let table = ExtensionTable::default();
        assert_eq!(table.classify("backup.mp4.txt"), FileCategory::Unclassified);
        assert_eq!(table.classify("scan.txt.jpeg"), FileCategory::ImageStandard);
    }

    #[test]
    fn default_tables_are_disjoint() {
        assert!(ExtensionTable::default().validate().is_ok());
    }

    #[test]
    fn overlapping_tables_are_rejected() {
        let mut table = ExtensionTable::default();
        table.video.push(".RAW".to_string());
        let err = table.validate().unwrap_err();
        assert!(matches!(err, ConfigError::OverlappingExtension { ref extension } if extension == "raw"));
    }

    #[test]
    fn custom_extension_is_picked_up() {
        let mut table = ExtensionTable::default();
        table.image_raw.push("dng".to_string());
        assert_eq!(table.classify("DSC_1.dng"), FileCategory::ImageRaw);
        assert!(table.is_media("DSC_1.dng"));
    }

    #[test]
    fn every_name_maps_to_exactly_one_category() {
        let table = ExtensionTable::default();
        for name in ["a.jpg", "b.nef", "c.mkv", "d", "e.doc", "f.JPEG"] {
            let category = table.classify(name);
            let matches = FileCategory::TARGETS
                .iter()
                .filter(|target| **target == category)
                .count();
            assert!(matches <= 1);
        }
    }
}
