//! # Scanner Module
//!
//! Reads a single source folder (no recursion, files and links to files) and
//! produces either a type-partitioned [`SourceAnalysis`] or a [`DateScan`].
//!
//! ## Example
//! ```rust,ignore
//! use flowbooster::core::scanner::scan_by_type;
//!
//! let analysis = scan_by_type(Path::new("/cards/DCIM"), &config.extensions)?;
//! println!("{}", analysis.project_kind());
//! ```

mod walker;

pub use walker::{list_files, scan_by_date, scan_by_type};

use crate::core::classify::FileCategory;
use crate::core::metadata::ResolvedTimestamp;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::Path;

/// A file name exactly as the filesystem returned it.
///
/// Paths are always rebuilt from the raw name; the lossy UTF-8 form is only
/// for display, logs and serialized output.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FileName(OsString);

impl FileName {
    pub fn as_os_str(&self) -> &OsStr {
        &self.0
    }

    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        self.0.to_string_lossy()
    }
}

impl fmt::Display for FileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}

impl AsRef<OsStr> for FileName {
    fn as_ref(&self) -> &OsStr {
        &self.0
    }
}

impl AsRef<Path> for FileName {
    fn as_ref(&self) -> &Path {
        Path::new(&self.0)
    }
}

impl From<OsString> for FileName {
    fn from(name: OsString) -> Self {
        Self(name)
    }
}

impl From<String> for FileName {
    fn from(name: String) -> Self {
        Self(name.into())
    }
}

impl From<&str> for FileName {
    fn from(name: &str) -> Self {
        Self(name.into())
    }
}

impl PartialEq<str> for FileName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for FileName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl Serialize for FileName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string_lossy())
    }
}

impl<'de> Deserialize<'de> for FileName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::from)
    }
}

/// What kind of project a source folder holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectKind {
    Empty,
    PhotoOnly,
    VideoOnly,
    Mixed,
}

impl fmt::Display for ProjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Empty => "Empty",
            Self::PhotoOnly => "Photography",
            Self::VideoOnly => "Video",
            Self::Mixed => "Mixed",
        };
        f.write_str(name)
    }
}

/// Type-mode scan result
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceAnalysis {
    /// File names per target category, in listing order
    files: BTreeMap<FileCategory, Vec<FileName>>,
    /// Files seen but not matching any table
    pub unclassified: Vec<FileName>,
}

impl SourceAnalysis {
    /// Record a file under its category
    pub fn push(&mut self, category: FileCategory, name: impl Into<FileName>) {
        let name = name.into();
        if category == FileCategory::Unclassified {
            self.unclassified.push(name);
        } else {
            self.files.entry(category).or_default().push(name);
        }
    }

    pub fn files(&self, category: FileCategory) -> &[FileName] {
        self.files.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn count(&self, category: FileCategory) -> usize {
        self.files(category).len()
    }

    /// Counts keyed by category label (`JPG`, `RAW`, `VIDEO`), zeros included
    pub fn counts(&self) -> BTreeMap<String, usize> {
        FileCategory::TARGETS
            .iter()
            .map(|c| (c.label().to_string(), self.count(*c)))
            .collect()
    }

    pub fn total(&self) -> usize {
        FileCategory::TARGETS.iter().map(|c| self.count(*c)).sum()
    }

    /// Derived from the counts on every call
    pub fn project_kind(&self) -> ProjectKind {
        let images = self.count(FileCategory::ImageStandard) + self.count(FileCategory::ImageRaw);
        let videos = self.count(FileCategory::Video);

        match (images > 0, videos > 0) {
            (true, true) => ProjectKind::Mixed,
            (true, false) => ProjectKind::PhotoOnly,
            (false, true) => ProjectKind::VideoOnly,
            (false, false) => ProjectKind::Empty,
        }
    }

    /// `(category, files)` pairs for non-empty categories, in processing order
    pub fn iter(&self) -> impl Iterator<Item = (FileCategory, &[FileName])> + '_ {
        FileCategory::TARGETS
            .into_iter()
            .map(|c| (c, self.files(c)))
            .filter(|(_, files)| !files.is_empty())
    }
}

/// A media file and its effective date
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatedFile {
    pub name: FileName,
    pub timestamp: ResolvedTimestamp,
}

/// File name to effective date, in listing order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DateIndex {
    entries: Vec<DatedFile>,
}

impl DateIndex {
    pub fn insert(&mut self, name: impl Into<FileName>, timestamp: ResolvedTimestamp) {
        self.entries.push(DatedFile {
            name: name.into(),
            timestamp,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DatedFile> {
        self.entries.iter()
    }
}

/// Date-mode scan result
#[derive(Debug, Clone, Default)]
pub struct DateScan {
    pub index: DateIndex,
    /// Media files dropped because they could not be stat'd
    pub excluded: usize,
}

impl DateScan {
    /// Number of files that will be organized; zero means nothing to do
    pub fn total(&self) -> usize {
        self.index.len()
    }
}
