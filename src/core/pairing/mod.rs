//! # Pairing Module
//!
//! Compares two folders by *base name*: the file name without its extension,
//! lower-cased. `IMG_01.JPG` and `img_01.cr2` share the base `img_01`.
//!
//! Matching is per base name, not per file, so every file sharing a base name
//! with no counterpart on the other side is unmatched together.
//!
//! [`reconcile`] is pure; [`PairReconciler`] lists real folders and moves
//! files into `matched/` and `unmatched/`.

mod reconciler;

pub use reconciler::{PairOutcome, PairReconciler, RelocatedFile, MATCHED_DIR, UNMATCHED_DIR};

use crate::core::scanner::FileName;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::ffi::OsStr;
use std::path::Path;

/// Which folder a file came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    A,
    B,
}

/// What gets relocated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairMode {
    /// Side A is sorted into `matched/` and `unmatched/`; side B is only read
    #[default]
    OneSided,
    /// Unmatched files of both sides go to `unmatched/`
    Unified,
}

/// A file name tagged with its origin folder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedFile {
    pub side: Side,
    pub name: FileName,
}

/// Partition of two listings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairReport {
    /// Base names present on both sides
    pub matched_bases: BTreeSet<String>,
    pub matched_a: Vec<FileName>,
    pub matched_b: Vec<FileName>,
    pub unmatched_a: Vec<FileName>,
    pub unmatched_b: Vec<FileName>,
}

impl PairReport {
    /// Unmatched files of both sides, side A first
    pub fn unified_unmatched(&self) -> Vec<TaggedFile> {
        let tag = |side: Side| move |name: &FileName| TaggedFile {
            side,
            name: name.clone(),
        };
        self.unmatched_a
            .iter()
            .map(tag(Side::A))
            .chain(self.unmatched_b.iter().map(tag(Side::B)))
            .collect()
    }

    pub fn is_fully_matched(&self) -> bool {
        self.unmatched_a.is_empty() && self.unmatched_b.is_empty()
    }
}

/// Reconciliation key of a file name
pub fn base_name(name: impl AsRef<OsStr>) -> String {
    Path::new(name.as_ref())
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// Split each side into names whose base exists on the other side and the rest
pub fn reconcile<S: AsRef<OsStr>>(side_a: &[S], side_b: &[S]) -> PairReport {
    let bases_a: HashSet<String> = side_a.iter().map(base_name).collect();
    let bases_b: HashSet<String> = side_b.iter().map(base_name).collect();

    let mut report = PairReport::default();

    for name in side_a {
        let name: &OsStr = name.as_ref();
        let base = base_name(name);
        if bases_b.contains(&base) {
            report.matched_bases.insert(base);
            report.matched_a.push(FileName::from(name.to_os_string()));
        } else {
            report.unmatched_a.push(FileName::from(name.to_os_string()));
        }
    }

    for name in side_b {
        let name: &OsStr = name.as_ref();
        if bases_a.contains(&base_name(name)) {
            report.matched_b.push(FileName::from(name.to_os_string()));
        } else {
            report.unmatched_b.push(FileName::from(name.to_os_string()));
        }
    }

    report
}
