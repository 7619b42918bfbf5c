//! Types for the organize module.

use crate::core::bucket::Granularity;
use crate::core::scanner::ProjectKind;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Operation mode
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OperationMode {
    /// Copy files to destination (keep originals)
    Copy,
    /// Move files to destination
    #[default]
    Move,
}

impl OperationMode {
    pub fn from_copy_flag(copy: bool) -> Self {
        if copy {
            Self::Copy
        } else {
            Self::Move
        }
    }
}

/// What to do when the destination already holds a file with the same name
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    /// Replace the existing file
    #[default]
    Overwrite,
    /// Leave both files alone and log the file as skipped
    Skip,
    /// Stop the run
    Fail,
    /// Transfer under the first free `name_N.ext`
    Rename,
}

/// Outcome of one file transfer
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TransferAction {
    Moved,
    Copied,
    Skipped,
}

impl TransferAction {
    pub fn for_mode(mode: OperationMode) -> Self {
        match mode {
            OperationMode::Copy => Self::Copied,
            OperationMode::Move => Self::Moved,
        }
    }
}

impl fmt::Display for TransferAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Moved => "Moved",
            Self::Copied => "Copied",
            Self::Skipped => "Skipped",
        };
        f.write_str(name)
    }
}

/// One line of the transfer log
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransferLogEntry {
    pub filename: String,
    /// Category label (`JPG`, `RAW`, `VIDEO`) or bucket label
    pub label: String,
    pub action: TransferAction,
    pub destination: PathBuf,
    /// Effective date, date mode only
    pub timestamp: Option<NaiveDateTime>,
}

/// Folders computed for a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructureLayout {
    /// Folders this run asked to create, in creation order
    pub created: Vec<PathBuf>,
    /// Every known target keyed by folder key (`jpg`, `raw`, `videos`) or bucket label
    pub targets: BTreeMap<String, PathBuf>,
}

impl StructureLayout {
    pub fn target(&self, key: &str) -> Option<&PathBuf> {
        self.targets.get(key)
    }
}

/// Caller choices shared by both organization modes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct OrganizeOptions {
    pub operation: OperationMode,
    /// Create every category folder, even without files (type mode)
    pub create_all: bool,
    pub include_readme: bool,
    pub conflict: ConflictPolicy,
}

/// How the destination is laid out
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OrganizeMode {
    ByType,
    ByDate(Granularity),
}

/// Result of a completed run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub mode: OrganizeMode,
    /// Type mode only
    pub project_kind: Option<ProjectKind>,
    pub entries: Vec<TransferLogEntry>,
    pub folders_created: Vec<PathBuf>,
    /// Date mode: media files that could not be stat'd
    pub excluded: usize,
    pub log_path: PathBuf,
    pub manifest_path: PathBuf,
    pub duration_ms: u64,
}

impl RunSummary {
    pub fn transferred(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.action != TransferAction::Skipped)
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.entries.len() - self.transferred()
    }
}

/// "Nothing to do" is a normal result, not an error
#[derive(Debug, Clone)]
pub enum OrganizeOutcome {
    NothingToDo,
    Completed(RunSummary),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copy_flag_selects_mode() {
        assert_eq!(OperationMode::from_copy_flag(true), OperationMode::Copy);
        assert_eq!(OperationMode::from_copy_flag(false), OperationMode::Move);
    }

    #[test]
    fn action_matches_mode() {
        assert_eq!(TransferAction::for_mode(OperationMode::Copy).to_string(), "Copied");
        assert_eq!(TransferAction::for_mode(OperationMode::Move).to_string(), "Moved");
    }

    #[test]
    fn conflict_policy_defaults_to_overwrite() {
        assert_eq!(ConflictPolicy::default(), ConflictPolicy::Overwrite);
    }
}
