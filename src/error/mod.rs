//! # Error Module
//!
//! Error types for the Flowbooster organizer.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths and file names always appear in the message
//! - **"Nothing to do" is not an error** - empty sources are normal outcomes,
//!   see `OrganizeOutcome` and `PackageOutcome`

use crate::core::organize::TransferLogEntry;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum FlowboosterError {
    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Organization error: {0}")]
    Organize(#[from] OrganizeError),

    #[error("Report generation error: {0}")]
    Report(#[from] ReportError),

    #[error("Folder comparison error: {0}")]
    Pair(#[from] PairError),

    #[error("Archive error: {0}")]
    Archive(#[from] ArchiveError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors that occur while listing a source directory
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Permission denied accessing: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to read directory {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that abort an organization run
#[derive(Error, Debug)]
pub enum OrganizeError {
    #[error("Failed to create folder {path}: {source}")]
    CreateFolder {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A single failed transfer stops the run. Entries for files that were
    /// already transferred are kept so the caller can still report them.
    #[error("Failed to transfer {filename} to {destination}: {source}")]
    Transfer {
        filename: String,
        destination: PathBuf,
        #[source]
        source: std::io::Error,
        completed: Vec<TransferLogEntry>,
    },

    #[error("Destination already holds {path} (conflict policy: fail)")]
    DestinationExists {
        path: PathBuf,
        completed: Vec<TransferLogEntry>,
    },

    #[error("No target folder for {label}")]
    MissingTarget { label: String },
}

impl OrganizeError {
    /// Entries completed before the run stopped, if any
    pub fn completed_entries(&self) -> &[TransferLogEntry] {
        match self {
            Self::Transfer { completed, .. } | Self::DestinationExists { completed, .. } => {
                completed
            }
            _ => &[],
        }
    }
}

/// Errors that occur during report generation
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize run manifest: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Errors from folder-pair reconciliation
#[derive(Error, Debug)]
pub enum PairError {
    #[error("Failed to list {path}: {source}")]
    List {
        path: PathBuf,
        #[source]
        source: ScanError,
    },

    #[error("Failed to create output folder {path}: {source}")]
    CreateFolder {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to move {from} to {to}: {source}")]
    Move {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that occur while building an archive
#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("Archive source not found: {path}")]
    SourceNotFound { path: PathBuf },

    #[error("Failed to read archive source {path}: {source}")]
    ReadSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Two sources produce the same archive member: {name}")]
    DuplicateMember { name: String },

    #[error("Archive password must not be empty")]
    InvalidPassword,

    #[error("Volume size must be greater than zero")]
    InvalidVolumeSize,

    #[error("Archive name must not be empty or contain path separators: {name:?}")]
    InvalidName { name: String },

    #[error("Failed to write archive {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Compression failed for {path}: {source}")]
    Zip {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
}

/// Configuration loading and validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Extension .{extension} is listed in more than one category")]
    OverlappingExtension { extension: String },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, FlowboosterError>;
