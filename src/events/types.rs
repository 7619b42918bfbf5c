//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by the organizer and the packager
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Source scanning
    Scan(ScanEvent),
    /// File copy/move phase
    Transfer(TransferEvent),
    /// Archive packaging
    Archive(ArchiveEvent),
}

/// Events while reading the source folder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScanEvent {
    Started { path: PathBuf },
    Completed { total_files: usize },
}

/// Events while transferring files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TransferEvent {
    Started { total: usize },
    /// Sent after each file
    Progress(TransferProgress),
    Completed { transferred: usize, skipped: usize },
}

/// Progress information during transfer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferProgress {
    /// Files handled so far
    pub completed: usize,
    pub total: usize,
    /// File just handled
    pub filename: String,
}

/// Events while writing an archive
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ArchiveEvent {
    Started { members: usize, total_bytes: u64 },
    /// Sent after each member
    MemberAdded {
        name: String,
        completed: usize,
        total: usize,
    },
    Completed { volumes: Vec<PathBuf> },
}
