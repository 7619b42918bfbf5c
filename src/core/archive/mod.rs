//! # Archive Module
//!
//! Packages one or more folders into a single deflate-compressed zip,
//! optionally AES-256 encrypted and split into fixed-size volumes.
//!
//! The archive is always written to a temporary file in the destination
//! folder first, so a failed run never leaves a half-written `.zip` behind.

mod plan;
mod volumes;
mod writer;

pub use plan::{ArchivePlan, PlannedMember};
pub use volumes::{discover_volumes, volume_path};

use crate::error::ArchiveError;
use crate::events::{null_sender, ArchiveEvent, Event, EventSender};
use chrono::{DateTime, Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Timestamp format of generated archive names
pub const ARCHIVE_TIME_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

const BYTES_PER_MEGABYTE: u64 = 1024 * 1024;

/// How the archive file is named
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingPolicy {
    /// Caller-supplied name, with or without `.zip`
    Fixed(String),
    /// Time the packager runs
    #[default]
    InvocationTime,
    /// Newest modification time among the packaged files
    LatestModified,
}

impl NamingPolicy {
    /// Archive name without extension
    pub fn resolve(&self, plan: &ArchivePlan, now: NaiveDateTime) -> Result<String, ArchiveError> {
        match self {
            NamingPolicy::Fixed(name) => {
                let trimmed = name.trim();
                let stem = trimmed
                    .strip_suffix(".zip")
                    .or_else(|| trimmed.strip_suffix(".ZIP"))
                    .unwrap_or(trimmed);
                if stem.is_empty() || stem.contains(['/', '\\']) || stem == "." || stem == ".." {
                    return Err(ArchiveError::InvalidName { name: name.clone() });
                }
                Ok(stem.to_string())
            }
            NamingPolicy::InvocationTime => Ok(now.format(ARCHIVE_TIME_FORMAT).to_string()),
            NamingPolicy::LatestModified => {
                let stamp = plan
                    .latest_modified()
                    .map(|t| DateTime::<Local>::from(t).naive_local())
                    .unwrap_or(now);
                Ok(stamp.format(ARCHIVE_TIME_FORMAT).to_string())
            }
        }
    }
}

/// What to package and how
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveRequest {
    pub sources: Vec<PathBuf>,
    /// Folder the archive is written into, created if missing
    pub destination: PathBuf,
    #[serde(default)]
    pub naming: NamingPolicy,
    #[serde(default)]
    pub password: Option<String>,
    /// Per-volume cap in bytes
    #[serde(default)]
    pub volume_size: Option<u64>,
}

impl ArchiveRequest {
    pub fn new(sources: Vec<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            sources,
            destination: destination.into(),
            naming: NamingPolicy::default(),
            password: None,
            volume_size: None,
        }
    }

    pub fn with_naming(mut self, naming: NamingPolicy) -> Self {
        self.naming = naming;
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_volume_size(mut self, bytes: u64) -> Self {
        self.volume_size = Some(bytes);
        self
    }

    fn validate(&self) -> Result<(), ArchiveError> {
        if matches!(self.password.as_deref(), Some("")) {
            return Err(ArchiveError::InvalidPassword);
        }
        if self.volume_size == Some(0) {
            return Err(ArchiveError::InvalidVolumeSize);
        }
        Ok(())
    }
}

/// Bytes in `megabytes` binary megabytes
pub fn split_megabytes(megabytes: u64) -> u64 {
    megabytes.saturating_mul(BYTES_PER_MEGABYTE)
}

/// A written archive
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveReport {
    /// `{name}.zip`, also the first volume
    pub archive_path: PathBuf,
    /// Every file written, in concatenation order
    pub volumes: Vec<PathBuf>,
    pub members: usize,
    /// Uncompressed size of all members
    pub source_bytes: u64,
    pub archive_bytes: u64,
    pub encrypted: bool,
}

impl ArchiveReport {
    pub fn is_split(&self) -> bool {
        self.volumes.len() > 1
    }

    /// Shell command that rebuilds a single archive from split volumes.
    ///
    /// The volumes are a byte split, so zip tools cannot open `{name}.zip`
    /// on its own: the central directory lives in the last volume. Run the
    /// command inside the output folder before extracting.
    pub fn join_command(&self) -> Option<String> {
        if !self.is_split() {
            return None;
        }
        let name = |path: &Path| {
            path.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        };
        let stem = self
            .archive_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let volumes: Vec<String> = self.volumes.iter().map(|v| name(v)).collect();
        Some(format!("cat {} > {}_full.zip", volumes.join(" "), stem))
    }
}

#[derive(Debug, Clone)]
pub enum PackageOutcome {
    /// The sources contain no files
    NothingToDo,
    Written(ArchiveReport),
}

pub struct ArchivePackager;

impl ArchivePackager {
    pub fn package(request: &ArchiveRequest) -> Result<PackageOutcome, ArchiveError> {
        Self::package_with_events(request, &null_sender())
    }

    pub fn package_with_events(
        request: &ArchiveRequest,
        events: &EventSender,
    ) -> Result<PackageOutcome, ArchiveError> {
        request.validate()?;

        let plan = ArchivePlan::build(&request.sources)?;
        if plan.is_empty() {
            tracing::info!(sources = request.sources.len(), "no files to archive");
            return Ok(PackageOutcome::NothingToDo);
        }

        let name = request.naming.resolve(&plan, Local::now().naive_local())?;
        let destination = &request.destination;
        fs::create_dir_all(destination).map_err(|source| ArchiveError::Write {
            path: destination.clone(),
            source,
        })?;
        let archive_path = destination.join(format!("{}.zip", name));

        events.send(Event::Archive(ArchiveEvent::Started {
            members: plan.len(),
            total_bytes: plan.total_bytes(),
        }));

        let mut staged = Self::stage(destination)?;
        let password = request.password.as_deref();
        let size = writer::write_members(
            &plan,
            staged.as_file_mut(),
            password,
            &archive_path,
            events,
        )?;

        volumes::remove_stale_volumes(&archive_path)?;
        let volumes = volumes::publish(staged, &archive_path, size, request.volume_size)?;

        events.send(Event::Archive(ArchiveEvent::Completed {
            volumes: volumes.clone(),
        }));
        tracing::info!(
            archive = %archive_path.display(),
            members = plan.len(),
            volumes = volumes.len(),
            bytes = size,
            "archive created"
        );

        Ok(PackageOutcome::Written(ArchiveReport {
            archive_path,
            volumes,
            members: plan.len(),
            source_bytes: plan.total_bytes(),
            archive_bytes: size,
            encrypted: password.is_some(),
        }))
    }

    fn stage(destination: &Path) -> Result<NamedTempFile, ArchiveError> {
        tempfile::Builder::new()
            .prefix(".flowbooster-")
            .suffix(".zip.part")
            .tempfile_in(destination)
            .map_err(|source| ArchiveError::Write {
                path: destination.to_path_buf(),
                source,
            })
    }
}
