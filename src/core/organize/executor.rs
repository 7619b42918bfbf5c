//! Copies or moves classified files into their target folders.

use super::types::*;
use crate::core::bucket::BucketPlan;
use crate::core::scanner::{FileName, SourceAnalysis};
use crate::error::OrganizeError;
use crate::events::{Event, EventSender, TransferEvent, TransferProgress};
use chrono::NaiveDateTime;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// One unit of work: a file, its label and the folder it goes to
struct Job<'a> {
    filename: &'a FileName,
    label: &'a str,
    target: &'a Path,
    timestamp: Option<NaiveDateTime>,
}

enum Failure {
    Io { destination: PathBuf, source: io::Error },
    Exists { destination: PathBuf },
}

/// Executes transfers for one run
pub struct TransferExecutor {
    operation: OperationMode,
    conflict: ConflictPolicy,
}

impl TransferExecutor {
    pub fn new(operation: OperationMode, conflict: ConflictPolicy) -> Self {
        Self {
            operation,
            conflict,
        }
    }

    /// Transfer every file of a type-mode analysis, category by category
    pub fn execute_typed(
        &self,
        source: &Path,
        analysis: &SourceAnalysis,
        layout: &StructureLayout,
        events: &EventSender,
    ) -> Result<Vec<TransferLogEntry>, OrganizeError> {
        let mut jobs = Vec::with_capacity(analysis.total());
        for (category, files) in analysis.iter() {
            let target = layout
                .target(category.folder_key())
                .ok_or_else(|| OrganizeError::MissingTarget {
                    label: category.label().to_string(),
                })?;
            jobs.extend(files.iter().map(|filename| Job {
                filename,
                label: category.label(),
                target,
                timestamp: None,
            }));
        }

        self.run(source, &jobs, events)
    }

    /// Transfer every file of a bucket plan, bucket by bucket
    pub fn execute_dated(
        &self,
        source: &Path,
        plan: &BucketPlan,
        layout: &StructureLayout,
        events: &EventSender,
    ) -> Result<Vec<TransferLogEntry>, OrganizeError> {
        let mut jobs = Vec::with_capacity(plan.total_files());
        for (label, files) in plan.iter() {
            let target = layout
                .target(label)
                .ok_or_else(|| OrganizeError::MissingTarget {
                    label: label.to_string(),
                })?;
            jobs.extend(files.iter().map(|file| Job {
                filename: &file.name,
                label,
                target,
                timestamp: Some(file.timestamp.value),
            }));
        }

        self.run(source, &jobs, events)
    }

    fn run(
        &self,
        source: &Path,
        jobs: &[Job<'_>],
        events: &EventSender,
    ) -> Result<Vec<TransferLogEntry>, OrganizeError> {
        events.send(Event::Transfer(TransferEvent::Started { total: jobs.len() }));

        let mut entries: Vec<TransferLogEntry> = Vec::with_capacity(jobs.len());

        for (i, job) in jobs.iter().enumerate() {
            let source_path = source.join(job.filename);

            let (action, destination) = match self.transfer_one(&source_path, job.target, job.filename) {
                Ok(done) => done,
                Err(Failure::Io { destination, source }) => {
                    tracing::error!(file = %job.filename, error = %source, "transfer failed");
                    return Err(OrganizeError::Transfer {
                        filename: job.filename.to_string(),
                        destination,
                        source,
                        completed: entries,
                    });
                }
                Err(Failure::Exists { destination }) => {
                    return Err(OrganizeError::DestinationExists {
                        path: destination,
                        completed: entries,
                    });
                }
            };

            tracing::debug!(file = %job.filename, label = job.label, %action, "transferred");
            entries.push(TransferLogEntry {
                filename: job.filename.to_string(),
                label: job.label.to_string(),
                action,
                destination,
                timestamp: job.timestamp,
            });

            events.send(Event::Transfer(TransferEvent::Progress(TransferProgress {
                completed: i + 1,
                total: jobs.len(),
                filename: job.filename.to_string(),
            })));
        }

        let skipped = entries
            .iter()
            .filter(|e| e.action == TransferAction::Skipped)
            .count();
        events.send(Event::Transfer(TransferEvent::Completed {
            transferred: entries.len() - skipped,
            skipped,
        }));

        Ok(entries)
    }

    fn transfer_one(
        &self,
        source_path: &Path,
        target: &Path,
        filename: &FileName,
    ) -> Result<(TransferAction, PathBuf), Failure> {
        let mut dest_path = target.join(filename);

        if dest_path.exists() {
            match self.conflict {
                ConflictPolicy::Overwrite => {}
                ConflictPolicy::Skip => {
                    tracing::info!(path = %dest_path.display(), "destination exists, skipping");
                    return Ok((TransferAction::Skipped, dest_path));
                }
                ConflictPolicy::Fail => return Err(Failure::Exists { destination: dest_path }),
                ConflictPolicy::Rename => dest_path = unique_path(&dest_path),
            }
        }

        let result = match self.operation {
            OperationMode::Copy => copy_preserving(source_path, &dest_path),
            OperationMode::Move => move_file(source_path, &dest_path),
        };

        match result {
            Ok(()) => Ok((TransferAction::for_mode(self.operation), dest_path)),
            Err(source) => Err(Failure::Io {
                destination: dest_path,
                source,
            }),
        }
    }
}

/// Copy a file and carry over its modification time
fn copy_preserving(source: &Path, dest: &Path) -> io::Result<()> {
    fs::copy(source, dest)?;

    let modified = fs::metadata(source)?.modified()?;
    if let Err(e) = fs::File::options()
        .write(true)
        .open(dest)
        .and_then(|f| f.set_modified(modified))
    {
        tracing::warn!(path = %dest.display(), error = %e, "could not preserve modification time");
    }
    Ok(())
}

/// Rename, falling back to copy + verify + delete across filesystems
pub(crate) fn move_file(source: &Path, dest: &Path) -> io::Result<()> {
    if fs::rename(source, dest).is_ok() {
        return Ok(());
    }

    let source_size = fs::metadata(source)?.len();
    copy_preserving(source, dest)?;

    let dest_size = fs::metadata(dest)?.len();
    if dest_size != source_size {
        // Incomplete copy, keep the source
        let _ = fs::remove_file(dest);
        return Err(io::Error::other(format!(
            "copy verification failed: source {} bytes, dest {} bytes",
            source_size, dest_size
        )));
    }

    fs::remove_file(source)
}

/// First `stem_N.ext` next to `path` that does not exist yet
fn unique_path(path: &Path) -> PathBuf {
    let stem = path.file_stem().unwrap_or(OsStr::new("file"));
    let parent = path.parent().unwrap_or(Path::new(""));

    let mut counter = 1;
    loop {
        let mut new_name = OsString::from(stem);
        new_name.push(format!("_{}", counter));
        if let Some(ext) = path.extension() {
            new_name.push(".");
            new_name.push(ext);
        }
        let new_path = parent.join(new_name);
        if !new_path.exists() {
            return new_path;
        }
        counter += 1;
    }
}
