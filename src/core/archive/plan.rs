//! Member planning: which files go into the archive and under which name.

use crate::error::ArchiveError;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

/// One file scheduled for the archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedMember {
    /// Absolute (or caller-relative) path on disk
    pub path: PathBuf,
    /// Name inside the archive, `/`-separated
    pub name: String,
    pub size: u64,
    pub modified: SystemTime,
}

/// Ordered list of archive members
#[derive(Debug, Clone, Default)]
pub struct ArchivePlan {
    members: Vec<PlannedMember>,
}

impl ArchivePlan {
    /// Enumerate every regular file below `sources`.
    ///
    /// With more than one source, member names are prefixed with the
    /// source's folder name so identical relative paths stay apart.
    pub fn build(sources: &[PathBuf]) -> Result<Self, ArchiveError> {
        let prefixed = sources.len() > 1;
        let mut members = Vec::new();
        let mut seen = HashSet::new();

        for source in sources {
            if !source.exists() {
                return Err(ArchiveError::SourceNotFound {
                    path: source.clone(),
                });
            }

            let prefix = if prefixed {
                Some(source_label(source)?)
            } else {
                None
            };

            for member in enumerate(source, prefix.as_deref())? {
                if !seen.insert(member.name.clone()) {
                    return Err(ArchiveError::DuplicateMember { name: member.name });
                }
                members.push(member);
            }
        }

        tracing::debug!(sources = sources.len(), members = members.len(), "archive planned");
        Ok(Self { members })
    }

    pub fn members(&self) -> &[PlannedMember] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn total_bytes(&self) -> u64 {
        self.members.iter().map(|m| m.size).sum()
    }

    /// Newest modification time among the members
    pub fn latest_modified(&self) -> Option<SystemTime> {
        self.members.iter().map(|m| m.modified).max()
    }
}

fn enumerate(source: &Path, prefix: Option<&str>) -> Result<Vec<PlannedMember>, ArchiveError> {
    let mut members = Vec::new();

    for entry in WalkDir::new(source).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(source).to_path_buf();
            let source = e
                .into_io_error()
                .unwrap_or_else(|| io::Error::other("filesystem loop"));
            ArchiveError::ReadSource { path, source }
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        let metadata = fs::metadata(entry.path()).map_err(|e| ArchiveError::ReadSource {
            path: entry.path().to_path_buf(),
            source: e,
        })?;
        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);

        let relative = if entry.depth() == 0 {
            // The source itself is a file
            PathBuf::from(entry.file_name())
        } else {
            entry
                .path()
                .strip_prefix(source)
                .map(Path::to_path_buf)
                .unwrap_or_else(|_| PathBuf::from(entry.file_name()))
        };

        let mut name = member_name(&relative);
        if let Some(prefix) = prefix {
            if entry.depth() > 0 {
                name = format!("{}/{}", prefix, name);
            }
        }

        members.push(PlannedMember {
            path: entry.into_path(),
            name,
            size: metadata.len(),
            modified,
        });
    }

    Ok(members)
}

/// `/`-joined normal components of a relative path
fn member_name(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn source_label(source: &Path) -> Result<String, ArchiveError> {
    if let Some(name) = source.file_name() {
        return Ok(name.to_string_lossy().into_owned());
    }

    // `.`, `..` or a root: use the resolved folder name
    let resolved = source
        .canonicalize()
        .map_err(|e| ArchiveError::ReadSource {
            path: source.to_path_buf(),
            source: e,
        })?;
    Ok(resolved
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "root".to_string()))
}
