//! Zip writing with deflate and optional AES-256.

use super::plan::ArchivePlan;
use crate::error::ArchiveError;
use crate::events::{ArchiveEvent, Event, EventSender};
use std::fs::File;
use std::io::{self, Seek, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{AesMode, CompressionMethod, ZipWriter};

/// Write every planned member into `out`.
///
/// `label` is only used for error messages; `out` is normally a temporary
/// file that gets published once this returns.
pub(crate) fn write_members(
    plan: &ArchivePlan,
    out: &mut File,
    password: Option<&str>,
    label: &Path,
    events: &EventSender,
) -> Result<u64, ArchiveError> {
    let zip_error = |source| ArchiveError::Zip {
        path: label.to_path_buf(),
        source,
    };

    let total = plan.len();
    let mut zip = ZipWriter::new(&mut *out);

    for (i, member) in plan.members().iter().enumerate() {
        let base = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .large_file(member.size >= u64::from(u32::MAX));
        let options = match password {
            Some(password) => base.with_aes_encryption(AesMode::Aes256, password),
            None => base,
        };

        zip.start_file(member.name.as_str(), options)
            .map_err(zip_error)?;

        let mut input = File::open(&member.path).map_err(|source| ArchiveError::ReadSource {
            path: member.path.clone(),
            source,
        })?;
        io::copy(&mut input, &mut zip).map_err(|source| ArchiveError::ReadSource {
            path: member.path.clone(),
            source,
        })?;

        events.send(Event::Archive(ArchiveEvent::MemberAdded {
            name: member.name.clone(),
            completed: i + 1,
            total,
        }));
    }

    let out = zip.finish().map_err(zip_error)?;

    let write_error = |source| ArchiveError::Write {
        path: label.to_path_buf(),
        source,
    };
    out.flush().map_err(write_error)?;
    out.sync_all().map_err(write_error)?;
    let size = out.stream_position().map_err(write_error)?;

    tracing::debug!(
        members = total,
        bytes = size,
        encrypted = password.is_some(),
        "archive written"
    );
    Ok(size)
}
