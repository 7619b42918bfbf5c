//! # Metadata Module
//!
//! Resolves the *effective date* of a media file.
//!
//! ## Fallback Chain
//! 1. EXIF `DateTimeOriginal` (images only, format `YYYY:MM:DD HH:MM:SS`)
//! 2. Filesystem last-modified time
//!
//! Resolution never fails for a file that can be stat'd. The reason for a
//! fallback is kept in [`TimestampSource`] so callers can tell a photo
//! without EXIF from a corrupt one.

use crate::core::classify::ExtensionTable;
use chrono::{DateTime, Local, NaiveDateTime};
use exif::{In, Reader, Tag, Value};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::Path;
use thiserror::Error;

/// EXIF date/time layout
pub const EXIF_DATETIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// Why reading the capture time failed
#[derive(Error, Debug)]
pub enum CaptureTimeError {
    #[error("failed to open file: {0}")]
    Io(#[source] io::Error),

    #[error("file carries no EXIF metadata")]
    NoMetadata,

    #[error("unreadable metadata container: {0}")]
    Corrupt(#[source] exif::Error),

    #[error("DateTimeOriginal tag is missing")]
    TagMissing,

    #[error("DateTimeOriginal value {value:?} is not a valid date")]
    Unparseable { value: String },
}

/// Serializable summary of a fallback cause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    /// Not an image type, metadata was never consulted
    NotAnImage,
    NoMetadata,
    TagMissing,
    Unparseable,
    CorruptMetadata,
    Io,
}

impl From<&CaptureTimeError> for FallbackReason {
    fn from(error: &CaptureTimeError) -> Self {
        match error {
            CaptureTimeError::Io(_) => Self::Io,
            CaptureTimeError::NoMetadata => Self::NoMetadata,
            CaptureTimeError::Corrupt(_) => Self::CorruptMetadata,
            CaptureTimeError::TagMissing => Self::TagMissing,
            CaptureTimeError::Unparseable { .. } => Self::Unparseable,
        }
    }
}

/// Where an effective date came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampSource {
    Exif,
    FileModified { reason: FallbackReason },
}

/// The effective date of a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedTimestamp {
    pub value: NaiveDateTime,
    pub source: TimestampSource,
}

impl ResolvedTimestamp {
    pub fn is_from_exif(&self) -> bool {
        matches!(self.source, TimestampSource::Exif)
    }
}

/// Read `DateTimeOriginal` from an image's EXIF block
pub fn read_capture_time(path: &Path) -> Result<NaiveDateTime, CaptureTimeError> {
    let file = File::open(path).map_err(CaptureTimeError::Io)?;
    let mut bufreader = BufReader::new(&file);

    let exif = match Reader::new().read_from_container(&mut bufreader) {
        Ok(exif) => exif,
        Err(exif::Error::NotFound(_)) => return Err(CaptureTimeError::NoMetadata),
        Err(exif::Error::Io(e)) => return Err(CaptureTimeError::Io(e)),
        Err(e) => return Err(CaptureTimeError::Corrupt(e)),
    };

    let field = exif
        .get_field(Tag::DateTimeOriginal, In::PRIMARY)
        .ok_or(CaptureTimeError::TagMissing)?;

    let raw = match field.value {
        Value::Ascii(ref vec) => vec.first().map(|bytes| String::from_utf8_lossy(bytes).into_owned()),
        _ => None,
    }
    .ok_or(CaptureTimeError::TagMissing)?;

    parse_exif_datetime(&raw).ok_or(CaptureTimeError::Unparseable { value: raw })
}

/// Parse an EXIF date string, tolerating trailing NULs and padding
pub fn parse_exif_datetime(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim_end_matches('\0').trim();
    NaiveDateTime::parse_from_str(trimmed, EXIF_DATETIME_FORMAT).ok()
}

/// Last-modified time of a file as local wall-clock time
pub fn modified_time(path: &Path) -> io::Result<NaiveDateTime> {
    let modified = fs::metadata(path)?.modified()?;
    let local: DateTime<Local> = modified.into();
    Ok(local.naive_local())
}

/// Resolve the effective date of `path`.
///
/// Fails only when the file cannot be stat'd.
pub fn resolve_timestamp(path: &Path, table: &ExtensionTable) -> io::Result<ResolvedTimestamp> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();

    let reason = if table.classify(&name).is_image() {
        match read_capture_time(path) {
            Ok(value) => {
                return Ok(ResolvedTimestamp {
                    value,
                    source: TimestampSource::Exif,
                })
            }
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "falling back to modification time");
                FallbackReason::from(&e)
            }
        }
    } else {
        FallbackReason::NotAnImage
    };

    Ok(ResolvedTimestamp {
        value: modified_time(path)?,
        source: TimestampSource::FileModified { reason },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    /// Minimal JPEG whose EXIF block carries only `DateTimeOriginal`
    fn jpeg_with_capture_time(datetime: &str) -> Vec<u8> {
        assert_eq!(datetime.len(), 19);
        let mut tiff: Vec<u8> = Vec::new();
        // Big-endian TIFF header, IFD0 at offset 8
        tiff.extend_from_slice(b"MM\x00\x2A\x00\x00\x00\x08");
        // IFD0: one entry, ExifIFDPointer -> 26
        tiff.extend_from_slice(&[0x00, 0x01]);
        tiff.extend_from_slice(&[0x87, 0x69, 0x00, 0x04, 0x00, 0x00, 0x00, 0x01]);
        tiff.extend_from_slice(&26u32.to_be_bytes());
        tiff.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);
        // Exif IFD: one entry, DateTimeOriginal ASCII[20] at 44
        tiff.extend_from_slice(&[0x00, 0x01]);
        tiff.extend_from_slice(&[0x90, 0x03, 0x00, 0x02, 0x00, 0x00, 0x00, 0x14]);
        tiff.extend_from_slice(&44u32.to_be_bytes());
        tiff.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);
        tiff.extend_from_slice(datetime.as_bytes());
        tiff.push(0);
        assert_eq!(tiff.len(), 64);

        let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xE1];
        let segment_len = (2 + 6 + tiff.len()) as u16;
        jpeg.extend_from_slice(&segment_len.to_be_bytes());
        jpeg.extend_from_slice(b"Exif\x00\x00");
        jpeg.extend_from_slice(&tiff);
        jpeg.extend_from_slice(&[0xFF, 0xD9]);
        jpeg
    }

    fn set_mtime(path: &Path, time: SystemTime) {
        let file = File::options().write(true).open(path).unwrap();
        file.set_modified(time).unwrap();
    }

    #[test]
    fn parses_exif_format() {
        let parsed = parse_exif_datetime("2024:01:15 10:30:00\0").unwrap();
        let expected = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();
        assert_eq!(parsed, expected);
    }

    #[test]
    fn rejects_non_exif_formats() {
        assert!(parse_exif_datetime("2024-01-15 10:30:00").is_none());
        assert!(parse_exif_datetime("0000:00:00 00:00:00").is_none());
        assert!(parse_exif_datetime("").is_none());
    }

    #[test]
    fn reads_capture_time_from_jpeg() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("shot.jpg");
        fs::write(&path, jpeg_with_capture_time("2021:06:15 08:30:00")).unwrap();

        let resolved = resolve_timestamp(&path, &ExtensionTable::default()).unwrap();

        assert!(resolved.is_from_exif());
        assert_eq!(resolved.value.to_string(), "2021-06-15 08:30:00");
    }

    #[test]
    fn corrupt_image_falls_back_to_mtime() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("broken.jpg");
        fs::write(&path, b"this is not a jpeg").unwrap();
        let mtime = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        set_mtime(&path, mtime);

        let resolved = resolve_timestamp(&path, &ExtensionTable::default()).unwrap();

        let expected: DateTime<Local> = mtime.into();
        assert_eq!(resolved.value, expected.naive_local());
        assert!(matches!(
            resolved.source,
            TimestampSource::FileModified { reason } if reason != FallbackReason::NotAnImage
        ));
    }

    #[test]
    fn videos_never_consult_exif() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("clip.mp4");
        fs::write(&path, jpeg_with_capture_time("2021:06:15 08:30:00")).unwrap();

        let resolved = resolve_timestamp(&path, &ExtensionTable::default()).unwrap();

        assert_eq!(
            resolved.source,
            TimestampSource::FileModified {
                reason: FallbackReason::NotAnImage
            }
        );
    }

    #[test]
    fn unparseable_tag_is_reported() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("odd.jpg");
        fs::write(&path, jpeg_with_capture_time("2021-06-15 08:30:00")).unwrap();

        let err = read_capture_time(&path).unwrap_err();
        assert!(matches!(err, CaptureTimeError::Unparseable { .. }));

        let resolved = resolve_timestamp(&path, &ExtensionTable::default()).unwrap();
        assert_eq!(
            resolved.source,
            TimestampSource::FileModified {
                reason: FallbackReason::Unparseable
            }
        );
    }

    #[test]
    fn missing_file_is_the_only_error() {
        let result = resolve_timestamp(Path::new("/nonexistent/a.jpg"), &ExtensionTable::default());
        assert!(result.is_err());
    }
}
