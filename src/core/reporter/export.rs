//! Transfer log and run manifest.

use super::REPORT_TIME_FORMAT;
use crate::core::bucket::{BucketPlan, Granularity};
use crate::core::organize::TransferLogEntry;
use crate::core::scanner::{ProjectKind, SourceAnalysis};
use crate::error::ReportError;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const LOG_FILE: &str = "log.md";
pub const MANIFEST_FILE: &str = "proyecto_info.json";

/// Render the Markdown transfer log
///
/// Line format: ``- `name` → **label** (Moved)``, plus ` — date` when the
/// entry carries an effective date.
pub fn render_log<W: Write>(
    entries: &[TransferLogEntry],
    generated_at: NaiveDateTime,
    mut writer: W,
) -> std::io::Result<()> {
    writeln!(writer, "# Organization log")?;
    writeln!(writer)?;
    writeln!(writer, "Generated on {}", generated_at.format(REPORT_TIME_FORMAT))?;
    writeln!(writer)?;
    writeln!(writer, "## Processed files")?;
    writeln!(writer)?;

    for entry in entries {
        write!(
            writer,
            "- `{}` → **{}** ({})",
            entry.filename, entry.label, entry.action
        )?;
        if let Some(ts) = entry.timestamp {
            write!(writer, " — {}", ts.format(REPORT_TIME_FORMAT))?;
        }
        writeln!(writer)?;
    }

    writer.flush()
}

/// Write `log.md` into `dest`
pub fn write_log(
    dest: &Path,
    entries: &[TransferLogEntry],
    generated_at: NaiveDateTime,
) -> Result<PathBuf, ReportError> {
    let path = dest.join(LOG_FILE);
    let to_report = |source| ReportError::Write {
        path: path.clone(),
        source,
    };

    let file = File::create(&path).map_err(to_report)?;
    render_log(entries, generated_at, BufWriter::new(file)).map_err(to_report)?;

    tracing::debug!(path = %path.display(), lines = entries.len(), "log written");
    Ok(path)
}

/// Source and destination of a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestPaths {
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// Mode-specific part of the manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "organization", rename_all = "snake_case")]
pub enum ManifestDetails {
    ByType {
        project_type: ProjectKind,
        file_counts: BTreeMap<String, usize>,
    },
    ByDate {
        granularity: Granularity,
        total_files: usize,
        bucket_counts: BTreeMap<String, usize>,
    },
}

/// Run metadata written as `proyecto_info.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: String,
    #[serde(flatten)]
    pub details: ManifestDetails,
    pub created_at: String,
    pub paths: ManifestPaths,
}

impl RunManifest {
    fn new(details: ManifestDetails, source: &Path, dest: &Path, created_at: NaiveDateTime) -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
            details,
            created_at: created_at.format(REPORT_TIME_FORMAT).to_string(),
            paths: ManifestPaths {
                source: source.to_path_buf(),
                destination: dest.to_path_buf(),
            },
        }
    }

    pub fn for_type_run(
        analysis: &SourceAnalysis,
        source: &Path,
        dest: &Path,
        created_at: NaiveDateTime,
    ) -> Self {
        let details = ManifestDetails::ByType {
            project_type: analysis.project_kind(),
            file_counts: analysis.counts(),
        };
        Self::new(details, source, dest, created_at)
    }

    pub fn for_date_run(plan: &BucketPlan, source: &Path, dest: &Path, created_at: NaiveDateTime) -> Self {
        let details = ManifestDetails::ByDate {
            granularity: plan.granularity,
            total_files: plan.total_files(),
            bucket_counts: plan.counts(),
        };
        Self::new(details, source, dest, created_at)
    }
}

/// Write the manifest as 4-space indented UTF-8 JSON, replacing any previous one
pub fn write_manifest(dest: &Path, manifest: &RunManifest) -> Result<PathBuf, ReportError> {
    let path = dest.join(MANIFEST_FILE);
    let to_report = |source| ReportError::Write {
        path: path.clone(),
        source,
    };

    let mut writer = BufWriter::new(File::create(&path).map_err(to_report)?);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut writer, formatter);
    manifest.serialize(&mut serializer)?;
    writer.write_all(b"\n").map_err(to_report)?;
    writer.flush().map_err(to_report)?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::classify::FileCategory;
    use crate::core::organize::TransferAction;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn entry(name: &str, label: &str, action: TransferAction) -> TransferLogEntry {
        TransferLogEntry {
            filename: name.to_string(),
            label: label.to_string(),
            action,
            destination: PathBuf::from("/dest").join(name),
            timestamp: None,
        }
    }

    #[test]
    fn log_lines_follow_format() {
        let entries = vec![
            entry("a.jpg", "JPG", TransferAction::Moved),
            entry("b.mp4", "VIDEO", TransferAction::Copied),
        ];
        let mut out = Vec::new();

        render_log(&entries, noon(), &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("# Organization log\n"));
        assert!(text.contains("Generated on 2024-01-15 12:00:00"));
        assert!(text.contains("- `a.jpg` → **JPG** (Moved)\n"));
        assert!(text.contains("- `b.mp4` → **VIDEO** (Copied)\n"));
    }

    #[test]
    fn date_entries_carry_their_date() {
        let mut dated = entry("a.jpg", "2024-01", TransferAction::Copied);
        dated.timestamp = Some(noon());
        let mut out = Vec::new();

        render_log(&[dated], noon(), &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("- `a.jpg` → **2024-01** (Copied) — 2024-01-15 12:00:00\n"));
    }

    #[test]
    fn manifest_lists_counts_and_paths() {
        let temp = TempDir::new().unwrap();
        let mut analysis = SourceAnalysis::default();
        analysis.push(FileCategory::ImageStandard, "a.jpg".to_string());
        analysis.push(FileCategory::Video, "b.mp4".to_string());
        let manifest = RunManifest::for_type_run(&analysis, Path::new("/src"), temp.path(), noon());

        let path = write_manifest(temp.path(), &manifest).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\n    \"run_id\""));
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["organization"], "by_type");
        assert_eq!(json["project_type"], "mixed");
        assert_eq!(json["file_counts"], serde_json::json!({"JPG": 1, "RAW": 0, "VIDEO": 1}));
        assert_eq!(json["paths"]["source"], "/src");
        assert_eq!(json["created_at"], "2024-01-15 12:00:00");
    }

    #[test]
    fn manifest_is_overwritten() {
        let temp = TempDir::new().unwrap();
        let analysis = SourceAnalysis::default();
        let first = RunManifest::for_type_run(&analysis, Path::new("/one"), temp.path(), noon());
        let second = RunManifest::for_type_run(&analysis, Path::new("/two"), temp.path(), noon());

        write_manifest(temp.path(), &first).unwrap();
        let path = write_manifest(temp.path(), &second).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(json["paths"]["source"], "/two");
        assert_eq!(json["run_id"], second.run_id);
    }
}
