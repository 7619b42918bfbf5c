//! Physical relocation of reconciled files.
//!
//! This moves files out of the compared folders. There is no undo, so front
//! ends should show [`PairReconciler::preview`] and ask before calling
//! [`PairReconciler::run`].

use super::{reconcile, PairMode, PairReport, Side};
use crate::core::organize::move_file;
use crate::core::scanner::{list_files, FileName};
use crate::error::PairError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const MATCHED_DIR: &str = "matched";
pub const UNMATCHED_DIR: &str = "unmatched";

/// A file that was moved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelocatedFile {
    pub side: Side,
    pub from: PathBuf,
    pub to: PathBuf,
}

/// Result of a relocation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairOutcome {
    pub report: PairReport,
    pub moved: Vec<RelocatedFile>,
    pub matched_dir: PathBuf,
    pub unmatched_dir: PathBuf,
}

/// Lists two folders and sorts their files by base-name match
pub struct PairReconciler;

impl PairReconciler {
    /// Reconcile without touching the filesystem
    pub fn preview(side_a: &Path, side_b: &Path) -> Result<PairReport, PairError> {
        let names_a = Self::list(side_a)?;
        let names_b = Self::list(side_b)?;
        Ok(reconcile(&names_a, &names_b))
    }

    /// Reconcile and move files below `output_root`.
    ///
    /// - [`PairMode::OneSided`]: side A's matched files go to `matched/`, its
    ///   unmatched files to `unmatched/`.
    /// - [`PairMode::Unified`]: unmatched files of both sides go to
    ///   `unmatched/`; matched files stay where they are.
    pub fn run(
        side_a: &Path,
        side_b: &Path,
        output_root: &Path,
        mode: PairMode,
    ) -> Result<PairOutcome, PairError> {
        let report = Self::preview(side_a, side_b)?;

        let matched_dir = output_root.join(MATCHED_DIR);
        let unmatched_dir = output_root.join(UNMATCHED_DIR);

        let mut plan: Vec<(Side, &FileName, &Path)> = Vec::new();
        match mode {
            PairMode::OneSided => {
                plan.extend(report.matched_a.iter().map(|n| (Side::A, n, matched_dir.as_path())));
                plan.extend(report.unmatched_a.iter().map(|n| (Side::A, n, unmatched_dir.as_path())));
            }
            PairMode::Unified => {
                plan.extend(report.unmatched_a.iter().map(|n| (Side::A, n, unmatched_dir.as_path())));
                plan.extend(report.unmatched_b.iter().map(|n| (Side::B, n, unmatched_dir.as_path())));
            }
        }

        let mut moved = Vec::with_capacity(plan.len());
        for (side, name, dir) in plan {
            Self::ensure_dir(dir)?;
            let origin = match side {
                Side::A => side_a,
                Side::B => side_b,
            };
            let from = origin.join(name);
            let to = dir.join(name);

            move_file(&from, &to).map_err(|source| PairError::Move {
                from: from.clone(),
                to: to.clone(),
                source,
            })?;
            tracing::debug!(?side, from = %from.display(), to = %to.display(), "relocated");
            moved.push(RelocatedFile { side, from, to });
        }

        tracing::info!(
            matched = report.matched_bases.len(),
            unmatched_a = report.unmatched_a.len(),
            unmatched_b = report.unmatched_b.len(),
            moved = moved.len(),
            ?mode,
            "folders reconciled"
        );

        Ok(PairOutcome {
            report,
            moved,
            matched_dir,
            unmatched_dir,
        })
    }

    fn list(dir: &Path) -> Result<Vec<FileName>, PairError> {
        list_files(dir).map_err(|source| PairError::List {
            path: dir.to_path_buf(),
            source,
        })
    }

    fn ensure_dir(dir: &Path) -> Result<(), PairError> {
        fs::create_dir_all(dir).map_err(|source| PairError::CreateFolder {
            path: dir.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn folder(root: &Path, name: &str, files: &[&str]) -> PathBuf {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        for file in files {
            fs::write(dir.join(file), file.as_bytes()).unwrap();
        }
        dir
    }

    #[test]
    fn preview_does_not_move_anything() {
        let temp = TempDir::new().unwrap();
        let a = folder(temp.path(), "a", &["img1.jpg", "only_a.png"]);
        let b = folder(temp.path(), "b", &["img1.raw"]);

        let report = PairReconciler::preview(&a, &b).unwrap();

        assert_eq!(report.unmatched_a, vec!["only_a.png"]);
        assert!(a.join("only_a.png").exists());
    }

    #[test]
    fn one_sided_run_sorts_side_a() {
        let temp = TempDir::new().unwrap();
        let a = folder(temp.path(), "a", &["img1.jpg", "img2.cr2", "only_a.png"]);
        let b = folder(temp.path(), "b", &["img1.raw", "only_b.png"]);
        let out = temp.path().join("out");

        let outcome = PairReconciler::run(&a, &b, &out, PairMode::OneSided).unwrap();

        assert_eq!(outcome.moved.len(), 3);
        assert!(out.join("matched/img1.jpg").exists());
        assert!(out.join("unmatched/img2.cr2").exists());
        assert!(out.join("unmatched/only_a.png").exists());
        assert!(b.join("only_b.png").exists());
        assert!(fs::read_dir(&a).unwrap().next().is_none());
    }

    #[test]
    fn unified_run_moves_unmatched_from_both_sides() {
        let temp = TempDir::new().unwrap();
        let a = folder(temp.path(), "a", &["img1.jpg", "only_a.png"]);
        let b = folder(temp.path(), "b", &["img1.raw", "only_b.png"]);
        let out = temp.path().join("out");

        let outcome = PairReconciler::run(&a, &b, &out, PairMode::Unified).unwrap();

        let sides: Vec<_> = outcome.moved.iter().map(|m| m.side).collect();
        assert_eq!(sides, vec![Side::A, Side::B]);
        assert!(out.join("unmatched/only_a.png").exists());
        assert!(out.join("unmatched/only_b.png").exists());
        assert!(a.join("img1.jpg").exists());
        assert!(b.join("img1.raw").exists());
        assert!(!out.join("matched").exists());
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_names_are_relocated() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let temp = TempDir::new().unwrap();
        let a = folder(temp.path(), "a", &["img1.jpg"]);
        let b = folder(temp.path(), "b", &[]);
        let odd_a = OsStr::from_bytes(b"img\xff.jpg");
        let odd_b = OsStr::from_bytes(b"IMG\xff.cr2");
        fs::write(a.join(odd_a), b"a").unwrap();
        fs::write(b.join(odd_b), b"b").unwrap();
        let out = temp.path().join("out");

        let outcome = PairReconciler::run(&a, &b, &out, PairMode::OneSided).unwrap();

        assert_eq!(outcome.report.matched_a.len(), 1);
        assert_eq!(outcome.report.matched_a[0].as_os_str(), odd_a);
        assert!(out.join("matched").join(odd_a).is_file());
        assert!(out.join("unmatched/img1.jpg").is_file());
        assert!(fs::read_dir(&a).unwrap().next().is_none());
    }

    #[test]
    fn missing_folder_is_reported() {
        let temp = TempDir::new().unwrap();
        let a = folder(temp.path(), "a", &[]);

        let result = PairReconciler::preview(&a, Path::new("/nonexistent/side"));

        assert!(matches!(result, Err(PairError::List { .. })));
    }
}
