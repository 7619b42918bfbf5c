//! # Reporter Module
//!
//! Writes the files that document a run into the destination root:
//! - `README.md` per category or bucket folder (optional)
//! - `log.md` with one line per transferred file
//! - `proyecto_info.json`, the run manifest (overwritten every run)

mod export;
mod readme;

pub use export::{
    render_log, write_log, write_manifest, ManifestDetails, ManifestPaths, RunManifest, LOG_FILE,
    MANIFEST_FILE,
};
pub use readme::{write_bucket_readmes, write_category_readmes, README_FILE};

/// Timestamp layout used in reports
pub const REPORT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
