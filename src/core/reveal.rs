//! Opening a folder in the platform file browser.

use std::path::Path;
use std::process::Command;

#[cfg(target_os = "windows")]
const OPENER: &str = "explorer";
#[cfg(target_os = "macos")]
const OPENER: &str = "open";
#[cfg(not(any(target_os = "windows", target_os = "macos")))]
const OPENER: &str = "xdg-open";

/// Ask the desktop to show `path`.
///
/// Best effort: the opener is spawned and not waited on. Returns `false`
/// when the folder is missing or the opener could not be started.
pub fn reveal_folder(path: &Path) -> bool {
    if !path.is_dir() {
        tracing::warn!(path = %path.display(), "cannot reveal, not a folder");
        return false;
    }

    match Command::new(OPENER).arg(path).spawn() {
        Ok(_) => {
            tracing::debug!(path = %path.display(), opener = OPENER, "folder revealed");
            true
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), opener = OPENER, error = %e, "could not open file browser");
            false
        }
    }
}
