//! # Config Module
//!
//! Immutable settings shared by every component of a run: the extension
//! tables and the canned README texts.
//!
//! The configuration is built once at startup and passed by reference.
//! It can be loaded from a JSON file; any field left out keeps its default.
//!
//! ```json
//! { "extensions": { "image_raw": ["cr2", "nef", "arw", "raw", "dng"] } }
//! ```

use crate::core::classify::{ExtensionTable, FileCategory};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File name looked up inside the per-user configuration directory
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Canned README contents, keyed by destination kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadmeTexts {
    pub jpg: String,
    pub raw: String,
    pub videos: String,
    /// Date-bucket README; `{label}` is replaced by the bucket name
    pub date: String,
}

impl Default for ReadmeTexts {
    fn default() -> Self {
        Self {
            jpg: "### Standard images\n\nThis folder holds images in standard formats (JPG, PNG).\n"
                .to_string(),
            raw: "### RAW images\n\nThis folder holds RAW images straight from the camera.\n"
                .to_string(),
            videos: "### Videos\n\nThis folder holds every video file of the project.\n"
                .to_string(),
            date: "### {label}\n\nThis folder holds the photos and videos captured in {label}.\n"
                .to_string(),
        }
    }
}

impl ReadmeTexts {
    /// README text for a type-mode category
    pub fn for_category(&self, category: FileCategory) -> Option<&str> {
        match category {
            FileCategory::ImageStandard => Some(&self.jpg),
            FileCategory::ImageRaw => Some(&self.raw),
            FileCategory::Video => Some(&self.videos),
            FileCategory::Unclassified => None,
        }
    }

    /// README text for a date bucket
    pub fn for_bucket(&self, label: &str) -> String {
        self.date.replace("{label}", label)
    }
}

/// Settings for one organizer process
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganizerConfig {
    pub extensions: ExtensionTable,
    pub readme: ReadmeTexts,
}

impl OrganizerConfig {
    /// Load and validate a configuration file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve the configuration for this process.
    ///
    /// An explicit path must exist. Without one, the per-user file is used
    /// when present and the built-in defaults otherwise.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        match Self::default_path() {
            Some(path) if path.is_file() => {
                tracing::debug!(path = %path.display(), "loading user configuration");
                Self::from_file(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// `{config_dir}/flowbooster/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("flowbooster").join(CONFIG_FILE_NAME))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.extensions.validate()
    }
}
