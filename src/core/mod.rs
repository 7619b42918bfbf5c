//! # Core Module
//!
//! The front-end-agnostic organizer engine.
//!
//! ## Modules
//! - `classify` - Maps file extensions to media categories
//! - `metadata` - Resolves capture timestamps (EXIF, then mtime)
//! - `scanner` - Lists a source folder by type or by date
//! - `bucket` - Names calendar buckets (day, ISO week, month, year)
//! - `organize` - Builds folder structures and copies/moves files
//! - `reporter` - Writes READMEs, the run log and the JSON manifest
//! - `pairing` - Matches two folders by base name
//! - `archive` - Packages folders into zip archives and volumes
//! - `config` - Extension table and README texts
//! - `reveal` - Opens folders in the file browser

pub mod archive;
pub mod bucket;
pub mod classify;
pub mod config;
pub mod metadata;
pub mod organize;
pub mod pairing;
pub mod reporter;
pub mod reveal;
pub mod scanner;

// Re-export commonly used types
pub use archive::{ArchivePackager, ArchiveRequest, NamingPolicy, PackageOutcome};
pub use bucket::{bucket_label, BucketPlan, Granularity};
pub use classify::{ExtensionTable, FileCategory};
pub use config::OrganizerConfig;
pub use metadata::{resolve_timestamp, ResolvedTimestamp, TimestampSource};
pub use organize::{ConflictPolicy, OperationMode, OrganizeOptions, OrganizeOutcome, Organizer};
pub use pairing::{reconcile, PairMode, PairReconciler, PairReport};
pub use reveal::reveal_folder;
pub use scanner::{FileName, ProjectKind, SourceAnalysis};
