//! # Flowbooster
//!
//! Sorts a folder of photos and videos into a tidy project structure.
//!
//! ## What it does
//! - **By type** - `img/jpg`, `img/raw` and `videos`, with an optional README per folder
//! - **By date** - one folder per day, ISO week, month or year, from EXIF capture time
//! - **Reports** - a Markdown log and a JSON manifest for every run
//! - **Pairing** - matches JPG/RAW sets across two folders by base name
//! - **Archives** - zip packaging with optional AES password and volume splitting
//!
//! ## Architecture
//! - `core` - The organizer engine
//! - `events` - Progress reporting for front ends
//! - `error` - Error types
//! - `cli` - Command-line interface (binary only)

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{FlowboosterError, Result};

/// Initialize tracing for the library
///
/// This should be called by the application entry point. `RUST_LOG` wins
/// over `verbose` when set.
pub fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
