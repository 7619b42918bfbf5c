//! # flowbooster CLI
//!
//! Command-line interface for the photo and video organizer.
//!
//! ## Usage
//! ```bash
//! flowbooster organize ./DCIM ./project --copy --readme
//! flowbooster organize ./DCIM ./project --by-date month --output json
//! ```

mod cli;

use console::style;
use std::process::ExitCode;

fn main() -> ExitCode {
    match cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("error:").red().bold(), e);
            ExitCode::FAILURE
        }
    }
}
