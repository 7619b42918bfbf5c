//! # CLI Module
//!
//! Command-line interface for Flowbooster.
//!
//! ## Usage
//! ```bash
//! # Sort a memory card dump by type, keeping the originals
//! flowbooster organize /media/card/DCIM ~/Projects/wedding --copy --readme
//!
//! # One folder per ISO week
//! flowbooster organize ./dump ./by-week --by-date week
//!
//! # Preview, then move, JPG files without a RAW partner
//! flowbooster pair ./jpg ./raw --dest ./review
//! flowbooster pair ./jpg ./raw --dest ./review --yes
//!
//! # Password-protected archive in 100 MB volumes
//! flowbooster archive ./img ./videos --dest ./out --password hunter2 --split-mb 100
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use flowbooster::core::archive::{
    split_megabytes, ArchivePackager, ArchiveReport, ArchiveRequest, NamingPolicy, PackageOutcome,
};
use flowbooster::core::bucket::Granularity;
use flowbooster::core::config::OrganizerConfig;
use flowbooster::core::organize::{
    ConflictPolicy, OperationMode, OrganizeMode, OrganizeOptions, OrganizeOutcome, Organizer,
    RunSummary,
};
use flowbooster::core::pairing::{PairMode, PairOutcome, PairReconciler, PairReport};
use flowbooster::core::reveal::reveal_folder;
use flowbooster::core::scanner::FileName;
use flowbooster::error::{FlowboosterError, ReportError, Result};
use flowbooster::events::{ArchiveEvent, Event, EventChannel, EventReceiver, ScanEvent, TransferEvent};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

/// Flowbooster - Sort photo and video dumps into projects
#[derive(Parser, Debug)]
#[command(name = "flowbooster")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to the per-user config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "pretty")]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sort a folder by media type or by date
    Organize {
        /// Folder with the files to sort (not recursive)
        source: PathBuf,

        /// Project folder to sort into
        dest: PathBuf,

        /// Copy instead of move
        #[arg(long)]
        copy: bool,

        /// Create every category folder, even empty ones
        #[arg(long)]
        all_folders: bool,

        /// Write a README.md into each folder
        #[arg(long)]
        readme: bool,

        /// Sort into date folders instead of type folders
        #[arg(long, value_name = "GRANULARITY")]
        by_date: Option<DateGranularity>,

        /// What to do when a file already exists in the destination
        #[arg(long, default_value = "overwrite")]
        on_conflict: Conflict,

        /// Open the destination when done
        #[arg(long)]
        open: bool,
    },

    /// Compare two folders by base name and set aside unmatched files
    Pair {
        /// First folder (the one that gets sorted)
        side_a: PathBuf,

        /// Second folder
        side_b: PathBuf,

        /// Folder receiving matched/ and unmatched/
        #[arg(short, long)]
        dest: PathBuf,

        /// Move unmatched files of both folders, leave matched ones in place
        #[arg(long)]
        unified: bool,

        /// Actually move files (otherwise only the preview is shown)
        #[arg(short, long)]
        yes: bool,
    },

    /// Package folders into a zip archive
    Archive {
        /// Folders (or files) to package
        #[arg(required = true)]
        sources: Vec<PathBuf>,

        /// Folder the archive is written into
        #[arg(short, long)]
        dest: PathBuf,

        /// Archive name (without .zip)
        #[arg(long, conflicts_with = "name_from")]
        name: Option<String>,

        /// Derive the name from a timestamp
        #[arg(long, value_name = "SOURCE")]
        name_from: Option<NameFrom>,

        /// Encrypt members with AES-256
        #[arg(long)]
        password: Option<String>,

        /// Split into volumes of this many megabytes
        #[arg(long, value_name = "MB")]
        split_mb: Option<u64>,

        /// Open the destination when done
        #[arg(long)]
        open: bool,
    },

    /// Open a folder in the file browser
    Reveal {
        /// Folder to show
        dir: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DateGranularity {
    /// One folder per day (YYYY-MM-DD)
    Day,
    /// One folder per ISO week (YYYY-Www)
    Week,
    /// One folder per month (YYYY-MM)
    Month,
    /// One folder per year (YYYY)
    Year,
}

impl From<DateGranularity> for Granularity {
    fn from(g: DateGranularity) -> Self {
        match g {
            DateGranularity::Day => Granularity::Day,
            DateGranularity::Week => Granularity::Week,
            DateGranularity::Month => Granularity::Month,
            DateGranularity::Year => Granularity::Year,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Conflict {
    /// Replace the existing file
    Overwrite,
    /// Keep the existing file
    Skip,
    /// Stop the run
    Fail,
    /// Store as name_1.ext, name_2.ext, ...
    Rename,
}

impl From<Conflict> for ConflictPolicy {
    fn from(c: Conflict) -> Self {
        match c {
            Conflict::Overwrite => ConflictPolicy::Overwrite,
            Conflict::Skip => ConflictPolicy::Skip,
            Conflict::Fail => ConflictPolicy::Fail,
            Conflict::Rename => ConflictPolicy::Rename,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum NameFrom {
    /// Current date and time
    Now,
    /// Newest modification time among the files
    Latest,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
}

impl OutputFormat {
    fn is_pretty(self) -> bool {
        matches!(self, OutputFormat::Pretty)
    }
}

/// JSON envelope for every command
#[derive(Serialize)]
struct JsonReport<'a, T: Serialize> {
    status: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<&'a T>,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    flowbooster::init_tracing(cli.verbose);

    let term = Term::stderr();
    let output = cli.output;

    match cli.command {
        Commands::Organize {
            source,
            dest,
            copy,
            all_folders,
            readme,
            by_date,
            on_conflict,
            open,
        } => {
            let config = OrganizerConfig::load(cli.config.as_deref())?;
            let options = OrganizeOptions {
                operation: OperationMode::from_copy_flag(copy),
                create_all: all_folders,
                include_readme: readme,
                conflict: on_conflict.into(),
            };
            run_organize(
                &term,
                &config,
                &source,
                &dest,
                by_date.map(Granularity::from),
                &options,
                output,
                cli.verbose,
            )?;
            if open {
                reveal(&term, &dest, output);
            }
            Ok(())
        }
        Commands::Pair {
            side_a,
            side_b,
            dest,
            unified,
            yes,
        } => {
            let mode = if unified {
                PairMode::Unified
            } else {
                PairMode::OneSided
            };
            run_pair(&term, &side_a, &side_b, &dest, mode, yes, output)
        }
        Commands::Archive {
            sources,
            dest,
            name,
            name_from,
            password,
            split_mb,
            open,
        } => {
            let naming = match (name, name_from) {
                (Some(name), _) => NamingPolicy::Fixed(name),
                (None, Some(NameFrom::Latest)) => NamingPolicy::LatestModified,
                (None, _) => NamingPolicy::InvocationTime,
            };
            let mut request = ArchiveRequest::new(sources, &dest).with_naming(naming);
            if let Some(password) = password {
                request = request.with_password(password);
            }
            if let Some(mb) = split_mb {
                request = request.with_volume_size(split_megabytes(mb));
            }
            run_archive(&term, &request, output)?;
            if open {
                reveal(&term, &dest, output);
            }
            Ok(())
        }
        Commands::Reveal { dir } => {
            reveal(&term, &dir, output);
            Ok(())
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn run_organize(
    term: &Term,
    config: &OrganizerConfig,
    source: &Path,
    dest: &Path,
    by_date: Option<Granularity>,
    options: &OrganizeOptions,
    output: OutputFormat,
    verbose: bool,
) -> Result<()> {
    if output.is_pretty() {
        print_header(term);
    }

    let (sender, receiver) = EventChannel::new();
    let progress = progress_bar(output);
    let event_thread = spawn_progress(receiver, progress.clone(), verbose);

    let organizer = Organizer::new(config);
    let result = match by_date {
        Some(granularity) => {
            organizer.organize_by_date_with_events(source, dest, granularity, options, &sender)
        }
        None => organizer.organize_by_type_with_events(source, dest, options, &sender),
    };

    // Drop sender to signal event thread to finish
    drop(sender);
    event_thread.join().ok();
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(e) => {
            if let FlowboosterError::Organize(ref inner) = e {
                let done = inner.completed_entries().len();
                if done > 0 && output.is_pretty() {
                    term.write_line(&format!(
                        "{} {} files were transferred before the failure",
                        style("!").yellow().bold(),
                        done
                    ))
                    .ok();
                }
            }
            return Err(e);
        }
    };

    match (outcome, output) {
        (OrganizeOutcome::NothingToDo, OutputFormat::Pretty) => {
            print_nothing_to_do(term, "No photos or videos found in the source folder")
        }
        (OrganizeOutcome::NothingToDo, OutputFormat::Json) => {
            print_json::<RunSummary>("nothing_to_do", None)?
        }
        (OrganizeOutcome::Completed(summary), OutputFormat::Pretty) => {
            print_organize_summary(term, &summary, verbose)
        }
        (OrganizeOutcome::Completed(summary), OutputFormat::Json) => {
            print_json("completed", Some(&summary))?
        }
    }

    Ok(())
}

fn run_pair(
    term: &Term,
    side_a: &Path,
    side_b: &Path,
    dest: &Path,
    mode: PairMode,
    confirmed: bool,
    output: OutputFormat,
) -> Result<()> {
    if !confirmed {
        let report = PairReconciler::preview(side_a, side_b)?;
        match output {
            OutputFormat::Pretty => {
                print_header(term);
                print_pair_report(term, &report, mode);
                term.write_line("").ok();
                term.write_line(&format!(
                    "{}",
                    style("Preview only. Run again with --yes to move these files.").dim()
                ))
                .ok();
            }
            OutputFormat::Json => print_json("preview", Some(&report))?,
        }
        return Ok(());
    }

    let outcome = PairReconciler::run(side_a, side_b, dest, mode)?;
    match output {
        OutputFormat::Pretty => {
            print_header(term);
            print_pair_report(term, &outcome.report, mode);
            print_pair_outcome(term, &outcome);
        }
        OutputFormat::Json => print_json("completed", Some(&outcome))?,
    }
    Ok(())
}

fn run_archive(term: &Term, request: &ArchiveRequest, output: OutputFormat) -> Result<()> {
    if output.is_pretty() {
        print_header(term);
    }

    let (sender, receiver) = EventChannel::new();
    let progress = progress_bar(output);
    let event_thread = spawn_progress(receiver, progress.clone(), true);

    let result = ArchivePackager::package_with_events(request, &sender);

    drop(sender);
    event_thread.join().ok();
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    match (result?, output) {
        (PackageOutcome::NothingToDo, OutputFormat::Pretty) => {
            print_nothing_to_do(term, "The sources contain no files")
        }
        (PackageOutcome::NothingToDo, OutputFormat::Json) => {
            print_json::<ArchiveReport>("nothing_to_do", None)?
        }
        (PackageOutcome::Written(report), OutputFormat::Pretty) => {
            print_archive_report(term, &report)
        }
        (PackageOutcome::Written(report), OutputFormat::Json) => {
            print_json("completed", Some(&report))?
        }
    }
    Ok(())
}

fn reveal(term: &Term, dir: &Path, output: OutputFormat) {
    if !reveal_folder(dir) && output.is_pretty() {
        term.write_line(&format!(
            "{} Could not open {}",
            style("!").yellow().bold(),
            dir.display()
        ))
        .ok();
    }
}

fn progress_bar(output: OutputFormat) -> Option<ProgressBar> {
    if !output.is_pretty() {
        return None;
    }
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓░");
    let pb = ProgressBar::new(0);
    pb.set_style(style);
    Some(pb)
}

/// Drain events into the progress bar until every sender is dropped
fn spawn_progress(
    receiver: EventReceiver,
    progress: Option<ProgressBar>,
    verbose: bool,
) -> JoinHandle<()> {
    thread::spawn(move || {
        for event in receiver.iter() {
            let Some(ref pb) = progress else {
                continue;
            };
            match event {
                Event::Scan(ScanEvent::Started { path }) => {
                    pb.set_message(format!("Scanning {}", path.display()));
                }
                Event::Transfer(TransferEvent::Started { total }) => {
                    pb.set_length(total as u64);
                    pb.set_message("Transferring");
                }
                Event::Transfer(TransferEvent::Progress(p)) => {
                    pb.set_position(p.completed as u64);
                    if verbose {
                        pb.set_message(p.filename);
                    }
                }
                Event::Archive(ArchiveEvent::Started { members, .. }) => {
                    pb.set_length(members as u64);
                    pb.set_message("Compressing");
                }
                Event::Archive(ArchiveEvent::MemberAdded {
                    name, completed, ..
                }) => {
                    pb.set_position(completed as u64);
                    if verbose {
                        pb.set_message(name);
                    }
                }
                Event::Transfer(TransferEvent::Completed { .. })
                | Event::Archive(ArchiveEvent::Completed { .. }) => {
                    pb.finish_and_clear();
                }
                _ => {}
            }
        }
    })
}

fn print_header(term: &Term) {
    term.write_line(&format!(
        "{} {}",
        style("Flowbooster").bold().cyan(),
        style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
    ))
    .ok();
    term.write_line("").ok();
}

fn print_nothing_to_do(term: &Term, reason: &str) {
    term.write_line(&format!("{} Nothing to do: {}", style("ℹ").blue().bold(), reason))
        .ok();
}

fn print_organize_summary(term: &Term, summary: &RunSummary, verbose: bool) {
    let heading = match summary.mode {
        OrganizeMode::ByType => match summary.project_kind {
            Some(kind) => format!("Organized by type ({} project)", kind),
            None => "Organized by type".to_string(),
        },
        OrganizeMode::ByDate(granularity) => format!("Organized by {}", granularity),
    };
    term.write_line(&format!("{} {}", style("✓").green().bold(), heading))
        .ok();
    term.write_line("").ok();

    term.write_line(&format!(
        "  {} files transferred in {:.1}s",
        style(summary.transferred()).cyan(),
        summary.duration_ms as f64 / 1000.0
    ))
    .ok();
    if summary.skipped() > 0 {
        term.write_line(&format!(
            "  {} files skipped (already present)",
            style(summary.skipped()).yellow()
        ))
        .ok();
    }
    if summary.excluded > 0 {
        term.write_line(&format!(
            "  {} files excluded (unreadable)",
            style(summary.excluded).yellow()
        ))
        .ok();
    }
    term.write_line(&format!(
        "  {} folders created",
        style(summary.folders_created.len()).cyan()
    ))
    .ok();

    if verbose {
        term.write_line("").ok();
        for entry in &summary.entries {
            term.write_line(&format!(
                "    {} {} {}",
                style(&entry.label).bold(),
                entry.filename,
                style(format!("({})", entry.action)).dim()
            ))
            .ok();
        }
    }

    term.write_line("").ok();
    term.write_line(&format!(
        "  {} {}",
        style("Log:").dim(),
        display_path(&summary.log_path)
    ))
    .ok();
    term.write_line(&format!(
        "  {} {}",
        style("Manifest:").dim(),
        display_path(&summary.manifest_path)
    ))
    .ok();
}

fn print_pair_report(term: &Term, report: &PairReport, mode: PairMode) {
    term.write_line(&format!(
        "  {} base names on both sides",
        style(report.matched_bases.len()).cyan()
    ))
    .ok();
    term.write_line(&format!(
        "  {} unmatched in A, {} unmatched in B",
        style(report.unmatched_a.len()).yellow(),
        style(report.unmatched_b.len()).yellow()
    ))
    .ok();

    // Only the files that will be moved into unmatched/
    let mut listed: Vec<(&str, &FileName)> = report.unmatched_a.iter().map(|n| ("A", n)).collect();
    if mode == PairMode::Unified {
        listed.extend(report.unmatched_b.iter().map(|n| ("B", n)));
    }
    if !listed.is_empty() {
        term.write_line("").ok();
        for (side, name) in listed {
            term.write_line(&format!("    {} {}", style(side).dim(), name))
                .ok();
        }
    }
}

fn print_pair_outcome(term: &Term, outcome: &PairOutcome) {
    term.write_line("").ok();
    term.write_line(&format!(
        "{} Moved {} files",
        style("✓").green().bold(),
        style(outcome.moved.len()).cyan()
    ))
    .ok();
    term.write_line(&format!(
        "  {} {}",
        style("Matched:").dim(),
        display_path(&outcome.matched_dir)
    ))
    .ok();
    term.write_line(&format!(
        "  {} {}",
        style("Unmatched:").dim(),
        display_path(&outcome.unmatched_dir)
    ))
    .ok();
}

fn print_archive_report(term: &Term, report: &ArchiveReport) {
    term.write_line(&format!(
        "{} Archive created{}",
        style("✓").green().bold(),
        if report.encrypted { " (AES-256)" } else { "" }
    ))
    .ok();
    term.write_line("").ok();
    term.write_line(&format!(
        "  {} files, {} compressed to {}",
        style(report.members).cyan(),
        format_bytes(report.source_bytes),
        style(format_bytes(report.archive_bytes)).yellow()
    ))
    .ok();
    term.write_line("").ok();
    for volume in &report.volumes {
        term.write_line(&format!("    {}", display_path(volume))).ok();
    }
    if let Some(join) = report.join_command() {
        term.write_line("").ok();
        term.write_line(&format!(
            "  {} zip tools need the volumes joined in order before extracting:",
            style("Note:").yellow()
        ))
        .ok();
        term.write_line(&format!("    {}", style(join).cyan())).ok();
    }
}

fn print_json<T: Serialize>(status: &str, result: Option<&T>) -> Result<()> {
    let json = serde_json::to_string_pretty(&JsonReport { status, result })
        .map_err(ReportError::from)?;
    println!("{}", json);
    Ok(())
}

/// Shorten paths below the home directory to `~/...`
fn display_path(path: &Path) -> String {
    match dirs::home_dir() {
        Some(home) => match path.strip_prefix(&home) {
            Ok(rest) => format!("~/{}", rest.display()),
            Err(_) => path.display().to_string(),
        },
        None => path.display().to_string(),
    }
}

fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
