//! CLI tool for syncing session records into a Google Slides deck.

mod service;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, TimeDelta, Utc};
use clap::Parser;
use service::{DryRunSlides, HttpSlides};
use slidesync_core::{
    IdSource, JsonRecordStore, RandomSuffix, RecordOutcome, RunCounter, SessionSync,
    SlidesService, SyncConfig, SyncOptions, SyncReport,
};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Sync session records (titles, participants, statuses) into slides.
#[derive(Parser, Debug)]
#[command(name = "slide-sync")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON export of the record store (table name -> rows)
    #[arg(short, long, env = "SLIDESYNC_RECORDS")]
    records: PathBuf,

    /// JSON config file (cell layout, field names, status colours)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Presentation to write into
    #[arg(long, env = "GOOGLE_PRESENTATION_ID")]
    presentation_id: String,

    /// Template slide duplicated for sessions without a slide
    #[arg(long, env = "TEMPLATE_SLIDE_ID")]
    template_slide_id: Option<String>,

    /// OAuth bearer token for the Slides API
    #[arg(long, env = "GOOGLE_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    /// Record batches instead of sending them
    #[arg(long)]
    dry_run: bool,

    /// Presentation snapshot (presentations.get JSON) used by --dry-run
    #[arg(long, requires = "dry_run")]
    snapshot: Option<PathBuf>,

    /// Where --dry-run writes the recorded batches (default: stdout)
    #[arg(short, long, requires = "dry_run")]
    output: Option<PathBuf>,

    /// Only sessions modified in the last N minutes
    #[arg(short = 'w', long)]
    window_minutes: Option<i64>,

    /// Process at most N sessions
    #[arg(short, long)]
    limit: Option<usize>,

    /// Duplicate the template for sessions that have no slide yet
    #[arg(long)]
    create_missing: bool,

    /// Use purely random id suffixes instead of a run-scoped counter
    #[arg(long)]
    random_suffix: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    let config = match &args.config {
        Some(path) => SyncConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => SyncConfig::default(),
    };

    let records = JsonRecordStore::load(&args.records, config.tables.sessions.clone())
        .with_context(|| format!("Failed to read records from {}", args.records.display()))?;

    let modified_since = match args.window_minutes {
        Some(minutes) => match window_start(Utc::now(), minutes) {
            Some(since) => Some(since),
            None => bail!("--window-minutes {} is out of range", minutes),
        },
        None => None,
    };

    let options = SyncOptions {
        presentation_id: args.presentation_id.clone(),
        template_slide_id: args.template_slide_id.clone(),
        create_missing: args.create_missing,
        modified_since,
        limit: args.limit,
    };
    if let Some(since) = options.modified_since {
        log::info!("Fetching sessions modified after {}", since.to_rfc3339());
    }

    let report = if args.random_suffix {
        run_with_ids(&args, config, &records, &options, RandomSuffix::new())?
    } else {
        run_with_ids(&args, config, &records, &options, RunCounter::new())?
    };

    print_report(&report);

    if report.failed() > 0 {
        bail!("{} session(s) failed to sync", report.failed());
    }
    Ok(())
}

/// Start of a look-back window of `minutes`, or `None` if it leaves chrono's range.
fn window_start(now: DateTime<Utc>, minutes: i64) -> Option<DateTime<Utc>> {
    TimeDelta::try_minutes(minutes).and_then(|window| now.checked_sub_signed(window))
}

/// Pick the service backend and run the sync.
fn run_with_ids<I: IdSource>(
    args: &Args,
    config: SyncConfig,
    records: &JsonRecordStore,
    options: &SyncOptions,
    ids: I,
) -> Result<SyncReport> {
    let mut sync = SessionSync::new(config, ids);

    if args.dry_run {
        let mut slides = match &args.snapshot {
            Some(path) => DryRunSlides::with_snapshot(path)
                .with_context(|| format!("Failed to read snapshot {}", path.display()))?,
            None => DryRunSlides::new(),
        };
        let report = run_against(&mut sync, records, &mut slides, options)?;
        write_batches(&slides, args.output.as_deref())?;
        return Ok(report);
    }

    let Some(token) = &args.access_token else {
        bail!("No access token given; set GOOGLE_ACCESS_TOKEN or pass --dry-run");
    };
    let mut slides = HttpSlides::new(token.clone());
    run_against(&mut sync, records, &mut slides, options)
}

fn run_against<I: IdSource>(
    sync: &mut SessionSync<I>,
    records: &JsonRecordStore,
    slides: &mut dyn SlidesService,
    options: &SyncOptions,
) -> Result<SyncReport> {
    sync.run(records, slides, options)
        .context("Failed to read sessions from the record store")
}

/// Write recorded dry-run batches as pretty JSON.
fn write_batches(slides: &DryRunSlides, output: Option<&Path>) -> Result<()> {
    let content = serde_json::to_string_pretty(slides.batches())?;

    match output {
        Some(path) => {
            let mut file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            file.write_all(content.as_bytes())
                .with_context(|| format!("Failed to write to {}", path.display()))?;
        }
        None => println!("{}", content),
    }

    Ok(())
}

fn print_report(report: &SyncReport) {
    for record in &report.records {
        match &record.outcome {
            RecordOutcome::Applied {
                slide_id,
                created,
                requests,
                ..
            } => eprintln!(
                "{}: {} slide {} ({} requests)",
                record.record_id,
                if *created { "created" } else { "updated" },
                slide_id,
                requests
            ),
            RecordOutcome::Skipped { reason } => {
                eprintln!("{}: skipped ({})", record.record_id, reason)
            }
            RecordOutcome::Failed {
                error,
                missing_structure,
            } => {
                eprintln!("Error updating slide for record {}: {}", record.record_id, error);
                if *missing_structure {
                    eprintln!("  (fix the slide in the deck before re-running)");
                }
            }
        }
    }
    eprintln!(
        "{} updated, {} skipped, {} failed",
        report.applied(),
        report.skipped(),
        report.failed()
    );
}
