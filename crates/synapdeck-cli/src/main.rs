//! Synapdeck CLI
//!
//! Command-line front end for the FSRS scheduler. Reads scheduling requests
//! as JSON and writes results as JSON on stdout; logs go to stderr.

use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use serde::Serialize;
use synapdeck_scheduler::{
    recalculate_retrievability, scheduling_stats, DueRounding, FSRSScheduler, GradeStats,
    RetrievabilitySummary, ScheduleRequest, ScheduledCard, SchedulerSettings, FSRS_WEIGHTS,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Synapdeck - FSRS spaced repetition scheduler
#[derive(Parser)]
#[command(name = "synapdeck")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Schedule flashcard reviews with the FSRS memory model")]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Scheduler tunables shared by every subcommand
#[derive(Args)]
struct SettingsArgs {
    /// Target retention (overrides SYNAPDECK_RETENTION)
    #[arg(long)]
    retention: Option<f64>,

    /// Due dates at millisecond precision instead of whole days
    #[arg(long)]
    exact_due: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Schedule a batch of graded cards read as a JSON array
    Schedule {
        /// JSON file with scheduling requests (stdin when omitted)
        #[arg(long)]
        input: Option<PathBuf>,
        /// Review timestamp for cards without their own (RFC 3339, defaults to now)
        #[arg(long)]
        at: Option<DateTime<Utc>>,
        /// Fail the whole batch if any card fails
        #[arg(long)]
        atomic: bool,
        /// Print a per-grade summary to stderr
        #[arg(long)]
        summary: bool,
        #[command(flatten)]
        settings: SettingsArgs,
    },

    /// Show the outcome of every grade for one card
    Preview {
        /// Current interval in days (1 for a new card)
        #[arg(long, default_value = "1")]
        interval: i64,
        /// Current due date (RFC 3339)
        #[arg(long)]
        time_due: DateTime<Utc>,
        /// Stored stability (omit for a new card)
        #[arg(long)]
        stability: Option<f64>,
        /// Stored difficulty
        #[arg(long)]
        difficulty: Option<f64>,
        /// Review timestamp (RFC 3339, defaults to now)
        #[arg(long)]
        at: Option<DateTime<Utc>>,
        #[command(flatten)]
        settings: SettingsArgs,
    },

    /// Evaluate the forgetting curve for one card or summarize a JSON batch
    Retrievability {
        /// Stored stability in days
        #[arg(long, requires = "last_review", conflicts_with = "input")]
        stability: Option<f64>,
        /// Timestamp of the last review (RFC 3339)
        #[arg(long, requires = "stability")]
        last_review: Option<DateTime<Utc>>,
        /// JSON file with stored cards, `-` for stdin
        #[arg(long)]
        input: Option<PathBuf>,
        /// Evaluation time (RFC 3339, defaults to now)
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },

    /// Print model weights and effective settings
    Weights {
        #[command(flatten)]
        settings: SettingsArgs,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_json);

    match cli.command {
        Commands::Schedule {
            input,
            at,
            atomic,
            summary,
            settings,
        } => run_schedule(input, at.unwrap_or_else(Utc::now), atomic, summary, settings),
        Commands::Preview {
            interval,
            time_due,
            stability,
            difficulty,
            at,
            settings,
        } => run_preview(
            interval,
            time_due,
            stability,
            difficulty,
            at.unwrap_or_else(Utc::now),
            settings,
        ),
        Commands::Retrievability {
            stability,
            last_review,
            input,
            at,
        } => {
            let at = at.unwrap_or_else(Utc::now);
            match (stability, last_review, input) {
                (Some(stability), Some(last_review), None) => {
                    run_retrievability(stability, last_review, at)
                }
                (None, None, Some(input)) => run_retrievability_batch(input, at),
                _ => anyhow::bail!("Pass either --stability with --last-review, or --input"),
            }
        }
        Commands::Weights { settings } => run_weights(settings),
    }
}

/// Logs go to stderr so stdout stays machine-readable
fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false);

    if json {
        builder.json().init();
    } else {
        builder.with_ansi(false).init();
    }
}

/// Environment settings with command-line overrides applied
fn build_scheduler(args: &SettingsArgs) -> anyhow::Result<FSRSScheduler> {
    let mut settings = SchedulerSettings::from_env();
    if let Some(retention) = args.retention {
        settings.retention = retention;
    }
    if args.exact_due {
        settings.due_rounding = DueRounding::Exact;
    }
    FSRSScheduler::new(settings).context("Invalid scheduler settings")
}

fn write_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

/// Read a JSON array of requests from `path`, or stdin for `None` and `-`
fn read_requests(path: Option<&Path>) -> anyhow::Result<Vec<ScheduleRequest>> {
    let raw = match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        _ => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            buf
        }
    };
    let cards: Vec<ScheduleRequest> =
        serde_json::from_str(&raw).context("Input is not a JSON array of scheduling requests")?;
    info!("Loaded {} scheduling requests", cards.len());
    Ok(cards)
}

#[derive(Serialize)]
struct FailedCard {
    card_id: i64,
    error: String,
}

#[derive(Serialize)]
struct RetrievabilityReport {
    summary: Option<RetrievabilitySummary>,
    failed: Vec<FailedCard>,
}

#[derive(Serialize)]
struct ScheduleReport {
    scheduled: Vec<ScheduledCard>,
    failed: Vec<FailedCard>,
    stats: Vec<GradeStats>,
}

/// Run schedule command
fn run_schedule(
    input: Option<PathBuf>,
    at: DateTime<Utc>,
    atomic: bool,
    summary: bool,
    settings: SettingsArgs,
) -> anyhow::Result<()> {
    let scheduler = build_scheduler(&settings)?;
    let cards = read_requests(input.as_deref())?;

    let (scheduled, failed) = if atomic {
        let scheduled = scheduler
            .reschedule_cards_atomic(&cards, at)
            .context("Batch aborted")?;
        (scheduled, Vec::new())
    } else {
        let mut scheduled = Vec::new();
        let mut failed = Vec::new();
        for result in scheduler.reschedule_cards(&cards, at) {
            match result {
                Ok(card) => scheduled.push(card),
                Err(e) => failed.push(FailedCard {
                    card_id: e.card_id(),
                    error: e.to_string(),
                }),
            }
        }
        (scheduled, failed)
    };

    let stats = scheduling_stats(&scheduled);
    if summary {
        print_summary(&stats, failed.len());
    }

    write_json(&ScheduleReport {
        scheduled,
        failed,
        stats,
    })
}

/// Print a per-grade table to stderr
fn print_summary(stats: &[GradeStats], failed: usize) {
    eprintln!("{}", "=== Scheduling Summary ===".cyan().bold());
    if stats.is_empty() {
        eprintln!("{}", "No cards scheduled.".dimmed());
    }
    for grade in stats {
        eprintln!(
            "{:<6} {:>5} cards  avg {:>7.1}d  min {:>5}d  max {:>5}d",
            grade.grade.as_str().white().bold(),
            grade.count,
            grade.avg_interval,
            grade.min_interval,
            grade.max_interval
        );
    }
    if failed > 0 {
        eprintln!("{}: {}", "Failed".red().bold(), failed);
    }
}

/// Run preview command
fn run_preview(
    interval: i64,
    time_due: DateTime<Utc>,
    stability: Option<f64>,
    difficulty: Option<f64>,
    at: DateTime<Utc>,
    settings: SettingsArgs,
) -> anyhow::Result<()> {
    let scheduler = build_scheduler(&settings)?;

    let card = ScheduleRequest {
        card_id: 0,
        current_time_due: time_due,
        current_interval: interval,
        current_retrievability: 1.0,
        current_stability: stability,
        current_difficulty: difficulty,
        grade: String::new(),
        reviewed_at: None,
    };

    let preview = scheduler.preview(&card, at)?;
    write_json(&preview)
}

/// Run retrievability command
fn run_retrievability(
    stability: f64,
    last_review: DateTime<Utc>,
    at: DateTime<Utc>,
) -> anyhow::Result<()> {
    if !(stability.is_finite() && stability > 0.0) {
        anyhow::bail!("Stability must be a positive number, got {}", stability);
    }
    if at < last_review {
        anyhow::bail!("Evaluation time precedes the last review");
    }

    let r = recalculate_retrievability(last_review, at, stability);
    write_json(&serde_json::json!({
        "stability": stability,
        "last_review": last_review,
        "at": at,
        "retrievability": r,
    }))
}

/// Run retrievability command over a batch of stored cards
fn run_retrievability_batch(input: PathBuf, at: DateTime<Utc>) -> anyhow::Result<()> {
    let cards = read_requests(Some(input.as_path()))?;

    let mut values = Vec::with_capacity(cards.len());
    let mut failed = Vec::new();
    for card in &cards {
        match card.retrievability_at(at) {
            Ok(r) => values.push(r),
            Err(e) => failed.push(FailedCard {
                card_id: e.card_id(),
                error: e.to_string(),
            }),
        }
    }
    info!(
        "Evaluated retrievability for {} cards, {} failed",
        values.len(),
        failed.len()
    );

    write_json(&RetrievabilityReport {
        summary: RetrievabilitySummary::from_values(&values),
        failed,
    })
}

/// Run weights command
fn run_weights(settings: SettingsArgs) -> anyhow::Result<()> {
    let scheduler = build_scheduler(&settings)?;
    write_json(&serde_json::json!({
        "weights": FSRS_WEIGHTS,
        "settings": scheduler.settings(),
    }))
}
