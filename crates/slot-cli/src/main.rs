//! `studio-slots` CLI: check and monitor bookable studio slots.
//!
//! Reservation data is read from a booking-service payload (the JSON answer to
//! an `AffectingReservations` query, or a bare array of reservations). Fetching
//! that payload is left to whatever produces the file.
//!
//! ## Usage
//!
//! ```sh
//! # Slots for today from a saved payload
//! studio-slots check -i reservations.json
//!
//! # A specific date, as JSON
//! studio-slots check -i reservations.json --date 2026-01-24 --json
//!
//! # Pipe the payload in
//! curl ... | studio-slots check
//!
//! # Re-read the payload every 5 minutes and announce new slots
//! studio-slots monitor -i reservations.json --notify console --notify file:notices.jsonl
//! ```

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use slot_engine::config::{parse_timezone, DEFAULT_INTERVAL_MINUTES, DEFAULT_RESOURCE_ID, DEFAULT_TIMEZONE};
use slot_engine::notify::format_slot;
use slot_engine::{
    decode_payload, Clock, DateTarget, FileSource, FreeSlot, MonitorConfig, NotifyTarget,
    ReservationFilter, SlotDeriver, SystemClock, TimeInterval,
};
use std::io::{self, Read};
use tracing::Level;

#[derive(Parser)]
#[command(
    name = "studio-slots",
    version,
    about = "Find and monitor bookable studio slots"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Args)]
struct StudioArgs {
    /// Date to evaluate: YYYY-MM-DD or "today"
    #[arg(long, default_value = "today")]
    date: String,
    /// Resource id whose reservations count as busy
    #[arg(long, default_value_t = DEFAULT_RESOURCE_ID)]
    resource: u32,
    /// IANA time zone of the studio's wall clock
    #[arg(long, default_value = DEFAULT_TIMEZONE)]
    timezone: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Show bookable slots once
    Check {
        /// Reservation payload file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        #[command(flatten)]
        studio: StudioArgs,
        /// Evaluate as if the local time were this (YYYY-MM-DDTHH:MM)
        #[arg(long)]
        now: Option<String>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Re-check periodically and notify when new slots appear
    Monitor {
        /// Reservation payload file, re-read on every check
        #[arg(short, long)]
        input: String,
        #[command(flatten)]
        studio: StudioArgs,
        /// Minutes between checks
        #[arg(long, default_value_t = DEFAULT_INTERVAL_MINUTES)]
        interval: u64,
        /// Notification target: "console" or "file:<path>" (repeatable)
        #[arg(long = "notify")]
        notify: Vec<String>,
        /// Display name used in notices
        #[arg(long)]
        name: Option<String>,
        /// Skip the start-up notice
        #[arg(long)]
        no_announce: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .init();

    match cli.command {
        Commands::Check {
            input,
            studio,
            now,
            json,
        } => check(input.as_deref(), &studio, now.as_deref(), json),
        Commands::Monitor {
            input,
            studio,
            interval,
            notify,
            name,
            no_announce,
        } => monitor(&input, &studio, interval, &notify, name, no_announce).await,
    }
}

/// JSON form of a one-shot check.
#[derive(Serialize)]
struct CheckReport<'a> {
    resource_id: u32,
    date: NaiveDate,
    evaluated_at: NaiveDateTime,
    reservations_count: usize,
    total_available_slots: usize,
    available_slots: &'a [FreeSlot],
}

fn check(input: Option<&str>, studio: &StudioArgs, now: Option<&str>, json: bool) -> Result<()> {
    let timezone = parse_timezone(&studio.timezone)?;
    let target: DateTarget = studio.date.parse()?;
    let now = match now {
        Some(raw) => parse_local_time(raw)?,
        None => SystemClock::new(timezone).now(),
    };
    let date = target.resolve(now.date());

    let payload = read_input(input)?;
    let filter = ReservationFilter {
        date,
        resource_id: Some(studio.resource),
        timezone,
    };
    let reservations =
        decode_payload(&payload, &filter).context("Failed to decode reservation data")?;
    let slots = SlotDeriver::default().derive(date, &reservations, now);

    if json {
        let report = CheckReport {
            resource_id: studio.resource,
            date,
            evaluated_at: now,
            reservations_count: reservations.len(),
            total_available_slots: slots.len(),
            available_slots: &slots,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(studio.resource, date, date == now.date(), &reservations, &slots);
    }

    Ok(())
}

async fn monitor(
    input: &str,
    studio: &StudioArgs,
    interval: u64,
    notify: &[String],
    name: Option<String>,
    no_announce: bool,
) -> Result<()> {
    let timezone = parse_timezone(&studio.timezone)?;
    let target: DateTarget = studio.date.parse()?;
    let name = name.unwrap_or_else(|| format!("Studio {}", studio.resource));

    let mut config = MonitorConfig::new(name, target, interval)?;
    if no_announce {
        config = config.without_announcement();
    }

    let channels = notify
        .iter()
        .map(|raw| raw.parse::<NotifyTarget>().map(NotifyTarget::into_channel))
        .collect::<Result<Vec<_>, _>>()?;
    if channels.is_empty() {
        tracing::warn!("no notification targets configured, slots will only be logged");
    }

    let source = FileSource::new(input, Some(studio.resource), timezone);
    slot_engine::run_monitor(config, source, channels, timezone, shutdown_signal()).await;
    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(e) => {
                tracing::warn!("failed to register SIGTERM handler: {e}");
                ctrl_c.await;
            }
        }
    }

    #[cfg(not(unix))]
    ctrl_c.await;
}

fn parse_local_time(raw: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M"))
        .with_context(|| format!("Invalid --now '{}': expected YYYY-MM-DDTHH:MM", raw))
}

fn print_report(
    resource: u32,
    date: NaiveDate,
    is_today: bool,
    reservations: &[TimeInterval],
    slots: &[FreeSlot],
) {
    let label = if is_today {
        "TODAY".to_string()
    } else {
        format!("{} ({})", date, date.format("%A"))
    };
    let rule = "=".repeat(72);

    println!("{rule}");
    println!("STUDIO AVAILABILITY - {label}");
    println!("{rule}");
    println!();
    println!("Studio {resource}");
    println!("   Reservations: {}", reservations.len());
    println!("   Available slots: {}", slots.len());

    if slots.is_empty() {
        println!();
        println!("   No available slots");
    } else {
        println!();
        println!("   Available time slots:");
        for slot in slots {
            if slot.raw_end > slot.end {
                println!(
                    "      ✓ {} (free until {})",
                    format_slot(slot),
                    slot.raw_end.format("%H:%M")
                );
            } else {
                println!("      ✓ {}", format_slot(slot));
            }
        }
    }

    if !reservations.is_empty() {
        let mut sorted = reservations.to_vec();
        sorted.sort();
        println!();
        println!("   Reserved time slots:");
        for r in &sorted {
            println!("      ✗ {}-{}", r.start.format("%H:%M"), r.end.format("%H:%M"));
        }
    }
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}
