//! Notices, notification channels, and fan-out dispatch.
//!
//! Channels receive a structured [`Notice`] and decide how to present it.
//! [`Notice::title`] and [`Notice::body`] give a plain-text rendering that
//! simple channels can use as-is.

use crate::config::DateTarget;
use crate::deriver::{FreeSlot, SlotKey};
use crate::error::{ConfigError, DispatchError};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::str::FromStr;
use tokio::io::AsyncWriteExt;

/// How many slots a rendered availability body lists before truncating.
pub const MAX_LISTED_SLOTS: usize = 5;

/// Current availability for one resource and date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AvailabilitySummary {
    pub resource: String,
    pub date: NaiveDate,
    /// Every slot currently available, ordered by start.
    pub slots: Vec<FreeSlot>,
    /// Slots that were not part of any earlier notice.
    pub fresh: Vec<SlotKey>,
}

impl AvailabilitySummary {
    pub fn is_fresh(&self, slot: &FreeSlot) -> bool {
        self.fresh.contains(&slot.key())
    }
}

/// A message delivered to every notification channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    /// Sent once when monitoring begins so channels can be verified.
    MonitorStarted {
        resource: String,
        target: DateTarget,
        interval_minutes: u64,
        started_at: NaiveDateTime,
    },
    /// New bookable slots appeared.
    SlotsAvailable(AvailabilitySummary),
}

impl Notice {
    pub fn title(&self) -> String {
        match self {
            Notice::MonitorStarted { resource, .. } => format!("Monitor started: {resource}"),
            Notice::SlotsAvailable(summary) => format!("Slots available on {}", summary.date),
        }
    }

    pub fn body(&self) -> String {
        match self {
            Notice::MonitorStarted {
                resource,
                target,
                interval_minutes,
                started_at,
            } => format!(
                "Monitoring {resource}\nDate: {target}\nCheck interval: {interval_minutes} minutes\nStarted: {}",
                started_at.format("%Y-%m-%d %H:%M:%S")
            ),
            Notice::SlotsAvailable(summary) => render_availability(summary),
        }
    }
}

fn render_availability(summary: &AvailabilitySummary) -> String {
    let mut body = format!(
        "{} has {} available slot(s)!",
        summary.resource,
        summary.slots.len()
    );
    for slot in summary.slots.iter().take(MAX_LISTED_SLOTS) {
        let _ = write!(body, "\n{}", format_slot(slot));
        if summary.is_fresh(slot) {
            body.push_str(" (new)");
        }
    }
    if summary.slots.len() > MAX_LISTED_SLOTS {
        let _ = write!(body, "\n... and {} more", summary.slots.len() - MAX_LISTED_SLOTS);
    }
    body
}

/// `HH:MM-HH:MM (N.Nh)` using the reported (capped) duration.
pub fn format_slot(slot: &FreeSlot) -> String {
    format!(
        "{}-{} ({:.1}h)",
        slot.start.format("%H:%M"),
        slot.end.format("%H:%M"),
        slot.duration_minutes as f64 / 60.0
    )
}

/// A destination for notices.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Short label used in logs and delivery reports.
    fn name(&self) -> &str;

    async fn send(&self, notice: &Notice) -> Result<(), DispatchError>;
}

/// Delivery result for one channel.
#[derive(Debug)]
pub struct ChannelOutcome {
    pub channel: String,
    pub result: Result<(), DispatchError>,
}

/// Per-channel results of one dispatch.
#[derive(Debug, Default)]
pub struct DispatchReport {
    pub outcomes: Vec<ChannelOutcome>,
}

impl DispatchReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    /// At least one channel accepted the notice, or there were no channels.
    pub fn delivered(&self) -> bool {
        self.outcomes.is_empty() || self.succeeded() > 0
    }
}

/// Sends each notice to every configured channel.
#[derive(Default)]
pub struct Dispatcher {
    channels: Vec<Box<dyn NotificationChannel>>,
}

impl Dispatcher {
    pub fn new(channels: Vec<Box<dyn NotificationChannel>>) -> Self {
        Self { channels }
    }

    pub fn with_channel(mut self, channel: impl NotificationChannel + 'static) -> Self {
        self.channels.push(Box::new(channel));
        self
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Attempt delivery on every channel in order.
    ///
    /// A failing channel never prevents the remaining channels from being
    /// tried.
    pub async fn dispatch(&self, notice: &Notice) -> DispatchReport {
        let mut report = DispatchReport::default();
        for channel in &self.channels {
            let result = channel.send(notice).await;
            match &result {
                Ok(()) => tracing::debug!(channel = channel.name(), "notice delivered"),
                Err(e) => tracing::warn!(channel = channel.name(), error = %e, "notice delivery failed"),
            }
            report.outcomes.push(ChannelOutcome {
                channel: channel.name().to_string(),
                result,
            });
        }
        report
    }
}

/// Prints rendered notices to standard output.
#[derive(Debug, Clone, Default)]
pub struct ConsoleChannel;

#[async_trait]
impl NotificationChannel for ConsoleChannel {
    fn name(&self) -> &str {
        "console"
    }

    async fn send(&self, notice: &Notice) -> Result<(), DispatchError> {
        let text = format!("\n== {} ==\n{}\n", notice.title(), notice.body());
        write_stdout(&text)
            .await
            .map_err(|e| DispatchError::io(self.name(), e))
    }
}

async fn write_stdout(text: &str) -> std::io::Result<()> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(text.as_bytes()).await?;
    stdout.flush().await
}

/// Appends each notice as one JSON line to a file.
#[derive(Debug, Clone)]
pub struct JsonLinesChannel {
    path: PathBuf,
    label: String,
}

impl JsonLinesChannel {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let label = format!("file:{}", path.display());
        Self { path, label }
    }

    async fn append(&self, line: &str) -> std::io::Result<()> {
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await
    }
}

#[async_trait]
impl NotificationChannel for JsonLinesChannel {
    fn name(&self) -> &str {
        &self.label
    }

    async fn send(&self, notice: &Notice) -> Result<(), DispatchError> {
        let mut line =
            serde_json::to_string(notice).map_err(|e| DispatchError::serialize(&self.label, e))?;
        line.push('\n');
        self.append(&line)
            .await
            .map_err(|e| DispatchError::io(&self.label, e))
    }
}

/// A notification target named on the command line.
///
/// - `console` prints notices to standard output
/// - `file:<path>` appends notices as JSON lines to `<path>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyTarget {
    Console,
    File(PathBuf),
}

impl NotifyTarget {
    pub fn into_channel(self) -> Box<dyn NotificationChannel> {
        match self {
            NotifyTarget::Console => Box::new(ConsoleChannel),
            NotifyTarget::File(path) => Box::new(JsonLinesChannel::new(path)),
        }
    }
}

impl FromStr for NotifyTarget {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == "console" {
            return Ok(NotifyTarget::Console);
        }
        match s.strip_prefix("file:") {
            Some(path) if !path.is_empty() => Ok(NotifyTarget::File(PathBuf::from(path))),
            _ => Err(ConfigError::UnknownTarget(s.to_string())),
        }
    }
}
