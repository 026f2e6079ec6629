//! Periodic availability monitoring with notification de-duplication.
//!
//! Each tick fetches reservations, derives slots, and compares them with the
//! slots already announced in this session. A notice goes out only when at
//! least one slot is new, and it always carries the full current list.
//!
//! A slot that disappears (booked, or elapsed) is forgotten, so if the same
//! slot shows up again later it is announced again. On today's date the
//! currently open gap starts at `now` and shrinks every tick; it keeps its
//! notified status as long as its free time still ends at the same instant.

use crate::clock::{Clock, SystemClock};
use crate::config::MonitorConfig;
use crate::deriver::{FreeSlot, SlotDeriver, SlotKey};
use crate::notify::{AvailabilitySummary, DispatchReport, Dispatcher, Notice, NotificationChannel};
use crate::source::ReservationSource;
use chrono::{NaiveDate, NaiveDateTime};
use chrono_tz::Tz;
use std::collections::BTreeMap;
use std::future::Future;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Slots already announced during this monitoring session.
///
/// Lives only as long as its [`MonitorLoop`]; nothing is persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonitorState {
    date: Option<NaiveDate>,
    /// Notified slot bounds, each with the end of its underlying free gap.
    notified: BTreeMap<SlotKey, NaiveDateTime>,
}

impl MonitorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The date the notified slots belong to.
    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn contains(&self, key: &SlotKey) -> bool {
        self.notified.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.notified.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notified.is_empty()
    }

    /// Switch to `date`, forgetting every notified slot if the date changed.
    ///
    /// Returns the previous date when a reset happened.
    pub fn roll_to(&mut self, date: NaiveDate) -> Option<NaiveDate> {
        let previous = self.date.replace(date);
        match previous {
            Some(prev) if prev != date => {
                self.notified.clear();
                Some(prev)
            }
            _ => None,
        }
    }

    pub fn clear(&mut self) {
        self.notified.clear();
    }

    /// Carry notified status over to the current `slots` and forget the rest.
    ///
    /// A slot keeps its status if its bounds are unchanged, or if it is an
    /// already notified gap trimmed at `now`: same `raw_end`, start moved
    /// forward to exactly `now`.
    pub fn retain_present(&mut self, slots: &[FreeSlot], now: NaiveDateTime) {
        let carried = slots
            .iter()
            .filter(|slot| {
                self.notified.contains_key(&slot.key())
                    || (slot.start == now
                        && self.notified.iter().any(|(key, raw_end)| {
                            *raw_end == slot.raw_end && key.start <= slot.start
                        }))
            })
            .map(|slot| (slot.key(), slot.raw_end))
            .collect();
        self.notified = carried;
    }

    /// Keys of `slots` that have not been notified yet, in slot order.
    pub fn unseen(&self, slots: &[FreeSlot]) -> Vec<SlotKey> {
        slots
            .iter()
            .map(FreeSlot::key)
            .filter(|key| !self.notified.contains_key(key))
            .collect()
    }

    pub fn mark<'a>(&mut self, slots: impl IntoIterator<Item = &'a FreeSlot>) {
        self.notified
            .extend(slots.into_iter().map(|slot| (slot.key(), slot.raw_end)));
    }
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Reservation data was unavailable; state untouched.
    FetchFailed,
    /// Nothing bookable; state cleared.
    NoSlots,
    /// Slots exist but all were already announced.
    Unchanged { available: usize },
    /// New slots were announced on at least one channel.
    Notified { available: usize, fresh: usize },
    /// New slots exist but every channel failed; they stay unannounced.
    DispatchFailed { available: usize, fresh: usize },
}

/// Fetch, derive, compare, dispatch; repeated at a fixed cadence.
pub struct MonitorLoop<S, C> {
    config: MonitorConfig,
    deriver: SlotDeriver,
    source: S,
    dispatcher: Dispatcher,
    clock: C,
    state: MonitorState,
    ticks: u64,
}

impl<S: ReservationSource, C: Clock> MonitorLoop<S, C> {
    pub fn new(config: MonitorConfig, source: S, dispatcher: Dispatcher, clock: C) -> Self {
        Self {
            config,
            deriver: SlotDeriver::default(),
            source,
            dispatcher,
            clock,
            state: MonitorState::new(),
            ticks: 0,
        }
    }

    pub fn with_deriver(mut self, deriver: SlotDeriver) -> Self {
        self.deriver = deriver;
        self
    }

    pub fn state(&self) -> &MonitorState {
        &self.state
    }

    /// Number of ticks evaluated so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Dispatch the "monitor started" notice.
    pub async fn announce(&self) -> DispatchReport {
        let notice = Notice::MonitorStarted {
            resource: self.config.resource.clone(),
            target: self.config.target,
            interval_minutes: self.config.interval_minutes(),
            started_at: self.clock.now(),
        };
        let report = self.dispatcher.dispatch(&notice).await;
        info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            "start-up notice dispatched"
        );
        report
    }

    /// Run one evaluation.
    pub async fn tick(&mut self) -> TickOutcome {
        self.ticks += 1;
        let tick = self.ticks;
        let now = self.clock.now();
        let date = self.config.target.resolve(now.date());

        if let Some(previous) = self.state.roll_to(date) {
            info!(tick, from = %previous, to = %date, "date changed, resetting notified slots");
        }

        let reservations = match self.source.fetch(date).await {
            Ok(set) => set,
            Err(e) => {
                warn!(tick, %date, error = %e, "reservation fetch failed, skipping tick");
                return TickOutcome::FetchFailed;
            }
        };

        let slots = self.deriver.derive(date, &reservations, now);
        if slots.is_empty() {
            self.state.clear();
            info!(tick, %date, reservations = reservations.len(), "no slots available");
            return TickOutcome::NoSlots;
        }

        self.state.retain_present(&slots, now);
        let fresh = self.state.unseen(&slots);
        let available = slots.len();

        if fresh.is_empty() {
            info!(tick, %date, available, "slots available (no change)");
            return TickOutcome::Unchanged { available };
        }

        let fresh_slots: Vec<FreeSlot> = slots
            .iter()
            .filter(|slot| fresh.contains(&slot.key()))
            .cloned()
            .collect();
        let notice = Notice::SlotsAvailable(AvailabilitySummary {
            resource: self.config.resource.clone(),
            date,
            slots,
            fresh: fresh.clone(),
        });
        let report = self.dispatcher.dispatch(&notice).await;

        if report.delivered() {
            let count = fresh.len();
            self.state.mark(&fresh_slots);
            info!(tick, %date, available, fresh = count, channels = report.succeeded(), "new slots announced");
            TickOutcome::Notified {
                available,
                fresh: count,
            }
        } else {
            warn!(tick, %date, available, fresh = fresh.len(), "every channel failed, will retry next tick");
            TickOutcome::DispatchFailed {
                available,
                fresh: fresh.len(),
            }
        }
    }

    /// Tick at the configured interval until `shutdown` resolves.
    ///
    /// The first tick runs immediately. Shutdown is only observed between
    /// ticks; a tick in progress always completes.
    pub async fn run<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        info!(
            resource = %self.config.resource,
            target = %self.config.target,
            interval_minutes = self.config.interval_minutes(),
            channels = self.dispatcher.len(),
            "monitor starting"
        );

        if self.config.announce_start {
            self.announce().await;
        }

        let mut ticker = tokio::time::interval(self.config.interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = &mut shutdown => {
                    info!(ticks = self.ticks, "shutdown requested, monitor stopping");
                    break;
                }
            }
            let outcome = self.tick().await;
            debug!(?outcome, "tick finished");
        }
    }
}

/// Monitor with the system clock in `timezone` until `shutdown` resolves.
pub async fn run_monitor<S, F>(
    config: MonitorConfig,
    source: S,
    channels: Vec<Box<dyn NotificationChannel>>,
    timezone: Tz,
    shutdown: F,
) -> MonitorState
where
    S: ReservationSource,
    F: Future<Output = ()>,
{
    let mut monitor = MonitorLoop::new(
        config,
        source,
        Dispatcher::new(channels),
        SystemClock::new(timezone),
    );
    monitor.run(shutdown).await;
    monitor.state
}
