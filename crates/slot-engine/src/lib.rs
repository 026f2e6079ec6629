//! # slot-engine
//!
//! Bookable slot derivation and availability monitoring for a shared studio.
//!
//! Given a date, the studio's operating hours for that weekday, and the
//! reservations already made, the engine answers "where is there room for a
//! booking of one to four hours?". A monitor loop re-asks that question on a
//! fixed cadence and notifies channels when new room appears.
//!
//! ## Modules
//!
//! - [`interval`]: half-open intervals, busy merging, window subtraction
//! - [`policy`]: weekday operating hours and booking-length rules
//! - [`deriver`]: free gaps → bookable slots (elapsed-time trim, min/max)
//! - [`reservation`]: reservation sets and booking-service payload decoding
//! - [`source`]: reservation source trait and file-backed source
//! - [`notify`]: notices, channels, fan-out dispatch
//! - [`monitor`]: periodic evaluation with de-duplicated notifications
//! - [`clock`]: wall-clock abstraction
//! - [`config`]: start-up configuration
//! - [`error`]: Error types

pub mod clock;
pub mod config;
pub mod deriver;
pub mod error;
pub mod interval;
pub mod monitor;
pub mod notify;
pub mod policy;
pub mod reservation;
pub mod source;

pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{DateTarget, MonitorConfig};
pub use deriver::{derive, FreeSlot, SlotDeriver, SlotKey};
pub use error::{ConfigError, DispatchError, FetchError};
pub use interval::TimeInterval;
pub use monitor::{run_monitor, MonitorLoop, MonitorState, TickOutcome};
pub use notify::{AvailabilitySummary, Dispatcher, Notice, NotificationChannel, NotifyTarget};
pub use policy::{DayPolicy, DurationConstraint, OperatingWindow};
pub use reservation::{decode_payload, ReservationFilter, ReservationSet};
pub use source::{FileSource, ReservationSource};
