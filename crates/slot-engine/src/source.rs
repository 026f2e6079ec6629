//! Where reservation data comes from.

use crate::error::FetchError;
use crate::reservation::{decode_payload, ReservationFilter, ReservationSet};
use async_trait::async_trait;
use chrono::NaiveDate;
use chrono_tz::Tz;
use std::path::PathBuf;

/// Supplies the current reservations for one date.
///
/// Implementations do not retry; a failed fetch abandons the monitor tick.
#[async_trait]
pub trait ReservationSource: Send + Sync {
    async fn fetch(&self, date: NaiveDate) -> Result<ReservationSet, FetchError>;
}

/// Reads a booking-service payload from a file on every fetch.
///
/// Whatever keeps the file fresh (a scheduled HTTP fetch, a manual export)
/// lives outside this crate.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    resource_id: Option<u32>,
    timezone: Tz,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>, resource_id: Option<u32>, timezone: Tz) -> Self {
        Self {
            path: path.into(),
            resource_id,
            timezone,
        }
    }
}

#[async_trait]
impl ReservationSource for FileSource {
    async fn fetch(&self, date: NaiveDate) -> Result<ReservationSet, FetchError> {
        let payload = tokio::fs::read_to_string(&self.path).await?;
        let filter = ReservationFilter {
            date,
            resource_id: self.resource_id,
            timezone: self.timezone,
        };
        let set = decode_payload(&payload, &filter)?;
        tracing::debug!(path = %self.path.display(), %date, reservations = set.len(), "loaded reservations");
        Ok(set)
    }
}
