//! Issue records and run versions.

use crate::check::{CheckId, TripId, UserId};
use crate::error::{CoreError, CoreResult};
use chrono::{Duration, Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

const RUN_VERSION_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Timestamp identifying one execution of the catalog against a trip.
///
/// Second resolution, formatted `YYYY-MM-DD HH:MM:SS` so lexical order is
/// chronological order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunVersion(String);

impl RunVersion {
    /// Parse and normalize a stored run version.
    pub fn parse(value: &str) -> CoreResult<Self> {
        let ts = NaiveDateTime::parse_from_str(value.trim(), RUN_VERSION_FORMAT).map_err(|_| {
            CoreError::InvalidRunVersion {
                value: value.to_string(),
            }
        })?;
        Ok(Self::from_datetime(ts))
    }

    pub fn from_datetime(ts: NaiveDateTime) -> Self {
        Self(ts.format(RUN_VERSION_FORMAT).to_string())
    }

    /// Current local time truncated to the second.
    pub fn now() -> Self {
        Self::from_datetime(Local::now().naive_local())
    }

    /// A version for a new run that sorts after `previous`.
    ///
    /// Two runs started within the same second would otherwise share a
    /// version; in that case (or when the clock went backwards) the previous
    /// version plus one second is used.
    pub fn next_after(previous: Option<&RunVersion>) -> Self {
        let now = Self::now();
        match previous {
            Some(prev) if &now <= prev => match prev.to_datetime() {
                Some(ts) => Self::from_datetime(ts + Duration::seconds(1)),
                None => now,
            },
            _ => now,
        }
    }

    pub fn to_datetime(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.0, RUN_VERSION_FORMAT).ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A finding produced by a triggered check.
///
/// Location fields are filled in by the check body and are all optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub issue_id: i64,
    pub check_id: CheckId,
    pub trip_id: TripId,
    /// `None` only transiently, between insert and stamping
    pub run_version: Option<RunVersion>,
    pub created_by: Option<UserId>,
    pub fishing_activity_id: Option<i64>,
    /// Haul number
    pub fishing_activity_num: Option<i64>,
    pub fishing_location_id: Option<i64>,
    pub catch_id: Option<i64>,
    pub catch_num: Option<i64>,
    pub species_composition_id: Option<i64>,
    pub species_comp_item_id: Option<i64>,
    pub bio_specimen_id: Option<i64>,
    pub bio_specimen_item_id: Option<i64>,
    pub length_frequency_id: Option<i64>,
    pub dissection_id: Option<i64>,
    pub fish_ticket_id: Option<i64>,
    pub species_name: Option<String>,
    pub error_item: Option<String>,
    pub error_value: Option<String>,
    pub notes: Option<String>,
}

#[cfg(test)]
#[path = "issue_test.rs"]
mod tests;
