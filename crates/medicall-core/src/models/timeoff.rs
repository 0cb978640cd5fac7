//! Time-off models: date ranges during which an executive is unavailable.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Categorical length of the absence, not a real start/end time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimeOffDuration {
    #[serde(rename = "2 A 4 HRS")]
    TwoToFourHours,
    #[serde(rename = "6 A 8 HRS")]
    SixToEightHours,
    #[default]
    #[serde(rename = "TODO EL DÍA")]
    FullDay,
}

/// Why the executive is unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimeOffReason {
    #[default]
    #[serde(rename = "JUNTA")]
    Meeting,
    #[serde(rename = "CAPACITACIÓN")]
    Training,
    #[serde(rename = "PERMISO")]
    Leave,
    #[serde(rename = "ADMINISTRATIVO")]
    Administrative,
}

/// A block of unavailability. Never edited in place: delete and recreate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeOff {
    pub id: String,
    /// Owning executive, keyed by name string
    pub executive: String,
    /// First day, inclusive
    pub start_date: NaiveDate,
    /// Last day, inclusive
    pub end_date: NaiveDate,
    pub duration: TimeOffDuration,
    pub reason: TimeOffReason,
    #[serde(default)]
    pub notes: String,
}

impl TimeOff {
    /// Every day of the inclusive range. Empty when the range is inverted.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end_date;
        self.start_date.iter_days().take_while(move |day| *day <= end)
    }

    pub fn covers(&self, day: NaiveDate) -> bool {
        self.start_date <= day && day <= self.end_date
    }
}
