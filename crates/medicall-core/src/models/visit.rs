//! Visit models: planned and reported interactions with a contact.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Note text older clients wrote into freshly planned entries.
const LEGACY_PLACEHOLDER_NOTES: [&str; 2] = ["Visita Planeada", "CITA PROGRAMADA"];

/// A time slot label (`HH:MM`). Visits carry a slot, never a duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotTime(NaiveTime);

impl SlotTime {
    /// Build a slot from hour and minute.
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(SlotTime)
    }

    /// Sort position for entries without a time (`23:59`).
    pub fn end_of_day() -> Self {
        SlotTime(NaiveTime::from_hms_opt(23, 59, 0).unwrap_or(NaiveTime::MIN))
    }

    pub fn as_naive_time(&self) -> NaiveTime {
        self.0
    }
}

impl fmt::Display for SlotTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

impl FromStr for SlotTime {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveTime::parse_from_str(s.trim(), "%H:%M").map(SlotTime)
    }
}

impl Serialize for SlotTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SlotTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Older records store a missing time as `""`.
fn deserialize_optional_slot<'de, D>(deserializer: D) -> Result<Option<SlotTime>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// Outcome tag of a visit.
///
/// `Planned` and `Appointment` are placeholders set at creation time;
/// only the remaining values can be chosen when a visit is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    #[serde(rename = "SEGUIMIENTO")]
    FollowUp,
    #[serde(rename = "COTIZACIÓN")]
    Quotation,
    #[serde(rename = "INTERESADO")]
    Interested,
    #[serde(rename = "PROGRAMAR PROCEDIMIENTO")]
    ScheduleProcedure,
    #[serde(rename = "PLANEADA")]
    Planned,
    #[serde(rename = "CITA")]
    Appointment,
    #[serde(rename = "AUSENTE")]
    Absent,
}

impl Outcome {
    /// Values selectable in a visit report.
    pub const REPORTABLE: [Outcome; 5] = [
        Outcome::FollowUp,
        Outcome::Quotation,
        Outcome::Interested,
        Outcome::ScheduleProcedure,
        Outcome::Absent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::FollowUp => "SEGUIMIENTO",
            Outcome::Quotation => "COTIZACIÓN",
            Outcome::Interested => "INTERESADO",
            Outcome::ScheduleProcedure => "PROGRAMAR PROCEDIMIENTO",
            Outcome::Planned => "PLANEADA",
            Outcome::Appointment => "CITA",
            Outcome::Absent => "AUSENTE",
        }
    }

    /// Parse a wire label. Returns `None` for anything outside the enumeration.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        [Outcome::Planned, Outcome::Appointment]
            .into_iter()
            .chain(Outcome::REPORTABLE)
            .find(|o| o.as_str() == label)
    }

    pub fn is_reportable(&self) -> bool {
        !matches!(self, Outcome::Planned | Outcome::Appointment)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Visit lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisitStatus {
    Planned,
    Completed,
}

/// What a calendar entry is, derived from its outcome tag.
///
/// Appointments are restricted to the fixed opening/closing slots and carry a
/// locked objective; regular visits take any business-hours slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Visit,
    Appointment,
}

/// A planned or completed interaction with a contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Visit {
    /// Unique across the whole system, not just within a contact
    pub id: String,
    /// Plain calendar day, no timezone
    pub date: NaiveDate,
    /// Slot label
    #[serde(
        default,
        deserialize_with = "deserialize_optional_slot",
        skip_serializing_if = "Option::is_none"
    )]
    pub time: Option<SlotTime>,
    /// Visit result, filled in when reported
    #[serde(default)]
    pub note: String,
    /// What the visit is meant to achieve
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objective: Option<String>,
    /// Next step agreed during the visit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follow_up: Option<String>,
    pub outcome: Outcome,
    pub status: VisitStatus,
}

impl Visit {
    /// Create a new planned entry of the given kind.
    pub fn planned(
        kind: EntryKind,
        date: NaiveDate,
        time: Option<SlotTime>,
        objective: String,
    ) -> Self {
        let outcome = match kind {
            EntryKind::Visit => Outcome::Planned,
            EntryKind::Appointment => Outcome::Appointment,
        };
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            date,
            time,
            note: String::new(),
            objective: Some(objective),
            follow_up: None,
            outcome,
            status: VisitStatus::Planned,
        }
    }

    pub fn kind(&self) -> EntryKind {
        if self.outcome == Outcome::Appointment {
            EntryKind::Appointment
        } else {
            EntryKind::Visit
        }
    }

    pub fn is_appointment(&self) -> bool {
        self.kind() == EntryKind::Appointment
    }

    pub fn is_completed(&self) -> bool {
        self.status == VisitStatus::Completed
    }

    /// True when the note holds no reported content yet.
    pub fn has_placeholder_note(&self) -> bool {
        let note = self.note.trim();
        note.is_empty()
            || LEGACY_PLACEHOLDER_NOTES
                .iter()
                .any(|placeholder| placeholder.eq_ignore_ascii_case(note))
    }
}
