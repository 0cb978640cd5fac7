//! Scheduling interactions: composing, editing, reporting, rescheduling and
//! deleting calendar entries against an [`EntityStore`](crate::models::EntityStore).
//!
//! Every operation validates first and mutates second, so a rejected save
//! leaves the store untouched. Successful operations return a [`Mutation`]
//! describing what must be persisted.

mod deletion;
mod interaction;
mod ops;
mod reschedule;
mod search;

pub use deletion::*;
pub use interaction::*;
pub use reschedule::*;
pub use search::*;

use chrono::NaiveDate;
use thiserror::Error;

use crate::models::{EntryKind, SlotTime, TimeOff, VisitLocator};

/// Validation errors. All of them are caught locally, before any network call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("Select a contact")]
    NoContactSelected,

    #[error("Contact not found: {0}")]
    ContactNotFound(String),

    #[error("Visit {visit_id} not found on contact {contact_id}")]
    VisitNotFound {
        contact_id: String,
        visit_id: String,
    },

    #[error("Time-off not found: {0}")]
    TimeOffNotFound(String),

    #[error("The {0} is required")]
    MissingField(&'static str),

    #[error("Invalid outcome: {0}")]
    InvalidOutcome(String),

    #[error("{time} is not an allowed slot for {kind:?} entries")]
    SlotNotAllowed { kind: EntryKind, time: SlotTime },

    #[error("The {0} cannot be changed here")]
    FieldLocked(&'static str),

    #[error("Appointments are edited, not reported")]
    AppointmentNotReportable,

    #[error("Only appointments can be reassigned")]
    NotAnAppointment,

    #[error("Only planned visits can be rescheduled from the report")]
    NotPlanned,

    #[error("Not available right now: {0}")]
    InvalidState(&'static str),

    #[error("End date {end} is before start date {start}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("Malformed drag payload: {0}")]
    InvalidPayload(String),
}

impl ScheduleError {
    pub(crate) fn visit_not_found(locator: &VisitLocator) -> Self {
        ScheduleError::VisitNotFound {
            contact_id: locator.contact_id.clone(),
            visit_id: locator.visit_id.clone(),
        }
    }
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;

/// A change applied to the local store that still has to be persisted.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    /// Contacts whose visit list changed; each is upserted whole.
    ContactsChanged(Vec<String>),
    /// A visit removed by explicit user action.
    VisitDeleted(VisitLocator),
    TimeOffCreated(TimeOff),
    TimeOffDeleted(String),
}

impl Mutation {
    /// Build a `ContactsChanged`, dropping repeated ids but keeping order.
    pub fn contacts_changed<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for id in ids {
            let id = id.into();
            if !unique.contains(&id) {
                unique.push(id);
            }
        }
        Mutation::ContactsChanged(unique)
    }
}
