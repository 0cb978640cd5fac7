//! The in-memory entity store the scheduling engine reads and mutates.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::contact::Contact;
use super::timeoff::TimeOff;
use super::visit::Visit;

/// Identifies a visit by `(contactId, visitId)`.
///
/// This pair is also the whole drag payload, so a drop always resolves
/// against current data rather than a stale copy of the visit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitLocator {
    pub contact_id: String,
    pub visit_id: String,
}

impl VisitLocator {
    pub fn new(contact_id: impl Into<String>, visit_id: impl Into<String>) -> Self {
        Self {
            contact_id: contact_id.into(),
            visit_id: visit_id.into(),
        }
    }
}

/// Contacts (with nested visits) plus time-off records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityStore {
    pub contacts: Vec<Contact>,
    pub time_offs: Vec<TimeOff>,
}

impl EntityStore {
    pub fn new(contacts: Vec<Contact>, time_offs: Vec<TimeOff>) -> Self {
        Self {
            contacts,
            time_offs,
        }
    }

    pub fn contact(&self, contact_id: &str) -> Option<&Contact> {
        self.contacts.iter().find(|c| c.id == contact_id)
    }

    pub fn contact_mut(&mut self, contact_id: &str) -> Option<&mut Contact> {
        self.contacts.iter_mut().find(|c| c.id == contact_id)
    }

    pub fn visit(&self, locator: &VisitLocator) -> Option<&Visit> {
        self.contact(&locator.contact_id)?.visit(&locator.visit_id)
    }

    pub fn time_off(&self, id: &str) -> Option<&TimeOff> {
        self.time_offs.iter().find(|t| t.id == id)
    }

    /// Distinct executive names owning at least one contact, sorted.
    pub fn executives(&self) -> Vec<String> {
        self.contacts
            .iter()
            .map(|c| c.executive.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
