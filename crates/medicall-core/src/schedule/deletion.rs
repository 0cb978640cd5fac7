//! Two-step deletion: every delete path yields a pending value that only
//! takes effect once confirmed.

use super::{Mutation, ScheduleResult};
use crate::models::{EntityStore, VisitLocator};

/// A deletion awaiting user confirmation. Dropping it cancels the deletion.
#[must_use = "nothing is deleted until the deletion is confirmed"]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingDeletion {
    Visit(VisitLocator),
    TimeOff(String),
}

impl PendingDeletion {
    /// Delete a visit from any surface (profile history, chip, trash zone).
    pub fn visit(locator: VisitLocator) -> Self {
        PendingDeletion::Visit(locator)
    }

    pub fn time_off(id: impl Into<String>) -> Self {
        PendingDeletion::TimeOff(id.into())
    }

    /// The user confirmed: remove the record from the store.
    pub fn confirm(self, store: &mut EntityStore) -> ScheduleResult<Mutation> {
        match self {
            PendingDeletion::Visit(locator) => {
                store.delete_visit(&locator)?;
                tracing::debug!(
                    contact_id = %locator.contact_id,
                    visit_id = %locator.visit_id,
                    "visit deleted"
                );
                Ok(Mutation::VisitDeleted(locator))
            }
            PendingDeletion::TimeOff(id) => {
                store.delete_time_off(&id)?;
                tracing::debug!(time_off_id = %id, "time-off deleted");
                Ok(Mutation::TimeOffDeleted(id))
            }
        }
    }
}
