//! Store-level edits shared by the interaction controller and the rescheduler.

use super::{ScheduleError, ScheduleResult};
use crate::models::{EntityStore, TimeOff, Visit, VisitLocator};

impl EntityStore {
    /// Append a visit to a contact's list.
    pub fn append_visit(&mut self, contact_id: &str, visit: Visit) -> ScheduleResult<()> {
        let contact = self
            .contact_mut(contact_id)
            .ok_or_else(|| ScheduleError::ContactNotFound(contact_id.to_string()))?;
        contact.visits.push(visit);
        Ok(())
    }

    /// Edit one visit in place.
    pub fn modify_visit<F>(&mut self, locator: &VisitLocator, edit: F) -> ScheduleResult<()>
    where
        F: FnOnce(&mut Visit),
    {
        let visit = self
            .contact_mut(&locator.contact_id)
            .and_then(|c| c.visit_mut(&locator.visit_id))
            .ok_or_else(|| ScheduleError::visit_not_found(locator))?;
        edit(visit);
        Ok(())
    }

    /// Remove one visit, whatever its status.
    pub fn delete_visit(&mut self, locator: &VisitLocator) -> ScheduleResult<Visit> {
        self.contact_mut(&locator.contact_id)
            .and_then(|c| c.remove_visit(&locator.visit_id))
            .ok_or_else(|| ScheduleError::visit_not_found(locator))
    }

    /// Move a visit to another contact's list, unchanged.
    ///
    /// Both ends are resolved before anything is touched, so a failure leaves
    /// the store as it was and no caller ever sees the visit on neither list.
    pub fn reassign_visit(
        &mut self,
        locator: &VisitLocator,
        to_contact_id: &str,
    ) -> ScheduleResult<()> {
        let from = self
            .contacts
            .iter()
            .position(|c| c.id == locator.contact_id)
            .ok_or_else(|| ScheduleError::visit_not_found(locator))?;
        let to = self
            .contacts
            .iter()
            .position(|c| c.id == to_contact_id)
            .ok_or_else(|| ScheduleError::ContactNotFound(to_contact_id.to_string()))?;
        let visit = self.contacts[from]
            .remove_visit(&locator.visit_id)
            .ok_or_else(|| ScheduleError::visit_not_found(locator))?;
        self.contacts[to].visits.push(visit);
        Ok(())
    }

    pub fn delete_time_off(&mut self, id: &str) -> ScheduleResult<TimeOff> {
        let pos = self
            .time_offs
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| ScheduleError::TimeOffNotFound(id.to_string()))?;
        Ok(self.time_offs.remove(pos))
    }
}
