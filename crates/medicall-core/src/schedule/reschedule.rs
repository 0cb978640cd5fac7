//! Drag-and-drop rescheduling of visit chips.

use chrono::NaiveDate;

use super::{Mutation, PendingDeletion, ScheduleError, ScheduleResult};
use crate::models::{EntityStore, EntryKind, SlotTime, VisitLocator};

/// Where a chip was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropTarget {
    /// A day cell in month or week view. The visit keeps its time.
    Day(NaiveDate),
    /// A time row in day view. Both date and time are replaced.
    Slot { date: NaiveDate, time: SlotTime },
    Trash,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DropOutcome {
    Moved(Mutation),
    /// Trash drops only delete after confirmation.
    ConfirmDeletion(PendingDeletion),
}

/// Encode the drag payload carried by a chip (`{"contactId":…,"visitId":…}`).
pub fn encode_payload(locator: &VisitLocator) -> String {
    // A struct of two strings always serializes.
    serde_json::to_string(locator).unwrap_or_default()
}

pub fn decode_payload(raw: &str) -> ScheduleResult<VisitLocator> {
    serde_json::from_str(raw).map_err(|e| ScheduleError::InvalidPayload(e.to_string()))
}

/// Tracks whether a chip is being dragged. Purely visual feedback; nothing
/// else is blocked while a drag is in progress.
#[derive(Debug, Default)]
pub struct Rescheduler {
    dragging: Option<VisitLocator>,
}

impl Rescheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start dragging a chip and return the payload to attach to the drag.
    pub fn start_drag(&mut self, locator: VisitLocator) -> String {
        let payload = encode_payload(&locator);
        self.dragging = Some(locator);
        payload
    }

    pub fn end_drag(&mut self) {
        self.dragging = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging.is_some()
    }

    pub fn dragged(&self) -> Option<&VisitLocator> {
        self.dragging.as_ref()
    }

    /// Resolve a raw drop payload and apply it.
    pub fn drop_payload(
        &mut self,
        store: &mut EntityStore,
        raw: &str,
        target: DropTarget,
    ) -> ScheduleResult<DropOutcome> {
        self.end_drag();
        let locator = decode_payload(raw)?;
        self.drop_on(store, &locator, target)
    }

    /// Apply a drop. The visit is looked up in current data, never in a copy
    /// taken when the drag started.
    pub fn drop_on(
        &mut self,
        store: &mut EntityStore,
        locator: &VisitLocator,
        target: DropTarget,
    ) -> ScheduleResult<DropOutcome> {
        self.end_drag();
        let visit = store
            .visit(locator)
            .ok_or_else(|| ScheduleError::visit_not_found(locator))?;

        let (date, time) = match target {
            DropTarget::Trash => {
                return Ok(DropOutcome::ConfirmDeletion(PendingDeletion::visit(
                    locator.clone(),
                )))
            }
            DropTarget::Day(date) => (date, visit.time),
            DropTarget::Slot { date, time } => (date, Some(time)),
        };

        // Dragging does not enforce the appointment slot restriction.
        if let (EntryKind::Appointment, Some(time)) = (visit.kind(), time) {
            if !EntryKind::Appointment.allows(time) {
                tracing::debug!(
                    visit_id = %locator.visit_id,
                    %time,
                    "appointment dropped outside its fixed slots"
                );
            }
        }

        store.modify_visit(locator, |visit| {
            visit.date = date;
            visit.time = time;
        })?;
        Ok(DropOutcome::Moved(Mutation::contacts_changed([
            locator.contact_id.as_str(),
        ])))
    }
}
