//! The compose/edit/report state machine behind the scheduling modals.
//!
//! ```text
//! Idle ──compose_*──────────▶ Composing(New)
//!      ──open_event(CITA)───▶ Composing(EditAppointment)
//!      ──open_event(visit)──▶ Composing(Report) ──edit_plan──▶ Composing(EditPlan)
//!      ──compose_time_off───▶ ComposingTimeOff
//!      ──open_event(toff)───▶ ViewingTimeOff
//! any  ──save ok / cancel / confirm_delete──▶ Idle
//! ```
//!
//! A failed save keeps the draft open so the user can fix it.

use chrono::NaiveDate;

use super::{search_contacts, Mutation, PendingDeletion, ScheduleError, ScheduleResult};
use crate::calendar::{default_slot, DayEvent, APPOINTMENT_OBJECTIVE};
use crate::models::{
    Contact, EntityStore, EntryKind, Outcome, SlotTime, TimeOff, TimeOffDuration, TimeOffReason,
    Visit, VisitLocator, VisitStatus,
};

/// Trimmed, upper-cased text, or `None` when blank.
fn normalize_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_uppercase())
    }
}

fn required(raw: &str, field: &'static str) -> ScheduleResult<String> {
    normalize_text(raw).ok_or(ScheduleError::MissingField(field))
}

/// A new visit or appointment being composed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEntryDraft {
    pub kind: EntryKind,
    pub date: NaiveDate,
    pub contact_id: Option<String>,
    pub time: SlotTime,
    /// Ignored for appointments, whose objective is fixed.
    pub objective: String,
}

/// Reassigning an existing appointment. Only the contact is editable; date,
/// time and objective stay those of `original`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppointmentEdit {
    pub origin: VisitLocator,
    pub original: Visit,
    pub contact_id: Option<String>,
}

/// Rescheduling a still-planned visit without reporting it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanEdit {
    pub target: VisitLocator,
    pub date: NaiveDate,
    pub time: Option<SlotTime>,
    pub objective: String,
}

/// Reporting the outcome of a visit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDraft {
    pub target: VisitLocator,
    pub original: Visit,
    pub date: NaiveDate,
    pub time: Option<SlotTime>,
    pub note: String,
    pub outcome: Outcome,
    pub follow_up: String,
    /// Optional follow-up visit to plan on the same contact.
    pub next_visit: Option<(NaiveDate, SlotTime)>,
}

impl ReportDraft {
    fn from_visit(target: VisitLocator, visit: &Visit) -> Self {
        // Placeholder outcomes and notes are replaced by report defaults.
        let outcome = if visit.outcome.is_reportable() {
            visit.outcome
        } else {
            Outcome::FollowUp
        };
        let note = if visit.has_placeholder_note() {
            String::new()
        } else {
            visit.note.clone()
        };
        Self {
            target,
            original: visit.clone(),
            date: visit.date,
            time: visit.time,
            note,
            outcome,
            follow_up: visit.follow_up.clone().unwrap_or_default(),
            next_visit: None,
        }
    }
}

/// Which form is open while composing a visit-like entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Draft {
    New(NewEntryDraft),
    EditAppointment(AppointmentEdit),
    EditPlan(PlanEdit),
    Report(ReportDraft),
}

/// A time-off block being composed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeOffDraft {
    pub executive: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub duration: TimeOffDuration,
    pub reason: TimeOffReason,
    pub notes: String,
}

impl TimeOffDraft {
    pub fn new(executive: impl Into<String>, today: NaiveDate) -> Self {
        Self {
            executive: executive.into(),
            start_date: today,
            end_date: today,
            duration: TimeOffDuration::default(),
            reason: TimeOffReason::default(),
            notes: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Interaction {
    #[default]
    Idle,
    Composing(Draft),
    ComposingTimeOff(TimeOffDraft),
    /// Detail popup of a time-off block, by id.
    ViewingTimeOff(String),
}

/// Drives one modal at a time over the entity store.
#[derive(Debug, Default)]
pub struct InteractionController {
    executive: Option<String>,
    state: Interaction,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    /// A controller whose contact search is limited to one executive.
    pub fn for_executive(executive: impl Into<String>) -> Self {
        Self {
            executive: Some(executive.into()),
            state: Interaction::Idle,
        }
    }

    pub fn executive(&self) -> Option<&str> {
        self.executive.as_deref()
    }

    pub fn set_executive(&mut self, executive: Option<String>) {
        self.executive = executive;
    }

    pub fn state(&self) -> &Interaction {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == Interaction::Idle
    }

    /// The open visit-like draft, if any.
    pub fn draft(&self) -> Option<&Draft> {
        match &self.state {
            Interaction::Composing(draft) => Some(draft),
            _ => None,
        }
    }

    pub fn cancel(&mut self) {
        self.state = Interaction::Idle;
    }

    // ---- opening forms ----

    /// Click on an empty day cell: a regular visit at the default slot.
    pub fn compose_visit(&mut self, date: NaiveDate) {
        self.compose(EntryKind::Visit, date, default_slot());
    }

    /// The "schedule appointment" action.
    pub fn compose_appointment(&mut self, date: NaiveDate) {
        self.compose(EntryKind::Appointment, date, default_slot());
    }

    /// Click on an empty slot in day view: a regular visit at that slot.
    pub fn compose_at_slot(&mut self, date: NaiveDate, time: SlotTime) {
        self.compose(EntryKind::Visit, date, time);
    }

    fn compose(&mut self, kind: EntryKind, date: NaiveDate, time: SlotTime) {
        let objective = match kind {
            EntryKind::Appointment => APPOINTMENT_OBJECTIVE.to_string(),
            EntryKind::Visit => String::new(),
        };
        self.state = Interaction::Composing(Draft::New(NewEntryDraft {
            kind,
            date,
            contact_id: None,
            time,
            objective,
        }));
    }

    pub fn compose_time_off(&mut self, executive: impl Into<String>, today: NaiveDate) {
        self.state = Interaction::ComposingTimeOff(TimeOffDraft::new(executive, today));
    }

    /// Click on a rendered chip: appointments open for reassignment,
    /// visits open for reporting, time-off opens its detail view.
    pub fn open_event(&mut self, event: &DayEvent<'_>) -> ScheduleResult<()> {
        match event {
            DayEvent::TimeOff(toff) => {
                self.state = Interaction::ViewingTimeOff(toff.id.clone());
                Ok(())
            }
            DayEvent::Visit(entry) if entry.visit.is_appointment() => {
                self.open_appointment(entry.contact, entry.visit)
            }
            DayEvent::Visit(entry) => self.open_report(entry.contact, entry.visit),
        }
    }

    pub fn edit_appointment(
        &mut self,
        store: &EntityStore,
        locator: &VisitLocator,
    ) -> ScheduleResult<()> {
        let (contact, visit) = Self::resolve(store, locator)?;
        self.open_appointment(contact, visit)
    }

    pub fn report(&mut self, store: &EntityStore, locator: &VisitLocator) -> ScheduleResult<()> {
        let (contact, visit) = Self::resolve(store, locator)?;
        self.open_report(contact, visit)
    }

    fn resolve<'s>(
        store: &'s EntityStore,
        locator: &VisitLocator,
    ) -> ScheduleResult<(&'s Contact, &'s Visit)> {
        let contact = store
            .contact(&locator.contact_id)
            .ok_or_else(|| ScheduleError::visit_not_found(locator))?;
        let visit = contact
            .visit(&locator.visit_id)
            .ok_or_else(|| ScheduleError::visit_not_found(locator))?;
        Ok((contact, visit))
    }

    fn open_appointment(&mut self, contact: &Contact, visit: &Visit) -> ScheduleResult<()> {
        if !visit.is_appointment() {
            return Err(ScheduleError::NotAnAppointment);
        }
        self.state = Interaction::Composing(Draft::EditAppointment(AppointmentEdit {
            origin: VisitLocator::new(contact.id.clone(), visit.id.clone()),
            original: visit.clone(),
            contact_id: Some(contact.id.clone()),
        }));
        Ok(())
    }

    fn open_report(&mut self, contact: &Contact, visit: &Visit) -> ScheduleResult<()> {
        if visit.is_appointment() {
            return Err(ScheduleError::AppointmentNotReportable);
        }
        let target = VisitLocator::new(contact.id.clone(), visit.id.clone());
        self.state = Interaction::Composing(Draft::Report(ReportDraft::from_visit(target, visit)));
        Ok(())
    }

    /// Switch the report form to its "edit plan" tab.
    pub fn edit_plan(&mut self) -> ScheduleResult<()> {
        let Interaction::Composing(Draft::Report(report)) = &self.state else {
            return Err(ScheduleError::InvalidState("edit plan is only reachable from a report"));
        };
        if report.original.status != VisitStatus::Planned {
            return Err(ScheduleError::NotPlanned);
        }
        let plan = PlanEdit {
            target: report.target.clone(),
            date: report.original.date,
            time: report.original.time,
            objective: report.original.objective.clone().unwrap_or_default(),
        };
        self.state = Interaction::Composing(Draft::EditPlan(plan));
        Ok(())
    }

    // ---- field edits ----

    fn draft_mut(&mut self) -> ScheduleResult<&mut Draft> {
        match &mut self.state {
            Interaction::Composing(draft) => Ok(draft),
            _ => Err(ScheduleError::InvalidState("no entry is being edited")),
        }
    }

    pub fn time_off_draft_mut(&mut self) -> ScheduleResult<&mut TimeOffDraft> {
        match &mut self.state {
            Interaction::ComposingTimeOff(draft) => Ok(draft),
            _ => Err(ScheduleError::InvalidState("no time-off is being composed")),
        }
    }

    /// Type-ahead candidates for the contact field.
    pub fn search<'s>(&self, store: &'s EntityStore, query: &str) -> Vec<&'s Contact> {
        search_contacts(&store.contacts, self.executive(), query)
    }

    /// Pick a contact from the type-ahead.
    pub fn select_contact(&mut self, store: &EntityStore, contact_id: &str) -> ScheduleResult<()> {
        if store.contact(contact_id).is_none() {
            return Err(ScheduleError::ContactNotFound(contact_id.to_string()));
        }
        match self.draft_mut()? {
            Draft::New(draft) => draft.contact_id = Some(contact_id.to_string()),
            Draft::EditAppointment(edit) => edit.contact_id = Some(contact_id.to_string()),
            Draft::EditPlan(_) | Draft::Report(_) => return Err(ScheduleError::FieldLocked("contact")),
        }
        Ok(())
    }

    /// Clear the contact field, as when the user edits the search text.
    pub fn clear_contact(&mut self) -> ScheduleResult<()> {
        match self.draft_mut()? {
            Draft::New(draft) => draft.contact_id = None,
            Draft::EditAppointment(edit) => edit.contact_id = None,
            Draft::EditPlan(_) | Draft::Report(_) => return Err(ScheduleError::FieldLocked("contact")),
        }
        Ok(())
    }

    pub fn set_date(&mut self, date: NaiveDate) -> ScheduleResult<()> {
        match self.draft_mut()? {
            Draft::New(draft) => draft.date = date,
            Draft::EditPlan(plan) => plan.date = date,
            Draft::Report(report) => report.date = date,
            Draft::EditAppointment(_) => return Err(ScheduleError::FieldLocked("date")),
        }
        Ok(())
    }

    /// Change the slot. Appointments only accept their two fixed slots, and an
    /// existing appointment's slot can only change by dragging it.
    pub fn set_time(&mut self, time: SlotTime) -> ScheduleResult<()> {
        match self.draft_mut()? {
            Draft::New(draft) => {
                if !draft.kind.allows(time) {
                    return Err(ScheduleError::SlotNotAllowed {
                        kind: draft.kind,
                        time,
                    });
                }
                draft.time = time;
            }
            Draft::EditPlan(plan) => {
                if !EntryKind::Visit.allows(time) {
                    return Err(ScheduleError::SlotNotAllowed {
                        kind: EntryKind::Visit,
                        time,
                    });
                }
                plan.time = Some(time);
            }
            Draft::Report(report) => {
                if !EntryKind::Visit.allows(time) {
                    return Err(ScheduleError::SlotNotAllowed {
                        kind: EntryKind::Visit,
                        time,
                    });
                }
                report.time = Some(time);
            }
            Draft::EditAppointment(_) => return Err(ScheduleError::FieldLocked("time")),
        }
        Ok(())
    }

    pub fn set_objective(&mut self, text: &str) -> ScheduleResult<()> {
        match self.draft_mut()? {
            Draft::New(draft) if draft.kind == EntryKind::Visit => draft.objective = text.to_string(),
            Draft::EditPlan(plan) => plan.objective = text.to_string(),
            _ => return Err(ScheduleError::FieldLocked("objective")),
        }
        Ok(())
    }

    fn report_mut(&mut self) -> ScheduleResult<&mut ReportDraft> {
        match self.draft_mut()? {
            Draft::Report(report) => Ok(report),
            _ => Err(ScheduleError::InvalidState("not reporting a visit")),
        }
    }

    pub fn set_note(&mut self, text: &str) -> ScheduleResult<()> {
        self.report_mut()?.note = text.to_string();
        Ok(())
    }

    pub fn set_follow_up(&mut self, text: &str) -> ScheduleResult<()> {
        self.report_mut()?.follow_up = text.to_string();
        Ok(())
    }

    pub fn set_outcome(&mut self, outcome: Outcome) -> ScheduleResult<()> {
        if !outcome.is_reportable() {
            return Err(ScheduleError::InvalidOutcome(outcome.to_string()));
        }
        self.report_mut()?.outcome = outcome;
        Ok(())
    }

    /// Set the outcome from its wire label (e.g. `"INTERESADO"`).
    pub fn set_outcome_label(&mut self, label: &str) -> ScheduleResult<()> {
        let outcome =
            Outcome::from_label(label).ok_or_else(|| ScheduleError::InvalidOutcome(label.to_string()))?;
        self.set_outcome(outcome)
    }

    /// Also plan a follow-up visit when the report is saved.
    pub fn plan_next_visit(&mut self, date: NaiveDate, time: SlotTime) -> ScheduleResult<()> {
        if !EntryKind::Visit.allows(time) {
            return Err(ScheduleError::SlotNotAllowed {
                kind: EntryKind::Visit,
                time,
            });
        }
        self.report_mut()?.next_visit = Some((date, time));
        Ok(())
    }

    pub fn clear_next_visit(&mut self) -> ScheduleResult<()> {
        self.report_mut()?.next_visit = None;
        Ok(())
    }

    // ---- completion ----

    /// Validate the open form and apply it to the store.
    ///
    /// On success the controller returns to idle. On failure nothing in the
    /// store has changed and the form stays open.
    pub fn save(&mut self, store: &mut EntityStore) -> ScheduleResult<Mutation> {
        let mutation = match &self.state {
            Interaction::Composing(Draft::New(draft)) => save_new(draft, store)?,
            Interaction::Composing(Draft::EditAppointment(edit)) => save_reassignment(edit, store)?,
            Interaction::Composing(Draft::EditPlan(plan)) => save_plan(plan, store)?,
            Interaction::Composing(Draft::Report(report)) => save_report(report, store)?,
            Interaction::ComposingTimeOff(draft) => save_time_off(draft, store)?,
            Interaction::Idle | Interaction::ViewingTimeOff(_) => {
                return Err(ScheduleError::InvalidState("nothing to save"))
            }
        };
        self.state = Interaction::Idle;
        Ok(mutation)
    }

    /// Delete button of the report form or the time-off detail view.
    pub fn request_delete(&self) -> ScheduleResult<PendingDeletion> {
        match &self.state {
            Interaction::Composing(Draft::Report(report)) => {
                Ok(PendingDeletion::visit(report.target.clone()))
            }
            Interaction::Composing(Draft::EditPlan(plan)) => {
                Ok(PendingDeletion::visit(plan.target.clone()))
            }
            Interaction::ViewingTimeOff(id) => Ok(PendingDeletion::time_off(id.clone())),
            _ => Err(ScheduleError::InvalidState("nothing to delete")),
        }
    }

    /// Apply a confirmed deletion and close whatever form was open.
    pub fn confirm_delete(
        &mut self,
        pending: PendingDeletion,
        store: &mut EntityStore,
    ) -> ScheduleResult<Mutation> {
        let mutation = pending.confirm(store)?;
        self.state = Interaction::Idle;
        Ok(mutation)
    }
}

fn save_new(draft: &NewEntryDraft, store: &mut EntityStore) -> ScheduleResult<Mutation> {
    let contact_id = draft
        .contact_id
        .as_deref()
        .ok_or(ScheduleError::NoContactSelected)?;
    if !draft.kind.allows(draft.time) {
        return Err(ScheduleError::SlotNotAllowed {
            kind: draft.kind,
            time: draft.time,
        });
    }
    let objective = match draft.kind {
        EntryKind::Appointment => APPOINTMENT_OBJECTIVE.to_string(),
        EntryKind::Visit => required(&draft.objective, "objective")?,
    };

    let visit = Visit::planned(draft.kind, draft.date, Some(draft.time), objective);
    tracing::debug!(contact_id, visit_id = %visit.id, kind = ?draft.kind, "entry created");
    store.append_visit(contact_id, visit)?;
    Ok(Mutation::contacts_changed([contact_id]))
}

fn save_reassignment(edit: &AppointmentEdit, store: &mut EntityStore) -> ScheduleResult<Mutation> {
    let to = edit
        .contact_id
        .as_deref()
        .ok_or(ScheduleError::NoContactSelected)?;
    if to == edit.origin.contact_id {
        // Nothing to move; the visit is already on this contact.
        return Ok(Mutation::contacts_changed([to]));
    }
    store.reassign_visit(&edit.origin, to)?;
    tracing::debug!(
        from = %edit.origin.contact_id,
        to,
        visit_id = %edit.origin.visit_id,
        "appointment reassigned"
    );
    Ok(Mutation::contacts_changed([edit.origin.contact_id.as_str(), to]))
}

fn save_plan(plan: &PlanEdit, store: &mut EntityStore) -> ScheduleResult<Mutation> {
    let objective = required(&plan.objective, "objective")?;
    if let Some(time) = plan.time {
        if !EntryKind::Visit.allows(time) {
            return Err(ScheduleError::SlotNotAllowed {
                kind: EntryKind::Visit,
                time,
            });
        }
    }
    store.modify_visit(&plan.target, |visit| {
        visit.date = plan.date;
        visit.time = plan.time;
        visit.objective = Some(objective);
    })?;
    Ok(Mutation::contacts_changed([plan.target.contact_id.as_str()]))
}

fn save_report(report: &ReportDraft, store: &mut EntityStore) -> ScheduleResult<Mutation> {
    let note = required(&report.note, "note")?;
    let follow_up = required(&report.follow_up, "follow-up")?;
    if !report.outcome.is_reportable() {
        return Err(ScheduleError::InvalidOutcome(report.outcome.to_string()));
    }
    // An off-grid time already on the visit may stay; a changed one may not.
    if let Some(time) = report.time.filter(|t| Some(*t) != report.original.time) {
        if !EntryKind::Visit.allows(time) {
            return Err(ScheduleError::SlotNotAllowed {
                kind: EntryKind::Visit,
                time,
            });
        }
    }

    let next = report.next_visit.map(|(date, time)| {
        Visit::planned(EntryKind::Visit, date, Some(time), follow_up.clone())
    });

    store.modify_visit(&report.target, |visit| {
        visit.date = report.date;
        visit.time = report.time;
        visit.note = note;
        visit.outcome = report.outcome;
        visit.follow_up = Some(follow_up);
        visit.status = VisitStatus::Completed;
    })?;
    // The contact was just resolved, so appending cannot fail.
    if let Some(next) = next {
        store.append_visit(&report.target.contact_id, next)?;
    }

    tracing::debug!(
        contact_id = %report.target.contact_id,
        visit_id = %report.target.visit_id,
        outcome = %report.outcome,
        next_visit = report.next_visit.is_some(),
        "visit reported"
    );
    Ok(Mutation::contacts_changed([report.target.contact_id.as_str()]))
}

fn save_time_off(draft: &TimeOffDraft, store: &mut EntityStore) -> ScheduleResult<Mutation> {
    if draft.executive.trim().is_empty() {
        return Err(ScheduleError::MissingField("executive"));
    }
    if draft.end_date < draft.start_date {
        return Err(ScheduleError::InvalidDateRange {
            start: draft.start_date,
            end: draft.end_date,
        });
    }
    let time_off = TimeOff {
        id: uuid::Uuid::new_v4().to_string(),
        executive: draft.executive.trim().to_string(),
        start_date: draft.start_date,
        end_date: draft.end_date,
        duration: draft.duration,
        reason: draft.reason,
        notes: normalize_text(&draft.notes).unwrap_or_default(),
    };
    store.time_offs.push(time_off.clone());
    Ok(Mutation::TimeOffCreated(time_off))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::EventIndex;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn slot(s: &str) -> SlotTime {
        s.parse().unwrap()
    }

    fn make_store() -> EntityStore {
        let a = Contact::new("ANGEL".into(), "Alicia Guzman".into());
        let b = Contact::new("ANGEL".into(), "Alma Navarro".into());
        EntityStore::new(vec![a, b], vec![])
    }

    fn make_planned_visit(store: &mut EntityStore) -> VisitLocator {
        let visit = Visit::planned(
            EntryKind::Visit,
            date("2024-03-05"),
            Some(slot("10:00")),
            "PRESENTAR PRODUCTO".into(),
        );
        let locator = VisitLocator::new(store.contacts[0].id.clone(), visit.id.clone());
        store.contacts[0].visits.push(visit);
        locator
    }

    #[test]
    fn test_compose_requires_contact() {
        let mut store = make_store();
        let mut ctl = InteractionController::new();
        ctl.compose_visit(date("2024-03-05"));
        ctl.set_objective("presentar").unwrap();

        assert_eq!(ctl.save(&mut store), Err(ScheduleError::NoContactSelected));
        assert!(!ctl.is_idle());
        assert!(store.contacts.iter().all(|c| c.visits.is_empty()));
    }

    #[test]
    fn test_compose_visit_uppercases_objective() {
        let mut store = make_store();
        let id = store.contacts[1].id.clone();
        let mut ctl = InteractionController::new();
        ctl.compose_at_slot(date("2024-03-05"), slot("13:30"));
        ctl.select_contact(&store, &id).unwrap();

        assert_eq!(ctl.save(&mut store), Err(ScheduleError::MissingField("objective")));

        ctl.set_objective("  presentar producto ").unwrap();
        let mutation = ctl.save(&mut store).unwrap();
        assert_eq!(mutation, Mutation::ContactsChanged(vec![id]));
        assert!(ctl.is_idle());

        let visit = &store.contacts[1].visits[0];
        assert_eq!(visit.objective.as_deref(), Some("PRESENTAR PRODUCTO"));
        assert_eq!(visit.time, Some(slot("13:30")));
        assert_eq!(visit.outcome, Outcome::Planned);
        assert!(visit.note.is_empty());
    }

    #[test]
    fn test_appointment_slot_and_objective_locked() {
        let mut store = make_store();
        let id = store.contacts[0].id.clone();
        let mut ctl = InteractionController::new();
        ctl.compose_appointment(date("2024-03-05"));
        ctl.select_contact(&store, &id).unwrap();

        assert_eq!(
            ctl.set_time(slot("10:00")),
            Err(ScheduleError::SlotNotAllowed {
                kind: EntryKind::Appointment,
                time: slot("10:00"),
            })
        );
        assert_eq!(ctl.set_objective("otra cosa"), Err(ScheduleError::FieldLocked("objective")));
        ctl.set_time(slot("16:00")).unwrap();
        ctl.save(&mut store).unwrap();

        let visit = &store.contacts[0].visits[0];
        assert!(visit.is_appointment());
        assert_eq!(visit.objective.as_deref(), Some(APPOINTMENT_OBJECTIVE));
        assert_eq!(visit.time, Some(slot("16:00")));
    }

    #[test]
    fn test_open_event_dispatch() {
        let mut store = make_store();
        let locator = make_planned_visit(&mut store);
        let mut ctl = InteractionController::new();

        {
            let index = EventIndex::build(&store.contacts, &store.time_offs);
            let event = index.events_on(date("2024-03-05"))[0];
            ctl.open_event(&event).unwrap();
        }
        match ctl.draft() {
            Some(Draft::Report(report)) => {
                assert_eq!(report.target, locator);
                assert_eq!(report.outcome, Outcome::FollowUp);
                assert!(report.note.is_empty());
            }
            other => panic!("expected report draft, got {other:?}"),
        }
        assert_eq!(
            ctl.edit_appointment(&store, &locator),
            Err(ScheduleError::NotAnAppointment)
        );
    }

    #[test]
    fn test_edit_appointment_locks_time() {
        let mut store = make_store();
        let visit = Visit::planned(
            EntryKind::Appointment,
            date("2024-03-05"),
            Some(slot("09:00")),
            APPOINTMENT_OBJECTIVE.into(),
        );
        let locator = VisitLocator::new(store.contacts[0].id.clone(), visit.id.clone());
        store.contacts[0].visits.push(visit);

        let mut ctl = InteractionController::new();
        ctl.edit_appointment(&store, &locator).unwrap();
        assert_eq!(ctl.set_time(slot("16:00")), Err(ScheduleError::FieldLocked("time")));
        assert_eq!(ctl.set_date(date("2024-03-06")), Err(ScheduleError::FieldLocked("date")));
        assert_eq!(ctl.report(&store, &locator), Err(ScheduleError::AppointmentNotReportable));

        ctl.clear_contact().unwrap();
        assert_eq!(ctl.save(&mut store), Err(ScheduleError::NoContactSelected));
        assert_eq!(store.contacts[0].visits.len(), 1);
    }

    #[test]
    fn test_report_validation() {
        let mut store = make_store();
        let locator = make_planned_visit(&mut store);
        let mut ctl = InteractionController::new();
        ctl.report(&store, &locator).unwrap();

        assert_eq!(ctl.save(&mut store), Err(ScheduleError::MissingField("note")));
        ctl.set_note("atendio").unwrap();
        assert_eq!(ctl.save(&mut store), Err(ScheduleError::MissingField("follow-up")));
        assert_eq!(
            ctl.set_outcome_label("CITA"),
            Err(ScheduleError::InvalidOutcome("CITA".into()))
        );
        assert_eq!(
            ctl.set_outcome_label("NADA"),
            Err(ScheduleError::InvalidOutcome("NADA".into()))
        );
        assert_eq!(store.visit(&locator).map(|v| v.status), Some(VisitStatus::Planned));
    }

    #[test]
    fn test_report_time_limited_to_business_slots() {
        let mut store = make_store();
        let locator = make_planned_visit(&mut store);
        let mut ctl = InteractionController::new();
        ctl.report(&store, &locator).unwrap();
        ctl.set_note("atendio").unwrap();
        ctl.set_follow_up("llamar").unwrap();

        assert_eq!(
            ctl.set_time(slot("03:15")),
            Err(ScheduleError::SlotNotAllowed {
                kind: EntryKind::Visit,
                time: slot("03:15"),
            })
        );

        // Forced past the setter, the save still refuses it.
        if let Interaction::Composing(Draft::Report(report)) = &mut ctl.state {
            report.time = Some(slot("03:15"));
        }
        assert!(matches!(
            ctl.save(&mut store),
            Err(ScheduleError::SlotNotAllowed { .. })
        ));
        assert_eq!(store.visit(&locator).and_then(|v| v.time), Some(slot("10:00")));

        ctl.set_time(slot("12:30")).unwrap();
        ctl.save(&mut store).unwrap();
        let visit = store.visit(&locator).unwrap();
        assert_eq!(visit.time, Some(slot("12:30")));
        assert_eq!(visit.status, VisitStatus::Completed);
    }

    #[test]
    fn test_edit_plan_keeps_status() {
        let mut store = make_store();
        let locator = make_planned_visit(&mut store);
        let mut ctl = InteractionController::new();
        ctl.report(&store, &locator).unwrap();
        ctl.edit_plan().unwrap();

        ctl.set_date(date("2024-03-08")).unwrap();
        ctl.set_time(slot("11:30")).unwrap();
        ctl.set_objective("negociar").unwrap();
        ctl.save(&mut store).unwrap();

        let visit = store.visit(&locator).unwrap();
        assert_eq!(visit.date, date("2024-03-08"));
        assert_eq!(visit.time, Some(slot("11:30")));
        assert_eq!(visit.objective.as_deref(), Some("NEGOCIAR"));
        assert_eq!(visit.status, VisitStatus::Planned);
        assert_eq!(visit.outcome, Outcome::Planned);
    }

    #[test]
    fn test_edit_plan_requires_planned_visit() {
        let mut store = make_store();
        let locator = make_planned_visit(&mut store);
        store
            .modify_visit(&locator, |v| v.status = VisitStatus::Completed)
            .unwrap();
        let mut ctl = InteractionController::new();
        ctl.report(&store, &locator).unwrap();
        assert_eq!(ctl.edit_plan(), Err(ScheduleError::NotPlanned));
    }

    #[test]
    fn test_time_off_compose_and_delete() {
        let mut store = make_store();
        let mut ctl = InteractionController::new();
        ctl.compose_time_off("ANGEL", date("2024-03-05"));
        {
            let draft = ctl.time_off_draft_mut().unwrap();
            assert_eq!(draft.duration, TimeOffDuration::FullDay);
            assert_eq!(draft.reason, TimeOffReason::Meeting);
            draft.end_date = date("2024-03-04");
        }
        assert!(matches!(
            ctl.save(&mut store),
            Err(ScheduleError::InvalidDateRange { .. })
        ));

        {
            let draft = ctl.time_off_draft_mut().unwrap();
            draft.end_date = date("2024-03-07");
            draft.notes = "congreso".into();
        }
        let Mutation::TimeOffCreated(created) = ctl.save(&mut store).unwrap() else {
            panic!("expected a time-off mutation");
        };
        assert_eq!(created.notes, "CONGRESO");
        assert_eq!(store.time_offs.len(), 1);

        {
            let index = EventIndex::build(&store.contacts, &store.time_offs);
            let event = index.events_on(date("2024-03-06"))[0];
            ctl.open_event(&event).unwrap();
        }
        let pending = ctl.request_delete().unwrap();
        assert_eq!(pending, PendingDeletion::TimeOff(created.id.clone()));
        let mutation = ctl.confirm_delete(pending, &mut store).unwrap();
        assert_eq!(mutation, Mutation::TimeOffDeleted(created.id));
        assert!(store.time_offs.is_empty());
        assert!(ctl.is_idle());
    }

    #[test]
    fn test_search_uses_executive_filter() {
        let mut store = make_store();
        store
            .contacts
            .push(Contact::new("LUIS".into(), "Alicia Perez".into()));
        let ctl = InteractionController::for_executive("ANGEL");
        let found = ctl.search(&store, "alicia");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Alicia Guzman");
    }
}
