//! Business-hours slot tables and the per-kind slot restriction.

use crate::models::{EntryKind, SlotTime};

/// Objective text every appointment carries.
pub const APPOINTMENT_OBJECTIVE: &str = "CITA DE CONTACTO";

const FIRST_HOUR: u32 = 9;
const LAST_HOUR: u32 = 20;

/// Half-hour slots from 09:00 through 20:00.
pub fn visit_slots() -> Vec<SlotTime> {
    (FIRST_HOUR..=LAST_HOUR)
        .flat_map(|hour| {
            let minutes: &[u32] = if hour == LAST_HOUR { &[0] } else { &[0, 30] };
            minutes.iter().map(move |&minute| (hour, minute))
        })
        .filter_map(|(hour, minute)| SlotTime::new(hour, minute))
        .collect()
}

/// The opening and closing slots appointments are limited to.
pub fn appointment_slots() -> Vec<SlotTime> {
    [(9, 0), (16, 0)]
        .into_iter()
        .filter_map(|(hour, minute)| SlotTime::new(hour, minute))
        .collect()
}

/// Slot preselected when a compose form opens.
pub fn default_slot() -> SlotTime {
    SlotTime::new(FIRST_HOUR, 0).unwrap_or_else(SlotTime::end_of_day)
}

impl EntryKind {
    pub fn allowed_slots(&self) -> Vec<SlotTime> {
        match self {
            EntryKind::Visit => visit_slots(),
            EntryKind::Appointment => appointment_slots(),
        }
    }

    pub fn allows(&self, slot: SlotTime) -> bool {
        self.allowed_slots().contains(&slot)
    }
}
