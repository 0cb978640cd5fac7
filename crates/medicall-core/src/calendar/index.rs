//! Date-keyed projection of visits and time-off.
//!
//! Built once per data or filter change so each rendered cell is a map
//! lookup instead of a scan over every contact's visit list.

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::NaiveDate;

use crate::models::{Contact, SlotTime, TimeOff, Visit, VisitLocator};

/// A visit as seen from the calendar, with the contact it belongs to.
#[derive(Debug, Clone, Copy)]
pub struct VisitEntry<'a> {
    pub contact: &'a Contact,
    pub visit: &'a Visit,
}

impl VisitEntry<'_> {
    pub fn locator(&self) -> VisitLocator {
        VisitLocator::new(self.contact.id.clone(), self.visit.id.clone())
    }
}

/// One entry in a day's event list.
#[derive(Debug, Clone, Copy)]
pub enum DayEvent<'a> {
    TimeOff(&'a TimeOff),
    Visit(VisitEntry<'a>),
}

impl<'a> DayEvent<'a> {
    pub fn as_visit(&self) -> Option<&VisitEntry<'a>> {
        match self {
            DayEvent::Visit(entry) => Some(entry),
            DayEvent::TimeOff(_) => None,
        }
    }

    pub fn as_time_off(&self) -> Option<&'a TimeOff> {
        match self {
            DayEvent::TimeOff(toff) => Some(*toff),
            DayEvent::Visit(_) => None,
        }
    }
}

/// Time-off first, then visits by slot (untimed last), planned before completed.
fn compare_events(a: &DayEvent<'_>, b: &DayEvent<'_>) -> Ordering {
    match (a, b) {
        (DayEvent::TimeOff(_), DayEvent::TimeOff(_)) => Ordering::Equal,
        (DayEvent::TimeOff(_), DayEvent::Visit(_)) => Ordering::Less,
        (DayEvent::Visit(_), DayEvent::TimeOff(_)) => Ordering::Greater,
        (DayEvent::Visit(x), DayEvent::Visit(y)) => {
            let time_x = x.visit.time.unwrap_or_else(SlotTime::end_of_day);
            let time_y = y.visit.time.unwrap_or_else(SlotTime::end_of_day);
            time_x
                .cmp(&time_y)
                .then_with(|| x.visit.is_completed().cmp(&y.visit.is_completed()))
        }
    }
}

/// Per-day event lists for one snapshot of the entity store.
#[derive(Debug, Default)]
pub struct EventIndex<'a> {
    days: HashMap<NaiveDate, Vec<DayEvent<'a>>>,
}

impl<'a> EventIndex<'a> {
    /// Index every contact and time-off record.
    pub fn build(contacts: &'a [Contact], time_offs: &'a [TimeOff]) -> Self {
        Self::from_parts(contacts.iter(), time_offs.iter())
    }

    /// Index only what belongs to one executive.
    pub fn for_executive(
        contacts: &'a [Contact],
        time_offs: &'a [TimeOff],
        executive: &str,
    ) -> Self {
        Self::from_parts(
            contacts.iter().filter(|c| c.executive == executive),
            time_offs.iter().filter(|t| t.executive == executive),
        )
    }

    fn from_parts(
        contacts: impl Iterator<Item = &'a Contact>,
        time_offs: impl Iterator<Item = &'a TimeOff>,
    ) -> Self {
        let mut days: HashMap<NaiveDate, Vec<DayEvent<'a>>> = HashMap::new();

        for contact in contacts {
            for visit in &contact.visits {
                days.entry(visit.date)
                    .or_default()
                    .push(DayEvent::Visit(VisitEntry { contact, visit }));
            }
        }

        for toff in time_offs {
            for day in toff.days() {
                days.entry(day).or_default().push(DayEvent::TimeOff(toff));
            }
        }

        for events in days.values_mut() {
            events.sort_by(compare_events);
        }

        Self { days }
    }

    /// Events of one day, already ordered for display.
    pub fn events_on(&self, day: NaiveDate) -> &[DayEvent<'a>] {
        self.days.get(&day).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Visits of a day booked exactly at `slot` (day view rows).
    pub fn slot_events(
        &self,
        day: NaiveDate,
        slot: SlotTime,
    ) -> impl Iterator<Item = &VisitEntry<'a>> + '_ {
        self.events_on(day)
            .iter()
            .filter_map(DayEvent::as_visit)
            .filter(move |entry| entry.visit.time == Some(slot))
    }

    /// Days that have at least one event.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.days.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}
