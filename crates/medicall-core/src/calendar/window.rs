//! Which calendar cells a view renders, and how navigation moves the anchor.

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Calendar granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    Month,
    Week,
    #[default]
    Day,
}

/// Sunday of the week containing `day`. Weeks start on Sunday in every view.
pub fn week_start(day: NaiveDate) -> NaiveDate {
    let offset = day.weekday().num_days_from_sunday();
    day.checked_sub_days(Days::new(u64::from(offset)))
        .unwrap_or(day)
}

fn month_start(day: NaiveDate) -> NaiveDate {
    day.checked_sub_days(Days::new(u64::from(day.day0())))
        .unwrap_or(day)
}

/// Ordered cells for a view. `None` is a leading blank in a month grid.
pub fn compute_cells(mode: ViewMode, anchor: NaiveDate) -> Vec<Option<NaiveDate>> {
    match mode {
        ViewMode::Month => {
            let first = month_start(anchor);
            let blanks = first.weekday().num_days_from_sunday() as usize;
            std::iter::repeat(None)
                .take(blanks)
                .chain(
                    first
                        .iter_days()
                        .take_while(|d| d.month() == first.month())
                        .map(Some),
                )
                .collect()
        }
        ViewMode::Week => week_start(anchor).iter_days().take(7).map(Some).collect(),
        ViewMode::Day => vec![Some(anchor)],
    }
}

/// Append trailing blanks so the grid fills whole weeks.
pub fn pad_to_weeks(mut cells: Vec<Option<NaiveDate>>) -> Vec<Option<NaiveDate>> {
    let remainder = cells.len() % 7;
    if remainder != 0 {
        cells.extend(std::iter::repeat(None).take(7 - remainder));
    }
    cells
}

/// Navigation state: the active mode and the date it is anchored on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarView {
    mode: ViewMode,
    anchor: NaiveDate,
}

impl CalendarView {
    pub fn new(mode: ViewMode, anchor: NaiveDate) -> Self {
        Self { mode, anchor }
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn anchor(&self) -> NaiveDate {
        self.anchor
    }

    pub fn set_mode(&mut self, mode: ViewMode) {
        self.mode = mode;
    }

    /// Jump to a date (e.g. after clicking a day), keeping the mode.
    pub fn focus(&mut self, day: NaiveDate) {
        self.anchor = day;
    }

    /// Step back one month, week or day. Month steps clamp to the last valid day.
    pub fn prev(&mut self) {
        let shifted = match self.mode {
            ViewMode::Month => self.anchor.checked_sub_months(Months::new(1)),
            ViewMode::Week => self.anchor.checked_sub_days(Days::new(7)),
            ViewMode::Day => self.anchor.checked_sub_days(Days::new(1)),
        };
        self.anchor = shifted.unwrap_or(self.anchor);
    }

    /// Step forward one month, week or day.
    pub fn next(&mut self) {
        let shifted = match self.mode {
            ViewMode::Month => self.anchor.checked_add_months(Months::new(1)),
            ViewMode::Week => self.anchor.checked_add_days(Days::new(7)),
            ViewMode::Day => self.anchor.checked_add_days(Days::new(1)),
        };
        self.anchor = shifted.unwrap_or(self.anchor);
    }

    pub fn cells(&self) -> Vec<Option<NaiveDate>> {
        compute_cells(self.mode, self.anchor)
    }
}
