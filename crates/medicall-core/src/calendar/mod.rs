//! Calendar projection: slot tables, the per-day event index and view windows.
//!
//! Everything here is synchronous and side-effect free; rendering a view is
//! `CalendarView::cells` followed by one `EventIndex::events_on` per cell.

mod index;
mod slots;
mod window;

pub use index::*;
pub use slots::*;
pub use window::*;
