//! MediCall Core Library
//!
//! Executive scheduling engine for the MediCall CRM, with the optimistic
//! sync shell that keeps it in step with the REST backend.
//!
//! # Architecture
//!
//! ```text
//!   EntityStore (contacts + nested visits, time-off)
//!        │
//!        ├──────────────▶ EventIndex ──▶ CalendarView::cells ──▶ rendered cells
//!        │                (per data or        (per navigation)
//!        │                 filter change)
//!        │
//!   InteractionController / Rescheduler
//!        │  validate, mutate locally, return a Mutation
//!        ▼
//!   SyncController ──push──▶ CrmApi (REST)        Database (SQLite)
//!        ▲                                          contact cache,
//!        └──poll marker / refetch──┘                time-off, markers
//! ```
//!
//! # Core Principle
//!
//! **Local first.** Every edit is applied to the in-memory store before any
//! network call. Single-record pushes never roll back; only a failed bulk
//! import restores its pre-import snapshot.
//!
//! # Modules
//!
//! - [`models`]: Contact, Visit, TimeOff and the entity store
//! - [`calendar`]: slot tables, event index, view windows
//! - [`schedule`]: compose/edit/report state machine, drag-and-drop, search
//! - [`db`]: SQLite contact cache, time-off and sync markers
//! - [`sync`]: `CrmApi` collaborator trait and the sync controller
//! - [`config`]: backend URL, poll interval, local store path

pub mod calendar;
pub mod config;
pub mod db;
pub mod models;
pub mod schedule;
pub mod sync;

// Re-export commonly used types
pub use calendar::{CalendarView, DayEvent, EventIndex, ViewMode};
pub use config::SyncConfig;
pub use db::Database;
pub use models::{
    Contact, EntityStore, EntryKind, Outcome, SlotTime, TimeOff, Visit, VisitLocator, VisitStatus,
};
pub use schedule::{
    InteractionController, Mutation, PendingDeletion, Rescheduler, ScheduleError,
};
pub use sync::{ApiError, CrmApi, PollOutcome, SyncController, SyncError, SyncStatus};
