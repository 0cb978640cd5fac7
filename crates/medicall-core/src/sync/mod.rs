//! Optimistic sync shell between the scheduling engine and the CRM backend.
//!
//! Local edits land in memory first and are pushed afterwards. A periodic
//! poll compares the server's version marker with the last one seen and
//! refetches only when it moved. Bulk imports hold an exclusive flag that
//! keeps the poll from installing server data mid-import.

mod api;
mod controller;
mod poller;

pub use api::*;
pub use controller::*;

use thiserror::Error;

use crate::db::DbError;
use crate::schedule::ScheduleError;

/// Sync shell errors.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Local store error: {0}")]
    Db(#[from] DbError),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error("A bulk import is already running")]
    ImportInProgress,
}

pub type SyncResult<T> = Result<T, SyncError>;
