//! Time-off persistence.

use chrono::NaiveDate;
use rusqlite::{params, Row};

use super::{Database, DbError, DbResult};
use crate::models::TimeOff;

/// Raw column values; labels are decoded after the row is read.
struct TimeOffRow {
    id: String,
    executive: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    duration: String,
    reason: String,
    notes: String,
}

impl TimeOffRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            executive: row.get(1)?,
            start_date: row.get(2)?,
            end_date: row.get(3)?,
            duration: row.get(4)?,
            reason: row.get(5)?,
            notes: row.get(6)?,
        })
    }

    fn into_time_off(self) -> DbResult<TimeOff> {
        Ok(TimeOff {
            id: self.id,
            executive: self.executive,
            start_date: self.start_date,
            end_date: self.end_date,
            duration: serde_json::from_str(&self.duration)?,
            reason: serde_json::from_str(&self.reason)?,
            notes: self.notes,
        })
    }
}

const SELECT_COLUMNS: &str =
    "SELECT id, executive, start_date, end_date, duration, reason, notes FROM time_off";

impl Database {
    /// Insert a time-off record.
    pub fn insert_time_off(&self, time_off: &TimeOff) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO time_off (id, executive, start_date, end_date, duration, reason, notes)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                time_off.id,
                time_off.executive,
                time_off.start_date,
                time_off.end_date,
                serde_json::to_string(&time_off.duration)?,
                serde_json::to_string(&time_off.reason)?,
                time_off.notes,
            ],
        )?;
        Ok(())
    }

    /// Delete a time-off record by id.
    pub fn delete_time_off(&self, id: &str) -> DbResult<()> {
        let rows = self
            .conn
            .execute("DELETE FROM time_off WHERE id = ?", [id])?;
        if rows == 0 {
            return Err(DbError::NotFound(format!("time-off {id}")));
        }
        Ok(())
    }

    /// All time-off records, oldest start first.
    pub fn list_time_off(&self) -> DbResult<Vec<TimeOff>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SELECT_COLUMNS} ORDER BY start_date, id"))?;
        let rows = stmt
            .query_map([], TimeOffRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(TimeOffRow::into_time_off).collect()
    }
}
