//! Key/value markers remembered between sessions.

use rusqlite::{params, OptionalExtension};

use super::{Database, DbResult};

/// Last contacts version marker seen from the server.
pub const CONTACTS_VERSION_KEY: &str = "contacts_version";
/// Last procedures version marker. Stored, but never drives a refetch here.
pub const PROCEDURES_VERSION_KEY: &str = "procedures_version";

impl Database {
    /// Get sync state value.
    pub fn get_sync_state(&self, key: &str) -> DbResult<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM sync_state WHERE key = ?",
                [key],
                |row| row.get(0),
            )
            .optional()
            .map_err(Into::into)
    }

    /// Set sync state value.
    pub fn set_sync_state(&self, key: &str, value: &str) -> DbResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO sync_state (key, value, updated_at) VALUES (?, ?, datetime('now'))",
            params![key, value],
        )?;
        Ok(())
    }

    /// A marker, with the empty seed value read as "never synced".
    pub fn sync_marker(&self, key: &str) -> DbResult<Option<String>> {
        Ok(self.get_sync_state(key)?.filter(|v| !v.is_empty()))
    }
}
