//! Contact cache operations.

use rusqlite::params;

use super::{Database, DbResult, CONTACTS_VERSION_KEY};
use crate::models::Contact;

impl Database {
    /// Replace the whole cache with a fresh server copy and remember the
    /// marker it was fetched under, in one transaction.
    pub fn replace_contact_cache(
        &mut self,
        contacts: &[Contact],
        marker: Option<&str>,
    ) -> DbResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM contact_cache", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT OR REPLACE INTO contact_cache (id, position, payload) VALUES (?1, ?2, ?3)",
            )?;
            for (position, contact) in contacts.iter().enumerate() {
                stmt.execute(params![
                    contact.id,
                    position as i64,
                    serde_json::to_string(contact)?
                ])?;
            }
        }
        if let Some(marker) = marker {
            tx.execute(
                "INSERT OR REPLACE INTO sync_state (key, value, updated_at) VALUES (?, ?, datetime('now'))",
                params![CONTACTS_VERSION_KEY, marker],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Write one contact after a local edit. New contacts go first, as they
    /// do in memory.
    pub fn upsert_cached_contact(&self, contact: &Contact) -> DbResult<()> {
        let payload = serde_json::to_string(contact)?;
        let updated = self.conn.execute(
            "UPDATE contact_cache SET payload = ?2, updated_at = datetime('now') WHERE id = ?1",
            params![contact.id, payload],
        )?;
        if updated == 0 {
            self.conn.execute(
                r#"
                INSERT INTO contact_cache (id, position, payload)
                VALUES (?1, (SELECT COALESCE(MIN(position), 0) - 1 FROM contact_cache), ?2)
                "#,
                params![contact.id, payload],
            )?;
        }
        Ok(())
    }

    /// Returns whether a row was removed.
    pub fn delete_cached_contact(&self, contact_id: &str) -> DbResult<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM contact_cache WHERE id = ?", [contact_id])?;
        Ok(rows > 0)
    }

    /// Cached contacts in list order.
    pub fn load_contact_cache(&self) -> DbResult<Vec<Contact>> {
        let mut stmt = self
            .conn
            .prepare("SELECT payload FROM contact_cache ORDER BY position")?;
        let payloads = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        payloads
            .iter()
            .map(|p| serde_json::from_str(p).map_err(Into::into))
            .collect()
    }
}
