//! SQLite schema for the local store.

/// Complete database schema.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Contact cache (last server copy plus local edits, for offline start)
-- ============================================================================

CREATE TABLE IF NOT EXISTS contact_cache (
    id TEXT PRIMARY KEY,
    position INTEGER NOT NULL,                   -- order in the server list
    payload TEXT NOT NULL,                       -- JSON Contact with embedded visits
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- ============================================================================
-- Time-off (local only, never pushed to the CRM server)
-- ============================================================================

CREATE TABLE IF NOT EXISTS time_off (
    id TEXT PRIMARY KEY,
    executive TEXT NOT NULL,
    start_date TEXT NOT NULL,                    -- YYYY-MM-DD, inclusive
    end_date TEXT NOT NULL,                      -- YYYY-MM-DD, inclusive
    duration TEXT NOT NULL,                      -- JSON label, e.g. "TODO EL DÍA"
    reason TEXT NOT NULL,                        -- JSON label, e.g. "JUNTA"
    notes TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    CHECK (end_date >= start_date)
);

CREATE INDEX IF NOT EXISTS idx_time_off_executive ON time_off(executive);
CREATE INDEX IF NOT EXISTS idx_time_off_range ON time_off(start_date, end_date);

-- ============================================================================
-- Sync State
-- ============================================================================

CREATE TABLE IF NOT EXISTS sync_state (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Last version markers seen from the server's sync-status endpoint
INSERT OR IGNORE INTO sync_state (key, value) VALUES ('contacts_version', '');
INSERT OR IGNORE INTO sync_state (key, value) VALUES ('procedures_version', '');
"#;
