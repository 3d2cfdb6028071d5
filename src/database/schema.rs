use anyhow::Result;
use rusqlite::Connection;

pub fn create_tables(conn: &Connection) -> Result<()> {
    // Journal entries. List columns hold JSON arrays, NULL when no analysis was attached.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS entries (
            id TEXT PRIMARY KEY,
            created_at INTEGER NOT NULL,
            user_id TEXT NOT NULL,
            content TEXT NOT NULL,
            productivity_score INTEGER,
            key_accomplishments TEXT,
            areas_for_improvement TEXT,
            actionable_tips TEXT,
            analysis_version TEXT
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_entries_user_created ON entries(user_id, created_at)",
        [],
    )?;

    Ok(())
}
