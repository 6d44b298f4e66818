//! Per-view table preferences

use crate::error::Result;
use crate::table::ViewPreferences;
use rusqlite::{Connection, OptionalExtension};

pub fn save(conn: &Connection, view_name: &str, prefs: &ViewPreferences) -> Result<()> {
    let filters = serde_json::to_string(&prefs.filters)?;
    let hidden = serde_json::to_string(&prefs.hidden_columns)?;

    conn.execute(
        "INSERT INTO view_preferences (view_name, filters, hidden_columns, page_size)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(view_name) DO UPDATE SET
           filters = excluded.filters,
           hidden_columns = excluded.hidden_columns,
           page_size = excluded.page_size,
           updated_at = datetime('now')",
        rusqlite::params![view_name, filters, hidden, prefs.page_size as i64],
    )?;

    Ok(())
}

pub fn load(conn: &Connection, view_name: &str) -> Result<Option<ViewPreferences>> {
    let row = conn
        .query_row(
            "SELECT filters, hidden_columns, page_size FROM view_preferences WHERE view_name = ?",
            [view_name],
            |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?, row.get::<_, i64>(2)?)),
        )
        .optional()?;

    let Some((filters, hidden, page_size)) = row else {
        return Ok(None);
    };

    Ok(Some(ViewPreferences {
        filters: serde_json::from_str(&filters)?,
        hidden_columns: serde_json::from_str(&hidden)?,
        page_size: usize::try_from(page_size).unwrap_or(0).max(1),
    }))
}

pub fn delete(conn: &Connection, view_name: &str) -> Result<()> {
    conn.execute("DELETE FROM view_preferences WHERE view_name = ?", [view_name])?;
    Ok(())
}
