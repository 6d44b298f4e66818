//! SQLite database migrations

use crate::error::Result;
use rusqlite::Connection;

pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS migrations (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    run_migration(conn, "001_auth_token", CREATE_AUTH_TOKEN_TABLE)?;
    run_migration(conn, "002_view_preferences", CREATE_VIEW_PREFERENCES_TABLE)?;

    tracing::debug!("Database migrations completed");
    Ok(())
}

fn run_migration(conn: &Connection, name: &str, sql: &str) -> Result<()> {
    let applied: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM migrations WHERE name = ?)",
        [name],
        |row| row.get(0),
    )?;

    if !applied {
        tracing::info!("Running migration: {}", name);
        conn.execute_batch(sql)?;
        conn.execute("INSERT INTO migrations (name) VALUES (?)", [name])?;
    }

    Ok(())
}

const CREATE_AUTH_TOKEN_TABLE: &str = r#"
CREATE TABLE auth_token (
    key TEXT PRIMARY KEY,
    token_encrypted TEXT NOT NULL,
    nonce TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

const CREATE_VIEW_PREFERENCES_TABLE: &str = r#"
CREATE TABLE view_preferences (
    view_name TEXT PRIMARY KEY,
    filters TEXT NOT NULL DEFAULT '{}',
    hidden_columns TEXT NOT NULL DEFAULT '[]',
    page_size INTEGER NOT NULL DEFAULT 100,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;
