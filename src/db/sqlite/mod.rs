//! SQLite database module

mod auth;
mod migrations;
mod preferences;

use crate::error::Result;
use crate::security::SecurityManager;
use crate::table::ViewPreferences;
use parking_lot::Mutex;
use rusqlite::Connection;
use std::path::Path;

pub use auth::TOKEN_KEY;

/// SQLite database wrapper
pub struct SqliteDb {
    conn: Mutex<Connection>,
}

impl SqliteDb {
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        migrations::run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    // ========== Auth Token ==========

    pub fn store_token(&self, token: &str, security: &SecurityManager) -> Result<()> {
        let conn = self.conn.lock();
        auth::store_token(&conn, token, security)
    }

    pub fn load_token(&self, security: &SecurityManager) -> Result<Option<String>> {
        let conn = self.conn.lock();
        auth::load_token(&conn, security)
    }

    pub fn delete_token(&self) -> Result<()> {
        let conn = self.conn.lock();
        auth::delete_token(&conn)
    }

    // ========== View Preferences ==========

    pub fn save_preferences(&self, view_name: &str, prefs: &ViewPreferences) -> Result<()> {
        let conn = self.conn.lock();
        preferences::save(&conn, view_name, prefs)
    }

    pub fn load_preferences(&self, view_name: &str) -> Result<Option<ViewPreferences>> {
        let conn = self.conn.lock();
        preferences::load(&conn, view_name)
    }

    pub fn delete_preferences(&self, view_name: &str) -> Result<()> {
        let conn = self.conn.lock();
        preferences::delete(&conn, view_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::FilterSet;

    #[test]
    fn test_token_is_stored_encrypted() {
        let db = SqliteDb::open_in_memory().unwrap();
        let security = SecurityManager::ephemeral().unwrap();

        assert_eq!(db.load_token(&security).unwrap(), None);

        db.store_token("abc.def.ghi", &security).unwrap();
        db.store_token("jkl.mno.pqr", &security).unwrap();
        assert_eq!(db.load_token(&security).unwrap().as_deref(), Some("jkl.mno.pqr"));

        let raw: String = db
            .conn
            .lock()
            .query_row("SELECT token_encrypted FROM auth_token", [], |row| row.get(0))
            .unwrap();
        assert!(!raw.contains("jkl"));

        db.delete_token().unwrap();
        assert_eq!(db.load_token(&security).unwrap(), None);
    }

    #[test]
    fn test_preferences_round_trip_per_view() {
        let db = SqliteDb::open_in_memory().unwrap();
        assert!(db.load_preferences("in_stocks").unwrap().is_none());

        let mut filters = FilterSet::new();
        filters.set_min("erp5_rank", Some(1.0));
        filters.toggle_choice("force_index_alert_state", "$$$");
        let prefs = ViewPreferences {
            filters,
            hidden_columns: ["stock_name".to_string()].into_iter().collect(),
            page_size: 250,
        };

        db.save_preferences("in_stocks", &prefs).unwrap();
        assert_eq!(db.load_preferences("in_stocks").unwrap(), Some(prefs));
        assert!(db.load_preferences("us_stocks").unwrap().is_none());

        db.delete_preferences("in_stocks").unwrap();
        assert!(db.load_preferences("in_stocks").unwrap().is_none());
    }

    #[test]
    fn test_on_disk_database_reopens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("screener.db");
        let security = SecurityManager::new(dir.path().to_path_buf()).unwrap();

        SqliteDb::new(&path).unwrap().store_token("persisted", &security).unwrap();
        let reopened = SqliteDb::new(&path).unwrap();
        assert_eq!(reopened.load_token(&security).unwrap().as_deref(), Some("persisted"));
    }
}
