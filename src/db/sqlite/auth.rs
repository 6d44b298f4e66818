//! Session token storage

use crate::error::Result;
use crate::security::{Sealed, SecurityManager};
use rusqlite::{Connection, OptionalExtension};

/// Key the bearer token is stored under
pub const TOKEN_KEY: &str = "token";

pub fn store_token(conn: &Connection, token: &str, security: &SecurityManager) -> Result<()> {
    let sealed = security.seal(token)?;

    conn.execute(
        "INSERT INTO auth_token (key, token_encrypted, nonce)
         VALUES (?1, ?2, ?3)
         ON CONFLICT(key) DO UPDATE SET
           token_encrypted = excluded.token_encrypted,
           nonce = excluded.nonce,
           updated_at = datetime('now')",
        rusqlite::params![TOKEN_KEY, sealed.ciphertext, sealed.nonce],
    )?;

    Ok(())
}

pub fn load_token(conn: &Connection, security: &SecurityManager) -> Result<Option<String>> {
    let sealed = conn
        .query_row(
            "SELECT token_encrypted, nonce FROM auth_token WHERE key = ?",
            [TOKEN_KEY],
            |row| {
                Ok(Sealed {
                    ciphertext: row.get(0)?,
                    nonce: row.get(1)?,
                })
            },
        )
        .optional()?;

    sealed.map(|s| security.open(&s)).transpose()
}

pub fn delete_token(conn: &Connection) -> Result<()> {
    conn.execute("DELETE FROM auth_token WHERE key = ?", [TOKEN_KEY])?;
    Ok(())
}
