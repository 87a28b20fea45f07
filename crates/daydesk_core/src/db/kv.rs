//! Key-value access over the `kv_store` table.
//!
//! Mirrors the browser storage API: `get` returns absence for unknown keys,
//! `set` overwrites, `remove` is idempotent.

use super::{DbError, DbResult};
use rusqlite::{params, Connection, OptionalExtension};

/// Reads the value stored under `key`, or `None` when the key was never set.
pub fn kv_get(conn: &Connection, key: &str) -> DbResult<Option<String>> {
    ensure_key(key)?;
    let value = conn
        .query_row(
            "SELECT value FROM kv_store WHERE key = ?1;",
            [key],
            |row| row.get::<_, String>(0),
        )
        .optional()?;
    Ok(value)
}

/// Stores `value` under `key`, replacing any previous value.
pub fn kv_set(conn: &Connection, key: &str, value: &str) -> DbResult<()> {
    ensure_key(key)?;
    conn.execute(
        "INSERT INTO kv_store (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET
            value = excluded.value,
            updated_at = (strftime('%s', 'now') * 1000);",
        params![key, value],
    )?;
    Ok(())
}

/// Removes `key`. Removing an unknown key is not an error.
pub fn kv_remove(conn: &Connection, key: &str) -> DbResult<()> {
    ensure_key(key)?;
    conn.execute("DELETE FROM kv_store WHERE key = ?1;", [key])?;
    Ok(())
}

fn ensure_key(key: &str) -> DbResult<()> {
    if key.is_empty() {
        return Err(DbError::EmptyKey);
    }
    Ok(())
}
