//! Database connection and schema management
use anyhow::Result;
use tokio_rusqlite::Connection;

/// Open an async connection to the sqlite database stored in
/// `db_path`. The directory must already exist (see `cli::init`).
pub async fn async_db(db_path: &str) -> Result<Connection> {
    let conn = Connection::open(format!("{}/pushbridge.sqlite3", db_path)).await?;
    Ok(conn)
}

/// Create all tables and indices. Idempotent so it doubles as the
/// migration script for now.
pub fn initialize_db(conn: &rusqlite::Connection) -> Result<()> {
    conn.execute_batch(
        r"
        CREATE TABLE IF NOT EXISTS user_device (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          user_id TEXT NOT NULL,
          device_type TEXT NOT NULL,
          fcm_token TEXT NOT NULL,
          device_id TEXT,
          device_name TEXT,
          browser_info TEXT,
          is_active INTEGER NOT NULL DEFAULT 1,
          created_at TEXT NOT NULL DEFAULT (datetime('now')),
          last_seen TEXT NOT NULL DEFAULT (datetime('now')),
          UNIQUE (user_id, fcm_token)
        );

        CREATE TABLE IF NOT EXISTS notification (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          user_id TEXT NOT NULL,
          title TEXT NOT NULL,
          message TEXT NOT NULL,
          kind TEXT NOT NULL,
          data TEXT,
          is_read INTEGER NOT NULL DEFAULT 0,
          push_success_count INTEGER NOT NULL DEFAULT 0,
          push_failure_count INTEGER NOT NULL DEFAULT 0,
          created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_user_device_user
          ON user_device (user_id, is_active);
        CREATE INDEX IF NOT EXISTS idx_notification_user
          ON notification (user_id, is_read);
        ",
    )?;
    Ok(())
}

pub fn migrate_db(conn: &rusqlite::Connection) -> Result<()> {
    initialize_db(conn)
}
