//! Database queries for devices and notifications
use anyhow::{Error, Result};
use tokio_rusqlite::Connection;

use super::models::{Device, NewDevice, NotificationRecord, NotificationStats};

const DEVICE_COLUMNS: &str = r"
  id,
  user_id,
  device_type,
  fcm_token,
  device_id,
  device_name,
  browser_info,
  is_active,
  created_at,
  last_seen
";

fn device_from_row(row: &rusqlite::Row) -> rusqlite::Result<Device> {
    Ok(Device {
        id: row.get(0)?,
        user_id: row.get(1)?,
        device_type: row.get(2)?,
        fcm_token: row.get(3)?,
        device_id: row.get(4)?,
        device_name: row.get(5)?,
        browser_info: row.get(6)?,
        is_active: row.get(7)?,
        created_at: row.get(8)?,
        last_seen: row.get(9)?,
    })
}

fn notification_from_row(row: &rusqlite::Row) -> rusqlite::Result<NotificationRecord> {
    let data: Option<String> = row.get(5)?;
    Ok(NotificationRecord {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        message: row.get(3)?,
        kind: row.get(4)?,
        data: data.and_then(|raw| serde_json::from_str(&raw).ok()),
        is_read: row.get(6)?,
        push_success_count: row.get(7)?,
        push_failure_count: row.get(8)?,
        created_at: row.get(9)?,
    })
}

/// Register a device, or refresh it if the user already registered
/// this FCM token. Returns the device id and whether it was newly
/// created.
pub async fn upsert_device(db: &Connection, device: NewDevice) -> Result<(i64, bool), Error> {
    db.call(move |conn| {
        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM user_device WHERE user_id = ? AND fcm_token = ?",
                tokio_rusqlite::params![device.user_id, device.fcm_token],
                |row| row.get(0),
            )
            .ok();

        match existing {
            Some(id) => {
                conn.execute(
                    r"
                    UPDATE user_device
                    SET device_type = ?,
                        device_name = ?,
                        browser_info = ?,
                        is_active = 1,
                        last_seen = datetime('now')
                    WHERE id = ?
                    ",
                    tokio_rusqlite::params![
                        device.device_type,
                        device.device_name,
                        device.browser_info,
                        id,
                    ],
                )?;
                Ok((id, false))
            }
            None => {
                conn.execute(
                    r"
                    INSERT INTO user_device
                      (user_id, device_type, fcm_token, device_id, device_name, browser_info)
                    VALUES (?, ?, ?, ?, ?, ?)
                    ",
                    tokio_rusqlite::params![
                        device.user_id,
                        device.device_type,
                        device.fcm_token,
                        device.device_id,
                        device.device_name,
                        device.browser_info,
                    ],
                )?;
                Ok((conn.last_insert_rowid(), true))
            }
        }
    })
    .await
    .map_err(|e| e.into())
}

/// All of a user's devices, most recently seen first.
pub async fn list_devices(db: &Connection, user_id: String) -> Result<Vec<Device>, Error> {
    db.call(move |conn| {
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM user_device WHERE user_id = ? ORDER BY last_seen DESC",
            DEVICE_COLUMNS
        ))?;
        let devices = stmt
            .query_map([user_id], device_from_row)?
            .filter_map(Result::ok)
            .collect::<Vec<Device>>();
        Ok(devices)
    })
    .await
    .map_err(|e| e.into())
}

/// Devices that should receive push notifications for a user.
pub async fn find_active_devices(db: &Connection, user_id: String) -> Result<Vec<Device>, Error> {
    db.call(move |conn| {
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM user_device WHERE user_id = ? AND is_active = 1",
            DEVICE_COLUMNS
        ))?;
        let devices = stmt
            .query_map([user_id], device_from_row)?
            .filter_map(Result::ok)
            .collect::<Vec<Device>>();
        Ok(devices)
    })
    .await
    .map_err(|e| e.into())
}

/// Enable or disable notifications for one of the user's devices.
/// Returns false when no such device exists.
pub async fn set_device_active(
    db: &Connection,
    device_id: i64,
    user_id: String,
    active: bool,
) -> Result<bool, Error> {
    let updated = db
        .call(move |conn| {
            let count = conn.execute(
                "UPDATE user_device SET is_active = ? WHERE id = ? AND user_id = ?",
                tokio_rusqlite::params![active, device_id, user_id],
            )?;
            Ok(count)
        })
        .await?;
    Ok(updated > 0)
}

/// Rotate the FCM token for a device. Returns false when no such
/// device exists.
pub async fn update_device_token(
    db: &Connection,
    device_id: i64,
    user_id: String,
    fcm_token: String,
) -> Result<bool, Error> {
    let updated = db
        .call(move |conn| {
            let count = conn.execute(
                r"
                UPDATE user_device
                SET fcm_token = ?, last_seen = datetime('now')
                WHERE id = ? AND user_id = ?
                ",
                tokio_rusqlite::params![fcm_token, device_id, user_id],
            )?;
            Ok(count)
        })
        .await?;
    Ok(updated > 0)
}

/// Remove a device. Returns the device name when one was removed.
pub async fn remove_device(
    db: &Connection,
    device_id: i64,
    user_id: String,
) -> Result<Option<String>, Error> {
    db.call(move |conn| {
        let name: Option<Option<String>> = conn
            .query_row(
                "SELECT device_name FROM user_device WHERE id = ? AND user_id = ?",
                tokio_rusqlite::params![device_id, user_id],
                |row| row.get(0),
            )
            .ok();

        match name {
            Some(device_name) => {
                conn.execute(
                    "DELETE FROM user_device WHERE id = ? AND user_id = ?",
                    tokio_rusqlite::params![device_id, user_id],
                )?;
                Ok(Some(device_name.unwrap_or_else(|| "Unknown".to_string())))
            }
            None => Ok(None),
        }
    })
    .await
    .map_err(|e| e.into())
}

/// Mark a device's token as no longer deliverable.
pub async fn deactivate_device_token(db: &Connection, fcm_token: String) -> Result<(), Error> {
    db.call(move |conn| {
        conn.execute(
            "UPDATE user_device SET is_active = 0 WHERE fcm_token = ?",
            [fcm_token],
        )?;
        Ok(())
    })
    .await
    .map_err(|e| e.into())
}

pub async fn insert_notification(
    db: &Connection,
    user_id: String,
    title: String,
    message: String,
    kind: String,
    data: Option<String>,
) -> Result<i64, Error> {
    db.call(move |conn| {
        conn.execute(
            r"
            INSERT INTO notification (user_id, title, message, kind, data)
            VALUES (?, ?, ?, ?, ?)
            ",
            tokio_rusqlite::params![user_id, title, message, kind, data],
        )?;
        Ok(conn.last_insert_rowid())
    })
    .await
    .map_err(|e| e.into())
}

/// Record how many devices a notification reached.
pub async fn record_push_counts(
    db: &Connection,
    notification_id: i64,
    success: usize,
    failed: usize,
) -> Result<(), Error> {
    db.call(move |conn| {
        conn.execute(
            r"
            UPDATE notification
            SET push_success_count = ?, push_failure_count = ?
            WHERE id = ?
            ",
            tokio_rusqlite::params![success as i64, failed as i64, notification_id],
        )?;
        Ok(())
    })
    .await
    .map_err(|e| e.into())
}

pub async fn get_notification(
    db: &Connection,
    notification_id: i64,
) -> Result<Option<NotificationRecord>, Error> {
    db.call(move |conn| {
        let mut stmt = conn.prepare(
            r"
            SELECT id, user_id, title, message, kind, data, is_read,
                   push_success_count, push_failure_count, created_at
            FROM notification
            WHERE id = ?
            ",
        )?;
        let record = stmt
            .query_map([notification_id], notification_from_row)?
            .filter_map(Result::ok)
            .next();
        Ok(record)
    })
    .await
    .map_err(|e| e.into())
}

/// A user's notifications, newest first.
pub async fn list_notifications(
    db: &Connection,
    user_id: String,
    unread_only: bool,
    limit: i64,
    offset: i64,
) -> Result<Vec<NotificationRecord>, Error> {
    db.call(move |conn| {
        let mut stmt = conn.prepare(
            r"
            SELECT id, user_id, title, message, kind, data, is_read,
                   push_success_count, push_failure_count, created_at
            FROM notification
            WHERE user_id = ?
              AND (? = 0 OR is_read = 0)
            ORDER BY created_at DESC, id DESC
            LIMIT ? OFFSET ?
            ",
        )?;
        let records = stmt
            .query_map(
                tokio_rusqlite::params![user_id, unread_only, limit, offset],
                notification_from_row,
            )?
            .filter_map(Result::ok)
            .collect::<Vec<NotificationRecord>>();
        Ok(records)
    })
    .await
    .map_err(|e| e.into())
}

/// Mark one notification as read. Returns false when the
/// notification does not exist for this user.
pub async fn mark_notification_read(
    db: &Connection,
    notification_id: i64,
    user_id: String,
) -> Result<bool, Error> {
    let updated = db
        .call(move |conn| {
            let count = conn.execute(
                "UPDATE notification SET is_read = 1 WHERE id = ? AND user_id = ?",
                tokio_rusqlite::params![notification_id, user_id],
            )?;
            Ok(count)
        })
        .await?;
    Ok(updated > 0)
}

/// Delete one notification. Returns false when the notification does
/// not exist for this user.
pub async fn delete_notification(
    db: &Connection,
    notification_id: i64,
    user_id: String,
) -> Result<bool, Error> {
    let deleted = db
        .call(move |conn| {
            let count = conn.execute(
                "DELETE FROM notification WHERE id = ? AND user_id = ?",
                tokio_rusqlite::params![notification_id, user_id],
            )?;
            Ok(count)
        })
        .await?;
    Ok(deleted > 0)
}

/// Delete all of a user's notifications, returning how many were
/// removed.
pub async fn clear_all_notifications(db: &Connection, user_id: String) -> Result<usize, Error> {
    db.call(move |conn| {
        let count = conn.execute("DELETE FROM notification WHERE user_id = ?", [user_id])?;
        Ok(count)
    })
    .await
    .map_err(|e| e.into())
}

pub async fn mark_all_notifications_read(db: &Connection, user_id: String) -> Result<usize, Error> {
    db.call(move |conn| {
        let count = conn.execute(
            "UPDATE notification SET is_read = 1 WHERE user_id = ? AND is_read = 0",
            [user_id],
        )?;
        Ok(count)
    })
    .await
    .map_err(|e| e.into())
}

pub async fn unread_count(db: &Connection, user_id: String) -> Result<i64, Error> {
    db.call(move |conn| {
        let count = conn.query_row(
            "SELECT COUNT(*) FROM notification WHERE user_id = ? AND is_read = 0",
            [user_id],
            |row| row.get(0),
        )?;
        Ok(count)
    })
    .await
    .map_err(|e| e.into())
}

/// Totals shown in the notification settings view.
pub async fn notification_stats(
    db: &Connection,
    user_id: String,
) -> Result<NotificationStats, Error> {
    db.call(move |conn| {
        let total: i64 = conn.query_row(
            "SELECT COUNT(*) FROM notification WHERE user_id = ?",
            [&user_id],
            |row| row.get(0),
        )?;
        let unread: i64 = conn.query_row(
            "SELECT COUNT(*) FROM notification WHERE user_id = ? AND is_read = 0",
            [&user_id],
            |row| row.get(0),
        )?;
        let recent: i64 = conn.query_row(
            r"
            SELECT COUNT(*) FROM notification
            WHERE user_id = ? AND created_at >= datetime('now', '-24 hours')
            ",
            [&user_id],
            |row| row.get(0),
        )?;
        let active_devices: i64 = conn.query_row(
            "SELECT COUNT(*) FROM user_device WHERE user_id = ? AND is_active = 1",
            [&user_id],
            |row| row.get(0),
        )?;

        Ok(NotificationStats {
            total_notifications: total,
            unread_count: unread,
            recent_count: recent,
            active_devices,
        })
    })
    .await
    .map_err(|e| e.into())
}
