use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, Row};

use super::OptionalExt;
use crate::Database;
use crate::models::UserRow;

const USER_COLUMNS: &str = "id, username, password, email, external_auth_id, subscription_plan, \
                            subscription_expiry, created_at";

impl Database {
    /// Insert a user unless the username is taken. `None` means taken.
    pub fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        email: Option<&str>,
        external_auth_id: Option<&str>,
    ) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT INTO users (username, password, email, external_auth_id)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(username) DO NOTHING",
                rusqlite::params![username, password_hash, email, external_auth_id],
            )?;
            if inserted == 0 {
                return Ok(None);
            }
            query_user_by_id(conn, conn.last_insert_rowid())
        })
    }

    pub fn get_user(&self, id: i64) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_id(conn, id))
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1");
            conn.query_row(&sql, [username], map_user).optional()
        })
    }

    /// Set plan and expiry. `None` if the user does not exist.
    pub fn update_user_subscription(
        &self,
        id: i64,
        plan: &str,
        expiry: DateTime<Utc>,
    ) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let updated = conn.execute(
                "UPDATE users SET subscription_plan = ?1, subscription_expiry = ?2 WHERE id = ?3",
                rusqlite::params![plan, expiry, id],
            )?;
            if updated == 0 {
                return Ok(None);
            }
            query_user_by_id(conn, id)
        })
    }
}

pub(crate) fn query_user_by_id(conn: &Connection, id: i64) -> Result<Option<UserRow>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1");
    conn.query_row(&sql, [id], map_user).optional()
}

fn map_user(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        password: row.get(2)?,
        email: row.get(3)?,
        external_auth_id: row.get(4)?,
        subscription_plan: row.get(5)?,
        subscription_expiry: row.get(6)?,
        created_at: row.get(7)?,
    })
}
