use anyhow::{Result, anyhow};
use rusqlite::types::Type;
use rusqlite::{Connection, Row, TransactionBehavior};
use tracing::debug;

use spacedesign_types::api::NewBusinessGroup;
use spacedesign_types::models::MemberRole;

use super::{OptionalExt, row_exists};
use crate::Database;
use crate::models::{BusinessGroupRow, Guarded, MembershipRow};

const GROUP_COLUMNS: &str = "id, name, category, description, member_count, created_at";

impl Database {
    pub fn create_business_group(&self, group: &NewBusinessGroup) -> Result<BusinessGroupRow> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO business_groups (name, category, description) VALUES (?1, ?2, ?3)",
                rusqlite::params![group.name, group.category, group.description],
            )?;
            let id = conn.last_insert_rowid();
            query_group(conn, id)?.ok_or_else(|| anyhow!("Business group {} vanished after insert", id))
        })
    }

    pub fn get_business_group(&self, id: i64) -> Result<Option<BusinessGroupRow>> {
        self.with_conn(|conn| query_group(conn, id))
    }

    /// Largest groups first.
    pub fn list_business_groups(&self, category: Option<&str>) -> Result<Vec<BusinessGroupRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {GROUP_COLUMNS} FROM business_groups
                 WHERE ?1 IS NULL OR category = ?1
                 ORDER BY member_count DESC, id ASC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([category], map_group)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn list_user_groups(&self, user_id: i64) -> Result<Vec<BusinessGroupRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT g.id, g.name, g.category, g.description, g.member_count, g.created_at
                 FROM business_groups g
                 INNER JOIN group_memberships m ON m.group_id = g.id
                 WHERE m.user_id = ?1
                 ORDER BY m.joined_at ASC, m.id ASC",
            )?;
            let rows = stmt
                .query_map([user_id], map_group)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Add a membership once per (user, group); `member_count` moves with it
    /// in the same transaction.
    pub fn join_group(
        &self,
        user_id: i64,
        group_id: i64,
        role: MemberRole,
    ) -> Result<Guarded<(BusinessGroupRow, MembershipRow)>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            if !row_exists(&tx, "users", user_id)? {
                return Ok(Guarded::MissingUser);
            }
            if !row_exists(&tx, "business_groups", group_id)? {
                return Ok(Guarded::MissingTarget);
            }

            let inserted = tx.execute(
                "INSERT OR IGNORE INTO group_memberships (user_id, group_id, role) VALUES (?1, ?2, ?3)",
                rusqlite::params![user_id, group_id, role.as_str()],
            )?;
            if inserted == 1 {
                tx.execute(
                    "UPDATE business_groups SET member_count = member_count + 1 WHERE id = ?1",
                    [group_id],
                )?;
            }

            let group = query_group(&tx, group_id)?
                .ok_or_else(|| anyhow!("Business group {} vanished during join", group_id))?;
            let membership = query_membership(&tx, user_id, group_id)?
                .ok_or_else(|| anyhow!("Membership ({}, {}) missing after join", user_id, group_id))?;
            tx.commit()?;

            debug!(user_id, group_id, inserted, "join_group");
            Ok(if inserted == 1 {
                Guarded::Inserted((group, membership))
            } else {
                Guarded::Unchanged((group, membership))
            })
        })
    }
}

fn query_group(conn: &Connection, id: i64) -> Result<Option<BusinessGroupRow>> {
    let sql = format!("SELECT {GROUP_COLUMNS} FROM business_groups WHERE id = ?1");
    conn.query_row(&sql, [id], map_group).optional()
}

fn query_membership(conn: &Connection, user_id: i64, group_id: i64) -> Result<Option<MembershipRow>> {
    conn.query_row(
        "SELECT id, user_id, group_id, role, joined_at FROM group_memberships
         WHERE user_id = ?1 AND group_id = ?2",
        [user_id, group_id],
        |row| {
            let role: String = row.get(3)?;
            Ok(MembershipRow {
                id: row.get(0)?,
                user_id: row.get(1)?,
                group_id: row.get(2)?,
                role: role
                    .parse()
                    .map_err(|e: String| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, e.into()))?,
                joined_at: row.get(4)?,
            })
        },
    )
    .optional()
}

fn map_group(row: &Row<'_>) -> rusqlite::Result<BusinessGroupRow> {
    Ok(BusinessGroupRow {
        id: row.get(0)?,
        name: row.get(1)?,
        category: row.get(2)?,
        description: row.get(3)?,
        member_count: row.get(4)?,
        created_at: row.get(5)?,
    })
}
