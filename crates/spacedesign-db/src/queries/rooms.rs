use anyhow::{Result, anyhow};
use rusqlite::{Connection, Row, TransactionBehavior};
use tracing::debug;

use spacedesign_types::api::NewRoomDesign;

use super::{OptionalExt, json_column, json_column_opt, row_exists, to_json};
use crate::Database;
use crate::models::{Guarded, RoomDesignRow};

/// Most recent public designs returned by the community feed.
pub const PUBLIC_FEED_LIMIT: u32 = 20;

const ROOM_COLUMNS: &str = "id, user_id, title, description, room_type, design_data, images, \
                            is_public, likes, created_at";

impl Database {
    pub fn create_room_design(&self, design: &NewRoomDesign) -> Result<RoomDesignRow> {
        let design_data = design.design_data.as_ref().map(to_json).transpose()?;
        let images = to_json(&design.images)?;

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO room_designs (user_id, title, description, room_type, design_data, images, is_public)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![
                    design.user_id,
                    design.title,
                    design.description,
                    design.room_type,
                    design_data,
                    images,
                    design.is_public,
                ],
            )?;
            let id = conn.last_insert_rowid();
            query_room_design(conn, id)?.ok_or_else(|| anyhow!("Room design {} vanished after insert", id))
        })
    }

    pub fn get_room_design(&self, id: i64) -> Result<Option<RoomDesignRow>> {
        self.with_conn(|conn| query_room_design(conn, id))
    }

    pub fn list_public_room_designs(&self, limit: u32) -> Result<Vec<RoomDesignRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {ROOM_COLUMNS} FROM room_designs
                 WHERE is_public = 1
                 ORDER BY created_at DESC, id DESC
                 LIMIT ?1"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([limit], map_room)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn list_user_room_designs(&self, user_id: i64) -> Result<Vec<RoomDesignRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {ROOM_COLUMNS} FROM room_designs
                 WHERE user_id = ?1
                 ORDER BY created_at DESC, id DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([user_id], map_room)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Record a like once per (user, room). The like row and the counter bump
    /// commit together, so `likes` always equals the number of like rows.
    pub fn like_room(&self, user_id: i64, room_id: i64) -> Result<Guarded<RoomDesignRow>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            if !row_exists(&tx, "users", user_id)? {
                return Ok(Guarded::MissingUser);
            }
            if !row_exists(&tx, "room_designs", room_id)? {
                return Ok(Guarded::MissingTarget);
            }

            let inserted = tx.execute(
                "INSERT OR IGNORE INTO room_likes (user_id, room_id) VALUES (?1, ?2)",
                [user_id, room_id],
            )?;
            if inserted == 1 {
                tx.execute("UPDATE room_designs SET likes = likes + 1 WHERE id = ?1", [room_id])?;
            }

            let room = query_room_design(&tx, room_id)?
                .ok_or_else(|| anyhow!("Room design {} vanished during like", room_id))?;
            tx.commit()?;

            debug!(user_id, room_id, inserted, "like_room");
            Ok(if inserted == 1 {
                Guarded::Inserted(room)
            } else {
                Guarded::Unchanged(room)
            })
        })
    }
}

fn query_room_design(conn: &Connection, id: i64) -> Result<Option<RoomDesignRow>> {
    let sql = format!("SELECT {ROOM_COLUMNS} FROM room_designs WHERE id = ?1");
    conn.query_row(&sql, [id], map_room).optional()
}

fn map_room(row: &Row<'_>) -> rusqlite::Result<RoomDesignRow> {
    Ok(RoomDesignRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        room_type: row.get(4)?,
        design_data: json_column_opt(row, 5)?,
        images: json_column(row, 6)?,
        is_public: row.get(7)?,
        likes: row.get(8)?,
        created_at: row.get(9)?,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn design(user_id: Option<i64>, title: &str, is_public: bool) -> NewRoomDesign {
        NewRoomDesign {
            user_id,
            title: title.to_string(),
            description: None,
            room_type: "living".to_string(),
            design_data: Some(json!({ "placements": [{ "furnitureId": 1, "x": 10 }] })),
            images: vec!["a.jpg".to_string(), "b.jpg".to_string()],
            is_public,
        }
    }

    #[test]
    fn create_and_read_back() {
        let db = Database::open_in_memory().unwrap();
        let created = db.create_room_design(&design(None, "Loft", true)).unwrap();
        assert_eq!(created.likes, 0);
        assert_eq!(created.images, vec!["a.jpg", "b.jpg"]);

        let fetched = db.get_room_design(created.id).unwrap().unwrap();
        assert_eq!(fetched.title, "Loft");
        assert_eq!(fetched.design_data, Some(json!({ "placements": [{ "furnitureId": 1, "x": 10 }] })));
        assert!(db.get_room_design(created.id + 1).unwrap().is_none());
    }

    #[test]
    fn public_feed_excludes_private_and_is_newest_first() {
        let db = Database::open_in_memory().unwrap();
        let user = db.create_user("owner", "h", None, None).unwrap().unwrap();
        db.create_room_design(&design(Some(user.id), "first", true)).unwrap();
        db.create_room_design(&design(Some(user.id), "hidden", false)).unwrap();
        db.create_room_design(&design(None, "second", true)).unwrap();

        let feed: Vec<_> = db
            .list_public_room_designs(PUBLIC_FEED_LIMIT)
            .unwrap()
            .into_iter()
            .map(|r| r.title)
            .collect();
        assert_eq!(feed, vec!["second", "first"]);

        let mine = db.list_user_room_designs(user.id).unwrap();
        assert_eq!(mine.len(), 2);

        assert_eq!(db.list_public_room_designs(1).unwrap().len(), 1);
    }

    #[test]
    fn like_is_idempotent_per_user() {
        let db = Database::open_in_memory().unwrap();
        let a = db.create_user("a-user", "h", None, None).unwrap().unwrap();
        let b = db.create_user("b-user", "h", None, None).unwrap().unwrap();
        let room = db.create_room_design(&design(None, "Den", true)).unwrap();

        assert!(matches!(db.like_room(a.id, room.id).unwrap(), Guarded::Inserted(r) if r.likes == 1));
        assert!(matches!(db.like_room(a.id, room.id).unwrap(), Guarded::Unchanged(r) if r.likes == 1));
        assert!(matches!(db.like_room(b.id, room.id).unwrap(), Guarded::Inserted(r) if r.likes == 2));

        let like_rows: i64 = db
            .with_conn(|conn| {
                Ok(conn.query_row(
                    "SELECT COUNT(*) FROM room_likes WHERE room_id = ?1",
                    [room.id],
                    |r| r.get(0),
                )?)
            })
            .unwrap();
        assert_eq!(like_rows, 2);
    }

    #[test]
    fn like_checks_both_parents() {
        let db = Database::open_in_memory().unwrap();
        let user = db.create_user("someone", "h", None, None).unwrap().unwrap();
        let room = db.create_room_design(&design(None, "Den", true)).unwrap();

        assert!(matches!(db.like_room(user.id + 10, room.id).unwrap(), Guarded::MissingUser));
        assert!(matches!(db.like_room(user.id, room.id + 10).unwrap(), Guarded::MissingTarget));
        assert_eq!(db.get_room_design(room.id).unwrap().unwrap().likes, 0);
    }

    #[test]
    fn concurrent_likes_do_not_lose_updates() {
        use std::sync::Arc;

        let db = Arc::new(Database::open_in_memory().unwrap());
        let room_id = db.create_room_design(&design(None, "Busy", true)).unwrap().id;
        let users: Vec<i64> = (0..16)
            .map(|i| db.create_user(&format!("fan-{i}"), "h", None, None).unwrap().unwrap().id)
            .collect();

        let handles: Vec<_> = users
            .into_iter()
            .map(|uid| {
                let db = db.clone();
                std::thread::spawn(move || {
                    db.like_room(uid, room_id).unwrap();
                    db.like_room(uid, room_id).unwrap();
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(db.get_room_design(room_id).unwrap().unwrap().likes, 16);
    }
}
