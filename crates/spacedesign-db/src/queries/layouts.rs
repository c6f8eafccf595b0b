use anyhow::Result;
use rusqlite::{Connection, Row, TransactionBehavior};
use tracing::debug;

use spacedesign_types::models::RoomLayout;

use super::furniture::missing_furniture_ids;
use super::{OptionalExt, json_column, to_json};
use crate::Database;
use crate::models::{LayoutRow, LayoutSave, Upsert};

const LAYOUT_COLUMNS: &str = "id, name, furniture, created_at, updated_at";

impl Database {
    /// Insert the layout, or replace name and furniture of the one with the
    /// same id. A replaced layout keeps its position in listings.
    ///
    /// Every placement must reference catalog furniture at the moment of the
    /// write; the check and the write share one transaction.
    pub fn save_room_layout(&self, layout: &RoomLayout) -> Result<LayoutSave> {
        let furniture = to_json(&layout.furniture)?;
        let ids: Vec<i64> = layout.furniture.iter().map(|p| p.furniture_id).collect();

        self.with_conn_mut(|conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let missing = missing_furniture_ids(&tx, &ids)?;
            if !missing.is_empty() {
                debug!(id = %layout.id, ?missing, "save_room_layout: unknown furniture");
                return Ok(LayoutSave::UnknownFurniture(missing));
            }

            let updated = tx.execute(
                "UPDATE room_layouts SET name = ?2, furniture = ?3, updated_at = datetime('now')
                 WHERE id = ?1",
                rusqlite::params![layout.id, layout.name, furniture],
            )?;
            let outcome = if updated == 0 {
                tx.execute(
                    "INSERT INTO room_layouts (id, name, furniture) VALUES (?1, ?2, ?3)",
                    rusqlite::params![layout.id, layout.name, furniture],
                )?;
                Upsert::Created
            } else {
                Upsert::Updated
            };
            tx.commit()?;

            debug!(id = %layout.id, ?outcome, "save_room_layout");
            Ok(LayoutSave::Saved(outcome))
        })
    }

    pub fn get_room_layout(&self, id: &str) -> Result<Option<LayoutRow>> {
        self.with_conn(|conn| query_layout(conn, id))
    }

    /// In the order layouts were first saved.
    pub fn list_room_layouts(&self) -> Result<Vec<LayoutRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {LAYOUT_COLUMNS} FROM room_layouts ORDER BY rowid ASC");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], map_layout)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn delete_room_layout(&self, id: &str) -> Result<Option<LayoutRow>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let Some(row) = query_layout(&tx, id)? else {
                return Ok(None);
            };
            tx.execute("DELETE FROM room_layouts WHERE id = ?1", [id])?;
            tx.commit()?;
            Ok(Some(row))
        })
    }
}

fn query_layout(conn: &Connection, id: &str) -> Result<Option<LayoutRow>> {
    let sql = format!("SELECT {LAYOUT_COLUMNS} FROM room_layouts WHERE id = ?1");
    conn.query_row(&sql, [id], map_layout).optional()
}

fn map_layout(row: &Row<'_>) -> rusqlite::Result<LayoutRow> {
    Ok(LayoutRow {
        id: row.get(0)?,
        name: row.get(1)?,
        furniture: json_column(row, 2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

#[cfg(test)]
mod tests {
    use spacedesign_types::api::NewFurniture;
    use spacedesign_types::models::FurniturePlacement;

    use super::*;

    fn layout(id: &str, name: &str, furniture_ids: &[i64]) -> RoomLayout {
        RoomLayout {
            id: id.to_string(),
            name: name.to_string(),
            furniture: furniture_ids
                .iter()
                .enumerate()
                .map(|(i, &furniture_id)| FurniturePlacement {
                    furniture_id,
                    x: 100.0 * i as f64,
                    y: 50.0,
                    z: 0.0,
                    rotation: 45.0,
                })
                .collect(),
        }
    }

    /// A database whose catalog holds ids `1..=n`.
    fn with_catalog(n: usize) -> Database {
        let db = Database::open_in_memory().unwrap();
        for i in 0..n {
            db.create_furniture(&NewFurniture {
                name: format!("Piece {i}"),
                category: "Misc".to_string(),
                price: 10,
                image_url: format!("https://img.example.com/{i}.jpg"),
                description: "A piece".to_string(),
                images: Vec::new(),
            })
            .unwrap();
        }
        db
    }

    #[test]
    fn save_creates_then_updates_in_place() {
        let db = with_catalog(3);
        let saved = LayoutSave::Saved;
        assert_eq!(db.save_room_layout(&layout("a", "First", &[1])).unwrap(), saved(Upsert::Created));
        assert_eq!(db.save_room_layout(&layout("b", "Second", &[])).unwrap(), saved(Upsert::Created));
        assert_eq!(db.save_room_layout(&layout("a", "First v2", &[2, 3])).unwrap(), saved(Upsert::Updated));

        let all = db.list_room_layouts().unwrap();
        let ids: Vec<_> = all.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);

        let a: RoomLayout = db.get_room_layout("a").unwrap().unwrap().into();
        assert_eq!(a, layout("a", "First v2", &[2, 3]));
    }

    #[test]
    fn unknown_furniture_writes_nothing() {
        let db = with_catalog(2);
        db.save_room_layout(&layout("den", "Den", &[1])).unwrap();

        assert_eq!(
            db.save_room_layout(&layout("den", "Den v2", &[2, 7, 9, 7])).unwrap(),
            LayoutSave::UnknownFurniture(vec![7, 9])
        );
        assert_eq!(
            db.save_room_layout(&layout("new", "New", &[8])).unwrap(),
            LayoutSave::UnknownFurniture(vec![8])
        );

        assert_eq!(db.get_room_layout("den").unwrap().unwrap().name, "Den");
        assert!(db.get_room_layout("new").unwrap().is_none());
    }

    #[test]
    fn deleted_furniture_cannot_be_placed() {
        let db = with_catalog(2);
        db.delete_furniture(2).unwrap().unwrap();
        assert_eq!(
            db.save_room_layout(&layout("late", "Late", &[1, 2])).unwrap(),
            LayoutSave::UnknownFurniture(vec![2])
        );
    }

    #[test]
    fn delete_returns_removed_layout() {
        let db = with_catalog(4);
        db.save_room_layout(&layout("gone", "Gone", &[4])).unwrap();

        let removed = db.delete_room_layout("gone").unwrap().unwrap();
        assert_eq!(removed.name, "Gone");
        assert!(db.get_room_layout("gone").unwrap().is_none());
        assert!(db.delete_room_layout("gone").unwrap().is_none());
    }
}
