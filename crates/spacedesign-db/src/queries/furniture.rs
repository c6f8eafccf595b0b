use anyhow::{Result, anyhow};
use rusqlite::{Connection, Row, TransactionBehavior};

use spacedesign_types::api::NewFurniture;

use super::{OptionalExt, json_column, json_column_opt, to_json};
use crate::Database;
use crate::models::FurnitureRow;

const FURNITURE_COLUMNS: &str = "id, name, category, price, description, image_url, images, \
                                 ai_score, reviews, average_rating, created_at";

impl Database {
    pub fn create_furniture(&self, item: &NewFurniture) -> Result<FurnitureRow> {
        let images = to_json(&item.images)?;

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO furniture_items (name, category, price, description, image_url, images)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    item.name,
                    item.category,
                    item.price,
                    item.description,
                    item.image_url,
                    images,
                ],
            )?;
            let id = conn.last_insert_rowid();
            query_furniture(conn, id)?.ok_or_else(|| anyhow!("Furniture {} vanished after insert", id))
        })
    }

    pub fn get_furniture(&self, id: i64) -> Result<Option<FurnitureRow>> {
        self.with_conn(|conn| query_furniture(conn, id))
    }

    /// Best rated first; unrated items after rated ones, in catalog order.
    pub fn list_furniture(&self, category: Option<&str>) -> Result<Vec<FurnitureRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {FURNITURE_COLUMNS} FROM furniture_items
                 WHERE ?1 IS NULL OR category = ?1 COLLATE NOCASE
                 ORDER BY average_rating IS NULL, average_rating DESC, id ASC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([category], map_furniture)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Remove an item and hand it back. `None` if it did not exist.
    pub fn delete_furniture(&self, id: i64) -> Result<Option<FurnitureRow>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let Some(row) = query_furniture(&tx, id)? else {
                return Ok(None);
            };
            tx.execute("DELETE FROM furniture_items WHERE id = ?1", [id])?;
            tx.commit()?;
            Ok(Some(row))
        })
    }

    pub fn count_furniture(&self) -> Result<i64> {
        self.with_conn(|conn| {
            let n = conn.query_row("SELECT COUNT(*) FROM furniture_items", [], |row| row.get(0))?;
            Ok(n)
        })
    }
}

/// The subset of `ids` that has no catalog entry, in input order.
pub(super) fn missing_furniture_ids(conn: &Connection, ids: &[i64]) -> Result<Vec<i64>> {
    let mut stmt = conn.prepare_cached("SELECT EXISTS(SELECT 1 FROM furniture_items WHERE id = ?1)")?;
    let mut missing = Vec::new();
    for &id in ids {
        let exists: bool = stmt.query_row([id], |row| row.get(0))?;
        if !exists && !missing.contains(&id) {
            missing.push(id);
        }
    }
    Ok(missing)
}

fn query_furniture(conn: &Connection, id: i64) -> Result<Option<FurnitureRow>> {
    let sql = format!("SELECT {FURNITURE_COLUMNS} FROM furniture_items WHERE id = ?1");
    conn.query_row(&sql, [id], map_furniture).optional()
}

fn map_furniture(row: &Row<'_>) -> rusqlite::Result<FurnitureRow> {
    Ok(FurnitureRow {
        id: row.get(0)?,
        name: row.get(1)?,
        category: row.get(2)?,
        price: row.get(3)?,
        description: row.get(4)?,
        image_url: row.get(5)?,
        images: json_column(row, 6)?,
        ai_score: row.get(7)?,
        reviews: json_column_opt(row, 8)?,
        average_rating: row.get(9)?,
        created_at: row.get(10)?,
    })
}
