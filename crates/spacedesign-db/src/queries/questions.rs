use anyhow::{Result, anyhow};
use rusqlite::{Connection, Row};

use spacedesign_types::api::NewQuestion;

use super::OptionalExt;
use crate::Database;
use crate::models::QuestionRow;

const QUESTION_COLUMNS: &str = "id, user_id, question, category, is_answered, ai_response, created_at";

impl Database {
    /// Insert a question together with its answer. A question is never
    /// visible unanswered.
    pub fn create_question(&self, question: &NewQuestion, ai_response: &str) -> Result<QuestionRow> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO qa_questions (user_id, question, category, is_answered, ai_response)
                 VALUES (?1, ?2, ?3, 1, ?4)",
                rusqlite::params![question.user_id, question.question, question.category, ai_response],
            )?;
            let id = conn.last_insert_rowid();
            query_question(conn, id)?.ok_or_else(|| anyhow!("Question {} vanished after insert", id))
        })
    }

    pub fn get_question(&self, id: i64) -> Result<Option<QuestionRow>> {
        self.with_conn(|conn| query_question(conn, id))
    }

    /// Newest first.
    pub fn list_questions(&self, category: Option<&str>) -> Result<Vec<QuestionRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {QUESTION_COLUMNS} FROM qa_questions
                 WHERE ?1 IS NULL OR category = ?1
                 ORDER BY created_at DESC, id DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([category], map_question)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn query_question(conn: &Connection, id: i64) -> Result<Option<QuestionRow>> {
    let sql = format!("SELECT {QUESTION_COLUMNS} FROM qa_questions WHERE id = ?1");
    conn.query_row(&sql, [id], map_question).optional()
}

fn map_question(row: &Row<'_>) -> rusqlite::Result<QuestionRow> {
    Ok(QuestionRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        question: row.get(2)?,
        category: row.get(3)?,
        is_answered: row.get(4)?,
        ai_response: row.get(5)?,
        created_at: row.get(6)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ask(text: &str, category: Option<&str>) -> NewQuestion {
        NewQuestion {
            user_id: None,
            question: text.to_string(),
            category: category.map(str::to_string),
        }
    }

    #[test]
    fn questions_are_stored_answered() {
        let db = Database::open_in_memory().unwrap();
        let q = db.create_question(&ask("Which sofa?", Some("furniture")), "The blue one.").unwrap();
        assert!(q.is_answered);
        assert_eq!(q.ai_response.as_deref(), Some("The blue one."));

        let stored = db.get_question(q.id).unwrap().unwrap();
        assert!(stored.is_answered);
        assert_eq!(stored.category.as_deref(), Some("furniture"));
        assert!(db.get_question(q.id + 100).unwrap().is_none());
    }

    #[test]
    fn list_filters_by_category() {
        let db = Database::open_in_memory().unwrap();
        db.create_question(&ask("one", Some("design")), "a").unwrap();
        db.create_question(&ask("two", None), "b").unwrap();
        db.create_question(&ask("three", Some("design")), "c").unwrap();

        let design: Vec<_> = db
            .list_questions(Some("design"))
            .unwrap()
            .into_iter()
            .map(|q| q.question)
            .collect();
        assert_eq!(design, vec!["three", "one"]);
        assert_eq!(db.list_questions(None).unwrap().len(), 3);
    }

    #[test]
    fn question_may_reference_a_user() {
        let db = Database::open_in_memory().unwrap();
        let user = db.create_user("curious", "h", None, None).unwrap().unwrap();
        let q = db
            .create_question(
                &NewQuestion {
                    user_id: Some(user.id),
                    ..ask("How tall?", None)
                },
                "Eye level.",
            )
            .unwrap();
        assert_eq!(q.user_id, Some(user.id));
    }
}
