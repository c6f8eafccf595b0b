use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub const SCHEMA_VERSION: i64 = 1;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version = current_version(conn)?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            BEGIN;

            CREATE TABLE users (
                id                  INTEGER PRIMARY KEY AUTOINCREMENT,
                username            TEXT NOT NULL UNIQUE,
                password            TEXT NOT NULL,
                email               TEXT,
                external_auth_id    TEXT,
                subscription_plan   TEXT NOT NULL DEFAULT 'free',
                subscription_expiry TEXT,
                created_at          TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE room_designs (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id     INTEGER REFERENCES users(id),
                title       TEXT NOT NULL,
                description TEXT,
                room_type   TEXT NOT NULL,
                design_data TEXT,
                images      TEXT NOT NULL DEFAULT '[]',
                is_public   INTEGER NOT NULL DEFAULT 0,
                likes       INTEGER NOT NULL DEFAULT 0,
                created_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX idx_room_designs_public
                ON room_designs(is_public, created_at);

            CREATE INDEX idx_room_designs_user
                ON room_designs(user_id, created_at);

            CREATE TABLE room_likes (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id     INTEGER NOT NULL REFERENCES users(id),
                room_id     INTEGER NOT NULL REFERENCES room_designs(id),
                created_at  TEXT NOT NULL DEFAULT (datetime('now')),
                UNIQUE(user_id, room_id)
            );

            CREATE TABLE business_groups (
                id           INTEGER PRIMARY KEY AUTOINCREMENT,
                name         TEXT NOT NULL,
                category     TEXT NOT NULL,
                description  TEXT,
                member_count INTEGER NOT NULL DEFAULT 0,
                created_at   TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE group_memberships (
                id         INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id    INTEGER NOT NULL REFERENCES users(id),
                group_id   INTEGER NOT NULL REFERENCES business_groups(id),
                role       TEXT NOT NULL DEFAULT 'member'
                           CHECK (role IN ('member', 'admin', 'moderator')),
                joined_at  TEXT NOT NULL DEFAULT (datetime('now')),
                UNIQUE(user_id, group_id)
            );

            CREATE TABLE furniture_items (
                id             INTEGER PRIMARY KEY AUTOINCREMENT,
                name           TEXT NOT NULL,
                category       TEXT NOT NULL,
                price          INTEGER,
                description    TEXT,
                image_url      TEXT,
                images         TEXT NOT NULL DEFAULT '[]',
                ai_score       INTEGER,
                reviews        TEXT,
                average_rating INTEGER,
                created_at     TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX idx_furniture_category
                ON furniture_items(category);

            CREATE TABLE room_layouts (
                id          TEXT PRIMARY KEY,
                name        TEXT NOT NULL,
                furniture   TEXT NOT NULL DEFAULT '[]',
                created_at  TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE qa_questions (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id     INTEGER REFERENCES users(id),
                question    TEXT NOT NULL,
                category    TEXT,
                is_answered INTEGER NOT NULL DEFAULT 0,
                ai_response TEXT,
                created_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX idx_qa_questions_category
                ON qa_questions(category, created_at);

            INSERT INTO schema_version (version) VALUES (1);

            COMMIT;
            ",
        )?;
    }

    info!("Database migrations complete (schema v{})", current_version(conn)?);
    Ok(())
}

fn current_version(conn: &Connection) -> Result<i64> {
    let version = conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| {
        r.get(0)
    })?;
    Ok(version)
}
