use sqlx::SqlitePool;

use super::DatabaseError;

/// Idempotent DDL, applied in order at startup.
///
/// `viewed_journeys` has no foreign key to `journeys`: the view
/// history is append-only and survives deletion of the journey itself.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id              BLOB PRIMARY KEY NOT NULL,
        name            TEXT NOT NULL,
        email           TEXT NOT NULL UNIQUE,
        password_hash   TEXT NOT NULL,
        user_type       TEXT NOT NULL CHECK (user_type IN ('traveler', 'seeker')),
        gender          TEXT CHECK (gender IN ('male', 'female', 'other')),
        profile_image   TEXT,
        bio             TEXT NOT NULL DEFAULT '',
        location        TEXT NOT NULL DEFAULT '',
        created_at      TEXT NOT NULL,
        updated_at      TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS journeys (
        id              BLOB PRIMARY KEY NOT NULL,
        traveler_id     BLOB NOT NULL REFERENCES users(id),
        title           TEXT NOT NULL,
        description     TEXT NOT NULL,
        start_location  TEXT NOT NULL,
        end_location    TEXT NOT NULL,
        start_date      TEXT NOT NULL,
        end_date        TEXT NOT NULL,
        duration        INTEGER NOT NULL,
        budget          TEXT NOT NULL DEFAULT 'moderate' CHECK (budget IN ('budget', 'moderate', 'luxury')),
        highlights      TEXT NOT NULL DEFAULT '[]',
        transportation  TEXT NOT NULL DEFAULT '[]',
        images          TEXT NOT NULL DEFAULT '[]',
        videos          TEXT NOT NULL DEFAULT '[]',
        -- Unicode-lowercased copies for case-insensitive search; SQLite LIKE only folds ASCII
        start_location_folded TEXT NOT NULL DEFAULT '',
        end_location_folded   TEXT NOT NULL DEFAULT '',
        search_terms_folded   TEXT NOT NULL DEFAULT '[]',
        views           INTEGER NOT NULL DEFAULT 0,
        rating          INTEGER CHECK (rating BETWEEN 1 AND 5),
        created_at      TEXT NOT NULL,
        updated_at      TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_journeys_traveler ON journeys (traveler_id)",
    "CREATE INDEX IF NOT EXISTS idx_journeys_created ON journeys (created_at)",
    r#"
    CREATE TABLE IF NOT EXISTS saved_journeys (
        user_id         BLOB NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        journey_id      BLOB NOT NULL REFERENCES journeys(id) ON DELETE CASCADE,
        saved_at        TEXT NOT NULL,
        PRIMARY KEY (user_id, journey_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS viewed_journeys (
        user_id         BLOB NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        journey_id      BLOB NOT NULL,
        viewed_at       TEXT NOT NULL,
        PRIMARY KEY (user_id, journey_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS chats (
        id                BLOB PRIMARY KEY NOT NULL,
        participant_low   BLOB NOT NULL REFERENCES users(id),
        participant_high  BLOB NOT NULL REFERENCES users(id),
        journey_id        BLOB REFERENCES journeys(id) ON DELETE SET NULL,
        created_at        TEXT NOT NULL,
        updated_at        TEXT NOT NULL,
        UNIQUE (participant_low, participant_high),
        CHECK (participant_low < participant_high)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS messages (
        id              BLOB PRIMARY KEY NOT NULL,
        chat_id         BLOB NOT NULL REFERENCES chats(id) ON DELETE CASCADE,
        sender_id       BLOB NOT NULL REFERENCES users(id),
        content         TEXT NOT NULL,
        is_read         INTEGER NOT NULL DEFAULT 0,
        created_at      TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_messages_chat ON messages (chat_id, created_at)",
];

pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), DatabaseError> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}
