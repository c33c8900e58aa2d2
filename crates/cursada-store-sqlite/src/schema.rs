//! SQL schema for the Cursada SQLite store.
//!
//! Executed once at connection startup. Every table is keyed by its owner's
//! `user_id` so a whole account can be removed with one predicate per table.
//! There are no foreign keys: deleting a parent never removes its children,
//! which is what the cascade layer expects.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS years (
    year_id     TEXT PRIMARY KEY,
    user_id     TEXT NOT NULL,
    name        TEXT NOT NULL,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS subjects (
    subject_id  TEXT PRIMARY KEY,
    year_id     TEXT NOT NULL,
    user_id     TEXT NOT NULL,
    name        TEXT NOT NULL,
    professor   TEXT,
    classroom   TEXT,
    commission  TEXT,
    schedule    TEXT NOT NULL DEFAULT '[]',  -- JSON array of ScheduleSlot
    start_date  TEXT,                        -- YYYY-MM-DD
    end_date    TEXT,                        -- YYYY-MM-DD
    color       TEXT NOT NULL DEFAULT '',
    files       TEXT NOT NULL DEFAULT '[]',  -- JSON array of FileDescriptor
    tasks       TEXT NOT NULL DEFAULT '[]',  -- JSON array of Task
    notes       TEXT NOT NULL DEFAULT '',
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS events (
    event_id    TEXT PRIMARY KEY,
    user_id     TEXT NOT NULL,
    year_id     TEXT NOT NULL,
    subject_id  TEXT NOT NULL,
    title       TEXT NOT NULL,
    start       TEXT NOT NULL,               -- as written by the client
    all_day     INTEGER NOT NULL DEFAULT 0,
    color       TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS general_events (
    event_id    TEXT PRIMARY KEY,
    user_id     TEXT NOT NULL,
    title       TEXT NOT NULL,
    start       TEXT NOT NULL,
    all_day     INTEGER NOT NULL DEFAULT 0,
    color       TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS grades (
    grade_id    TEXT PRIMARY KEY,
    user_id     TEXT NOT NULL,
    subject_id  TEXT NOT NULL,
    title       TEXT NOT NULL,
    score       REAL NOT NULL,
    recorded_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS years_user_idx          ON years(user_id);
CREATE INDEX IF NOT EXISTS subjects_year_idx       ON subjects(user_id, year_id);
CREATE INDEX IF NOT EXISTS events_subject_idx      ON events(user_id, year_id, subject_id);
CREATE INDEX IF NOT EXISTS general_events_user_idx ON general_events(user_id);
CREATE INDEX IF NOT EXISTS grades_user_idx         ON grades(user_id, subject_id);

PRAGMA user_version = 1;
";
