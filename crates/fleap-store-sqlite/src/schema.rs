//! SQL schema for the Fleap SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One JSON document per user. `email` is copied out of the document so
-- logins can use an index.
CREATE TABLE IF NOT EXISTS users (
    user_id     TEXT PRIMARY KEY,
    email       TEXT NOT NULL,
    document    TEXT NOT NULL,   -- serialized User
    created_at  TEXT NOT NULL    -- ISO 8601 UTC
);

-- Append-only. No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS notifications (
    notification_id TEXT PRIMARY KEY,
    target_user_id  TEXT NOT NULL,
    message         TEXT NOT NULL,
    created_at      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS posts (
    post_id     TEXT PRIMARY KEY,
    author_id   TEXT NOT NULL,
    content     TEXT NOT NULL,
    created_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS users_email_idx          ON users(email);
CREATE INDEX IF NOT EXISTS notifications_target_idx ON notifications(target_user_id);
CREATE INDEX IF NOT EXISTS posts_author_idx         ON posts(author_id);

PRAGMA user_version = 1;
";
