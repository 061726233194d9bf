//! SQL schema for the Juday SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS principals (
    principal_id TEXT PRIMARY KEY,
    email        TEXT NOT NULL UNIQUE,
    created_at   TEXT NOT NULL
);

-- One row per (owner, day). The UNIQUE constraint is the system invariant;
-- concurrent creation races are resolved by callers re-reading on conflict.
CREATE TABLE IF NOT EXISTS sheets (
    sheet_id   TEXT PRIMARY KEY,
    owner_id   TEXT NOT NULL,   -- opaque principal id; ownership scoping is the auth layer's job
    day        TEXT NOT NULL,   -- YYYY-MM-DD; lexicographic = chronological
    body       TEXT NOT NULL,
    created_at TEXT NOT NULL,   -- ISO 8601 UTC; server-assigned
    updated_at TEXT NOT NULL,
    UNIQUE (owner_id, day)
);

CREATE INDEX IF NOT EXISTS sheets_owner_day_idx ON sheets(owner_id, day DESC);

PRAGMA user_version = 1;
";
