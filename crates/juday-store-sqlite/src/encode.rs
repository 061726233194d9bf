//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. Day keys are stored in
//! their canonical `YYYY-MM-DD` form, so lexicographic ordering in SQL is
//! chronological ordering. UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, Utc};
use juday_core::{
  principal::Principal,
  sheet::{DayKey, Sheet},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── DayKey ──────────────────────────────────────────────────────────────────

pub fn encode_day(day: DayKey) -> String { day.to_string() }

pub fn decode_day(s: &str) -> Result<DayKey> {
  DayKey::parse(s).map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `sheets` row.
pub struct RawSheet {
  pub sheet_id:   String,
  pub owner_id:   String,
  pub day:        String,
  pub body:       String,
  pub created_at: String,
  pub updated_at: String,
}

impl RawSheet {
  pub fn into_sheet(self) -> Result<Sheet> {
    Ok(Sheet {
      id:         decode_uuid(&self.sheet_id)?,
      owner:      decode_uuid(&self.owner_id)?,
      day:        decode_day(&self.day)?,
      body:       self.body,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read directly from a `principals` row.
pub struct RawPrincipal {
  pub principal_id: String,
  pub email:        String,
  pub created_at:   String,
}

impl RawPrincipal {
  pub fn into_principal(self) -> Result<Principal> {
    Ok(Principal {
      id:         decode_uuid(&self.principal_id)?,
      email:      self.email,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}
