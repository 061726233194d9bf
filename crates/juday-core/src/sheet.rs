//! Sheet — one calendar day's markdown notes for one principal.
//!
//! The system invariant lives here: at most one [`Sheet`] exists for any
//! `(owner, day)` pair, ever. The storage backend enforces it with a
//! uniqueness constraint; everything above relies on it.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize, de, ser};
use uuid::Uuid;

use crate::error::DayKeyError;

// ─── DayKey ──────────────────────────────────────────────────────────────────

/// A calendar date in its canonical `YYYY-MM-DD` text form.
///
/// Parsing is strict: the shape must be exactly four digits, hyphen, two
/// digits, hyphen, two digits, and the digits must name a real calendar
/// date. `2024-1-2` and `2024-13-45` are both rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DayKey(NaiveDate);

impl DayKey {
  pub fn new(date: NaiveDate) -> Self { Self(date) }

  pub fn date(self) -> NaiveDate { self.0 }

  /// Strict `YYYY-MM-DD` parse. Shape first, then calendar validity.
  pub fn parse(s: &str) -> Result<Self, DayKeyError> {
    let bytes = s.as_bytes();
    let shaped = bytes.len() == 10
      && bytes[4] == b'-'
      && bytes[7] == b'-'
      && bytes
        .iter()
        .enumerate()
        .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
    if !shaped {
      return Err(DayKeyError::Malformed(s.to_string()));
    }

    let year: i32 = s[..4].parse().expect("digits checked");
    let month: u32 = s[5..7].parse().expect("digits checked");
    let day: u32 = s[8..10].parse().expect("digits checked");

    NaiveDate::from_ymd_opt(year, month, day)
      .map(Self)
      .ok_or_else(|| DayKeyError::NotACalendarDate(s.to_string()))
  }

  /// The day before this one.
  pub fn pred(self) -> Self { Self(self.0.pred_opt().expect("in range")) }

  /// The day after this one.
  pub fn succ(self) -> Self { Self(self.0.succ_opt().expect("in range")) }
}

impl fmt::Display for DayKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{:04}-{:02}-{:02}",
      self.0.year(),
      self.0.month(),
      self.0.day()
    )
  }
}

impl FromStr for DayKey {
  type Err = DayKeyError;

  fn from_str(s: &str) -> Result<Self, Self::Err> { Self::parse(s) }
}

impl From<NaiveDate> for DayKey {
  fn from(date: NaiveDate) -> Self { Self(date) }
}

impl Serialize for DayKey {
  fn serialize<S: ser::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(self)
  }
}

impl<'de> Deserialize<'de> for DayKey {
  fn deserialize<D: de::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
    let s = String::deserialize(d)?;
    Self::parse(&s).map_err(de::Error::custom)
  }
}

// ─── Sheet ───────────────────────────────────────────────────────────────────

/// One day's journal sheet. The body is free-form markdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sheet {
  pub id:         Uuid,
  /// Principal id; immutable after creation.
  pub owner:      Uuid,
  /// The calendar day this sheet belongs to; unique per owner.
  pub day:        DayKey,
  pub body:       String,
  pub created_at: DateTime<Utc>,
  /// Refreshed on every body mutation.
  pub updated_at: DateTime<Utc>,
}

/// Input for batch insertion (bulk import). Ids and timestamps are assigned
/// by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSheet {
  pub day:  DayKey,
  pub body: String,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parse_valid_day() {
    let k = DayKey::parse("2024-03-15").unwrap();
    assert_eq!(k.to_string(), "2024-03-15");
    assert_eq!(k.date(), NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
  }

  #[test]
  fn parse_rejects_unpadded_components() {
    assert!(matches!(
      DayKey::parse("2024-3-15"),
      Err(DayKeyError::Malformed(_))
    ));
    assert!(matches!(
      DayKey::parse("2024-03-5"),
      Err(DayKeyError::Malformed(_))
    ));
  }

  #[test]
  fn parse_rejects_impossible_date() {
    assert!(matches!(
      DayKey::parse("2024-13-45"),
      Err(DayKeyError::NotACalendarDate(_))
    ));
    assert!(matches!(
      DayKey::parse("2023-02-29"),
      Err(DayKeyError::NotACalendarDate(_))
    ));
  }

  #[test]
  fn parse_rejects_garbage() {
    for s in ["", "---", "20240315", "2024/03/15", "2024-03-15 ", "x024-03-15"]
    {
      assert!(DayKey::parse(s).is_err(), "accepted {s:?}");
    }
  }

  #[test]
  fn leap_day_is_valid() {
    assert!(DayKey::parse("2024-02-29").is_ok());
  }

  #[test]
  fn ordering_matches_chronology() {
    let a = DayKey::parse("2024-01-31").unwrap();
    let b = DayKey::parse("2024-02-01").unwrap();
    assert!(a < b);
    assert_eq!(a.succ(), b);
    assert_eq!(b.pred(), a);
  }

  #[test]
  fn serde_round_trips_as_string() {
    let k = DayKey::parse("2024-12-01").unwrap();
    let json = serde_json::to_string(&k).unwrap();
    assert_eq!(json, "\"2024-12-01\"");
    let back: DayKey = serde_json::from_str(&json).unwrap();
    assert_eq!(back, k);
  }
}
