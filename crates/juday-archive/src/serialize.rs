//! Archive writer.

use chrono::{DateTime, TimeZone};
use juday_core::sheet::Sheet;

/// Serialize `sheets` as one archive document, in the order given.
///
/// Each block is `---<day>`, a blank line, then the body; entries are joined
/// with two blank lines. Export order is the caller's choice (the app
/// exports newest first).
pub fn write_archive(sheets: &[Sheet]) -> String {
  sheets
    .iter()
    .map(|s| format!("---{}\n\n{}", s.day, s.body))
    .collect::<Vec<_>>()
    .join("\n\n\n")
}

/// The conventional export filename: `juday-data-<YYYYMMDD-HHmm>.md`,
/// stamped with the export time.
pub fn export_filename<Tz: TimeZone>(at: DateTime<Tz>) -> String
where
  Tz::Offset: std::fmt::Display,
{
  format!("juday-data-{}.md", at.format("%Y%m%d-%H%M"))
}

#[cfg(test)]
mod tests {
  use chrono::{TimeZone as _, Utc};

  use super::*;

  #[test]
  fn filename_uses_compact_timestamp() {
    let at = Utc.with_ymd_and_hms(2024, 6, 1, 9, 5, 30).unwrap();
    assert_eq!(export_filename(at), "juday-data-20240601-0905.md");
  }

  #[test]
  fn empty_sheet_list_writes_empty_document() {
    assert_eq!(write_archive(&[]), "");
  }
}
