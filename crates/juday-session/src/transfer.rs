//! Bulk export/import orchestration over the archive codec.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use juday_archive::{export_filename, parse_archive, write_archive};
use juday_core::{sheet::NewSheet, store::SheetStore};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// A rendered export: one markdown document plus its download filename.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Export {
  pub filename: String,
  pub content:  String,
}

/// Import outcome counts. `skipped` covers malformed blocks, days that
/// already have a sheet, and same-document duplicate days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
  pub imported: usize,
  pub skipped:  usize,
}

/// Export every sheet `owner` has, newest first, stamped with `at`.
///
/// An account with no sheets is reported as [`Error::NothingToExport`]
/// rather than producing an empty document.
pub async fn export_all<S: SheetStore>(
  store: &S,
  owner: Uuid,
  at: DateTime<Utc>,
) -> Result<Export> {
  let sheets = store.list_all(owner).await.map_err(Error::store)?;
  if sheets.is_empty() {
    return Err(Error::NothingToExport);
  }
  Ok(Export {
    filename: export_filename(at),
    content:  write_archive(&sheets),
  })
}

/// Import an archive document into `owner`'s account.
///
/// Existing sheets are never touched: a day that already has a sheet is
/// skipped and counted, as is a second block for the same day within the
/// document. Everything staged is inserted in one batch; if that batch
/// fails the whole import fails and nothing is persisted.
pub async fn import_archive<S: SheetStore>(
  store: &S,
  owner: Uuid,
  document: &str,
) -> Result<ImportReport> {
  let parsed = parse_archive(document);
  let mut skipped = parsed.skipped;

  let mut staged_days = HashSet::new();
  let mut staged = Vec::new();
  for entry in parsed.entries {
    if staged_days.contains(&entry.day) {
      skipped += 1;
      continue;
    }
    let exists = store
      .get_sheet(owner, entry.day)
      .await
      .map_err(Error::store)?
      .is_some();
    if exists {
      skipped += 1;
      continue;
    }
    staged_days.insert(entry.day);
    staged.push(NewSheet { day: entry.day, body: entry.body });
  }

  let imported = staged.len();
  if !staged.is_empty() {
    store
      .insert_batch(owner, staged)
      .await
      .map_err(Error::import)?;
  }

  tracing::info!(%owner, imported, skipped, "archive import finished");
  Ok(ImportReport { imported, skipped })
}
