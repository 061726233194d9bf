//! Daily sheet resolution — the fetch-or-create path.
//!
//! One sheet per (owner, day). The sheet for today (or a future day) is
//! created lazily on first request; past days are read-only views of
//! whatever exists. Concurrent creation from another tab or client is
//! expected and resolved by re-reading, never surfaced as an error.

use chrono::Local;
use juday_core::{
  sheet::{DayKey, Sheet},
  store::{CreateOutcome, SheetStore},
};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Today in the machine's local timezone — the default resolution anchor.
pub fn today_local() -> DayKey { DayKey::new(Local::now().date_naive()) }

/// Resolve the unique sheet for `(owner, day)`.
///
/// - An existing sheet is returned as-is.
/// - A missing sheet for today-or-future is created with an empty body. If
///   the create loses the uniqueness race to a concurrent caller, the
///   winner's sheet is re-read and returned — one retry, no loop.
/// - A missing sheet for a past day is `None`; past days are never
///   auto-created.
///
/// `today` is the comparison anchor; production callers pass
/// [`today_local`].
pub async fn resolve_daily<S: SheetStore>(
  store: &S,
  owner: Uuid,
  day: DayKey,
  today: DayKey,
) -> Result<Option<Sheet>> {
  if let Some(existing) = store.get_sheet(owner, day).await.map_err(Error::store)?
  {
    return Ok(Some(existing));
  }

  if day < today {
    return Ok(None);
  }

  match store
    .create_sheet(owner, day, String::new())
    .await
    .map_err(Error::store)?
  {
    CreateOutcome::Created(sheet) => Ok(Some(sheet)),
    CreateOutcome::Conflict => {
      // Another session created the row first; adopt whatever won.
      tracing::debug!(%owner, %day, "sheet create lost the race, re-reading");
      match store.get_sheet(owner, day).await.map_err(Error::store)? {
        Some(sheet) => Ok(Some(sheet)),
        None => Err(Error::ConflictVanished { day }),
      }
    }
  }
}
