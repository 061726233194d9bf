//! Historical pagination — reverse-chronological loading of older sheets.

use std::collections::HashSet;

use juday_core::{
  sheet::{DayKey, Sheet},
  store::SheetStore,
};
use uuid::Uuid;

use crate::error::{Error, Result};

/// How many sheets a feed requests per page unless told otherwise.
pub const DEFAULT_PAGE_SIZE: usize = 10;

// ─── Single page ─────────────────────────────────────────────────────────────

/// One page of history: sheets strictly older than the requested cursor,
/// newest first.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Page {
  pub sheets:      Vec<Sheet>,
  /// Day of the oldest sheet returned; feed the next call with this.
  pub next_cursor: Option<DayKey>,
  /// `true` when the page came back full. This is a heuristic, not an
  /// exact count: a full page whose successor is empty reads as "more"
  /// until that next call returns nothing.
  pub has_more:    bool,
}

/// Fetch one page of sheets with `day < before` for `owner`.
pub async fn load_page<S: SheetStore>(
  store: &S,
  owner: Uuid,
  before: DayKey,
  limit: usize,
) -> Result<Page> {
  let sheets = store
    .list_before(owner, before, limit)
    .await
    .map_err(Error::store)?;
  let has_more = sheets.len() == limit;
  let next_cursor = sheets.last().map(|s| s.day);
  Ok(Page { sheets, next_cursor, has_more })
}

// ─── Accumulating feed ───────────────────────────────────────────────────────

/// Accumulates history pages for display, chaining cursors backward in time.
///
/// Guarantees: the visible list never contains two sheets with the same id
/// (even if overlapping pages come back after a retry), and at most one
/// fetch is in flight at a time.
pub struct HistoryFeed {
  owner:     Uuid,
  page_size: usize,
  cursor:    DayKey,
  has_more:  bool,
  loading:   bool,
  seen:      HashSet<Uuid>,
  sheets:    Vec<Sheet>,
}

impl HistoryFeed {
  /// A feed of sheets strictly older than `start` (normally today).
  pub fn new(owner: Uuid, start: DayKey, page_size: usize) -> Self {
    Self {
      owner,
      page_size: page_size.max(1),
      cursor: start,
      has_more: true,
      loading: false,
      seen: HashSet::new(),
      sheets: Vec::new(),
    }
  }

  /// All sheets loaded so far, newest first.
  pub fn sheets(&self) -> &[Sheet] { &self.sheets }

  pub fn has_more(&self) -> bool { self.has_more }

  pub fn is_loading(&self) -> bool { self.loading }

  /// Whether a proximity trigger should start a fetch right now.
  pub fn should_load(&self) -> bool { !self.loading && self.has_more }

  /// Load the next page, if one should be loaded. Returns how many new
  /// sheets became visible; `0` when the trigger was a no-op.
  pub async fn request_more<S: SheetStore>(
    &mut self,
    store: &S,
  ) -> Result<usize> {
    if !self.should_load() {
      return Ok(0);
    }

    self.loading = true;
    let result = load_page(store, self.owner, self.cursor, self.page_size).await;
    self.loading = false;

    let page = result?;
    self.has_more = page.has_more;
    if let Some(cursor) = page.next_cursor {
      self.cursor = cursor;
    }

    let mut added = 0;
    for sheet in page.sheets {
      if self.seen.insert(sheet.id) {
        self.sheets.push(sheet);
        added += 1;
      }
    }
    Ok(added)
  }
}
