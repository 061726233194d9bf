//! [`SqliteStore`] — the SQLite implementation of [`SheetStore`].

use std::{
  collections::HashMap,
  path::Path,
  sync::{Arc, Mutex, PoisonError},
};

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use tokio::sync::broadcast;
use uuid::Uuid;

use juday_core::{
  principal::Principal,
  sheet::{DayKey, NewSheet, Sheet},
  store::{CreateOutcome, SheetStore},
};

use crate::{
  Error, Result,
  encode::{RawPrincipal, RawSheet, encode_day, encode_dt, encode_uuid},
  schema::SCHEMA,
};

/// Capacity of each per-sheet update channel. Lagging receivers miss events
/// rather than blocking writers.
const WATCH_CAPACITY: usize = 16;

const SHEET_COLUMNS: &str =
  "sheet_id, owner_id, day, body, created_at, updated_at";

fn read_sheet_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawSheet> {
  Ok(RawSheet {
    sheet_id:   row.get(0)?,
    owner_id:   row.get(1)?,
    day:        row.get(2)?,
    body:       row.get(3)?,
    created_at: row.get(4)?,
    updated_at: row.get(5)?,
  })
}

fn is_unique_violation(e: &rusqlite::Error) -> bool {
  matches!(
    e,
    rusqlite::Error::SqliteFailure(f, _)
      if f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
        || f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
  )
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Juday sheet store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection and the watcher registry are
/// reference-counted, so clones observe each other's updates.
#[derive(Clone)]
pub struct SqliteStore {
  conn:     tokio_rusqlite::Connection,
  watchers: Arc<Mutex<HashMap<Uuid, broadcast::Sender<Sheet>>>>,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self {
      conn,
      watchers: Arc::new(Mutex::new(HashMap::new())),
    };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self {
      conn,
      watchers: Arc::new(Mutex::new(HashMap::new())),
    };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Find the principal for `email`, creating it on first use.
  ///
  /// The auth collaborator owns sign-in; this only materialises the row that
  /// sheet ownership references.
  pub async fn ensure_principal(&self, email: &str) -> Result<Principal> {
    let email_owned = email.to_owned();
    let fresh_id = encode_uuid(Uuid::new_v4());
    let fresh_at = encode_dt(Utc::now());

    let raw: RawPrincipal = self
      .conn
      .call(move |conn| {
        let existing = conn
          .query_row(
            "SELECT principal_id, email, created_at
             FROM principals WHERE email = ?1",
            rusqlite::params![email_owned],
            |row| {
              Ok(RawPrincipal {
                principal_id: row.get(0)?,
                email:        row.get(1)?,
                created_at:   row.get(2)?,
              })
            },
          )
          .optional()?;

        if let Some(p) = existing {
          return Ok(p);
        }

        conn.execute(
          "INSERT INTO principals (principal_id, email, created_at)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![fresh_id, email_owned, fresh_at],
        )?;

        Ok(RawPrincipal {
          principal_id: fresh_id,
          email:        email_owned,
          created_at:   fresh_at,
        })
      })
      .await?;

    raw.into_principal()
  }

  /// Deliver `sheet` to watchers of its id, dropping the channel once the
  /// last receiver is gone.
  fn notify_update(&self, sheet: &Sheet) {
    let mut watchers = self
      .watchers
      .lock()
      .unwrap_or_else(PoisonError::into_inner);
    if let Some(tx) = watchers.get(&sheet.id)
      && tx.send(sheet.clone()).is_err()
    {
      watchers.remove(&sheet.id);
    }
  }
}

// ─── SheetStore impl ─────────────────────────────────────────────────────────

impl SheetStore for SqliteStore {
  type Error = Error;

  async fn get_sheet(&self, owner: Uuid, day: DayKey) -> Result<Option<Sheet>> {
    let owner_str = encode_uuid(owner);
    let day_str = encode_day(day);

    let raw: Option<RawSheet> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {SHEET_COLUMNS} FROM sheets
                 WHERE owner_id = ?1 AND day = ?2"
              ),
              rusqlite::params![owner_str, day_str],
              read_sheet_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSheet::into_sheet).transpose()
  }

  async fn create_sheet(
    &self,
    owner: Uuid,
    day: DayKey,
    body: String,
  ) -> Result<CreateOutcome> {
    let now = Utc::now();
    let sheet = Sheet {
      id: Uuid::new_v4(),
      owner,
      day,
      body,
      created_at: now,
      updated_at: now,
    };

    let id_str = encode_uuid(sheet.id);
    let owner_str = encode_uuid(owner);
    let day_str = encode_day(day);
    let body_str = sheet.body.clone();
    let at_str = encode_dt(now);

    let inserted: bool = self
      .conn
      .call(move |conn| {
        let result = conn.execute(
          "INSERT INTO sheets (sheet_id, owner_id, day, body, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, owner_str, day_str, body_str, at_str, at_str],
        );
        match result {
          Ok(_) => Ok(true),
          Err(ref e) if is_unique_violation(e) => Ok(false),
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    if inserted {
      Ok(CreateOutcome::Created(sheet))
    } else {
      Ok(CreateOutcome::Conflict)
    }
  }

  async fn update_body(&self, id: Uuid, body: String) -> Result<Option<Sheet>> {
    let id_str = encode_uuid(id);
    let at_str = encode_dt(Utc::now());

    let raw: Option<RawSheet> = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE sheets SET body = ?2, updated_at = ?3 WHERE sheet_id = ?1",
          rusqlite::params![id_str, body, at_str],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(
          conn
            .query_row(
              &format!("SELECT {SHEET_COLUMNS} FROM sheets WHERE sheet_id = ?1"),
              rusqlite::params![id_str],
              read_sheet_row,
            )
            .optional()?,
        )
      })
      .await?;

    let sheet = raw.map(RawSheet::into_sheet).transpose()?;
    if let Some(ref s) = sheet {
      self.notify_update(s);
    }
    Ok(sheet)
  }

  async fn list_before(
    &self,
    owner: Uuid,
    before: DayKey,
    limit: usize,
  ) -> Result<Vec<Sheet>> {
    let owner_str = encode_uuid(owner);
    let before_str = encode_day(before);
    let limit_val = limit as i64;

    let raws: Vec<RawSheet> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {SHEET_COLUMNS} FROM sheets
           WHERE owner_id = ?1 AND day < ?2
           ORDER BY day DESC
           LIMIT ?3"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![owner_str, before_str, limit_val],
            read_sheet_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSheet::into_sheet).collect()
  }

  async fn list_all(&self, owner: Uuid) -> Result<Vec<Sheet>> {
    let owner_str = encode_uuid(owner);

    let raws: Vec<RawSheet> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {SHEET_COLUMNS} FROM sheets
           WHERE owner_id = ?1
           ORDER BY day DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![owner_str], read_sheet_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSheet::into_sheet).collect()
  }

  async fn insert_batch(
    &self,
    owner: Uuid,
    entries: Vec<NewSheet>,
  ) -> Result<Vec<Sheet>> {
    let now = Utc::now();
    let sheets: Vec<Sheet> = entries
      .into_iter()
      .map(|e| Sheet {
        id: Uuid::new_v4(),
        owner,
        day: e.day,
        body: e.body,
        created_at: now,
        updated_at: now,
      })
      .collect();

    let rows: Vec<(String, String, String, String, String)> = sheets
      .iter()
      .map(|s| {
        (
          encode_uuid(s.id),
          encode_uuid(s.owner),
          encode_day(s.day),
          s.body.clone(),
          encode_dt(now),
        )
      })
      .collect();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        for (id, owner, day, body, at) in &rows {
          tx.execute(
            "INSERT INTO sheets (sheet_id, owner_id, day, body, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
            rusqlite::params![id, owner, day, body, at],
          )?;
        }
        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok(sheets)
  }

  async fn watch_sheet(&self, id: Uuid) -> Result<broadcast::Receiver<Sheet>> {
    let mut watchers = self
      .watchers
      .lock()
      .unwrap_or_else(PoisonError::into_inner);
    let tx = watchers
      .entry(id)
      .or_insert_with(|| broadcast::channel(WATCH_CAPACITY).0);
    Ok(tx.subscribe())
  }
}
