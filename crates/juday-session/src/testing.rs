//! In-memory backend doubles shared by this crate's tests.

use std::{
  collections::HashMap,
  sync::{
    Mutex, MutexGuard, PoisonError,
    atomic::{AtomicBool, AtomicUsize, Ordering},
  },
};

use chrono::Utc;
use juday_core::{
  auth::{AuthGateway, Provider},
  error::AuthError,
  principal::Principal,
  sheet::{DayKey, NewSheet, Sheet},
  store::{CreateOutcome, SheetStore},
};
use thiserror::Error;
use tokio::sync::{broadcast, watch};
use uuid::Uuid;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
  mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ─── MemStore ────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub(crate) enum TestStoreError {
  #[error("backend unavailable")]
  Unavailable,

  #[error("duplicate day in batch")]
  DuplicateDay,
}

/// Hash-map sheet store with failure injection and a plantable create race.
pub(crate) struct MemStore {
  sheets:       Mutex<HashMap<Uuid, Sheet>>,
  watchers:     Mutex<HashMap<Uuid, broadcast::Sender<Sheet>>>,
  /// Inserted behind the caller's back by the next `create_sheet` call,
  /// which then reports `Conflict` — another tab winning the race.
  race_winner:  Mutex<Option<Sheet>>,
  create_calls: AtomicUsize,
  write_count:  AtomicUsize,
  fail_updates: AtomicBool,
  fail_lists:   AtomicBool,
  fail_batches: AtomicBool,
}

impl MemStore {
  pub(crate) fn new() -> Self {
    Self {
      sheets:       Mutex::new(HashMap::new()),
      watchers:     Mutex::new(HashMap::new()),
      race_winner:  Mutex::new(None),
      create_calls: AtomicUsize::new(0),
      write_count:  AtomicUsize::new(0),
      fail_updates: AtomicBool::new(false),
      fail_lists:   AtomicBool::new(false),
      fail_batches: AtomicBool::new(false),
    }
  }

  fn make_sheet(owner: Uuid, day: DayKey, body: &str) -> Sheet {
    let now = Utc::now();
    Sheet {
      id: Uuid::new_v4(),
      owner,
      day,
      body: body.to_string(),
      created_at: now,
      updated_at: now,
    }
  }

  /// Insert a sheet directly, bypassing the create path.
  pub(crate) fn seed(&self, owner: Uuid, day: DayKey, body: &str) -> Sheet {
    let sheet = Self::make_sheet(owner, day, body);
    lock(&self.sheets).insert(sheet.id, sheet.clone());
    sheet
  }

  /// Arrange for the next `create_sheet` call to lose the uniqueness race
  /// to this sheet.
  pub(crate) fn plant_race_winner(
    &self,
    owner: Uuid,
    day: DayKey,
    body: &str,
  ) -> Sheet {
    let sheet = Self::make_sheet(owner, day, body);
    *lock(&self.race_winner) = Some(sheet.clone());
    sheet
  }

  /// Apply an update as another session would: persisted and broadcast,
  /// without counting against this session's writes.
  pub(crate) fn remote_update(&self, id: Uuid, body: &str) {
    let updated = {
      let mut sheets = lock(&self.sheets);
      let sheet = sheets.get_mut(&id).expect("remote_update of unknown id");
      sheet.body = body.to_string();
      sheet.updated_at = Utc::now();
      sheet.clone()
    };
    self.notify(&updated);
  }

  pub(crate) fn sheet_by_id(&self, id: Uuid) -> Option<Sheet> {
    lock(&self.sheets).get(&id).cloned()
  }

  pub(crate) fn sheet_count(&self, owner: Uuid) -> usize {
    lock(&self.sheets)
      .values()
      .filter(|s| s.owner == owner)
      .count()
  }

  pub(crate) fn create_calls(&self) -> usize {
    self.create_calls.load(Ordering::SeqCst)
  }

  pub(crate) fn write_count(&self) -> usize {
    self.write_count.load(Ordering::SeqCst)
  }

  pub(crate) fn fail_updates(&self, fail: bool) {
    self.fail_updates.store(fail, Ordering::SeqCst);
  }

  pub(crate) fn fail_lists(&self, fail: bool) {
    self.fail_lists.store(fail, Ordering::SeqCst);
  }

  pub(crate) fn fail_batches(&self, fail: bool) {
    self.fail_batches.store(fail, Ordering::SeqCst);
  }

  fn notify(&self, sheet: &Sheet) {
    let mut watchers = lock(&self.watchers);
    if let Some(tx) = watchers.get(&sheet.id)
      && tx.send(sheet.clone()).is_err()
    {
      watchers.remove(&sheet.id);
    }
  }

  fn find(&self, owner: Uuid, day: DayKey) -> Option<Sheet> {
    lock(&self.sheets)
      .values()
      .find(|s| s.owner == owner && s.day == day)
      .cloned()
  }
}

impl SheetStore for MemStore {
  type Error = TestStoreError;

  async fn get_sheet(
    &self,
    owner: Uuid,
    day: DayKey,
  ) -> Result<Option<Sheet>, Self::Error> {
    Ok(self.find(owner, day))
  }

  async fn create_sheet(
    &self,
    owner: Uuid,
    day: DayKey,
    body: String,
  ) -> Result<CreateOutcome, Self::Error> {
    self.create_calls.fetch_add(1, Ordering::SeqCst);

    if let Some(winner) = lock(&self.race_winner).take() {
      lock(&self.sheets).insert(winner.id, winner);
      return Ok(CreateOutcome::Conflict);
    }

    if self.find(owner, day).is_some() {
      return Ok(CreateOutcome::Conflict);
    }

    let sheet = Self::make_sheet(owner, day, &body);
    lock(&self.sheets).insert(sheet.id, sheet.clone());
    Ok(CreateOutcome::Created(sheet))
  }

  async fn update_body(
    &self,
    id: Uuid,
    body: String,
  ) -> Result<Option<Sheet>, Self::Error> {
    if self.fail_updates.load(Ordering::SeqCst) {
      return Err(TestStoreError::Unavailable);
    }
    let updated = {
      let mut sheets = lock(&self.sheets);
      match sheets.get_mut(&id) {
        Some(sheet) => {
          sheet.body = body;
          sheet.updated_at = Utc::now();
          Some(sheet.clone())
        }
        None => None,
      }
    };
    if let Some(ref sheet) = updated {
      self.write_count.fetch_add(1, Ordering::SeqCst);
      self.notify(sheet);
    }
    Ok(updated)
  }

  async fn list_before(
    &self,
    owner: Uuid,
    before: DayKey,
    limit: usize,
  ) -> Result<Vec<Sheet>, Self::Error> {
    if self.fail_lists.load(Ordering::SeqCst) {
      return Err(TestStoreError::Unavailable);
    }
    let mut sheets: Vec<Sheet> = lock(&self.sheets)
      .values()
      .filter(|s| s.owner == owner && s.day < before)
      .cloned()
      .collect();
    sheets.sort_by(|a, b| b.day.cmp(&a.day));
    sheets.truncate(limit);
    Ok(sheets)
  }

  async fn list_all(&self, owner: Uuid) -> Result<Vec<Sheet>, Self::Error> {
    if self.fail_lists.load(Ordering::SeqCst) {
      return Err(TestStoreError::Unavailable);
    }
    let mut sheets: Vec<Sheet> = lock(&self.sheets)
      .values()
      .filter(|s| s.owner == owner)
      .cloned()
      .collect();
    sheets.sort_by(|a, b| b.day.cmp(&a.day));
    Ok(sheets)
  }

  async fn insert_batch(
    &self,
    owner: Uuid,
    entries: Vec<NewSheet>,
  ) -> Result<Vec<Sheet>, Self::Error> {
    if self.fail_batches.load(Ordering::SeqCst) {
      return Err(TestStoreError::Unavailable);
    }
    // All-or-nothing: validate before touching the map.
    for entry in &entries {
      if self.find(owner, entry.day).is_some() {
        return Err(TestStoreError::DuplicateDay);
      }
    }
    let sheets: Vec<Sheet> = entries
      .iter()
      .map(|e| Self::make_sheet(owner, e.day, &e.body))
      .collect();
    let mut map = lock(&self.sheets);
    for sheet in &sheets {
      map.insert(sheet.id, sheet.clone());
    }
    Ok(sheets)
  }

  async fn watch_sheet(
    &self,
    id: Uuid,
  ) -> Result<broadcast::Receiver<Sheet>, Self::Error> {
    let mut watchers = lock(&self.watchers);
    let tx = watchers
      .entry(id)
      .or_insert_with(|| broadcast::channel(16).0);
    Ok(tx.subscribe())
  }
}

// ─── MemoryAuth ──────────────────────────────────────────────────────────────

/// Auth gateway double: sign-in records a pending flow that the test
/// completes by hand, mimicking the out-of-band magic link.
pub(crate) struct MemoryAuth {
  sessions_tx: watch::Sender<Option<Principal>>,
  sessions_rx: watch::Receiver<Option<Principal>>,
  pending:     Mutex<Option<String>>,
  fail_next:   Mutex<Option<String>>,
}

impl MemoryAuth {
  pub(crate) fn new() -> Self {
    let (sessions_tx, sessions_rx) = watch::channel(None);
    Self {
      sessions_tx,
      sessions_rx,
      pending: Mutex::new(None),
      fail_next: Mutex::new(None),
    }
  }

  pub(crate) fn pending_email(&self) -> Option<String> {
    lock(&self.pending).clone()
  }

  /// Make the next gateway call fail with `message`.
  pub(crate) fn fail_next(&self, message: &str) {
    *lock(&self.fail_next) = Some(message.to_string());
  }

  /// Complete the pending sign-in flow, as following the mailed link would.
  pub(crate) fn complete_sign_in(&self) -> Principal {
    let email = lock(&self.pending)
      .take()
      .expect("no sign-in flow pending");
    let principal = Principal {
      id:         Uuid::new_v4(),
      email,
      created_at: Utc::now(),
    };
    let _ = self.sessions_tx.send(Some(principal.clone()));
    principal
  }

  fn take_failure(&self) -> Result<(), AuthError> {
    match lock(&self.fail_next).take() {
      Some(message) => Err(AuthError::Gateway(message)),
      None => Ok(()),
    }
  }
}

impl AuthGateway for MemoryAuth {
  async fn current_principal(&self) -> Result<Option<Principal>, AuthError> {
    self.take_failure()?;
    Ok(self.sessions_rx.borrow().clone())
  }

  fn sign_in_with_email(
    &self,
    email: &str,
  ) -> impl std::future::Future<Output = Result<(), AuthError>> + Send + '_ {
    let email = email.to_string();
    async move {
      self.take_failure()?;
      *lock(&self.pending) = Some(email);
      Ok(())
    }
  }

  async fn sign_in_with_provider(
    &self,
    provider: Provider,
  ) -> Result<(), AuthError> {
    self.take_failure()?;
    *lock(&self.pending) = Some(format!("user@{provider:?}"));
    Ok(())
  }

  async fn sign_out(&self) -> Result<(), AuthError> {
    self.take_failure()?;
    let _ = self.sessions_tx.send(None);
    Ok(())
  }

  fn sessions(&self) -> watch::Receiver<Option<Principal>> {
    self.sessions_rx.clone()
  }
}
