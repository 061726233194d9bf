//! Live editing of one sheet: debounced autosave + realtime reconciliation.
//!
//! Local keystrokes land in transient state and are persisted after a quiet
//! period (trailing-edge debounce, one pending save per session — a new
//! keystroke cancels and reschedules). Remote updates to the watched sheet
//! overwrite differing local state: last-writer-wins, no merge. Concurrent
//! edits from two sessions can silently lose one side's keystrokes; that is
//! the product's declared conflict policy, not something this layer papers
//! over.

use std::{
  sync::{Arc, Mutex, MutexGuard, PoisonError},
  time::Duration,
};

use juday_core::{sheet::Sheet, store::SheetStore};
use tokio::{
  sync::{broadcast, mpsc},
  task::JoinHandle,
};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Quiet period before an edit is persisted.
pub const DEFAULT_SAVE_DELAY: Duration = Duration::from_secs(1);

/// Notifications a UI surfaces (the toast channel).
#[derive(Debug, Clone)]
pub enum EditorEvent {
  /// A debounced (or flushed) save was persisted.
  Saved(Sheet),
  /// A save failed. No automatic retry; the next edit schedules a new save.
  SaveFailed(String),
  /// A differing remote update replaced local state.
  RemoteApplied { body: String },
}

pub type EditorEvents = mpsc::UnboundedReceiver<EditorEvent>;

// ─── Live session on one sheet ───────────────────────────────────────────────

struct EditorState {
  body:         String,
  closed:       bool,
  pending_save: Option<JoinHandle<()>>,
}

fn lock(state: &Mutex<EditorState>) -> MutexGuard<'_, EditorState> {
  state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// An editing session bound to exactly one sheet.
///
/// Holds the realtime subscription for that sheet id and the single-slot
/// save timer. [`close`](Self::close) cancels any pending save — edits made
/// inside the debounce window are lost on teardown; call
/// [`flush`](Self::flush) first when durability matters more.
pub struct LiveSheet<S> {
  store:      Arc<S>,
  sheet_id:   Uuid,
  state:      Arc<Mutex<EditorState>>,
  watcher:    JoinHandle<()>,
  events:     mpsc::UnboundedSender<EditorEvent>,
  save_delay: Duration,
}

impl<S: SheetStore + 'static> LiveSheet<S> {
  /// Start a session on `sheet`: subscribe to its remote updates and hand
  /// back the event channel the UI should drain.
  pub async fn open(
    store: Arc<S>,
    sheet: Sheet,
    save_delay: Duration,
  ) -> Result<(Self, EditorEvents)> {
    let updates = store.watch_sheet(sheet.id).await.map_err(Error::store)?;
    let (events_tx, events_rx) = mpsc::unbounded_channel();

    let state = Arc::new(Mutex::new(EditorState {
      body:         sheet.body,
      closed:       false,
      pending_save: None,
    }));

    let watcher = tokio::spawn(watch_remote(
      updates,
      Arc::clone(&state),
      events_tx.clone(),
    ));

    Ok((
      Self {
        store,
        sheet_id: sheet.id,
        state,
        watcher,
        events: events_tx,
        save_delay,
      },
      events_rx,
    ))
  }

  pub fn sheet_id(&self) -> Uuid { self.sheet_id }

  /// The body as the editor currently sees it (local edits included).
  pub fn body(&self) -> String { lock(&self.state).body.clone() }

  /// Record a keystroke's worth of new content and (re)arm the save timer.
  ///
  /// The scheduled save captures `text` as given here; whichever edit runs
  /// last before the quiet period elapses is the one that persists.
  pub fn edit(&self, text: impl Into<String>) {
    let text = text.into();
    let mut state = lock(&self.state);
    if state.closed {
      return;
    }
    state.body = text.clone();

    if let Some(previous) = state.pending_save.take() {
      previous.abort();
    }

    let store = Arc::clone(&self.store);
    let shared = Arc::clone(&self.state);
    let events = self.events.clone();
    let id = self.sheet_id;
    let delay = self.save_delay;
    state.pending_save = Some(tokio::spawn(async move {
      tokio::time::sleep(delay).await;
      if lock(&shared).closed {
        return;
      }
      save(store.as_ref(), id, text, &events).await;
    }));
  }

  /// Persist the current body immediately if a save is pending.
  ///
  /// The explicit opt-out from the cancel-on-teardown default: a UI that
  /// prefers durability calls this before navigating away.
  pub async fn flush(&self) {
    let text = {
      let mut state = lock(&self.state);
      if state.closed {
        return;
      }
      match state.pending_save.take() {
        Some(pending) => {
          pending.abort();
          state.body.clone()
        }
        None => return,
      }
    };
    save(self.store.as_ref(), self.sheet_id, text, &self.events).await;
  }

  /// Tear the session down: cancel any pending save and drop the remote
  /// subscription. A save or update racing with teardown is ignored.
  pub fn close(self) {
    let mut state = lock(&self.state);
    state.closed = true;
    if let Some(pending) = state.pending_save.take() {
      pending.abort();
    }
    drop(state);
    self.watcher.abort();
  }
}

async fn watch_remote(
  mut updates: broadcast::Receiver<Sheet>,
  state: Arc<Mutex<EditorState>>,
  events: mpsc::UnboundedSender<EditorEvent>,
) {
  loop {
    match updates.recv().await {
      Ok(remote) => {
        let mut state = lock(&state);
        if state.closed {
          break;
        }
        // Last-writer-wins: a differing remote body replaces local state.
        // An echo of our own save matches and is ignored.
        if remote.body != state.body {
          state.body = remote.body.clone();
          let _ = events.send(EditorEvent::RemoteApplied { body: remote.body });
        }
      }
      // Missed events mean missed intermediate states; the next update
      // carries the latest row anyway.
      Err(broadcast::error::RecvError::Lagged(skipped)) => {
        tracing::debug!(skipped, "remote update stream lagged");
      }
      Err(broadcast::error::RecvError::Closed) => break,
    }
  }
}

async fn save<S: SheetStore>(
  store: &S,
  id: Uuid,
  body: String,
  events: &mpsc::UnboundedSender<EditorEvent>,
) {
  match store.update_body(id, body).await {
    Ok(Some(sheet)) => {
      let _ = events.send(EditorEvent::Saved(sheet));
    }
    Ok(None) => {
      let _ = events
        .send(EditorEvent::SaveFailed("sheet no longer exists".to_string()));
    }
    Err(e) => {
      tracing::warn!(sheet = %id, error = %e, "autosave failed");
      let _ = events.send(EditorEvent::SaveFailed(e.to_string()));
    }
  }
}

// ─── Editor — one active session at a time ───────────────────────────────────

/// Owns at most one [`LiveSheet`] and enforces the switch protocol: opening
/// a sheet tears down the previous session (and its subscription) first.
pub struct SheetEditor<S> {
  store:      Arc<S>,
  save_delay: Duration,
  active:     Option<LiveSheet<S>>,
}

impl<S: SheetStore + 'static> SheetEditor<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self::with_save_delay(store, DEFAULT_SAVE_DELAY)
  }

  pub fn with_save_delay(store: Arc<S>, save_delay: Duration) -> Self {
    Self { store, save_delay, active: None }
  }

  /// Switch the active session to `sheet`. At most one sheet is watched at
  /// a time; the old subscription is dropped before the new one starts.
  pub async fn open(&mut self, sheet: Sheet) -> Result<EditorEvents> {
    if let Some(previous) = self.active.take() {
      previous.close();
    }
    let (live, events) =
      LiveSheet::open(Arc::clone(&self.store), sheet, self.save_delay).await?;
    self.active = Some(live);
    Ok(events)
  }

  pub fn active(&self) -> Option<&LiveSheet<S>> { self.active.as_ref() }

  /// Route an edit to the active session; no-op when nothing is open.
  pub fn edit(&self, text: impl Into<String>) {
    if let Some(live) = &self.active {
      live.edit(text);
    }
  }

  /// Close the active session, if any.
  pub fn close(&mut self) {
    if let Some(live) = self.active.take() {
      live.close();
    }
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
