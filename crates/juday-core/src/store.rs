//! The `SheetStore` trait and supporting types.
//!
//! The trait is implemented by storage backends (e.g. `juday-store-sqlite`).
//! Higher layers (`juday-session`, `juday-api`) depend on this abstraction,
//! not on any concrete backend.

use std::future::Future;

use tokio::sync::broadcast;
use uuid::Uuid;

use crate::sheet::{DayKey, NewSheet, Sheet};

// ─── Create outcome ──────────────────────────────────────────────────────────

/// The tagged result of an optimistic sheet creation.
///
/// `Conflict` is the expected uniqueness race under multi-tab use: another
/// caller created the `(owner, day)` row first. It is not an error — the
/// caller re-reads and adopts whatever now exists. Genuine failures travel
/// on the `Result` error channel instead.
#[derive(Debug, Clone)]
pub enum CreateOutcome {
  Created(Sheet),
  Conflict,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Juday sheet store backend.
///
/// The backend enforces the one-sheet-per-(owner, day) invariant with a
/// uniqueness constraint and reports the constraint trip as
/// [`CreateOutcome::Conflict`]. "Not found" conditions are `None`, never
/// errors.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait SheetStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Read the unique sheet for `(owner, day)`. `None` if absent.
  fn get_sheet(
    &self,
    owner: Uuid,
    day: DayKey,
  ) -> impl Future<Output = Result<Option<Sheet>, Self::Error>> + Send + '_;

  /// Attempt to create the sheet for `(owner, day)`.
  ///
  /// Returns [`CreateOutcome::Conflict`] when the uniqueness constraint
  /// fires (a concurrent caller won the race); any other failure is an
  /// error.
  fn create_sheet(
    &self,
    owner: Uuid,
    day: DayKey,
    body: String,
  ) -> impl Future<Output = Result<CreateOutcome, Self::Error>> + Send + '_;

  /// Overwrite a sheet's body and refresh `updated_at`.
  ///
  /// Returns the updated sheet, or `None` if no sheet has that id. No
  /// retry policy is built in; callers surface failures and may re-trigger.
  fn update_body(
    &self,
    id: Uuid,
    body: String,
  ) -> impl Future<Output = Result<Option<Sheet>, Self::Error>> + Send + '_;

  /// Sheets for `owner` with `day < before`, newest first, at most `limit`.
  fn list_before(
    &self,
    owner: Uuid,
    before: DayKey,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<Sheet>, Self::Error>> + Send + '_;

  /// All sheets for `owner`, newest first.
  fn list_all(
    &self,
    owner: Uuid,
  ) -> impl Future<Output = Result<Vec<Sheet>, Self::Error>> + Send + '_;

  /// Insert all `entries` for `owner` in one transaction.
  ///
  /// All-or-nothing: if any row fails (including a uniqueness trip), the
  /// whole batch fails and nothing is persisted.
  fn insert_batch(
    &self,
    owner: Uuid,
    entries: Vec<NewSheet>,
  ) -> impl Future<Output = Result<Vec<Sheet>, Self::Error>> + Send + '_;

  /// Subscribe to update events for exactly one sheet id.
  ///
  /// Each successful [`update_body`](Self::update_body) delivers the new
  /// row state to every current subscriber of that id.
  fn watch_sheet(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<broadcast::Receiver<Sheet>, Self::Error>>
  + Send
  + '_;
}
