//! Error type for `juday-session`.
//!
//! Backend failures are caught at the point of call and carried here as
//! boxed sources; nothing propagates as an uncaught fault. A missing sheet,
//! an empty history page and an empty import document are ordinary values,
//! not errors.

use juday_core::{error::AuthError, sheet::DayKey};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Sign-in/out or session failure. Surfaced, never retried automatically.
  #[error("auth error: {0}")]
  Auth(#[from] AuthError),

  /// A backend read/write failure outside the expected create race.
  /// Surfaced; callers may re-trigger the action by hand.
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  /// The batch insert of an import failed; the whole import is rejected.
  #[error("import failed: {0}")]
  Import(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("no sheets to export")]
  NothingToExport,

  /// The post-conflict re-read found nothing. Impossible while deletion
  /// stays out of scope; reported rather than masked.
  #[error("sheet for {day} vanished after create conflict")]
  ConflictVanished { day: DayKey },
}

impl Error {
  pub(crate) fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }

  pub(crate) fn import<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Import(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
