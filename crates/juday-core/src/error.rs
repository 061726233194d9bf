//! Error types for `juday-core`.

use thiserror::Error;

/// A `YYYY-MM-DD` key that failed strict validation.
#[derive(Debug, Clone, Error)]
pub enum DayKeyError {
  #[error("malformed day key (expected YYYY-MM-DD): {0:?}")]
  Malformed(String),

  #[error("not a real calendar date: {0:?}")]
  NotACalendarDate(String),
}

/// Sign-in/out and session failures from the auth collaborator.
///
/// Always surfaced to the user, never retried automatically.
#[derive(Debug, Error)]
pub enum AuthError {
  #[error("auth gateway error: {0}")]
  Gateway(String),

  #[error("sign-in rejected: {0}")]
  Rejected(String),

  #[error("no active session")]
  NotSignedIn,
}
