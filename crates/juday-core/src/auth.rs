//! The `AuthGateway` trait — contract for the external auth collaborator.
//!
//! Sign-in is asynchronous in the out-of-band sense: `sign_in_with_email`
//! returns once the verification flow (a mailed magic link) has been
//! *started*. Completion happens later, outside this process's control, and
//! is observed as a change on the [`sessions`](AuthGateway::sessions)
//! channel. Callers must not assume a principal was established just because
//! a sign-in call returned `Ok`.

use std::future::Future;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::{error::AuthError, principal::Principal};

/// A third-party identity provider for redirect-based sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
  Google,
  Github,
  Apple,
}

/// Abstraction over the managed auth backend.
pub trait AuthGateway: Send + Sync {
  /// The principal of the current session, if any.
  fn current_principal(
    &self,
  ) -> impl Future<Output = Result<Option<Principal>, AuthError>> + Send + '_;

  /// Start an email magic-link sign-in for `email`.
  fn sign_in_with_email(
    &self,
    email: &str,
  ) -> impl Future<Output = Result<(), AuthError>> + Send + '_;

  /// Start a redirect-based sign-in with a third-party provider.
  fn sign_in_with_provider(
    &self,
    provider: Provider,
  ) -> impl Future<Output = Result<(), AuthError>> + Send + '_;

  /// End the current session. Fires a session-change notification.
  fn sign_out(
    &self,
  ) -> impl Future<Output = Result<(), AuthError>> + Send + '_;

  /// Session-change notifications: holds the current principal and updates
  /// whenever a sign-in completes or a sign-out happens.
  fn sessions(&self) -> watch::Receiver<Option<Principal>>;
}
