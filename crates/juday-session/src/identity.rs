//! Identity context — session state over the auth collaborator.
//!
//! A thin observer layer: components take an [`IdentityContext`] (injected,
//! not ambient) and subscribe to principal changes through it. Sign-in
//! starts an out-of-band verification flow; completion arrives later as a
//! change notification, never as the sign-in call's return value.

use std::sync::Arc;

use juday_core::{
  auth::{AuthGateway, Provider},
  principal::Principal,
};
use tokio::sync::watch;

use crate::error::{Error, Result};

/// Tracks the current authenticated principal for one client session.
pub struct IdentityContext<A> {
  gateway: Arc<A>,
}

impl<A: AuthGateway> IdentityContext<A> {
  pub fn new(gateway: Arc<A>) -> Self { Self { gateway } }

  /// The current principal, if a session is established.
  pub async fn current(&self) -> Result<Option<Principal>> {
    Ok(self.gateway.current_principal().await?)
  }

  /// Principal-change notifications. Holds the latest value; `changed()`
  /// resolves whenever a sign-in completes or a sign-out happens.
  pub fn watch(&self) -> watch::Receiver<Option<Principal>> {
    self.gateway.sessions()
  }

  /// Start an email magic-link sign-in. Returns once the flow is started;
  /// a principal is only established when the link is followed, observed
  /// via [`watch`](Self::watch).
  pub async fn sign_in_with_email(&self, email: &str) -> Result<()> {
    self
      .gateway
      .sign_in_with_email(email)
      .await
      .map_err(Error::from)
  }

  /// Start a redirect-based third-party sign-in.
  pub async fn sign_in_with_provider(&self, provider: Provider) -> Result<()> {
    self
      .gateway
      .sign_in_with_provider(provider)
      .await
      .map_err(Error::from)
  }

  /// End the current session.
  pub async fn sign_out(&self) -> Result<()> {
    self.gateway.sign_out().await.map_err(Error::from)
  }
}
