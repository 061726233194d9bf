//! JSON/text REST API for Juday.
//!
//! Exposes an axum [`Router`] backed by any [`juday_core::store::SheetStore`].
//! Auth, TLS, and transport concerns are the caller's responsibility; the
//! owner whose sheets are served is fixed in [`ApiState`] (row-level
//! ownership for multi-user deployments is the backend's job).
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", juday_api::api_router(state))
//! ```

pub mod error;
pub mod sheets;
pub mod transfer;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use juday_core::store::SheetStore;
use uuid::Uuid;

pub use error::ApiError;

/// State threaded through all API handlers.
pub struct ApiState<S> {
  pub store: Arc<S>,
  /// The principal whose sheets this API serves.
  pub owner: Uuid,
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self {
      store: Arc::clone(&self.store),
      owner: self.owner,
    }
  }
}

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: ApiState<S>) -> Router<()>
where
  S: SheetStore + 'static,
{
  Router::new()
    // Sheets: history pages, daily resolve, body updates
    .route("/sheets", get(sheets::list::<S>))
    .route(
      "/sheets/{key}",
      get(sheets::daily::<S>).patch(sheets::update::<S>),
    )
    // Bulk transfer
    .route("/export", get(transfer::export::<S>))
    .route("/import", post(transfer::import::<S>))
    .with_state(state)
}
