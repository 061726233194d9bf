//! Juday server library: configuration, state, and the authenticated router.
//!
//! The bundled server is single-user: one configured login, one owning
//! principal, Basic auth on every request. Multi-user deployments sit this
//! binary behind a backend that does its own row-level ownership.

pub mod auth;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  extract::{Request, State},
  middleware::{self, Next},
  response::{IntoResponse, Response},
};
use juday_api::ApiState;
use juday_core::store::SheetStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use auth::{AuthConfig, verify_auth};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:               String,
  pub port:               u16,
  pub store_path:         PathBuf,
  /// Basic-auth login; also the email of the owning principal.
  pub auth_username:      String,
  pub auth_password_hash: String,
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through the auth middleware and API handlers.
pub struct AppState<S> {
  pub store:  Arc<S>,
  /// Principal owning every sheet this server serves.
  pub owner:  Uuid,
  pub config: Arc<ServerConfig>,
  pub auth:   Arc<AuthConfig>,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:  Arc::clone(&self.store),
      owner:  self.owner,
      config: Arc::clone(&self.config),
      auth:   Arc::clone(&self.auth),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the authenticated axum [`Router`] for the server.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: SheetStore + 'static,
{
  let api = juday_api::api_router(ApiState {
    store: Arc::clone(&state.store),
    owner: state.owner,
  });

  Router::new()
    .nest("/api", api)
    .layer(middleware::from_fn_with_state(state, require_auth::<S>))
    .layer(TraceLayer::new_for_http())
}

async fn require_auth<S>(
  State(state): State<AppState<S>>,
  req: Request,
  next: Next,
) -> Response
where
  S: SheetStore + 'static,
{
  match verify_auth(req.headers(), &state.auth) {
    Ok(()) => next.run(req).await,
    Err(rejection) => rejection.into_response(),
  }
}

// ─── Integration tests ────────────────────────────────────────────────────────
