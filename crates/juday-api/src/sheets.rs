//! Handlers for `/sheets` endpoints.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `GET`   | `/sheets` | optional `before` (day, default today), `limit` |
//! | `GET`   | `/sheets/:day` | daily resolve; 404 for an empty past day |
//! | `PATCH` | `/sheets/:id` | body: `{"body":"…"}`; returns the updated sheet |

use axum::{
  Json,
  extract::{Path, Query, State},
};
use juday_core::{
  sheet::{DayKey, Sheet},
  store::SheetStore,
};
use juday_session::{
  daily::{resolve_daily, today_local},
  history::{DEFAULT_PAGE_SIZE, Page, load_page},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{ApiState, error::ApiError};

/// Upper bound on `limit` regardless of what the client asks for.
const MAX_PAGE_SIZE: usize = 100;

// ─── History pages ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  /// Exclusive upper bound on the day. Defaults to today: history is
  /// everything strictly older than the live sheet.
  pub before: Option<DayKey>,
  pub limit:  Option<usize>,
}

/// `GET /sheets[?before=YYYY-MM-DD][&limit=N]`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Page>, ApiError>
where
  S: SheetStore,
{
  let before = params.before.unwrap_or_else(today_local);
  let limit = params
    .limit
    .unwrap_or(DEFAULT_PAGE_SIZE)
    .clamp(1, MAX_PAGE_SIZE);

  let page = load_page(state.store.as_ref(), state.owner, before, limit).await?;
  Ok(Json(page))
}

// ─── Daily resolve ────────────────────────────────────────────────────────────

/// `GET /sheets/:day` — fetch-or-create semantics. Today and future days
/// are created on first request; a past day with no sheet is 404.
pub async fn daily<S>(
  State(state): State<ApiState<S>>,
  Path(key): Path<String>,
) -> Result<Json<Sheet>, ApiError>
where
  S: SheetStore,
{
  let day = DayKey::parse(&key).map_err(|e| ApiError::BadRequest(e.to_string()))?;

  let resolved =
    resolve_daily(state.store.as_ref(), state.owner, day, today_local()).await?;
  match resolved {
    Some(sheet) => Ok(Json(sheet)),
    None => Err(ApiError::NotFound(format!("no sheet for {day}"))),
  }
}

// ─── Body update ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UpdateBody {
  pub body: String,
}

/// `PATCH /sheets/:id` — overwrite the body, refresh `updated_at`.
pub async fn update<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
  Json(input): Json<UpdateBody>,
) -> Result<Json<Sheet>, ApiError>
where
  S: SheetStore,
{
  let updated = state
    .store
    .update_body(id, input.body)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  match updated {
    Some(sheet) => Ok(Json(sheet)),
    None => Err(ApiError::NotFound(format!("sheet {id} not found"))),
  }
}
