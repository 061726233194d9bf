//! Handlers for bulk transfer: `GET /export`, `POST /import`.

use axum::{
  Json,
  extract::State,
  http::{HeaderValue, header},
  response::{IntoResponse, Response},
};
use chrono::Utc;
use juday_core::store::SheetStore;
use juday_session::transfer::{ImportReport, export_all, import_archive};

use crate::{ApiState, error::ApiError};

/// `GET /export` — the whole account as one markdown attachment.
pub async fn export<S>(
  State(state): State<ApiState<S>>,
) -> Result<Response, ApiError>
where
  S: SheetStore,
{
  let export = export_all(state.store.as_ref(), state.owner, Utc::now()).await?;

  let disposition = format!("attachment; filename=\"{}\"", export.filename);
  let mut response = export.content.into_response();
  response.headers_mut().insert(
    header::CONTENT_TYPE,
    HeaderValue::from_static("text/markdown; charset=utf-8"),
  );
  response.headers_mut().insert(
    header::CONTENT_DISPOSITION,
    HeaderValue::from_str(&disposition)
      .unwrap_or_else(|_| HeaderValue::from_static("attachment")),
  );
  Ok(response)
}

/// `POST /import` — plain-text archive body; responds with the counts.
pub async fn import<S>(
  State(state): State<ApiState<S>>,
  document: String,
) -> Result<Json<ImportReport>, ApiError>
where
  S: SheetStore,
{
  let report =
    import_archive(state.store.as_ref(), state.owner, &document).await?;
  Ok(Json(report))
}
