//! Handlers for `/users/{uid}/years` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/users/{uid}/years` | |
//! | `POST`   | `/users/{uid}/years` | Body: `{"name":"2024"}` |
//! | `PATCH`  | `/users/{uid}/years/{yid}` | Body: `{"name":"..."}`; 404 if not found |
//! | `DELETE` | `/users/{uid}/years/{yid}` | Cascades to subjects, events and files |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use cursada_core::{
  store::{AgendaStore, BlobStore},
  year::Year,
};
use cursada_service::CascadeReport;
use serde::Deserialize;
use uuid::Uuid;

use crate::{ApiState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct NameBody {
  pub name: String,
}

impl NameBody {
  fn validated(self) -> Result<String, ApiError> {
    let name = self.name.trim();
    if name.is_empty() {
      return Err(ApiError::BadRequest("year name must not be empty".into()));
    }
    Ok(name.to_owned())
  }
}

/// `GET /users/{uid}/years`
pub async fn list<S, B>(
  State(state): State<ApiState<S, B>>,
  Path(uid): Path<Uuid>,
) -> Result<Json<Vec<Year>>, ApiError>
where
  S: AgendaStore + 'static,
  B: BlobStore + 'static,
{
  let years = state.store.list_years(uid).await.map_err(ApiError::store)?;
  Ok(Json(years))
}

/// `POST /users/{uid}/years`
pub async fn create<S, B>(
  State(state): State<ApiState<S, B>>,
  Path(uid): Path<Uuid>,
  Json(body): Json<NameBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: AgendaStore + 'static,
  B: BlobStore + 'static,
{
  let name = body.validated()?;
  let year = state.store.add_year(uid, name).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(year)))
}

/// `PATCH /users/{uid}/years/{yid}`
pub async fn rename<S, B>(
  State(state): State<ApiState<S, B>>,
  Path((uid, yid)): Path<(Uuid, Uuid)>,
  Json(body): Json<NameBody>,
) -> Result<Json<Year>, ApiError>
where
  S: AgendaStore + 'static,
  B: BlobStore + 'static,
{
  let name = body.validated()?;
  let year = state
    .store
    .rename_year(uid, yid, name)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(year))
}

/// `DELETE /users/{uid}/years/{yid}`
pub async fn delete_one<S, B>(
  State(state): State<ApiState<S, B>>,
  Path((uid, yid)): Path<(Uuid, Uuid)>,
) -> Result<Json<CascadeReport>, ApiError>
where
  S: AgendaStore + 'static,
  B: BlobStore + 'static,
{
  let report = cursada_service::delete_year(&state.store, &state.blobs, uid, yid).await?;
  Ok(Json(report))
}
