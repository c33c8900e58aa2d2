//! Handlers for `/users/{uid}/calendar` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/users/{uid}/calendar` | Classes, subject events and general events |
//! | `POST` | `/users/{uid}/calendar/delete` | Body: an occurrence as returned by `GET`; 409 for classes and general events |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
};
use cursada_core::{
  occurrence::CalendarOccurrence,
  store::{AgendaStore, BlobStore},
};
use uuid::Uuid;

use crate::{ApiState, error::ApiError};

/// `GET /users/{uid}/calendar`
pub async fn list<S, B>(
  State(state): State<ApiState<S, B>>,
  Path(uid): Path<Uuid>,
) -> Result<Json<Vec<CalendarOccurrence>>, ApiError>
where
  S: AgendaStore + 'static,
  B: BlobStore + 'static,
{
  let occurrences = cursada_service::load_all(&state.store, uid, &state.options).await?;
  Ok(Json(occurrences))
}

/// `POST /users/{uid}/calendar/delete`
pub async fn delete_one<S, B>(
  State(state): State<ApiState<S, B>>,
  Path(uid): Path<Uuid>,
  Json(occurrence): Json<CalendarOccurrence>,
) -> Result<StatusCode, ApiError>
where
  S: AgendaStore + 'static,
  B: BlobStore + 'static,
{
  cursada_service::delete_occurrence(state.store.as_ref(), uid, &occurrence).await?;
  Ok(StatusCode::NO_CONTENT)
}
