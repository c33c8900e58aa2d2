//! Handlers for `/users/{uid}/general-events` endpoints.
//!
//! These are the stored events, not their calendar rendering: an all-day
//! event is returned with `all_day: true` here even though the calendar pins
//! it to a morning slot.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use cursada_core::{
  event::{GeneralEvent, NewGeneralEvent},
  path::DocumentPath,
  store::{AgendaStore, BlobStore},
  time::CalendarTime,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{ApiState, error::ApiError};

/// `GET /users/{uid}/general-events`
pub async fn list<S, B>(
  State(state): State<ApiState<S, B>>,
  Path(uid): Path<Uuid>,
) -> Result<Json<Vec<GeneralEvent>>, ApiError>
where
  S: AgendaStore + 'static,
  B: BlobStore + 'static,
{
  let events = state
    .store
    .list_general_events(uid)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(events))
}

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub title:   String,
  pub start:   CalendarTime,
  #[serde(default)]
  pub all_day: bool,
  #[serde(default)]
  pub color:   String,
}

/// `POST /users/{uid}/general-events`
pub async fn create<S, B>(
  State(state): State<ApiState<S, B>>,
  Path(uid): Path<Uuid>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: AgendaStore + 'static,
  B: BlobStore + 'static,
{
  let event = state
    .store
    .add_general_event(NewGeneralEvent {
      user_id: uid,
      title:   body.title,
      start:   body.start,
      all_day: body.all_day,
      color:   body.color,
    })
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(event)))
}

/// `DELETE /users/{uid}/general-events/{eid}`; succeeds even if the event
/// is already gone.
pub async fn delete_one<S, B>(
  State(state): State<ApiState<S, B>>,
  Path((uid, eid)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError>
where
  S: AgendaStore + 'static,
  B: BlobStore + 'static,
{
  state
    .store
    .delete(DocumentPath::GeneralEvent { user_id: uid, event_id: eid })
    .await
    .map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}
