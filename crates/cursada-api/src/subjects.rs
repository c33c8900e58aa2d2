//! Handlers for `/users/{uid}/years/{yid}/subjects` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `.../subjects` | |
//! | `POST`   | `.../subjects` | 404 if the year does not exist |
//! | `PATCH`  | `.../subjects/{sid}` | Merge; `null` clears nullable fields |
//! | `DELETE` | `.../subjects/{sid}` | Cascades to events and files; grades are kept |
//! | `POST`   | `.../subjects/{sid}/events` | |
//! | `POST`   | `.../subjects/{sid}/files?name=<file>` | Raw body; replaces a file of the same name |

use axum::{
  Json,
  body::Bytes,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::NaiveDate;
use cursada_core::{
  event::NewEvent,
  path::DocumentPath,
  store::{AgendaStore, BlobStore},
  subject::{NewSubject, ScheduleSlot, Subject, SubjectPatch},
  time::CalendarTime,
};
use cursada_service::CascadeReport;
use serde::Deserialize;
use uuid::Uuid;

use crate::{ApiState, error::ApiError};

async fn require_subject<S: AgendaStore>(
  store: &S,
  uid: Uuid,
  yid: Uuid,
  sid: Uuid,
) -> Result<Subject, ApiError> {
  store
    .get_subject(uid, yid, sid)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| {
      ApiError::NotFound(
        DocumentPath::Subject { user_id: uid, year_id: yid, subject_id: sid }.to_string(),
      )
    })
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /users/{uid}/years/{yid}/subjects`
pub async fn list<S, B>(
  State(state): State<ApiState<S, B>>,
  Path((uid, yid)): Path<(Uuid, Uuid)>,
) -> Result<Json<Vec<Subject>>, ApiError>
where
  S: AgendaStore + 'static,
  B: BlobStore + 'static,
{
  let subjects = state
    .store
    .list_subjects(uid, yid)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(subjects))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub name:       String,
  #[serde(default)]
  pub professor:  Option<String>,
  #[serde(default)]
  pub classroom:  Option<String>,
  #[serde(default)]
  pub commission: Option<String>,
  #[serde(default)]
  pub schedule:   Vec<ScheduleSlot>,
  #[serde(default)]
  pub start_date: Option<NaiveDate>,
  #[serde(default)]
  pub end_date:   Option<NaiveDate>,
  #[serde(default)]
  pub color:      String,
}

/// `POST /users/{uid}/years/{yid}/subjects`
pub async fn create<S, B>(
  State(state): State<ApiState<S, B>>,
  Path((uid, yid)): Path<(Uuid, Uuid)>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: AgendaStore + 'static,
  B: BlobStore + 'static,
{
  if body.name.trim().is_empty() {
    return Err(ApiError::BadRequest("subject name must not be empty".into()));
  }
  state
    .store
    .get_year(uid, yid)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| {
      ApiError::NotFound(DocumentPath::Year { user_id: uid, year_id: yid }.to_string())
    })?;

  let input = NewSubject {
    user_id:    uid,
    year_id:    yid,
    name:       body.name,
    professor:  body.professor,
    classroom:  body.classroom,
    commission: body.commission,
    schedule:   body.schedule,
    start_date: body.start_date,
    end_date:   body.end_date,
    color:      body.color,
  };
  let subject = state.store.add_subject(input).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(subject)))
}

// ─── Update / delete ──────────────────────────────────────────────────────────

/// `PATCH /users/{uid}/years/{yid}/subjects/{sid}`
pub async fn update<S, B>(
  State(state): State<ApiState<S, B>>,
  Path((uid, yid, sid)): Path<(Uuid, Uuid, Uuid)>,
  Json(patch): Json<SubjectPatch>,
) -> Result<Json<Subject>, ApiError>
where
  S: AgendaStore + 'static,
  B: BlobStore + 'static,
{
  let subject = state
    .store
    .update_subject(uid, yid, sid, patch)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(subject))
}

/// `DELETE /users/{uid}/years/{yid}/subjects/{sid}`
pub async fn delete_one<S, B>(
  State(state): State<ApiState<S, B>>,
  Path((uid, yid, sid)): Path<(Uuid, Uuid, Uuid)>,
) -> Result<Json<CascadeReport>, ApiError>
where
  S: AgendaStore + 'static,
  B: BlobStore + 'static,
{
  let report = cursada_service::delete_subject(&state.store, &state.blobs, uid, yid, sid).await?;
  Ok(Json(report))
}

// ─── Events ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct EventBody {
  pub title:   String,
  pub start:   CalendarTime,
  #[serde(default)]
  pub all_day: bool,
  /// Defaults to the subject's color.
  #[serde(default)]
  pub color:   Option<String>,
}

/// `POST /users/{uid}/years/{yid}/subjects/{sid}/events`
pub async fn create_event<S, B>(
  State(state): State<ApiState<S, B>>,
  Path((uid, yid, sid)): Path<(Uuid, Uuid, Uuid)>,
  Json(body): Json<EventBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: AgendaStore + 'static,
  B: BlobStore + 'static,
{
  let subject = require_subject(state.store.as_ref(), uid, yid, sid).await?;
  let input = NewEvent {
    user_id:    uid,
    year_id:    yid,
    subject_id: sid,
    title:      body.title,
    start:      body.start,
    all_day:    body.all_day,
    color:      body.color.unwrap_or(subject.color),
  };
  let event = state.store.add_event(input).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(event)))
}

// ─── Files ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UploadParams {
  pub name: String,
}

/// `POST /users/{uid}/years/{yid}/subjects/{sid}/files?name=<file>`
pub async fn upload<S, B>(
  State(state): State<ApiState<S, B>>,
  Path((uid, yid, sid)): Path<(Uuid, Uuid, Uuid)>,
  Query(params): Query<UploadParams>,
  body: Bytes,
) -> Result<impl IntoResponse, ApiError>
where
  S: AgendaStore + 'static,
  B: BlobStore + 'static,
{
  let subject = cursada_service::upload_file(
    state.store.as_ref(),
    state.blobs.as_ref(),
    uid,
    yid,
    sid,
    &params.name,
    body.to_vec(),
  )
  .await?;
  Ok((StatusCode::CREATED, Json(subject)))
}
