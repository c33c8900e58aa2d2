//! Handlers for the grade notebook.

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use cursada_core::{
  grade::{Grade, NewGrade},
  path::DocumentPath,
  store::{AgendaStore, BlobStore},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ApiState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub subject_id: Option<Uuid>,
}

/// `GET /users/{uid}/grades[?subject_id=<sid>]`
pub async fn list<S, B>(
  State(state): State<ApiState<S, B>>,
  Path(uid): Path<Uuid>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Grade>>, ApiError>
where
  S: AgendaStore + 'static,
  B: BlobStore + 'static,
{
  let grades = state
    .store
    .list_grades(uid, params.subject_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(grades))
}

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub subject_id: Uuid,
  pub title:      String,
  pub score:      f64,
}

/// `POST /users/{uid}/grades`
pub async fn create<S, B>(
  State(state): State<ApiState<S, B>>,
  Path(uid): Path<Uuid>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: AgendaStore + 'static,
  B: BlobStore + 'static,
{
  if !body.score.is_finite() {
    return Err(ApiError::BadRequest("score must be a number".into()));
  }
  let grade = state
    .store
    .add_grade(NewGrade {
      user_id:    uid,
      subject_id: body.subject_id,
      title:      body.title,
      score:      body.score,
    })
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(grade)))
}

/// `DELETE /users/{uid}/grades/{gid}`
pub async fn delete_one<S, B>(
  State(state): State<ApiState<S, B>>,
  Path((uid, gid)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError>
where
  S: AgendaStore + 'static,
  B: BlobStore + 'static,
{
  state
    .store
    .delete(DocumentPath::Grade { user_id: uid, grade_id: gid })
    .await
    .map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize)]
pub struct PurgeResponse {
  pub deleted: usize,
}

/// `DELETE /users/{uid}/subjects/{sid}/grades`
pub async fn purge<S, B>(
  State(state): State<ApiState<S, B>>,
  Path((uid, sid)): Path<(Uuid, Uuid)>,
) -> Result<Json<PurgeResponse>, ApiError>
where
  S: AgendaStore + 'static,
  B: BlobStore + 'static,
{
  let deleted = cursada_service::purge_subject_grades(state.store.as_ref(), uid, sid).await?;
  Ok(Json(PurgeResponse { deleted }))
}
