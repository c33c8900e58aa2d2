//! `DELETE /users/{uid}`: remove every document and file of an account.
//!
//! Always answers 200 with a report; cleanup failures are counted in it
//! rather than turned into an error status.

use axum::{
  Json,
  extract::{Path, State},
};
use cursada_core::store::{AgendaStore, BlobStore};
use cursada_service::CascadeReport;
use uuid::Uuid;

use crate::ApiState;

pub async fn delete_account<S, B>(
  State(state): State<ApiState<S, B>>,
  Path(uid): Path<Uuid>,
) -> Json<CascadeReport>
where
  S: AgendaStore + 'static,
  B: BlobStore + 'static,
{
  Json(cursada_service::delete_user(state.store.as_ref(), state.blobs.as_ref(), uid).await)
}
