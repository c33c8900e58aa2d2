//! Cascade deletion across the document store and the blob store.
//!
//! Documents are removed in one atomic batch; once it commits, uploaded files
//! are removed concurrently and best-effort. A failed file cleanup is logged
//! and counted but never undoes or fails the document deletion, so for a
//! short window files may outlive their subject. A failed commit leaves both
//! documents and files in place.

use std::sync::Arc;

use cursada_core::{
  path::{BlobPrefix, DeleteBatch, DocumentPath},
  store::{AgendaStore, BlobStore, StoreError},
};
use serde::Serialize;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::{Error, Result};

/// What a cascade removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CascadeReport {
  pub documents_deleted: usize,
  pub blobs_deleted:     usize,
  /// Best-effort steps that failed for a reason other than "not found".
  pub cleanup_failures:  usize,
}

type BlobTasks<E> = JoinSet<(BlobPrefix, Result<usize, E>)>;

fn spawn_blob_cleanup<B>(blobs: &Arc<B>, prefixes: impl IntoIterator<Item = BlobPrefix>) -> BlobTasks<B::Error>
where
  B: BlobStore + 'static,
{
  let mut tasks = JoinSet::new();
  for prefix in prefixes {
    let blobs = Arc::clone(blobs);
    tasks.spawn(async move { (prefix, blobs.delete_prefix(prefix).await) });
  }
  tasks
}

async fn join_blob_cleanup<E: StoreError>(mut tasks: BlobTasks<E>, report: &mut CascadeReport) {
  while let Some(joined) = tasks.join_next().await {
    match joined {
      Ok((_, Ok(count))) => report.blobs_deleted += count,
      Ok((prefix, Err(e))) if e.is_not_found() => {
        debug!(%prefix, "no files to clean up");
      }
      Ok((prefix, Err(e))) => {
        warn!(%prefix, error = %e, "file cleanup failed");
        report.cleanup_failures += 1;
      }
      Err(e) => {
        warn!(error = %e, "file cleanup task failed");
        report.cleanup_failures += 1;
      }
    }
  }
}

/// Delete a year, its subjects, their events and their uploaded files.
///
/// Event reads run per subject concurrently. If any read or the batch commit
/// fails nothing is deleted. Running it again on an already-deleted year succeeds and removes
/// nothing.
pub async fn delete_year<S, B>(
  store: &Arc<S>,
  blobs: &Arc<B>,
  user_id: Uuid,
  year_id: Uuid,
) -> Result<CascadeReport>
where
  S: AgendaStore + 'static,
  B: BlobStore + 'static,
{
  let subjects = store.list_subjects(user_id, year_id).await.map_err(Error::store)?;
  debug!(%user_id, %year_id, subjects = subjects.len(), "deleting year");

  let mut reads = JoinSet::new();
  for subject in &subjects {
    let store = Arc::clone(store);
    let subject_id = subject.subject_id;
    reads.spawn(async move {
      let events = store
        .list_subject_events(user_id, year_id, subject_id)
        .await
        .map_err(Error::store)?;
      Ok::<_, Error>((subject_id, events))
    });
  }

  let mut batch = DeleteBatch::new();
  while let Some(joined) = reads.join_next().await {
    let (subject_id, events) = joined??;
    for event in events {
      batch.push(DocumentPath::Event { user_id, year_id, subject_id, event_id: event.event_id });
    }
    batch.push(DocumentPath::Subject { user_id, year_id, subject_id });
  }
  batch.push(DocumentPath::Year { user_id, year_id });

  let mut report = CascadeReport {
    documents_deleted: store.commit_batch(batch).await.map_err(Error::store)?,
    ..CascadeReport::default()
  };

  // Files go only once no document can still reference them.
  let cleanup = spawn_blob_cleanup(
    blobs,
    subjects
      .iter()
      .map(|s| BlobPrefix::Subject { user_id, subject_id: s.subject_id }),
  );
  join_blob_cleanup(cleanup, &mut report).await;

  info!(%user_id, %year_id, ?report, "year deleted");
  Ok(report)
}

/// Delete one subject, its events and its uploaded files. Grades recorded
/// for the subject are kept; see [`purge_subject_grades`].
pub async fn delete_subject<S, B>(
  store: &Arc<S>,
  blobs: &Arc<B>,
  user_id: Uuid,
  year_id: Uuid,
  subject_id: Uuid,
) -> Result<CascadeReport>
where
  S: AgendaStore + 'static,
  B: BlobStore + 'static,
{
  let events = store
    .list_subject_events(user_id, year_id, subject_id)
    .await
    .map_err(Error::store)?;

  let mut batch: DeleteBatch = events
    .iter()
    .map(|e| DocumentPath::Event { user_id, year_id, subject_id, event_id: e.event_id })
    .collect();
  batch.push(DocumentPath::Subject { user_id, year_id, subject_id });

  let mut report = CascadeReport {
    documents_deleted: store.commit_batch(batch).await.map_err(Error::store)?,
    ..CascadeReport::default()
  };
  let cleanup = spawn_blob_cleanup(blobs, [BlobPrefix::Subject { user_id, subject_id }]);
  join_blob_cleanup(cleanup, &mut report).await;

  info!(%user_id, %subject_id, ?report, "subject deleted");
  Ok(report)
}

/// Remove every document and file belonging to `user_id`.
///
/// Never fails: missing data is expected, and any other failure is logged
/// and counted in the report.
pub async fn delete_user<S, B>(store: &S, blobs: &B, user_id: Uuid) -> CascadeReport
where
  S: AgendaStore,
  B: BlobStore,
{
  let mut report = CascadeReport::default();

  match store.delete_tree(DocumentPath::User { user_id }).await {
    Ok(count) => report.documents_deleted = count,
    Err(e) if e.is_not_found() => debug!(%user_id, "no documents to delete"),
    Err(e) => {
      error!(%user_id, error = %e, "deleting account documents failed");
      report.cleanup_failures += 1;
    }
  }

  match blobs.delete_prefix(BlobPrefix::User { user_id }).await {
    Ok(count) => report.blobs_deleted = count,
    Err(e) if e.is_not_found() => debug!(%user_id, "no files to delete"),
    Err(e) => {
      error!(%user_id, error = %e, "deleting account files failed");
      report.cleanup_failures += 1;
    }
  }

  info!(%user_id, ?report, "account data deleted");
  report
}

/// Delete every grade recorded for `subject_id`. Returns how many were
/// removed.
pub async fn purge_subject_grades<S: AgendaStore>(
  store: &S,
  user_id: Uuid,
  subject_id: Uuid,
) -> Result<usize> {
  let grades = store
    .list_grades(user_id, Some(subject_id))
    .await
    .map_err(Error::store)?;

  let batch: DeleteBatch = grades
    .iter()
    .map(|g| DocumentPath::Grade { user_id, grade_id: g.grade_id })
    .collect();
  if batch.is_empty() {
    return Ok(0);
  }

  let removed = store.commit_batch(batch).await.map_err(Error::store)?;
  info!(%user_id, %subject_id, removed, "grades purged");
  Ok(removed)
}
