//! Editing a single subject: tasks, uploaded files and their storage.

use std::sync::Arc;

use chrono::Utc;
use cursada_core::{
  optimistic::apply_optimistic,
  path::{BlobPath, DocumentPath},
  store::{AgendaStore, BlobStore, StoreError},
  subject::{FileDescriptor, Subject, SubjectChange, SubjectPatch, Task},
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{Error, Result};

fn subject_path(subject: &Subject) -> DocumentPath {
  DocumentPath::Subject {
    user_id:    subject.user_id,
    year_id:    subject.year_id,
    subject_id: subject.subject_id,
  }
}

/// Store `bytes` as `name` under the subject and record its descriptor.
///
/// The blob is written first; the subject only learns about the file once
/// its download URL is known. A file with the same name is replaced.
pub async fn upload_file<S, B>(
  store: &S,
  blobs: &B,
  user_id: Uuid,
  year_id: Uuid,
  subject_id: Uuid,
  name: &str,
  bytes: Vec<u8>,
) -> Result<Subject>
where
  S: AgendaStore,
  B: BlobStore,
{
  let path = BlobPath::new(user_id, subject_id, name)?;
  let subject = store
    .get_subject(user_id, year_id, subject_id)
    .await
    .map_err(Error::store)?
    .ok_or_else(|| {
      Error::NotFound(DocumentPath::Subject { user_id, year_id, subject_id }.to_string())
    })?;

  let size = blobs.put(path.clone(), bytes).await.map_err(Error::store)?;
  let url = blobs.download_url(path.clone()).await.map_err(Error::store)?;

  let descriptor = FileDescriptor {
    name: path.file_name().to_owned(),
    path: path.to_string(),
    url,
    size,
    uploaded_at: Utc::now(),
  };

  let mut files = subject.files;
  files.retain(|f| f.name != descriptor.name);
  files.push(descriptor);

  let updated = store
    .update_subject(user_id, year_id, subject_id, SubjectPatch::files(files))
    .await
    .map_err(Error::store)?;

  info!(%path, size, "file uploaded");
  Ok(updated)
}

/// A subject as displayed to the user, edited optimistically.
///
/// Each edit is applied locally first and then persisted as a merge of the
/// affected list. If persisting fails the local edit is undone and the error
/// is returned.
pub struct SubjectSession<S, B> {
  store:   Arc<S>,
  blobs:   Arc<B>,
  subject: Subject,
}

impl<S, B> SubjectSession<S, B>
where
  S: AgendaStore,
  B: BlobStore,
{
  pub fn new(store: Arc<S>, blobs: Arc<B>, subject: Subject) -> Self {
    Self { store, blobs, subject }
  }

  /// Load the subject from the store.
  pub async fn open(
    store: Arc<S>,
    blobs: Arc<B>,
    user_id: Uuid,
    year_id: Uuid,
    subject_id: Uuid,
  ) -> Result<Self> {
    let subject = store
      .get_subject(user_id, year_id, subject_id)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| {
        Error::NotFound(DocumentPath::Subject { user_id, year_id, subject_id }.to_string())
      })?;
    Ok(Self::new(store, blobs, subject))
  }

  pub fn subject(&self) -> &Subject { &self.subject }

  pub async fn add_task(&mut self, text: impl Into<String>) -> Result<Uuid> {
    let task = Task { task_id: Uuid::new_v4(), text: text.into(), done: false };
    let task_id = task.task_id;
    self.persist(SubjectChange::AddTask(task)).await?;
    Ok(task_id)
  }

  pub async fn toggle_task(&mut self, task_id: Uuid) -> Result<()> {
    if !self.subject.tasks.iter().any(|t| t.task_id == task_id) {
      return Err(Error::NotFound(format!("task {task_id}")));
    }
    self.persist(SubjectChange::ToggleTask(task_id)).await
  }

  pub async fn remove_task(&mut self, task_id: Uuid) -> Result<()> {
    let change = SubjectChange::remove_task(&self.subject, task_id)
      .ok_or_else(|| Error::NotFound(format!("task {task_id}")))?;
    self.persist(change).await
  }

  /// Drop the file's descriptor, then delete the stored bytes best-effort.
  pub async fn remove_file(&mut self, name: &str) -> Result<()> {
    let change = SubjectChange::remove_file(&self.subject, name)
      .ok_or_else(|| Error::NotFound(format!("file {name}")))?;
    self.persist(change).await?;

    let path = BlobPath::new(self.subject.user_id, self.subject.subject_id, name)?;
    match self.blobs.delete(path.clone()).await {
      Ok(()) => debug!(%path, "file removed"),
      Err(e) if e.is_not_found() => debug!(%path, "file was already gone"),
      Err(e) => warn!(%path, error = %e, "file removal failed"),
    }
    Ok(())
  }

  pub async fn upload_file(&mut self, name: &str, bytes: Vec<u8>) -> Result<&Subject> {
    let Subject { user_id, year_id, subject_id, .. } = self.subject;
    self.subject = upload_file(
      self.store.as_ref(),
      self.blobs.as_ref(),
      user_id,
      year_id,
      subject_id,
      name,
      bytes,
    )
    .await?;
    Ok(&self.subject)
  }

  async fn persist(&mut self, change: SubjectChange) -> Result<()> {
    let store = Arc::clone(&self.store);
    let path = subject_path(&self.subject);
    let Subject { user_id, year_id, subject_id, .. } = self.subject;

    let stored = apply_optimistic(&mut self.subject, &change, |subject| {
      let patch = change.patch(subject);
      async move {
        store
          .update_subject(user_id, year_id, subject_id, patch)
          .await
          .map_err(Error::store)
      }
    })
    .await
    .inspect_err(|e| warn!(%path, error = %e, "subject update failed, local change undone"))?;

    self.subject = stored;
    Ok(())
  }
}
