//! The `AgendaStore` and `BlobStore` traits.
//!
//! Both are implemented by storage backends (e.g. `cursada-store-sqlite`).
//! Higher layers (`cursada-service`, `cursada-api`) depend on these
//! abstractions, not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  event::{Event, GeneralEvent, NewEvent, NewGeneralEvent},
  grade::{Grade, NewGrade},
  path::{BlobPath, BlobPrefix, DeleteBatch, DocumentPath},
  subject::{NewSubject, Subject, SubjectPatch},
  year::Year,
};

/// Errors surfaced by a backend.
///
/// Cascades treat "nothing was there" as a normal outcome, so backends must
/// be able to say when an error means exactly that.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  fn is_not_found(&self) -> bool;
}

// ─── Documents ───────────────────────────────────────────────────────────────

/// Abstraction over the hierarchical document store.
///
/// Child documents do not disappear when their parent is deleted; removing
/// a whole subtree is either [`AgendaStore::delete_tree`] or an explicit
/// cascade.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait AgendaStore: Send + Sync {
  type Error: StoreError;

  // ── Years ─────────────────────────────────────────────────────────────

  fn add_year(
    &self,
    user_id: Uuid,
    name: String,
  ) -> impl Future<Output = Result<Year, Self::Error>> + Send + '_;

  /// Returns `None` if not found.
  fn get_year(
    &self,
    user_id: Uuid,
    year_id: Uuid,
  ) -> impl Future<Output = Result<Option<Year>, Self::Error>> + Send + '_;

  fn list_years(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Year>, Self::Error>> + Send + '_;

  /// Fails with a not-found error if the year does not exist.
  fn rename_year(
    &self,
    user_id: Uuid,
    year_id: Uuid,
    name: String,
  ) -> impl Future<Output = Result<Year, Self::Error>> + Send + '_;

  // ── Subjects ──────────────────────────────────────────────────────────

  fn add_subject(
    &self,
    input: NewSubject,
  ) -> impl Future<Output = Result<Subject, Self::Error>> + Send + '_;

  fn get_subject(
    &self,
    user_id: Uuid,
    year_id: Uuid,
    subject_id: Uuid,
  ) -> impl Future<Output = Result<Option<Subject>, Self::Error>> + Send + '_;

  /// All subjects under one year.
  fn list_subjects(
    &self,
    user_id: Uuid,
    year_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Subject>, Self::Error>> + Send + '_;

  /// Merge `patch` into the stored subject and return the result. Fails
  /// with a not-found error if the subject does not exist.
  fn update_subject(
    &self,
    user_id: Uuid,
    year_id: Uuid,
    subject_id: Uuid,
    patch: SubjectPatch,
  ) -> impl Future<Output = Result<Subject, Self::Error>> + Send + '_;

  // ── Subject events ────────────────────────────────────────────────────

  fn add_event(
    &self,
    input: NewEvent,
  ) -> impl Future<Output = Result<Event, Self::Error>> + Send + '_;

  /// The `events` sub-collection of one subject.
  fn list_subject_events(
    &self,
    user_id: Uuid,
    year_id: Uuid,
    subject_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Event>, Self::Error>> + Send + '_;

  /// Every subject event owned by the user, across years and subjects.
  fn list_user_events(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Event>, Self::Error>> + Send + '_;

  // ── General events ────────────────────────────────────────────────────

  fn add_general_event(
    &self,
    input: NewGeneralEvent,
  ) -> impl Future<Output = Result<GeneralEvent, Self::Error>> + Send + '_;

  fn list_general_events(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<GeneralEvent>, Self::Error>> + Send + '_;

  // ── Notebook ──────────────────────────────────────────────────────────

  fn add_grade(
    &self,
    input: NewGrade,
  ) -> impl Future<Output = Result<Grade, Self::Error>> + Send + '_;

  /// The user's grades, optionally restricted to one subject.
  fn list_grades(
    &self,
    user_id: Uuid,
    subject_id: Option<Uuid>,
  ) -> impl Future<Output = Result<Vec<Grade>, Self::Error>> + Send + '_;

  // ── Deletion ──────────────────────────────────────────────────────────

  /// Delete a single document. Deleting a missing document succeeds.
  /// Children of the document are left in place.
  fn delete(
    &self,
    path: DocumentPath,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Delete every document in `batch` atomically. Returns how many
  /// documents existed and were removed.
  fn commit_batch(
    &self,
    batch: DeleteBatch,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// Delete `path` and everything beneath it. Fails with a not-found error
  /// when the subtree was already empty.
  fn delete_tree(
    &self,
    path: DocumentPath,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;
}

// ─── Blobs ───────────────────────────────────────────────────────────────────

/// Abstraction over the object store holding uploaded files.
pub trait BlobStore: Send + Sync {
  type Error: StoreError;

  /// Store `bytes` at `path`, replacing any previous object. Returns the
  /// stored size.
  fn put(
    &self,
    path: BlobPath,
    bytes: Vec<u8>,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// A URL the front-end can download the object from. Fails with a
  /// not-found error if there is no such object.
  fn download_url(
    &self,
    path: BlobPath,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + '_;

  /// Fails with a not-found error if there is no such object.
  fn delete(
    &self,
    path: BlobPath,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Delete every object under `prefix` and return how many there were.
  /// Fails with a not-found error if the folder does not exist.
  fn delete_prefix(
    &self,
    prefix: BlobPrefix,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;
}
