//! Service tests against `SqliteStore` and `FsBlobStore`, with wrappers that
//! inject failures into chosen operations.

use std::{
  sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
  },
  time::Duration,
};

use chrono::NaiveDate;
use cursada_core::{
  event::{Event, GeneralEvent, NewEvent, NewGeneralEvent},
  grade::{Grade, NewGrade},
  normalize::NormalizeOptions,
  occurrence::OccurrenceSource,
  path::{BlobPath, BlobPrefix, DeleteBatch, DocumentPath},
  store::{AgendaStore, BlobStore, StoreError},
  subject::{ClassDay, NewSubject, ScheduleSlot, Subject, SubjectPatch},
  time::CalendarTime,
  year::Year,
};
use cursada_store_sqlite::{FsBlobStore, SqliteStore};
use uuid::Uuid;

use crate::{
  CalendarView, DeleteRejection, Error, SubjectSession, delete_occurrence, delete_subject,
  delete_user, delete_year, load_all, purge_subject_grades,
};

// ─── Fault injection ─────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
enum FaultError {
  #[error("injected failure")]
  Injected,
  #[error(transparent)]
  Inner(#[from] cursada_store_sqlite::Error),
}

impl StoreError for FaultError {
  fn is_not_found(&self) -> bool {
    match self {
      Self::Injected => false,
      Self::Inner(e) => e.is_not_found(),
    }
  }
}

#[derive(Default)]
struct Faults {
  list_general_events: AtomicBool,
  list_subject_events: AtomicBool,
  update_subject:      AtomicBool,
  delete:              AtomicBool,
  commit_batch:        AtomicBool,
  delete_tree:         AtomicBool,
}

fn trip(flag: &AtomicBool) -> Result<(), FaultError> {
  if flag.load(Ordering::SeqCst) { Err(FaultError::Injected) } else { Ok(()) }
}

struct FlakyStore {
  inner:  SqliteStore,
  faults: Faults,
}

impl AgendaStore for FlakyStore {
  type Error = FaultError;

  async fn add_year(&self, user_id: Uuid, name: String) -> Result<Year, FaultError> {
    Ok(self.inner.add_year(user_id, name).await?)
  }

  async fn get_year(&self, user_id: Uuid, year_id: Uuid) -> Result<Option<Year>, FaultError> {
    Ok(self.inner.get_year(user_id, year_id).await?)
  }

  async fn list_years(&self, user_id: Uuid) -> Result<Vec<Year>, FaultError> {
    Ok(self.inner.list_years(user_id).await?)
  }

  async fn rename_year(&self, user_id: Uuid, year_id: Uuid, name: String) -> Result<Year, FaultError> {
    Ok(self.inner.rename_year(user_id, year_id, name).await?)
  }

  async fn add_subject(&self, input: NewSubject) -> Result<Subject, FaultError> {
    Ok(self.inner.add_subject(input).await?)
  }

  async fn get_subject(
    &self,
    user_id: Uuid,
    year_id: Uuid,
    subject_id: Uuid,
  ) -> Result<Option<Subject>, FaultError> {
    Ok(self.inner.get_subject(user_id, year_id, subject_id).await?)
  }

  async fn list_subjects(&self, user_id: Uuid, year_id: Uuid) -> Result<Vec<Subject>, FaultError> {
    Ok(self.inner.list_subjects(user_id, year_id).await?)
  }

  async fn update_subject(
    &self,
    user_id: Uuid,
    year_id: Uuid,
    subject_id: Uuid,
    patch: SubjectPatch,
  ) -> Result<Subject, FaultError> {
    trip(&self.faults.update_subject)?;
    Ok(self.inner.update_subject(user_id, year_id, subject_id, patch).await?)
  }

  async fn add_event(&self, input: NewEvent) -> Result<Event, FaultError> {
    Ok(self.inner.add_event(input).await?)
  }

  async fn list_subject_events(
    &self,
    user_id: Uuid,
    year_id: Uuid,
    subject_id: Uuid,
  ) -> Result<Vec<Event>, FaultError> {
    trip(&self.faults.list_subject_events)?;
    Ok(self.inner.list_subject_events(user_id, year_id, subject_id).await?)
  }

  async fn list_user_events(&self, user_id: Uuid) -> Result<Vec<Event>, FaultError> {
    Ok(self.inner.list_user_events(user_id).await?)
  }

  async fn add_general_event(&self, input: NewGeneralEvent) -> Result<GeneralEvent, FaultError> {
    Ok(self.inner.add_general_event(input).await?)
  }

  async fn list_general_events(&self, user_id: Uuid) -> Result<Vec<GeneralEvent>, FaultError> {
    trip(&self.faults.list_general_events)?;
    Ok(self.inner.list_general_events(user_id).await?)
  }

  async fn add_grade(&self, input: NewGrade) -> Result<Grade, FaultError> {
    Ok(self.inner.add_grade(input).await?)
  }

  async fn list_grades(&self, user_id: Uuid, subject_id: Option<Uuid>) -> Result<Vec<Grade>, FaultError> {
    Ok(self.inner.list_grades(user_id, subject_id).await?)
  }

  async fn delete(&self, path: DocumentPath) -> Result<(), FaultError> {
    trip(&self.faults.delete)?;
    Ok(AgendaStore::delete(&self.inner, path).await?)
  }

  async fn commit_batch(&self, batch: DeleteBatch) -> Result<usize, FaultError> {
    if self.faults.commit_batch.load(Ordering::SeqCst) {
      // Slow failure, so any cleanup racing the commit would get to run.
      tokio::time::sleep(Duration::from_millis(50)).await;
      return Err(FaultError::Injected);
    }
    Ok(self.inner.commit_batch(batch).await?)
  }

  async fn delete_tree(&self, path: DocumentPath) -> Result<usize, FaultError> {
    trip(&self.faults.delete_tree)?;
    Ok(self.inner.delete_tree(path).await?)
  }
}

struct FlakyBlobs {
  inner:              FsBlobStore,
  fail_delete_prefix: AtomicBool,
}

impl BlobStore for FlakyBlobs {
  type Error = FaultError;

  async fn put(&self, path: BlobPath, bytes: Vec<u8>) -> Result<u64, FaultError> {
    Ok(self.inner.put(path, bytes).await?)
  }

  async fn download_url(&self, path: BlobPath) -> Result<String, FaultError> {
    Ok(self.inner.download_url(path).await?)
  }

  async fn delete(&self, path: BlobPath) -> Result<(), FaultError> {
    Ok(BlobStore::delete(&self.inner, path).await?)
  }

  async fn delete_prefix(&self, prefix: BlobPrefix) -> Result<usize, FaultError> {
    trip(&self.fail_delete_prefix)?;
    Ok(self.inner.delete_prefix(prefix).await?)
  }
}

// ─── Fixtures ────────────────────────────────────────────────────────────────

struct Fixture {
  _dir:  tempfile::TempDir,
  store: Arc<FlakyStore>,
  blobs: Arc<FlakyBlobs>,
  user:  Uuid,
}

async fn fixture() -> Fixture {
  let dir = tempfile::tempdir().expect("temp dir");
  let blobs = FsBlobStore::open(dir.path(), "http://files.test")
    .await
    .expect("blob store");
  let store = SqliteStore::open_in_memory().await.expect("in-memory store");
  Fixture {
    _dir:  dir,
    store: Arc::new(FlakyStore { inner: store, faults: Faults::default() }),
    blobs: Arc::new(FlakyBlobs { inner: blobs, fail_delete_prefix: AtomicBool::new(false) }),
    user:  Uuid::new_v4(),
  }
}

fn date(s: &str) -> Option<NaiveDate> { NaiveDate::parse_from_str(s, "%Y-%m-%d").ok() }

impl Fixture {
  async fn year(&self, name: &str) -> Year {
    self.store.add_year(self.user, name.into()).await.unwrap()
  }

  async fn subject(&self, year: &Year, name: &str) -> Subject {
    let mut input = NewSubject::new(self.user, year.year_id, name);
    input.schedule = vec![ScheduleSlot::new(ClassDay::Monday)];
    input.start_date = date("2024-03-04");
    input.end_date = date("2024-03-18");
    self.store.add_subject(input).await.unwrap()
  }

  async fn event(&self, subject: &Subject, start: &str) -> Event {
    self
      .store
      .add_event(NewEvent {
        user_id:    self.user,
        year_id:    subject.year_id,
        subject_id: subject.subject_id,
        title:      "Parcial".into(),
        start:      CalendarTime::parse(start),
        all_day:    false,
        color:      "#ff0000".into(),
      })
      .await
      .unwrap()
  }

  async fn general(&self, start: &str, all_day: bool) -> GeneralEvent {
    self
      .store
      .add_general_event(NewGeneralEvent {
        user_id: self.user,
        title: "Feriado".into(),
        start: CalendarTime::parse(start),
        all_day,
        color: String::new(),
      })
      .await
      .unwrap()
  }

  async fn file(&self, subject: &Subject, name: &str) -> BlobPath {
    let path = BlobPath::new(self.user, subject.subject_id, name).unwrap();
    self.blobs.put(path.clone(), b"contenido".to_vec()).await.unwrap();
    path
  }

  async fn blob_exists(&self, path: &BlobPath) -> bool {
    match self.blobs.download_url(path.clone()).await {
      Ok(_) => true,
      Err(e) if e.is_not_found() => false,
      Err(e) => panic!("unexpected blob error: {e}"),
    }
  }
}

// ─── Calendar ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn load_all_merges_classes_events_and_general_events() {
  let f = fixture().await;
  let year = f.year("2024").await;
  let subject = f.subject(&year, "Química").await;
  let event = f.event(&subject, "2024-03-06T10:00").await;
  f.general("2024-03-08", true).await;

  let occurrences = load_all(&f.store, f.user, &NormalizeOptions::default())
    .await
    .unwrap();

  let kinds: Vec<&str> = occurrences.iter().map(|o| o.source.kind()).collect();
  assert_eq!(kinds, ["class", "class", "class", "event", "general"]);

  let normalized = &occurrences[3];
  assert_eq!(normalized.id, event.event_id.to_string());
  assert_eq!(normalized.title, "10:00 Parcial");
  assert!(matches!(
    &normalized.source,
    OccurrenceSource::SubjectEvent { subject_name: Some(name), .. } if name == "Química"
  ));

  let pinned = &occurrences[4];
  assert!(!pinned.all_day);
  assert_eq!(pinned.start.to_string(), "2024-03-08T06:00");
}

#[tokio::test]
async fn load_all_collects_subjects_from_every_year() {
  let f = fixture().await;
  let first = f.year("2023").await;
  let second = f.year("2024").await;
  f.subject(&first, "A").await;
  f.subject(&second, "B").await;
  f.subject(&second, "C").await;

  let occurrences = load_all(&f.store, f.user, &NormalizeOptions::default())
    .await
    .unwrap();
  assert_eq!(occurrences.len(), 9);
}

#[tokio::test]
async fn failed_read_fails_the_load_and_keeps_the_view() {
  let f = fixture().await;
  let year = f.year("2024").await;
  f.subject(&year, "Química").await;

  let mut view = CalendarView::new(Arc::clone(&f.store), f.user, NormalizeOptions::default());
  assert_eq!(view.refresh().await.unwrap().len(), 3);

  f.store.faults.list_general_events.store(true, Ordering::SeqCst);
  f.subject(&year, "Física").await;

  assert!(matches!(view.refresh().await, Err(Error::Store(_))));
  assert_eq!(view.occurrences().len(), 3);
}

#[tokio::test]
async fn only_subject_events_can_be_deleted_from_the_calendar() {
  let f = fixture().await;
  let year = f.year("2024").await;
  let subject = f.subject(&year, "Química").await;
  f.event(&subject, "2024-03-06").await;
  f.general("2024-03-08T18:00", false).await;

  let occurrences = load_all(&f.store, f.user, &NormalizeOptions::default())
    .await
    .unwrap();

  let class = &occurrences[0];
  let event = &occurrences[3];
  let general = &occurrences[4];

  assert!(matches!(
    delete_occurrence(f.store.as_ref(), f.user, class).await,
    Err(Error::Rejected(DeleteRejection::RecurringClass))
  ));
  assert!(matches!(
    delete_occurrence(f.store.as_ref(), f.user, general).await,
    Err(Error::Rejected(DeleteRejection::GeneralEvent))
  ));

  delete_occurrence(f.store.as_ref(), f.user, event).await.unwrap();
  assert!(f.store.list_user_events(f.user).await.unwrap().is_empty());
}

#[tokio::test]
async fn view_removes_an_event_only_after_the_store_confirms() {
  let f = fixture().await;
  let year = f.year("2024").await;
  let subject = f.subject(&year, "Química").await;
  let event = f.event(&subject, "2024-03-06").await;
  let id = event.event_id.to_string();

  let mut view = CalendarView::new(Arc::clone(&f.store), f.user, NormalizeOptions::default());
  view.refresh().await.unwrap();

  f.store.faults.delete.store(true, Ordering::SeqCst);
  assert!(view.delete(&id).await.is_err());
  assert!(view.occurrences().iter().any(|o| o.id == id));

  f.store.faults.delete.store(false, Ordering::SeqCst);
  view.delete(&id).await.unwrap();
  assert!(!view.occurrences().iter().any(|o| o.id == id));
  assert_eq!(view.occurrences().len(), 3);
}

// ─── Cascades ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn year_cascade_removes_subjects_events_and_files() {
  let f = fixture().await;
  let year = f.year("2024").await;
  let keep = f.year("2025").await;
  let kept_subject = f.subject(&keep, "Otra").await;

  let mut files = Vec::new();
  for name in ["Química", "Física"] {
    let subject = f.subject(&year, name).await;
    for day in ["2024-04-01", "2024-04-02", "2024-04-03"] {
      f.event(&subject, day).await;
    }
    files.push(f.file(&subject, "apunte.pdf").await);
    files.push(f.file(&subject, "guia.pdf").await);
  }

  let report = delete_year(&f.store, &f.blobs, f.user, year.year_id).await.unwrap();
  assert_eq!(report.documents_deleted, 2 + 6 + 1);
  assert_eq!(report.blobs_deleted, 4);
  assert_eq!(report.cleanup_failures, 0);

  assert!(f.store.list_subjects(f.user, year.year_id).await.unwrap().is_empty());
  assert!(f.store.get_year(f.user, year.year_id).await.unwrap().is_none());
  assert!(f.store.list_user_events(f.user).await.unwrap().is_empty());
  for path in &files {
    assert!(!f.blob_exists(path).await);
  }
  assert_eq!(f.store.list_subjects(f.user, keep.year_id).await.unwrap(), vec![kept_subject]);

  let again = delete_year(&f.store, &f.blobs, f.user, year.year_id).await.unwrap();
  assert_eq!(again.documents_deleted, 0);
  assert_eq!(again.blobs_deleted, 0);
}

#[tokio::test]
async fn failed_event_read_deletes_nothing() {
  let f = fixture().await;
  let year = f.year("2024").await;
  let subject = f.subject(&year, "Química").await;
  f.event(&subject, "2024-04-01").await;
  let file = f.file(&subject, "apunte.pdf").await;

  f.store.faults.list_subject_events.store(true, Ordering::SeqCst);
  assert!(delete_year(&f.store, &f.blobs, f.user, year.year_id).await.is_err());

  assert_eq!(f.store.list_subjects(f.user, year.year_id).await.unwrap().len(), 1);
  assert!(f.store.get_year(f.user, year.year_id).await.unwrap().is_some());
  assert!(f.blob_exists(&file).await);
}

#[tokio::test]
async fn failed_commit_keeps_documents_and_files() {
  let f = fixture().await;
  let year = f.year("2024").await;
  let subject = f.subject(&year, "Química").await;
  f.event(&subject, "2024-04-01").await;
  let file = f.file(&subject, "apunte.pdf").await;

  f.store.faults.commit_batch.store(true, Ordering::SeqCst);
  assert!(delete_year(&f.store, &f.blobs, f.user, year.year_id).await.is_err());
  assert!(
    delete_subject(&f.store, &f.blobs, f.user, year.year_id, subject.subject_id)
      .await
      .is_err()
  );

  assert!(f.store.get_year(f.user, year.year_id).await.unwrap().is_some());
  let subjects = f.store.list_subjects(f.user, year.year_id).await.unwrap();
  assert_eq!(subjects.len(), 1);
  assert_eq!(subjects[0].subject_id, subject.subject_id);
  assert!(f.blob_exists(&file).await);

  f.store.faults.commit_batch.store(false, Ordering::SeqCst);
  let report = delete_year(&f.store, &f.blobs, f.user, year.year_id).await.unwrap();
  assert_eq!(report.blobs_deleted, 1);
  assert!(!f.blob_exists(&file).await);
}

#[tokio::test]
async fn failed_file_cleanup_is_counted_not_propagated() {
  let f = fixture().await;
  let year = f.year("2024").await;
  let subject = f.subject(&year, "Química").await;
  let file = f.file(&subject, "apunte.pdf").await;

  f.blobs.fail_delete_prefix.store(true, Ordering::SeqCst);
  let report = delete_year(&f.store, &f.blobs, f.user, year.year_id).await.unwrap();

  assert_eq!(report.documents_deleted, 2);
  assert_eq!(report.cleanup_failures, 1);
  assert!(f.store.get_year(f.user, year.year_id).await.unwrap().is_none());
  assert!(f.blob_exists(&file).await);
}

#[tokio::test]
async fn subject_cascade_keeps_grades_until_purged() {
  let f = fixture().await;
  let year = f.year("2024").await;
  let subject = f.subject(&year, "Química").await;
  let other = f.subject(&year, "Física").await;
  f.event(&subject, "2024-04-01").await;
  f.event(&other, "2024-04-01").await;
  let file = f.file(&subject, "apunte.pdf").await;
  for score in [6.0, 8.5] {
    f.store
      .add_grade(NewGrade {
        user_id:    f.user,
        subject_id: subject.subject_id,
        title:      "Parcial".into(),
        score,
      })
      .await
      .unwrap();
  }

  let report = delete_subject(&f.store, &f.blobs, f.user, year.year_id, subject.subject_id)
    .await
    .unwrap();
  assert_eq!(report.documents_deleted, 2);
  assert_eq!(report.blobs_deleted, 1);
  assert!(!f.blob_exists(&file).await);
  assert_eq!(f.store.list_user_events(f.user).await.unwrap().len(), 1);
  assert_eq!(f.store.list_grades(f.user, Some(subject.subject_id)).await.unwrap().len(), 2);

  let purged = purge_subject_grades(f.store.as_ref(), f.user, subject.subject_id)
    .await
    .unwrap();
  assert_eq!(purged, 2);
  assert_eq!(
    purge_subject_grades(f.store.as_ref(), f.user, subject.subject_id).await.unwrap(),
    0
  );
}

#[tokio::test]
async fn account_deletion_clears_everything_and_is_repeatable() {
  let f = fixture().await;
  let year = f.year("2024").await;
  let subject = f.subject(&year, "Química").await;
  f.event(&subject, "2024-04-01").await;
  f.general("2024-05-25", true).await;
  let file = f.file(&subject, "apunte.pdf").await;

  let report = delete_user(f.store.as_ref(), f.blobs.as_ref(), f.user).await;
  assert_eq!(report.documents_deleted, 4);
  assert_eq!(report.blobs_deleted, 1);
  assert_eq!(report.cleanup_failures, 0);
  assert!(!f.blob_exists(&file).await);
  assert!(f.store.list_years(f.user).await.unwrap().is_empty());

  let again = delete_user(f.store.as_ref(), f.blobs.as_ref(), f.user).await;
  assert_eq!(again, Default::default());
}

#[tokio::test]
async fn account_deletion_logs_unexpected_failures() {
  let f = fixture().await;
  let year = f.year("2024").await;
  let subject = f.subject(&year, "Química").await;
  let file = f.file(&subject, "apunte.pdf").await;

  f.store.faults.delete_tree.store(true, Ordering::SeqCst);
  let report = delete_user(f.store.as_ref(), f.blobs.as_ref(), f.user).await;

  assert_eq!(report.cleanup_failures, 1);
  assert_eq!(report.blobs_deleted, 1);
  assert!(!f.blob_exists(&file).await);
}

// ─── Subject editing ─────────────────────────────────────────────────────────

#[tokio::test]
async fn task_edits_are_persisted() {
  let f = fixture().await;
  let year = f.year("2024").await;
  let subject = f.subject(&year, "Química").await;

  let mut session = SubjectSession::open(
    Arc::clone(&f.store),
    Arc::clone(&f.blobs),
    f.user,
    year.year_id,
    subject.subject_id,
  )
  .await
  .unwrap();

  let first = session.add_task("TP 1").await.unwrap();
  let second = session.add_task("TP 2").await.unwrap();
  session.toggle_task(first).await.unwrap();
  session.remove_task(second).await.unwrap();

  let stored = f
    .store
    .get_subject(f.user, year.year_id, subject.subject_id)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(stored.tasks.len(), 1);
  assert!(stored.tasks[0].done);
  assert_eq!(&stored, session.subject());
}

#[tokio::test]
async fn failed_task_edit_rolls_back_local_state() {
  let f = fixture().await;
  let year = f.year("2024").await;
  let subject = f.subject(&year, "Química").await;
  let mut session = SubjectSession::new(Arc::clone(&f.store), Arc::clone(&f.blobs), subject);
  let a = session.add_task("A").await.unwrap();
  session.add_task("B").await.unwrap();
  let before = session.subject().clone();

  f.store.faults.update_subject.store(true, Ordering::SeqCst);
  assert!(session.add_task("C").await.is_err());
  assert!(session.toggle_task(a).await.is_err());
  assert!(session.remove_task(a).await.is_err());
  assert_eq!(session.subject(), &before);

  assert!(matches!(
    session.remove_task(Uuid::new_v4()).await,
    Err(Error::NotFound(_))
  ));
}

#[tokio::test]
async fn uploaded_files_can_be_removed() {
  let f = fixture().await;
  let year = f.year("2024").await;
  let subject = f.subject(&year, "Química").await;
  let mut session = SubjectSession::new(Arc::clone(&f.store), Arc::clone(&f.blobs), subject);

  session.upload_file("apunte.pdf", b"v1".to_vec()).await.unwrap();
  let updated = session.upload_file("apunte.pdf", b"v2-longer".to_vec()).await.unwrap();
  assert_eq!(updated.files.len(), 1);
  assert_eq!(updated.files[0].size, 9);
  assert!(updated.files[0].url.starts_with("http://files.test/users/"));

  let path = BlobPath::new(f.user, updated.subject_id, "apunte.pdf").unwrap();
  assert!(f.blob_exists(&path).await);

  session.remove_file("apunte.pdf").await.unwrap();
  assert!(session.subject().files.is_empty());
  assert!(!f.blob_exists(&path).await);
}

#[tokio::test]
async fn failed_file_removal_keeps_the_descriptor_and_the_bytes() {
  let f = fixture().await;
  let year = f.year("2024").await;
  let subject = f.subject(&year, "Química").await;
  let mut session = SubjectSession::new(Arc::clone(&f.store), Arc::clone(&f.blobs), subject);
  session.upload_file("apunte.pdf", b"v1".to_vec()).await.unwrap();

  f.store.faults.update_subject.store(true, Ordering::SeqCst);
  assert!(session.remove_file("apunte.pdf").await.is_err());
  assert_eq!(session.subject().files.len(), 1);

  let path = BlobPath::new(f.user, session.subject().subject_id, "apunte.pdf").unwrap();
  assert!(f.blob_exists(&path).await);
}

#[tokio::test]
async fn invalid_upload_names_are_rejected() {
  let f = fixture().await;
  let year = f.year("2024").await;
  let subject = f.subject(&year, "Química").await;
  let mut session = SubjectSession::new(Arc::clone(&f.store), Arc::clone(&f.blobs), subject);

  assert!(matches!(
    session.upload_file("../escape", b"x".to_vec()).await,
    Err(Error::Core(cursada_core::Error::InvalidFileName(_)))
  ));
}
