//! [`SqliteStore`]: the SQLite implementation of [`AgendaStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use cursada_core::{
  event::{Event, GeneralEvent, NewEvent, NewGeneralEvent},
  grade::{Grade, NewGrade},
  path::{DeleteBatch, DocumentPath},
  store::AgendaStore,
  subject::{NewSubject, Subject, SubjectPatch},
  year::Year,
};

use crate::{
  Error, Result,
  encode::{
    RawEvent, RawGeneralEvent, RawGrade, RawSubject, RawYear, encode_dt, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Cursada document store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, mostly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run `statements` in one transaction and return the total row count.
  async fn delete_all(&self, statements: Vec<Statement>) -> Result<usize> {
    let removed = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut removed = 0;
        for (sql, params) in &statements {
          removed += tx.execute(sql, rusqlite::params_from_iter(params.iter()))?;
        }
        tx.commit()?;
        Ok(removed)
      })
      .await?;
    Ok(removed)
  }
}

// ─── Delete statements ───────────────────────────────────────────────────────

type Statement = (&'static str, Vec<String>);

/// Statements removing exactly the document at `path`. The user document
/// has no row of its own, so it maps to nothing.
fn document_statements(path: &DocumentPath) -> Vec<Statement> {
  match *path {
    DocumentPath::User { .. } => vec![],
    DocumentPath::Year { user_id, year_id } => vec![(
      "DELETE FROM years WHERE user_id = ?1 AND year_id = ?2",
      vec![encode_uuid(user_id), encode_uuid(year_id)],
    )],
    DocumentPath::Subject { user_id, year_id, subject_id } => vec![(
      "DELETE FROM subjects WHERE user_id = ?1 AND year_id = ?2 AND subject_id = ?3",
      vec![encode_uuid(user_id), encode_uuid(year_id), encode_uuid(subject_id)],
    )],
    DocumentPath::Event { user_id, year_id, subject_id, event_id } => vec![(
      "DELETE FROM events
       WHERE user_id = ?1 AND year_id = ?2 AND subject_id = ?3 AND event_id = ?4",
      vec![
        encode_uuid(user_id),
        encode_uuid(year_id),
        encode_uuid(subject_id),
        encode_uuid(event_id),
      ],
    )],
    DocumentPath::GeneralEvent { user_id, event_id } => vec![(
      "DELETE FROM general_events WHERE user_id = ?1 AND event_id = ?2",
      vec![encode_uuid(user_id), encode_uuid(event_id)],
    )],
    DocumentPath::Grade { user_id, grade_id } => vec![(
      "DELETE FROM grades WHERE user_id = ?1 AND grade_id = ?2",
      vec![encode_uuid(user_id), encode_uuid(grade_id)],
    )],
  }
}

/// Statements removing `path` and every document beneath it.
fn tree_statements(path: &DocumentPath) -> Vec<Statement> {
  match *path {
    DocumentPath::User { user_id } => {
      let uid = encode_uuid(user_id);
      [
        "DELETE FROM events WHERE user_id = ?1",
        "DELETE FROM subjects WHERE user_id = ?1",
        "DELETE FROM years WHERE user_id = ?1",
        "DELETE FROM general_events WHERE user_id = ?1",
        "DELETE FROM grades WHERE user_id = ?1",
      ]
      .into_iter()
      .map(|sql| (sql, vec![uid.clone()]))
      .collect()
    }
    DocumentPath::Year { user_id, year_id } => {
      let params = vec![encode_uuid(user_id), encode_uuid(year_id)];
      vec![
        ("DELETE FROM events WHERE user_id = ?1 AND year_id = ?2", params.clone()),
        ("DELETE FROM subjects WHERE user_id = ?1 AND year_id = ?2", params.clone()),
        ("DELETE FROM years WHERE user_id = ?1 AND year_id = ?2", params),
      ]
    }
    DocumentPath::Subject { user_id, year_id, subject_id } => {
      let params = vec![encode_uuid(user_id), encode_uuid(year_id), encode_uuid(subject_id)];
      vec![
        (
          "DELETE FROM events WHERE user_id = ?1 AND year_id = ?2 AND subject_id = ?3",
          params.clone(),
        ),
        (
          "DELETE FROM subjects WHERE user_id = ?1 AND year_id = ?2 AND subject_id = ?3",
          params,
        ),
      ]
    }
    DocumentPath::Event { .. } | DocumentPath::GeneralEvent { .. } | DocumentPath::Grade { .. } => {
      document_statements(path)
    }
  }
}

// ─── AgendaStore impl ────────────────────────────────────────────────────────

impl AgendaStore for SqliteStore {
  type Error = Error;

  // ── Years ─────────────────────────────────────────────────────────────────

  async fn add_year(&self, user_id: Uuid, name: String) -> Result<Year> {
    let year = Year { year_id: Uuid::new_v4(), user_id, name, created_at: Utc::now() };

    let id_str   = encode_uuid(year.year_id);
    let user_str = encode_uuid(user_id);
    let name     = year.name.clone();
    let at_str   = encode_dt(year.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO years (year_id, user_id, name, created_at) VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, user_str, name, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(year)
  }

  async fn get_year(&self, user_id: Uuid, year_id: Uuid) -> Result<Option<Year>> {
    let user_str = encode_uuid(user_id);
    let id_str   = encode_uuid(year_id);

    let raw: Option<RawYear> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {} FROM years WHERE user_id = ?1 AND year_id = ?2",
          RawYear::COLUMNS
        );
        Ok(
          conn
            .query_row(&sql, rusqlite::params![user_str, id_str], RawYear::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawYear::into_year).transpose()
  }

  async fn list_years(&self, user_id: Uuid) -> Result<Vec<Year>> {
    let user_str = encode_uuid(user_id);

    let raws: Vec<RawYear> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {} FROM years WHERE user_id = ?1 ORDER BY created_at",
          RawYear::COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![user_str], RawYear::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawYear::into_year).collect()
  }

  async fn rename_year(&self, user_id: Uuid, year_id: Uuid, name: String) -> Result<Year> {
    let user_str = encode_uuid(user_id);
    let id_str   = encode_uuid(year_id);

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE years SET name = ?3 WHERE user_id = ?1 AND year_id = ?2",
          rusqlite::params![user_str, id_str, name],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(Error::NotFound(DocumentPath::Year { user_id, year_id }.to_string()));
    }
    self
      .get_year(user_id, year_id)
      .await?
      .ok_or_else(|| Error::NotFound(DocumentPath::Year { user_id, year_id }.to_string()))
  }

  // ── Subjects ──────────────────────────────────────────────────────────────

  async fn add_subject(&self, input: NewSubject) -> Result<Subject> {
    let subject = Subject {
      subject_id: Uuid::new_v4(),
      year_id:    input.year_id,
      user_id:    input.user_id,
      name:       input.name,
      professor:  input.professor,
      classroom:  input.classroom,
      commission: input.commission,
      schedule:   input.schedule,
      start_date: input.start_date,
      end_date:   input.end_date,
      color:      input.color,
      files:      Vec::new(),
      tasks:      Vec::new(),
      notes:      String::new(),
      created_at: Utc::now(),
    };

    let raw = RawSubject::from_subject(&subject)?;

    self
      .conn
      .call(move |conn| {
        let sql = format!(
          "INSERT INTO subjects ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, \
           ?13, ?14, ?15)",
          RawSubject::COLUMNS
        );
        conn.execute(
          &sql,
          rusqlite::params![
            raw.subject_id,
            raw.year_id,
            raw.user_id,
            raw.name,
            raw.professor,
            raw.classroom,
            raw.commission,
            raw.schedule,
            raw.start_date,
            raw.end_date,
            raw.color,
            raw.files,
            raw.tasks,
            raw.notes,
            raw.created_at,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(subject)
  }

  async fn get_subject(
    &self,
    user_id: Uuid,
    year_id: Uuid,
    subject_id: Uuid,
  ) -> Result<Option<Subject>> {
    let params = [encode_uuid(user_id), encode_uuid(year_id), encode_uuid(subject_id)];

    let raw: Option<RawSubject> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {} FROM subjects WHERE user_id = ?1 AND year_id = ?2 AND subject_id = ?3",
          RawSubject::COLUMNS
        );
        Ok(conn.query_row(&sql, params, RawSubject::from_row).optional()?)
      })
      .await?;

    raw.map(RawSubject::into_subject).transpose()
  }

  async fn list_subjects(&self, user_id: Uuid, year_id: Uuid) -> Result<Vec<Subject>> {
    let params = [encode_uuid(user_id), encode_uuid(year_id)];

    let raws: Vec<RawSubject> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {} FROM subjects WHERE user_id = ?1 AND year_id = ?2 ORDER BY created_at",
          RawSubject::COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(params, RawSubject::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSubject::into_subject).collect()
  }

  async fn update_subject(
    &self,
    user_id: Uuid,
    year_id: Uuid,
    subject_id: Uuid,
    patch: SubjectPatch,
  ) -> Result<Subject> {
    let path = DocumentPath::Subject { user_id, year_id, subject_id };
    let mut subject = self
      .get_subject(user_id, year_id, subject_id)
      .await?
      .ok_or_else(|| Error::NotFound(path.to_string()))?;

    patch.apply_to(&mut subject);
    let raw = RawSubject::from_subject(&subject)?;

    // Concurrent merges are last-write-wins.
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE subjects SET
             name = ?4, professor = ?5, classroom = ?6, commission = ?7, schedule = ?8,
             start_date = ?9, end_date = ?10, color = ?11, files = ?12, tasks = ?13,
             notes = ?14
           WHERE user_id = ?1 AND year_id = ?2 AND subject_id = ?3",
          rusqlite::params![
            raw.user_id,
            raw.year_id,
            raw.subject_id,
            raw.name,
            raw.professor,
            raw.classroom,
            raw.commission,
            raw.schedule,
            raw.start_date,
            raw.end_date,
            raw.color,
            raw.files,
            raw.tasks,
            raw.notes,
          ],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(Error::NotFound(path.to_string()));
    }
    Ok(subject)
  }

  // ── Subject events ────────────────────────────────────────────────────────

  async fn add_event(&self, input: NewEvent) -> Result<Event> {
    let event = Event {
      event_id:   Uuid::new_v4(),
      user_id:    input.user_id,
      year_id:    input.year_id,
      subject_id: input.subject_id,
      title:      input.title,
      start:      input.start,
      all_day:    input.all_day,
      color:      input.color,
    };

    let id_str      = encode_uuid(event.event_id);
    let user_str    = encode_uuid(event.user_id);
    let year_str    = encode_uuid(event.year_id);
    let subject_str = encode_uuid(event.subject_id);
    let title       = event.title.clone();
    let start       = event.start.to_string();
    let all_day     = event.all_day;
    let color       = event.color.clone();

    self
      .conn
      .call(move |conn| {
        let sql = format!(
          "INSERT INTO events ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          RawEvent::COLUMNS
        );
        conn.execute(
          &sql,
          rusqlite::params![id_str, user_str, year_str, subject_str, title, start, all_day, color],
        )?;
        Ok(())
      })
      .await?;

    Ok(event)
  }

  async fn list_subject_events(
    &self,
    user_id: Uuid,
    year_id: Uuid,
    subject_id: Uuid,
  ) -> Result<Vec<Event>> {
    let params = [encode_uuid(user_id), encode_uuid(year_id), encode_uuid(subject_id)];

    let raws: Vec<RawEvent> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {} FROM events
           WHERE user_id = ?1 AND year_id = ?2 AND subject_id = ?3
           ORDER BY start",
          RawEvent::COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(params, RawEvent::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEvent::into_event).collect()
  }

  async fn list_user_events(&self, user_id: Uuid) -> Result<Vec<Event>> {
    let user_str = encode_uuid(user_id);

    let raws: Vec<RawEvent> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {} FROM events WHERE user_id = ?1 ORDER BY start",
          RawEvent::COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![user_str], RawEvent::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEvent::into_event).collect()
  }

  // ── General events ────────────────────────────────────────────────────────

  async fn add_general_event(&self, input: NewGeneralEvent) -> Result<GeneralEvent> {
    let event = GeneralEvent {
      event_id: Uuid::new_v4(),
      user_id:  input.user_id,
      title:    input.title,
      start:    input.start,
      all_day:  input.all_day,
      color:    input.color,
    };

    let id_str   = encode_uuid(event.event_id);
    let user_str = encode_uuid(event.user_id);
    let title    = event.title.clone();
    let start    = event.start.to_string();
    let all_day  = event.all_day;
    let color    = event.color.clone();

    self
      .conn
      .call(move |conn| {
        let sql = format!(
          "INSERT INTO general_events ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          RawGeneralEvent::COLUMNS
        );
        conn.execute(
          &sql,
          rusqlite::params![id_str, user_str, title, start, all_day, color],
        )?;
        Ok(())
      })
      .await?;

    Ok(event)
  }

  async fn list_general_events(&self, user_id: Uuid) -> Result<Vec<GeneralEvent>> {
    let user_str = encode_uuid(user_id);

    let raws: Vec<RawGeneralEvent> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {} FROM general_events WHERE user_id = ?1 ORDER BY start",
          RawGeneralEvent::COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![user_str], RawGeneralEvent::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawGeneralEvent::into_general_event).collect()
  }

  // ── Notebook ──────────────────────────────────────────────────────────────

  async fn add_grade(&self, input: NewGrade) -> Result<Grade> {
    let grade = Grade {
      grade_id:    Uuid::new_v4(),
      user_id:     input.user_id,
      subject_id:  input.subject_id,
      title:       input.title,
      score:       input.score,
      recorded_at: Utc::now(),
    };

    let id_str      = encode_uuid(grade.grade_id);
    let user_str    = encode_uuid(grade.user_id);
    let subject_str = encode_uuid(grade.subject_id);
    let title       = grade.title.clone();
    let score       = grade.score;
    let at_str      = encode_dt(grade.recorded_at);

    self
      .conn
      .call(move |conn| {
        let sql = format!(
          "INSERT INTO grades ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          RawGrade::COLUMNS
        );
        conn.execute(
          &sql,
          rusqlite::params![id_str, user_str, subject_str, title, score, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(grade)
  }

  async fn list_grades(&self, user_id: Uuid, subject_id: Option<Uuid>) -> Result<Vec<Grade>> {
    let user_str    = encode_uuid(user_id);
    let subject_str = subject_id.map(encode_uuid);

    let raws: Vec<RawGrade> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {} FROM grades
           WHERE user_id = ?1 AND (?2 IS NULL OR subject_id = ?2)
           ORDER BY recorded_at",
          RawGrade::COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![user_str, subject_str], RawGrade::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawGrade::into_grade).collect()
  }

  // ── Deletion ──────────────────────────────────────────────────────────────

  async fn delete(&self, path: DocumentPath) -> Result<()> {
    self.delete_all(document_statements(&path)).await?;
    Ok(())
  }

  async fn commit_batch(&self, batch: DeleteBatch) -> Result<usize> {
    let statements = batch.paths().iter().flat_map(document_statements).collect();
    let removed = self.delete_all(statements).await?;
    tracing::debug!(paths = batch.len(), removed, "committed delete batch");
    Ok(removed)
  }

  async fn delete_tree(&self, path: DocumentPath) -> Result<usize> {
    let removed = self.delete_all(tree_statements(&path)).await?;
    if removed == 0 {
      return Err(Error::NotFound(path.to_string()));
    }
    tracing::debug!(%path, removed, "deleted document subtree");
    Ok(removed)
  }
}
