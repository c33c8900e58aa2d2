//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings, civil dates are `YYYY-MM-DD`, and the
//! lists embedded in a subject (schedule, files, tasks) are compact JSON.
//! UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, NaiveDate, Utc};
use cursada_core::{
  event::{Event, GeneralEvent},
  grade::Grade,
  subject::Subject,
  time::CalendarTime,
  year::Year,
};
use serde::{Serialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
  Ok(serde_json::to_string(value)?)
}

pub fn decode_json<T: DeserializeOwned>(s: &str) -> Result<T> { Ok(serde_json::from_str(s)?) }

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `years` row.
pub struct RawYear {
  pub year_id:    String,
  pub user_id:    String,
  pub name:       String,
  pub created_at: String,
}

impl RawYear {
  pub const COLUMNS: &'static str = "year_id, user_id, name, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      year_id:    row.get(0)?,
      user_id:    row.get(1)?,
      name:       row.get(2)?,
      created_at: row.get(3)?,
    })
  }

  pub fn into_year(self) -> Result<Year> {
    Ok(Year {
      year_id:    decode_uuid(&self.year_id)?,
      user_id:    decode_uuid(&self.user_id)?,
      name:       self.name,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `subjects` row.
pub struct RawSubject {
  pub subject_id: String,
  pub year_id:    String,
  pub user_id:    String,
  pub name:       String,
  pub professor:  Option<String>,
  pub classroom:  Option<String>,
  pub commission: Option<String>,
  pub schedule:   String,
  pub start_date: Option<String>,
  pub end_date:   Option<String>,
  pub color:      String,
  pub files:      String,
  pub tasks:      String,
  pub notes:      String,
  pub created_at: String,
}

impl RawSubject {
  pub const COLUMNS: &'static str = "subject_id, year_id, user_id, name, professor, classroom, \
                                     commission, schedule, start_date, end_date, color, files, \
                                     tasks, notes, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      subject_id: row.get(0)?,
      year_id:    row.get(1)?,
      user_id:    row.get(2)?,
      name:       row.get(3)?,
      professor:  row.get(4)?,
      classroom:  row.get(5)?,
      commission: row.get(6)?,
      schedule:   row.get(7)?,
      start_date: row.get(8)?,
      end_date:   row.get(9)?,
      color:      row.get(10)?,
      files:      row.get(11)?,
      tasks:      row.get(12)?,
      notes:      row.get(13)?,
      created_at: row.get(14)?,
    })
  }

  /// Encode a full subject for `INSERT` or whole-row `UPDATE`.
  pub fn from_subject(s: &Subject) -> Result<Self> {
    Ok(Self {
      subject_id: encode_uuid(s.subject_id),
      year_id:    encode_uuid(s.year_id),
      user_id:    encode_uuid(s.user_id),
      name:       s.name.clone(),
      professor:  s.professor.clone(),
      classroom:  s.classroom.clone(),
      commission: s.commission.clone(),
      schedule:   encode_json(&s.schedule)?,
      start_date: s.start_date.map(encode_date),
      end_date:   s.end_date.map(encode_date),
      color:      s.color.clone(),
      files:      encode_json(&s.files)?,
      tasks:      encode_json(&s.tasks)?,
      notes:      s.notes.clone(),
      created_at: encode_dt(s.created_at),
    })
  }

  pub fn into_subject(self) -> Result<Subject> {
    Ok(Subject {
      subject_id: decode_uuid(&self.subject_id)?,
      year_id:    decode_uuid(&self.year_id)?,
      user_id:    decode_uuid(&self.user_id)?,
      name:       self.name,
      professor:  self.professor,
      classroom:  self.classroom,
      commission: self.commission,
      schedule:   decode_json(&self.schedule)?,
      start_date: self.start_date.as_deref().map(decode_date).transpose()?,
      end_date:   self.end_date.as_deref().map(decode_date).transpose()?,
      color:      self.color,
      files:      decode_json(&self.files)?,
      tasks:      decode_json(&self.tasks)?,
      notes:      self.notes,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from an `events` row.
pub struct RawEvent {
  pub event_id:   String,
  pub user_id:    String,
  pub year_id:    String,
  pub subject_id: String,
  pub title:      String,
  pub start:      String,
  pub all_day:    bool,
  pub color:      String,
}

impl RawEvent {
  pub const COLUMNS: &'static str =
    "event_id, user_id, year_id, subject_id, title, start, all_day, color";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      event_id:   row.get(0)?,
      user_id:    row.get(1)?,
      year_id:    row.get(2)?,
      subject_id: row.get(3)?,
      title:      row.get(4)?,
      start:      row.get(5)?,
      all_day:    row.get(6)?,
      color:      row.get(7)?,
    })
  }

  pub fn into_event(self) -> Result<Event> {
    Ok(Event {
      event_id:   decode_uuid(&self.event_id)?,
      user_id:    decode_uuid(&self.user_id)?,
      year_id:    decode_uuid(&self.year_id)?,
      subject_id: decode_uuid(&self.subject_id)?,
      title:      self.title,
      start:      CalendarTime::parse(&self.start),
      all_day:    self.all_day,
      color:      self.color,
    })
  }
}

/// Raw strings read directly from a `general_events` row.
pub struct RawGeneralEvent {
  pub event_id: String,
  pub user_id:  String,
  pub title:    String,
  pub start:    String,
  pub all_day:  bool,
  pub color:    String,
}

impl RawGeneralEvent {
  pub const COLUMNS: &'static str = "event_id, user_id, title, start, all_day, color";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      event_id: row.get(0)?,
      user_id:  row.get(1)?,
      title:    row.get(2)?,
      start:    row.get(3)?,
      all_day:  row.get(4)?,
      color:    row.get(5)?,
    })
  }

  pub fn into_general_event(self) -> Result<GeneralEvent> {
    Ok(GeneralEvent {
      event_id: decode_uuid(&self.event_id)?,
      user_id:  decode_uuid(&self.user_id)?,
      title:    self.title,
      start:    CalendarTime::parse(&self.start),
      all_day:  self.all_day,
      color:    self.color,
    })
  }
}

/// Raw strings read directly from a `grades` row.
pub struct RawGrade {
  pub grade_id:    String,
  pub user_id:     String,
  pub subject_id:  String,
  pub title:       String,
  pub score:       f64,
  pub recorded_at: String,
}

impl RawGrade {
  pub const COLUMNS: &'static str = "grade_id, user_id, subject_id, title, score, recorded_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      grade_id:    row.get(0)?,
      user_id:     row.get(1)?,
      subject_id:  row.get(2)?,
      title:       row.get(3)?,
      score:       row.get(4)?,
      recorded_at: row.get(5)?,
    })
  }

  pub fn into_grade(self) -> Result<Grade> {
    Ok(Grade {
      grade_id:    decode_uuid(&self.grade_id)?,
      user_id:     decode_uuid(&self.user_id)?,
      subject_id:  decode_uuid(&self.subject_id)?,
      title:       self.title,
      score:       self.score,
      recorded_at: decode_dt(&self.recorded_at)?,
    })
  }
}
