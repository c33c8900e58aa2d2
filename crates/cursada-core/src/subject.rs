//! Subject: one academic course and its weekly class schedule.

use chrono::{DateTime, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::optimistic::Transition;

// ─── Schedule ────────────────────────────────────────────────────────────────

/// The weekdays a class can be scheduled on. Sunday is not representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassDay {
  Monday = 1,
  Tuesday,
  Wednesday,
  Thursday,
  Friday,
  Saturday,
}

impl ClassDay {
  pub const ALL: [ClassDay; 6] = [
    ClassDay::Monday,
    ClassDay::Tuesday,
    ClassDay::Wednesday,
    ClassDay::Thursday,
    ClassDay::Friday,
    ClassDay::Saturday,
  ];

  /// Resolve a stored day name. Matching ignores case and the accents in
  /// "Miércoles" and "Sábado".
  pub fn from_name(name: &str) -> Option<Self> {
    let folded = fold(name.trim());
    Self::ALL
      .into_iter()
      .find(|day| fold(day.name()) == folded)
  }

  /// Display name as written by the front-end.
  pub fn name(self) -> &'static str {
    match self {
      Self::Monday => "Lunes",
      Self::Tuesday => "Martes",
      Self::Wednesday => "Miércoles",
      Self::Thursday => "Jueves",
      Self::Friday => "Viernes",
      Self::Saturday => "Sábado",
    }
  }

  /// Monday = 1 .. Saturday = 6.
  pub fn number(self) -> u32 { self as u32 }

  pub fn weekday(self) -> Weekday {
    match self {
      Self::Monday => Weekday::Mon,
      Self::Tuesday => Weekday::Tue,
      Self::Wednesday => Weekday::Wed,
      Self::Thursday => Weekday::Thu,
      Self::Friday => Weekday::Fri,
      Self::Saturday => Weekday::Sat,
    }
  }
}

fn fold(name: &str) -> String {
  name.to_lowercase().replace('é', "e").replace('á', "a")
}

/// One entry of a subject's weekly schedule.
///
/// Fields stay as the strings the user entered; interpretation happens in
/// [`crate::recurrence`] so that odd legacy values never fail to load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSlot {
  pub day:        String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub start_time: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub end_time:   Option<String>,
}

impl ScheduleSlot {
  pub fn new(day: ClassDay) -> Self {
    Self { day: day.name().to_owned(), start_time: None, end_time: None }
  }

  pub fn with_times(mut self, start: &str, end: &str) -> Self {
    self.start_time = Some(start.to_owned());
    self.end_time = Some(end.to_owned());
    self
  }
}

// ─── Sub-collections embedded in the subject ─────────────────────────────────

/// A checklist item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
  pub task_id: Uuid,
  pub text:    String,
  #[serde(default)]
  pub done:    bool,
}

/// Metadata for an uploaded file; the bytes live in the blob store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptor {
  pub name:        String,
  /// Blob store key, `users/{uid}/subjects/{sid}/{name}`.
  pub path:        String,
  pub url:         String,
  pub size:        u64,
  pub uploaded_at: DateTime<Utc>,
}

// ─── Subject ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
  pub subject_id: Uuid,
  pub year_id:    Uuid,
  pub user_id:    Uuid,
  pub name:       String,
  pub professor:  Option<String>,
  pub classroom:  Option<String>,
  pub commission: Option<String>,
  pub schedule:   Vec<ScheduleSlot>,
  /// First day of classes, inclusive.
  pub start_date: Option<NaiveDate>,
  /// Last day of classes, inclusive. `None` means open-ended.
  pub end_date:   Option<NaiveDate>,
  pub color:      String,
  pub files:      Vec<FileDescriptor>,
  pub tasks:      Vec<Task>,
  pub notes:      String,
  pub created_at: DateTime<Utc>,
}

/// Input to [`crate::store::AgendaStore::add_subject`].
#[derive(Debug, Clone)]
pub struct NewSubject {
  pub user_id:    Uuid,
  pub year_id:    Uuid,
  pub name:       String,
  pub professor:  Option<String>,
  pub classroom:  Option<String>,
  pub commission: Option<String>,
  pub schedule:   Vec<ScheduleSlot>,
  pub start_date: Option<NaiveDate>,
  pub end_date:   Option<NaiveDate>,
  pub color:      String,
}

impl NewSubject {
  /// Convenience constructor with no schedule and no metadata.
  pub fn new(user_id: Uuid, year_id: Uuid, name: impl Into<String>) -> Self {
    Self {
      user_id,
      year_id,
      name: name.into(),
      professor: None,
      classroom: None,
      commission: None,
      schedule: Vec::new(),
      start_date: None,
      end_date: None,
      color: String::new(),
    }
  }
}

// ─── Update-merge ────────────────────────────────────────────────────────────

/// A partial update. `None` leaves a field untouched; for nullable fields
/// `Some(None)` clears it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubjectPatch {
  pub name:       Option<String>,
  #[serde(default, deserialize_with = "nullable")]
  pub professor:  Option<Option<String>>,
  #[serde(default, deserialize_with = "nullable")]
  pub classroom:  Option<Option<String>>,
  #[serde(default, deserialize_with = "nullable")]
  pub commission: Option<Option<String>>,
  pub schedule:   Option<Vec<ScheduleSlot>>,
  #[serde(default, deserialize_with = "nullable")]
  pub start_date: Option<Option<NaiveDate>>,
  #[serde(default, deserialize_with = "nullable")]
  pub end_date:   Option<Option<NaiveDate>>,
  pub color:      Option<String>,
  pub files:      Option<Vec<FileDescriptor>>,
  pub tasks:      Option<Vec<Task>>,
  pub notes:      Option<String>,
}

/// Distinguishes an absent key (outer `None`) from an explicit `null`.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
  D: Deserializer<'de>,
  T: Deserialize<'de>,
{
  Option::<T>::deserialize(deserializer).map(Some)
}

impl SubjectPatch {
  pub fn tasks(tasks: Vec<Task>) -> Self {
    Self { tasks: Some(tasks), ..Default::default() }
  }

  pub fn files(files: Vec<FileDescriptor>) -> Self {
    Self { files: Some(files), ..Default::default() }
  }

  pub fn apply_to(self, subject: &mut Subject) {
    if let Some(name) = self.name {
      subject.name = name;
    }
    if let Some(professor) = self.professor {
      subject.professor = professor;
    }
    if let Some(classroom) = self.classroom {
      subject.classroom = classroom;
    }
    if let Some(commission) = self.commission {
      subject.commission = commission;
    }
    if let Some(schedule) = self.schedule {
      subject.schedule = schedule;
    }
    if let Some(start_date) = self.start_date {
      subject.start_date = start_date;
    }
    if let Some(end_date) = self.end_date {
      subject.end_date = end_date;
    }
    if let Some(color) = self.color {
      subject.color = color;
    }
    if let Some(files) = self.files {
      subject.files = files;
    }
    if let Some(tasks) = self.tasks {
      subject.tasks = tasks;
    }
    if let Some(notes) = self.notes {
      subject.notes = notes;
    }
  }
}

// ─── Local changes applied optimistically ────────────────────────────────────

/// A reversible edit to a subject's task or file list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubjectChange {
  AddTask(Task),
  ToggleTask(Uuid),
  /// `index` is where the task sat, so a rollback restores its position.
  RemoveTask { index: usize, task: Task },
  RemoveFile { index: usize, file: FileDescriptor },
}

impl SubjectChange {
  /// Prepare the removal of `task_id`, if present.
  pub fn remove_task(subject: &Subject, task_id: Uuid) -> Option<Self> {
    let index = subject.tasks.iter().position(|t| t.task_id == task_id)?;
    Some(Self::RemoveTask { index, task: subject.tasks[index].clone() })
  }

  /// Prepare the removal of the file called `name`, if present.
  pub fn remove_file(subject: &Subject, name: &str) -> Option<Self> {
    let index = subject.files.iter().position(|f| f.name == name)?;
    Some(Self::RemoveFile { index, file: subject.files[index].clone() })
  }

  /// The merge patch that persists the post-change state of `subject`.
  pub fn patch(&self, subject: &Subject) -> SubjectPatch {
    match self {
      Self::AddTask(_) | Self::ToggleTask(_) | Self::RemoveTask { .. } => {
        SubjectPatch::tasks(subject.tasks.clone())
      }
      Self::RemoveFile { .. } => SubjectPatch::files(subject.files.clone()),
    }
  }
}

impl Transition<Subject> for SubjectChange {
  fn apply(&self, subject: &mut Subject) {
    match self {
      Self::AddTask(task) => subject.tasks.push(task.clone()),
      Self::ToggleTask(id) => toggle(subject, *id),
      Self::RemoveTask { task, .. } => subject.tasks.retain(|t| t.task_id != task.task_id),
      Self::RemoveFile { file, .. } => subject.files.retain(|f| f.name != file.name),
    }
  }

  fn revert(&self, subject: &mut Subject) {
    match self {
      Self::AddTask(task) => subject.tasks.retain(|t| t.task_id != task.task_id),
      Self::ToggleTask(id) => toggle(subject, *id),
      Self::RemoveTask { index, task } => {
        let at = (*index).min(subject.tasks.len());
        subject.tasks.insert(at, task.clone());
      }
      Self::RemoveFile { index, file } => {
        let at = (*index).min(subject.files.len());
        subject.files.insert(at, file.clone());
      }
    }
  }
}

fn toggle(subject: &mut Subject, task_id: Uuid) {
  if let Some(task) = subject.tasks.iter_mut().find(|t| t.task_id == task_id) {
    task.done = !task.done;
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn subject() -> Subject {
    Subject {
      subject_id: Uuid::new_v4(),
      year_id:    Uuid::new_v4(),
      user_id:    Uuid::new_v4(),
      name:       "Análisis II".into(),
      professor:  Some("Pérez".into()),
      classroom:  None,
      commission: None,
      schedule:   vec![],
      start_date: None,
      end_date:   None,
      color:      "#ff0000".into(),
      files:      vec![],
      tasks:      vec![
        Task { task_id: Uuid::new_v4(), text: "TP 1".into(), done: false },
        Task { task_id: Uuid::new_v4(), text: "TP 2".into(), done: true },
      ],
      notes:      String::new(),
      created_at: Utc::now(),
    }
  }

  #[test]
  fn day_names_resolve_with_or_without_accents() {
    assert_eq!(ClassDay::from_name("Lunes"), Some(ClassDay::Monday));
    assert_eq!(ClassDay::from_name("miercoles"), Some(ClassDay::Wednesday));
    assert_eq!(ClassDay::from_name("Miércoles"), Some(ClassDay::Wednesday));
    assert_eq!(ClassDay::from_name("SÁBADO"), Some(ClassDay::Saturday));
    assert_eq!(ClassDay::from_name("Domingo"), None);
    assert_eq!(ClassDay::Saturday.number(), 6);
  }

  #[test]
  fn patch_distinguishes_missing_from_null() {
    let mut s = subject();
    let patch: SubjectPatch =
      serde_json::from_str(r#"{"professor": null, "notes": "parcial el 10"}"#).unwrap();
    patch.apply_to(&mut s);
    assert_eq!(s.professor, None);
    assert_eq!(s.notes, "parcial el 10");
    assert_eq!(s.color, "#ff0000");
  }

  #[test]
  fn removing_a_task_and_reverting_restores_its_position() {
    let mut s = subject();
    let before = s.tasks.clone();
    let change = SubjectChange::remove_task(&s, before[0].task_id).unwrap();

    change.apply(&mut s);
    assert_eq!(s.tasks.len(), 1);

    change.revert(&mut s);
    assert_eq!(s.tasks, before);
  }

  #[test]
  fn toggle_is_its_own_inverse() {
    let mut s = subject();
    let id = s.tasks[0].task_id;
    let change = SubjectChange::ToggleTask(id);
    change.apply(&mut s);
    assert!(s.tasks[0].done);
    change.revert(&mut s);
    assert!(!s.tasks[0].done);
  }
}
