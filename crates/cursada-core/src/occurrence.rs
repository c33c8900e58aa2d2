//! [`CalendarOccurrence`]: the derived, never-persisted unit the calendar
//! renders.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::time::CalendarTime;

/// Where an occurrence came from. Deletion and rendering branch on this, so
/// every consumer matches it exhaustively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OccurrenceSource {
  /// Materialised from a subject's weekly schedule.
  Class { subject_id: Uuid, year_id: Uuid },
  /// A one-off event stored under a subject.
  #[serde(rename = "event")]
  SubjectEvent {
    event_id:     Uuid,
    subject_id:   Uuid,
    year_id:      Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    subject_name: Option<String>,
  },
  /// A user-wide event.
  General {
    event_id:       Uuid,
    /// The stored all-day flag. The displayed occurrence may be pinned to a
    /// visible hour; this keeps the real value.
    marked_all_day: bool,
  },
}

impl OccurrenceSource {
  /// Short tag used in logs and in the serialized `kind` field.
  pub fn kind(&self) -> &'static str {
    match self {
      Self::Class { .. } => "class",
      Self::SubjectEvent { .. } => "event",
      Self::General { .. } => "general",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarOccurrence {
  pub id:      String,
  pub title:   String,
  pub start:   CalendarTime,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub end:     Option<CalendarTime>,
  pub all_day: bool,
  pub color:   String,
  #[serde(flatten)]
  pub source:  OccurrenceSource,
}
