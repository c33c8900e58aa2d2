//! One-off calendar entries: subject-scoped events and user-wide general
//! events.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::time::CalendarTime;

/// A dated item attached to a subject (an exam, a deadline, a field trip).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
  pub event_id:   Uuid,
  pub user_id:    Uuid,
  pub year_id:    Uuid,
  pub subject_id: Uuid,
  pub title:      String,
  pub start:      CalendarTime,
  pub all_day:    bool,
  pub color:      String,
}

/// Input to [`crate::store::AgendaStore::add_event`].
#[derive(Debug, Clone)]
pub struct NewEvent {
  pub user_id:    Uuid,
  pub year_id:    Uuid,
  pub subject_id: Uuid,
  pub title:      String,
  pub start:      CalendarTime,
  pub all_day:    bool,
  pub color:      String,
}

/// A dated item owned by the user and not tied to any subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralEvent {
  pub event_id: Uuid,
  pub user_id:  Uuid,
  pub title:    String,
  pub start:    CalendarTime,
  pub all_day:  bool,
  pub color:    String,
}

/// Input to [`crate::store::AgendaStore::add_general_event`].
#[derive(Debug, Clone)]
pub struct NewGeneralEvent {
  pub user_id: Uuid,
  pub title:   String,
  pub start:   CalendarTime,
  pub all_day: bool,
  pub color:   String,
}
