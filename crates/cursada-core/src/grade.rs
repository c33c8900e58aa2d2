//! Grades recorded in the user's notebook.
//!
//! Grades reference a subject but are owned by the user; deleting a subject
//! leaves its grades in place until they are purged explicitly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grade {
  pub grade_id:    Uuid,
  pub user_id:     Uuid,
  pub subject_id:  Uuid,
  pub title:       String,
  pub score:       f64,
  /// Server-assigned.
  pub recorded_at: DateTime<Utc>,
}

/// Input to [`crate::store::AgendaStore::add_grade`].
#[derive(Debug, Clone)]
pub struct NewGrade {
  pub user_id:    Uuid,
  pub subject_id: Uuid,
  pub title:      String,
  pub score:      f64,
}
