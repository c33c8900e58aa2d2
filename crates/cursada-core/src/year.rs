//! Year: a named grouping of subjects owned by a user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Year {
  pub year_id:    Uuid,
  pub user_id:    Uuid,
  pub name:       String,
  pub created_at: DateTime<Utc>,
}
