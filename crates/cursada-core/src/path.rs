//! Typed addresses into the document tree and the blob store.
//!
//! Document layout:
//!
//! ```text
//! users/{uid}
//!   years/{yid}
//!     subjects/{sid}
//!       events/{eid}
//!   generalEvents/{eid}
//!   notebook/{gid}
//! ```
//!
//! Blob layout: `users/{uid}/subjects/{sid}/{file_name}`.

use std::fmt;

use uuid::Uuid;

use crate::{Error, Result};

// ─── Documents ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentPath {
  User { user_id: Uuid },
  Year { user_id: Uuid, year_id: Uuid },
  Subject { user_id: Uuid, year_id: Uuid, subject_id: Uuid },
  Event { user_id: Uuid, year_id: Uuid, subject_id: Uuid, event_id: Uuid },
  GeneralEvent { user_id: Uuid, event_id: Uuid },
  Grade { user_id: Uuid, grade_id: Uuid },
}

impl DocumentPath {
  pub fn user_id(&self) -> Uuid {
    match *self {
      Self::User { user_id }
      | Self::Year { user_id, .. }
      | Self::Subject { user_id, .. }
      | Self::Event { user_id, .. }
      | Self::GeneralEvent { user_id, .. }
      | Self::Grade { user_id, .. } => user_id,
    }
  }
}

impl fmt::Display for DocumentPath {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::User { user_id } => write!(f, "users/{user_id}"),
      Self::Year { user_id, year_id } => write!(f, "users/{user_id}/years/{year_id}"),
      Self::Subject { user_id, year_id, subject_id } => {
        write!(f, "users/{user_id}/years/{year_id}/subjects/{subject_id}")
      }
      Self::Event { user_id, year_id, subject_id, event_id } => write!(
        f,
        "users/{user_id}/years/{year_id}/subjects/{subject_id}/events/{event_id}"
      ),
      Self::GeneralEvent { user_id, event_id } => {
        write!(f, "users/{user_id}/generalEvents/{event_id}")
      }
      Self::Grade { user_id, grade_id } => write!(f, "users/{user_id}/notebook/{grade_id}"),
    }
  }
}

/// A set of document deletions committed together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteBatch {
  paths: Vec<DocumentPath>,
}

impl DeleteBatch {
  pub fn new() -> Self { Self::default() }

  pub fn push(&mut self, path: DocumentPath) { self.paths.push(path) }

  pub fn len(&self) -> usize { self.paths.len() }

  pub fn is_empty(&self) -> bool { self.paths.is_empty() }

  pub fn paths(&self) -> &[DocumentPath] { &self.paths }
}

impl FromIterator<DocumentPath> for DeleteBatch {
  fn from_iter<I: IntoIterator<Item = DocumentPath>>(iter: I) -> Self {
    Self { paths: iter.into_iter().collect() }
  }
}

// ─── Blobs ───────────────────────────────────────────────────────────────────

/// The key of a single uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobPath {
  user_id:    Uuid,
  subject_id: Uuid,
  file_name:  String,
}

impl BlobPath {
  /// Build a key, rejecting names that would escape the subject folder.
  pub fn new(user_id: Uuid, subject_id: Uuid, file_name: &str) -> Result<Self> {
    let trimmed = file_name.trim();
    if trimmed.is_empty()
      || trimmed == "."
      || trimmed == ".."
      || trimmed.contains(['/', '\\', '\0'])
    {
      return Err(Error::InvalidFileName(file_name.to_owned()));
    }
    Ok(Self { user_id, subject_id, file_name: trimmed.to_owned() })
  }

  pub fn file_name(&self) -> &str { &self.file_name }

  pub fn prefix(&self) -> BlobPrefix {
    BlobPrefix::Subject { user_id: self.user_id, subject_id: self.subject_id }
  }
}

impl fmt::Display for BlobPath {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}{}", self.prefix(), self.file_name)
  }
}

/// A folder in the blob store. Displayed with a trailing `/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlobPrefix {
  User { user_id: Uuid },
  Subject { user_id: Uuid, subject_id: Uuid },
}

impl fmt::Display for BlobPrefix {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::User { user_id } => write!(f, "users/{user_id}/"),
      Self::Subject { user_id, subject_id } => {
        write!(f, "users/{user_id}/subjects/{subject_id}/")
      }
    }
  }
}
