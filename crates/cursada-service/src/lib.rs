//! Orchestration over the Cursada stores.
//!
//! Everything here is generic over [`cursada_core::store::AgendaStore`] and
//! [`cursada_core::store::BlobStore`]: loading the merged calendar, cascade
//! deletions and subject editing. Independent reads are fanned out on the
//! tokio runtime and joined before their results are combined.
//!
//! [`CalendarView`] and [`SubjectSession`] keep local state for stateful
//! clients; the HTTP API calls the free functions directly.

pub mod calendar;
pub mod cascade;
pub mod error;
pub mod subject;

pub use calendar::{CalendarView, delete_occurrence, load_all};
pub use cascade::{CascadeReport, delete_subject, delete_user, delete_year, purge_subject_grades};
pub use error::{DeleteRejection, Error, Result};
pub use subject::{SubjectSession, upload_file};

#[cfg(test)]
mod tests;
