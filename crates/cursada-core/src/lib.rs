//! Core types, pure scheduling algorithms and storage traits for Cursada.
//!
//! This crate is deliberately free of HTTP, database and runtime
//! dependencies. Storage backends implement [`store::AgendaStore`] and
//! [`store::BlobStore`]; the orchestration that needs I/O lives in
//! `cursada-service`.

pub mod error;
pub mod event;
pub mod exam;
pub mod grade;
pub mod normalize;
pub mod occurrence;
pub mod optimistic;
pub mod path;
pub mod recurrence;
pub mod store;
pub mod subject;
pub mod time;
pub mod year;

pub use error::{Error, Result};
