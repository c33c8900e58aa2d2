//! JSON REST API for Cursada.
//!
//! Exposes an axum [`Router`] backed by any [`AgendaStore`] and
//! [`BlobStore`]. Auth, TLS, and transport concerns are the caller's
//! responsibility; every route is scoped by the `{uid}` in its path.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", cursada_api::api_router(state))
//! ```

pub mod calendar;
pub mod error;
pub mod exams;
pub mod general_events;
pub mod grades;
pub mod subjects;
pub mod users;
pub mod years;

use std::sync::Arc;

use axum::{
  Router,
  routing::{delete, get, patch, post},
};
use cursada_core::{
  normalize::NormalizeOptions,
  store::{AgendaStore, BlobStore},
};

pub use error::ApiError;

/// Shared state threaded through all handlers.
pub struct ApiState<S, B> {
  pub store:   Arc<S>,
  pub blobs:   Arc<B>,
  pub options: NormalizeOptions,
}

impl<S, B> ApiState<S, B> {
  pub fn new(store: Arc<S>, blobs: Arc<B>, options: NormalizeOptions) -> Self {
    Self { store, blobs, options }
  }
}

// Derived `Clone` would require `S: Clone` and `B: Clone`.
impl<S, B> Clone for ApiState<S, B> {
  fn clone(&self) -> Self {
    Self {
      store:   Arc::clone(&self.store),
      blobs:   Arc::clone(&self.blobs),
      options: self.options,
    }
  }
}

/// Build a fully-materialised API router.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, B>(state: ApiState<S, B>) -> Router<()>
where
  S: AgendaStore + 'static,
  B: BlobStore + 'static,
{
  Router::new()
    // Calendar
    .route("/users/{uid}/calendar", get(calendar::list::<S, B>))
    .route("/users/{uid}/calendar/delete", post(calendar::delete_one::<S, B>))
    // Years
    .route("/users/{uid}/years", get(years::list::<S, B>).post(years::create::<S, B>))
    .route(
      "/users/{uid}/years/{yid}",
      patch(years::rename::<S, B>).delete(years::delete_one::<S, B>),
    )
    // Subjects
    .route(
      "/users/{uid}/years/{yid}/subjects",
      get(subjects::list::<S, B>).post(subjects::create::<S, B>),
    )
    .route(
      "/users/{uid}/years/{yid}/subjects/{sid}",
      patch(subjects::update::<S, B>).delete(subjects::delete_one::<S, B>),
    )
    .route(
      "/users/{uid}/years/{yid}/subjects/{sid}/events",
      post(subjects::create_event::<S, B>),
    )
    .route(
      "/users/{uid}/years/{yid}/subjects/{sid}/files",
      post(subjects::upload::<S, B>),
    )
    // General events
    .route(
      "/users/{uid}/general-events",
      get(general_events::list::<S, B>).post(general_events::create::<S, B>),
    )
    .route(
      "/users/{uid}/general-events/{eid}",
      delete(general_events::delete_one::<S, B>),
    )
    // Notebook
    .route("/users/{uid}/grades", get(grades::list::<S, B>).post(grades::create::<S, B>))
    .route("/users/{uid}/grades/{gid}", delete(grades::delete_one::<S, B>))
    .route("/users/{uid}/subjects/{sid}/grades", delete(grades::purge::<S, B>))
    // Account
    .route("/users/{uid}", delete(users::delete_account::<S, B>))
    // Exams
    .route("/exams/shuffle", post(exams::shuffle))
    .with_state(state)
}
