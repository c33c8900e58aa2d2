//! SQLite and filesystem backends for the Cursada stores.
//!
//! Documents live in SQLite behind [`tokio_rusqlite`] so database access runs
//! on a dedicated thread without blocking the async runtime. Uploaded files
//! live as plain files under a root directory, written with [`tokio::fs`].

mod blob;
mod encode;
mod schema;
mod store;

pub mod error;

pub use blob::FsBlobStore;
pub use error::{Error, Result};
pub use store::SqliteStore;
