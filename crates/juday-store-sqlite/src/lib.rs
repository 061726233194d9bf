//! SQLite backend for the Juday sheet store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! pool without blocking the async runtime. The one-sheet-per-(owner, day)
//! invariant is enforced by a UNIQUE constraint; realtime update events are
//! fanned out through per-sheet broadcast channels.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
