//! Client-session engines for Juday.
//!
//! This crate is the application logic between the UI and the backend
//! collaborator: the identity context, the daily fetch-or-create resolver,
//! the historical pagination feed, the live editor (debounced autosave +
//! realtime reconciliation), and bulk export/import orchestration. It is
//! generic over [`juday_core::store::SheetStore`] and
//! [`juday_core::auth::AuthGateway`]; no HTTP or database dependencies.

pub mod daily;
pub mod editor;
pub mod error;
pub mod history;
pub mod identity;
pub mod transfer;

pub use error::{Error, Result};

#[cfg(test)]
pub(crate) mod testing;
